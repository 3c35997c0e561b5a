//! The registration walk: definition tree in, flat bound-route table out.

use super::def::RouteDef;
use super::headers::{merge_over, HeaderCatalog};
use crate::body::BodyConverters;
use crate::dispatcher::HeaderVec;
use crate::error::ConfigError;
use crate::runner::RouteRunner;
use http::Method;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// One registered (path, method) pair. Built once by the walk, immutable
/// thereafter; shared by the router table and the handler's runner.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub method: Method,
    /// Full path template with `:name` tokens, ancestors' prefixes included.
    pub path_pattern: String,
    pub handler_name: String,
    /// Effective response headers: own + inherited, child over parent.
    pub headers: Vec<(String, String)>,
}

impl RouteEntry {
    /// The header set in the dispatch-time representation.
    #[must_use]
    pub fn header_vec(&self) -> HeaderVec {
        self.headers
            .iter()
            .map(|(name, value)| (Arc::from(name.as_str()), value.clone()))
            .collect()
    }
}

/// A route entry together with its bound runner.
#[derive(Debug)]
pub struct BoundRoute {
    pub entry: Arc<RouteEntry>,
    pub runner: RouteRunner,
}

/// Walk one definition tree into bound routes.
///
/// # Errors
///
/// Any [`ConfigError`] aborts the walk — and with it, startup.
pub fn bind_routes(
    root: &RouteDef,
    catalog: &HeaderCatalog,
    converters: &Arc<BodyConverters>,
) -> Result<Vec<BoundRoute>, ConfigError> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    bind_into(root, catalog, converters, &mut out, &mut seen, "", &[])?;
    info!(routes_count = out.len(), "route tree bound");
    Ok(out)
}

/// Walk one definition tree into an existing table, sharing the collision
/// set across multiple mounted trees.
///
/// Sub-routes are walked (and therefore registered) before the node's own
/// handlers; dispatch is path-driven, so the order only pins down which
/// registration a duplicate-route error points at.
///
/// # Errors
///
/// See [`bind_routes`].
pub fn bind_into(
    def: &RouteDef,
    catalog: &HeaderCatalog,
    converters: &Arc<BodyConverters>,
    out: &mut Vec<BoundRoute>,
    seen: &mut HashSet<(Method, String)>,
    prefix: &str,
    inherited: &[(String, String)],
) -> Result<(), ConfigError> {
    let own_path = join_paths(prefix, &def.path)?;
    let own_headers = merge_over(
        inherited,
        catalog.accumulate(&def.headers, &def.header_groups)?,
    );

    for sub in &def.subroutes {
        bind_into(sub, catalog, converters, out, seen, &own_path, &own_headers)?;
    }

    for handler in &def.handlers {
        let joined = join_paths(&own_path, &handler.path_ext)?;
        let full_path = if joined.is_empty() {
            "/".to_string()
        } else {
            joined
        };
        let headers = merge_over(
            &own_headers,
            catalog.accumulate(&handler.headers, &handler.header_groups)?,
        );

        if !seen.insert((handler.method.clone(), full_path.clone())) {
            return Err(ConfigError::DuplicateRoute {
                method: handler.method.clone(),
                path: full_path,
            });
        }

        let entry = Arc::new(RouteEntry {
            method: handler.method.clone(),
            path_pattern: full_path,
            handler_name: handler.name.clone(),
            headers,
        });
        debug!(
            method = %entry.method,
            path = %entry.path_pattern,
            handler_name = %entry.handler_name,
            "route bound"
        );
        let runner = RouteRunner::bind(entry.clone(), handler, converters.clone())?;
        out.push(BoundRoute { entry, runner });
    }

    Ok(())
}

/// Append a path segment to a prefix, validating its shape.
///
/// The empty string and `"/"` both mean "no extension" and yield the prefix
/// unchanged; anything else must start with `/` and not end with one.
fn join_paths(prefix: &str, segment: &str) -> Result<String, ConfigError> {
    if segment.is_empty() || segment == "/" {
        return Ok(prefix.to_string());
    }
    if !segment.starts_with('/') {
        return Err(ConfigError::InvalidPath {
            path: segment.to_string(),
            reason: "must start with '/'",
        });
    }
    if segment.ends_with('/') {
        return Err(ConfigError::InvalidPath {
            path: segment.to_string(),
            reason: "must not end with '/'",
        });
    }
    if segment.contains("//") {
        return Err(ConfigError::InvalidPath {
            path: segment.to_string(),
            reason: "must not contain empty segments",
        });
    }
    Ok(format!("{prefix}{segment}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_paths() {
        assert_eq!(join_paths("", "/items").expect("join"), "/items");
        assert_eq!(join_paths("/items", "/:id").expect("join"), "/items/:id");
        assert_eq!(join_paths("/items", "").expect("join"), "/items");
        assert_eq!(join_paths("/items", "/").expect("join"), "/items");
    }

    #[test]
    fn test_join_paths_rejects_malformed_segments() {
        assert!(join_paths("", "items").is_err());
        assert!(join_paths("", "/items/").is_err());
        assert!(join_paths("", "/a//b").is_err());
    }
}
