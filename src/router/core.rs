use crate::routes::RouteEntry;
use http::Method;
use regex::Regex;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Maximum number of path/query parameters before heap allocation.
/// Most REST paths have ≤4 parameters.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the dispatch hot path. Parameter
/// names come from the static route table, so they are shared as `Arc<str>`;
/// values are per-request data.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Result of matching a request path against the route table.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: Arc<RouteEntry>,
    /// Path parameters extracted from the URL (`:id` → `("id", "42")`).
    pub path_params: ParamVec,
    pub handler_name: String,
    /// Query parameters, populated by the server before dispatch.
    pub query_params: ParamVec,
}

/// Matches HTTP requests against the bound route table.
#[derive(Clone)]
pub struct Router {
    routes: Vec<(Method, Regex, Arc<RouteEntry>, Vec<Arc<str>>)>,
}

impl Router {
    /// Compile the bound entries into a matchable table.
    #[must_use]
    pub fn new(entries: Vec<Arc<RouteEntry>>) -> Self {
        let routes: Vec<_> = entries
            .into_iter()
            .map(|entry| {
                let (regex, param_names) = path_to_regex(&entry.path_pattern);
                (entry.method.clone(), regex, entry, param_names)
            })
            .collect();

        info!(routes_count = routes.len(), "routing table compiled");
        Self { routes }
    }

    /// Match a request to a route, extracting path parameters.
    ///
    /// Returns `None` when nothing matches (a 404 for the caller).
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        for (route_method, regex, entry, param_names) in &self.routes {
            if route_method != method {
                continue;
            }
            if let Some(captures) = regex.captures(path) {
                let mut path_params = ParamVec::new();
                for (name, capture) in param_names.iter().zip(captures.iter().skip(1)) {
                    if let Some(value) = capture {
                        path_params.push((name.clone(), value.as_str().to_string()));
                    }
                }
                debug!(
                    method = %method,
                    path = %path,
                    handler_name = %entry.handler_name,
                    route_pattern = %entry.path_pattern,
                    "route matched"
                );
                return Some(RouteMatch {
                    route: entry.clone(),
                    path_params,
                    handler_name: entry.handler_name.clone(),
                    query_params: ParamVec::new(),
                });
            }
        }

        warn!(method = %method, path = %path, "no route matched");
        None
    }

    /// All registered path patterns, for diagnostics.
    #[must_use]
    pub fn path_patterns(&self) -> Vec<String> {
        self.routes
            .iter()
            .map(|(_, _, entry, _)| entry.path_pattern.clone())
            .collect()
    }
}

/// Convert a `:name` path template into a regex plus the ordered parameter
/// names.
///
/// `/items/:id` → `^/items/([^/]+)$` with names `["id"]`.
fn path_to_regex(path: &str) -> (Regex, Vec<Arc<str>>) {
    if path == "/" {
        return (
            Regex::new(r"^/$").expect("failed to compile path regex"),
            Vec::new(),
        );
    }

    let mut pattern = String::with_capacity(path.len() + 8);
    pattern.push('^');
    let mut param_names: Vec<Arc<str>> = Vec::new();

    for segment in path.split('/') {
        if let Some(name) = segment.strip_prefix(':') {
            pattern.push_str("/([^/]+)");
            param_names.push(Arc::from(name));
        } else if !segment.is_empty() {
            pattern.push('/');
            pattern.push_str(&regex::escape(segment));
        }
    }

    pattern.push('$');
    let regex = Regex::new(&pattern).expect("failed to compile path regex");
    (regex, param_names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_to_regex_extracts_params() {
        let (regex, names) = path_to_regex("/users/:user_id/posts/:post_id");
        assert_eq!(
            names,
            vec![Arc::<str>::from("user_id"), Arc::<str>::from("post_id")]
        );
        let caps = regex.captures("/users/7/posts/abc").expect("match");
        assert_eq!(&caps[1], "7");
        assert_eq!(&caps[2], "abc");
        assert!(!regex.is_match("/users/7/posts"));
    }

    #[test]
    fn test_path_to_regex_root() {
        let (regex, names) = path_to_regex("/");
        assert!(regex.is_match("/"));
        assert!(names.is_empty());
    }
}
