//! Route and handler definition builders.
//!
//! These are the explicit, statically built replacements for runtime route
//! discovery: a [`RouteDef`] describes one path segment with response
//! headers, nested sub-routes and handler functions; a [`HandlerDef`] maps
//! one function to one HTTP method and path extension; a [`ParamSpec`]
//! declares where each handler argument comes from and what type it must
//! coerce to. Definitions exist only during registration — the walk in
//! [`super::walk`] turns them into the immutable runtime table.

use crate::coerce::{DeclaredType, ValueType};
use crate::dispatcher::RequestContext;
use crate::error::HttpError;
use crate::resolver::Args;
use http::Method;
use serde_json::Value;
use std::sync::Arc;

/// What a handler hands back to the framework.
pub enum Reply {
    /// A payload the runner feeds into the request's reply slot.
    Payload(Value),
    /// The handler already sent through the context (or wants an empty
    /// body); the runner only force-completes the slot.
    Sent,
}

/// Result type returned by handler functions.
pub type HandlerResult = Result<Reply, HttpError>;

/// A bound handler function: resolved arguments in, one reply out.
pub type HandlerFn = dyn Fn(&RequestContext, &Args) -> HandlerResult + Send + Sync;

/// The source a parameter's value is extracted from — exactly one per
/// parameter, by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamSource {
    /// A `:key` path segment of the full route path.
    Path(String),
    /// A query-string parameter.
    Query(String),
    /// A request header.
    Header(String),
    /// The request body, decoded by the content-type converter registry.
    Body,
}

impl std::fmt::Display for ParamSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamSource::Path(_) => write!(f, "path"),
            ParamSource::Query(_) => write!(f, "query"),
            ParamSource::Header(_) => write!(f, "header"),
            ParamSource::Body => write!(f, "body"),
        }
    }
}

/// Declaration of one formal handler parameter.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: String,
    pub source: ParamSource,
    pub declared: DeclaredType,
    pub optional: bool,
}

impl ParamSpec {
    /// A path parameter. Accepts the key with or without the `:` marker
    /// prefix; it is normalized off.
    #[must_use]
    pub fn path(key: &str, ty: ValueType) -> Self {
        let key = key.strip_prefix(':').unwrap_or(key);
        Self {
            name: key.to_string(),
            source: ParamSource::Path(key.to_string()),
            declared: DeclaredType::new(ty),
            optional: false,
        }
    }

    /// A string query parameter.
    #[must_use]
    pub fn query(key: &str) -> Self {
        Self {
            name: key.to_string(),
            source: ParamSource::Query(key.to_string()),
            declared: DeclaredType::new(ValueType::Str),
            optional: false,
        }
    }

    /// A string header parameter. The `Content-Type` header resolves to the
    /// parsed media-type essence rather than the raw header value.
    #[must_use]
    pub fn header(name: &str) -> Self {
        Self {
            name: name.to_string(),
            source: ParamSource::Header(name.to_string()),
            declared: DeclaredType::new(ValueType::Str),
            optional: false,
        }
    }

    /// The request body, decoded against its declared content type.
    #[must_use]
    pub fn body(name: &str) -> Self {
        Self {
            name: name.to_string(),
            source: ParamSource::Body,
            declared: DeclaredType::new(ValueType::Json),
            optional: false,
        }
    }

    /// Override the declared target type. Role/type constraints are checked
    /// when the handler is bound.
    #[must_use]
    pub fn with_type(mut self, ty: ValueType) -> Self {
        self.declared.ty = ty;
        self
    }

    /// Rename the argument as seen by the handler, keeping the extraction
    /// key (useful when a header name is not a valid argument name).
    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Allow the parameter to resolve to null.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.declared.nullable = true;
        self
    }

    /// Mark the parameter as having a caller-side default: absence is not
    /// an error even when the type is non-nullable.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Definition of one handler function: one HTTP method, a path extension
/// appended to the owning route's path, the parameter list and the callable.
#[derive(Clone)]
pub struct HandlerDef {
    pub name: String,
    pub method: Method,
    pub path_ext: String,
    pub params: Vec<ParamSpec>,
    pub headers: Vec<(String, String)>,
    pub header_groups: Vec<String>,
    pub handler: Arc<HandlerFn>,
}

macro_rules! method_ctor {
    ($fn_name:ident, $method:expr) => {
        #[must_use]
        pub fn $fn_name<F>(name: &str, path_ext: &str, handler: F) -> Self
        where
            F: Fn(&RequestContext, &Args) -> HandlerResult + Send + Sync + 'static,
        {
            Self::new($method, name, path_ext, handler)
        }
    };
}

impl HandlerDef {
    #[must_use]
    pub fn new<F>(method: Method, name: &str, path_ext: &str, handler: F) -> Self
    where
        F: Fn(&RequestContext, &Args) -> HandlerResult + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            method,
            path_ext: path_ext.to_string(),
            params: Vec::new(),
            headers: Vec::new(),
            header_groups: Vec::new(),
            handler: Arc::new(handler),
        }
    }

    method_ctor!(get, Method::GET);
    method_ctor!(post, Method::POST);
    method_ctor!(put, Method::PUT);
    method_ctor!(patch, Method::PATCH);
    method_ctor!(delete, Method::DELETE);
    method_ctor!(head, Method::HEAD);
    method_ctor!(options, Method::OPTIONS);

    #[must_use]
    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.params.push(spec);
        self
    }

    #[must_use]
    pub fn response_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn header_group(mut self, group: &str) -> Self {
        self.header_groups.push(group.to_string());
        self
    }
}

impl std::fmt::Debug for HandlerDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerDef")
            .field("name", &self.name)
            .field("method", &self.method)
            .field("path_ext", &self.path_ext)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Definition of one route node: a path segment, response headers that
/// propagate to every descendant, nested sub-routes and own handlers.
#[derive(Debug, Clone, Default)]
pub struct RouteDef {
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub header_groups: Vec<String>,
    pub subroutes: Vec<RouteDef>,
    pub handlers: Vec<HandlerDef>,
}

impl RouteDef {
    #[must_use]
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn response_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn header_group(mut self, group: &str) -> Self {
        self.header_groups.push(group.to_string());
        self
    }

    /// Compose a sub-route under this route's path prefix. Sub-route trees
    /// can be built dynamically before mounting.
    #[must_use]
    pub fn mount(mut self, sub: RouteDef) -> Self {
        self.subroutes.push(sub);
        self
    }

    #[must_use]
    pub fn handle(mut self, handler: HandlerDef) -> Self {
        self.handlers.push(handler);
        self
    }
}
