//! # Routes Module
//!
//! Declarative route definitions and their registration walk.
//!
//! A [`RouteDef`] tree is built explicitly at startup — path segment,
//! response headers, nested sub-routes and handler definitions — and
//! [`bind_routes`] walks it recursively into a flat table of immutable
//! [`RouteEntry`] values, composing path prefixes and merging response
//! headers down the hierarchy. Everything the walk produces is read-only
//! for the life of the process; all structural validation (duplicate
//! (path, method) pairs, malformed paths, unknown header groups, parameter
//! role constraints) happens here, before a single request is served.

mod def;
mod headers;
mod walk;

pub use def::{HandlerDef, HandlerResult, ParamSource, ParamSpec, Reply, RouteDef};
pub use headers::{HeaderCatalog, HeaderGroup};
pub use walk::{bind_into, bind_routes, BoundRoute, RouteEntry};
