//! # Trellis
//!
//! **Trellis** is a declarative route-tree HTTP framework core for Rust,
//! powered by the `may` coroutine runtime and `may_minihttp`.
//!
//! Routes are defined explicitly at startup as a tree of [`routes::RouteDef`]
//! values: each node carries a path segment, response headers, nested
//! sub-routes and handler functions. Registration walks the tree once,
//! composing path prefixes and merging response headers down the hierarchy,
//! and binds every handler to a per-parameter resolver list — so all
//! structural validation (duplicate routes, parameter role/type constraints,
//! malformed paths) fails the boot, never a request.
//!
//! ## Architecture
//!
//! - **[`routes`]** - route/handler definition builders, the registration
//!   walk and response-header accumulation
//! - **[`coerce`]** - primitive type coercion for parameter values
//! - **[`resolver`]** - per-parameter extraction strategies with
//!   null/optional contracts
//! - **[`runner`]** - binds one handler to one (path, method) and runs it
//!   in a coroutine
//! - **[`router`]** - `:name` template matching over the bound table
//! - **[`dispatcher`]** - request context construction, middleware chain,
//!   coroutine handoff
//! - **[`reply`]** - the per-request single-slot result handoff
//! - **[`body`]** - pluggable request-body conversion by content type
//! - **[`server`]** - `may_minihttp` integration and the `/health` and
//!   `/metrics` endpoints
//! - **[`app`]** - the application context built at startup
//!
//! ## Quick Start
//!
//! ```no_run
//! use trellis::app::AppBuilder;
//! use trellis::coerce::ValueType;
//! use trellis::config::AppConfig;
//! use trellis::routes::{HandlerDef, ParamSpec, Reply, RouteDef};
//! use serde_json::json;
//!
//! let items = RouteDef::new("/items").handle(
//!     HandlerDef::get("get_item", "/:id", |_ctx, args| {
//!         let id = args.long("id").unwrap_or_default();
//!         Ok(Reply::Payload(json!({ "id": id })))
//!     })
//!     .param(ParamSpec::path("id", ValueType::Long)),
//! );
//!
//! let app = AppBuilder::new(AppConfig::default())
//!     .mount(items)
//!     .build()
//!     .expect("route registration failed");
//! // app.start()?;
//! ```
//!
//! ## Runtime Considerations
//!
//! Trellis uses the `may` coroutine runtime, not tokio. Each bound handler
//! runs in its own coroutine; stack size is configurable via the
//! `TRELLIS_STACK_SIZE` environment variable. Blocking operations inside
//! handlers should use `may`'s blocking facilities.

pub mod app;
pub mod body;
pub mod coerce;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod ids;
pub mod middleware;
pub mod reply;
pub mod resolver;
pub mod router;
pub mod routes;
pub mod runner;
pub mod runtime_config;
pub mod server;

pub use app::{App, AppBuilder};
pub use error::{ConfigError, HttpError};
pub use routes::{HandlerDef, ParamSpec, Reply, RouteDef};
