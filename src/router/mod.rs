//! # Router Module
//!
//! Path matching over the bound route table.
//!
//! Route templates use `:name` tokens for path parameters. At startup each
//! template is compiled into a regex that matches and captures parameter
//! values; per request the table is scanned for the first (method, pattern)
//! hit. The table is built once and read-only afterwards — safe for any
//! number of concurrent readers without locking.

mod core;

pub use self::core::{ParamVec, RouteMatch, Router, MAX_INLINE_PARAMS};
