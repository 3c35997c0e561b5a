//! # Dispatcher Module
//!
//! Per-request dispatch to handler coroutines.
//!
//! Each bound handler runs in its own `may` coroutine, consuming
//! [`Invocation`]s from an MPSC channel. The dispatcher builds the
//! [`RequestContext`] (including the request's reply slot), runs the
//! middleware chain, hands the invocation to the runner coroutine and
//! blocks on the per-request response channel. Requests are independent:
//! every one gets its own context and reply slot, and the handler map is
//! written once at startup and read-only afterwards.

mod core;

pub use self::core::{
    Dispatcher, HandlerResponse, HandlerSender, HeaderVec, Invocation, RequestContext,
    MAX_INLINE_HEADERS,
};
