//! # Runner Module
//!
//! Binds one handler definition to one (path, method) pair. All parameter
//! validation — role/type constraints, path-token presence, method support —
//! happens once at bind time; per request the runner only resolves
//! arguments, invokes the handler under a panic guard and drains the reply
//! slot.

mod core;

pub use self::core::RouteRunner;
