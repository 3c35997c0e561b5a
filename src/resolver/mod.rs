//! # Resolver Module
//!
//! Per-parameter extraction strategies. A [`ParamResolver`] is built once at
//! registration time — identity, nullability/optionality contract and a
//! boxed extraction function — and invoked on every request, because request
//! data is inherently request-scoped even though the type matching that
//! produced the resolver is not.

mod core;

pub use self::core::{Args, ExtractFn, MissingFn, ParamIdentity, ParamResolver};
