//! # Coercion Module
//!
//! Converts raw, loosely typed request values (path segments, query strings,
//! already-parsed JSON scalars) into the strongly typed primitives a handler
//! declared. Kind lookup happens once per parameter at registration time;
//! only the conversion itself runs per request.

mod core;

pub use self::core::{DeclaredType, ParamKind, ParamValue, ValueType};
