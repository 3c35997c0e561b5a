//! # Body Module
//!
//! Pluggable request-body conversion, keyed by the request's declared
//! content type. Handlers declare a `Body` parameter; the bound resolver
//! picks the converter at dispatch time from the registry built at startup.

mod core;

pub use self::core::{
    content_type_essence, BodyConverter, BodyConverters, JsonBodyConverter, TextBodyConverter,
};
