//! Error taxonomy for the routing core.
//!
//! Two families exist and they never mix:
//!
//! - [`ConfigError`] — registration-time failures. These are fatal: a
//!   partially registered route table is worse than a failed boot, so they
//!   propagate out of [`crate::app::AppBuilder::build`] and abort startup.
//! - [`HttpError`] — request-time failures, rendered to the client as a
//!   structured JSON body `{ "status": <int>, "message": <string> }`.

use crate::coerce::DeclaredType;
use http::Method;
use serde_json::{json, Value};
use thiserror::Error;

/// Fatal registration-time configuration error.
///
/// Raised while walking route definitions and binding handlers. Never caught
/// inside the crate.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("duplicate route registration: {method} {path}")]
    DuplicateRoute { method: Method, path: String },

    #[error("handler `{handler}`: HTTP method {method} is not supported")]
    UnsupportedMethod { handler: String, method: Method },

    #[error(
        "handler `{handler}`: path parameter `{name}` (#{index}, {declared}) \
         must be declared as string, int or long"
    )]
    UnsupportedPathParamType {
        handler: String,
        name: String,
        index: usize,
        declared: DeclaredType,
    },

    #[error(
        "handler `{handler}`: query parameter `{name}` (#{index}, {declared}) \
         must be declared as string"
    )]
    UnsupportedQueryParamType {
        handler: String,
        name: String,
        index: usize,
        declared: DeclaredType,
    },

    #[error(
        "handler `{handler}`: header parameter `{name}` (#{index}, {declared}) \
         must be declared as string"
    )]
    UnsupportedHeaderParamType {
        handler: String,
        name: String,
        index: usize,
        declared: DeclaredType,
    },

    #[error(
        "handler `{handler}`: body parameter `{name}` (#{index}, {declared}) \
         must be declared as json"
    )]
    UnsupportedBodyParamType {
        handler: String,
        name: String,
        index: usize,
        declared: DeclaredType,
    },

    #[error("handler `{handler}`: path parameter `{name}` has no `:{name}` segment in `{path}`")]
    MissingPathToken {
        handler: String,
        name: String,
        path: String,
    },

    #[error("invalid route path `{path}`: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    #[error("unknown response header group `{group}`")]
    UnknownHeaderGroup { group: String },
}

/// A classified request-time error carrying an HTTP status code.
///
/// The status is required to be a client or server error code. Constructing
/// one with a status below 400 is a programming error and asserts.
#[derive(Debug, Error)]
#[error("{status}: {message}")]
pub struct HttpError {
    status: u16,
    message: String,
}

impl HttpError {
    /// Create an error with an explicit status code.
    ///
    /// # Panics
    ///
    /// Panics if `status < 400` — an "error" response in the success range
    /// is a construction bug, caught at the call site rather than on the wire.
    #[must_use]
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        assert!(status >= 400, "HttpError status must be >= 400, got {status}");
        Self {
            status,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, message)
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(404, message)
    }

    #[must_use]
    pub fn unsupported_media_type(message: impl Into<String>) -> Self {
        Self::new(415, message)
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(500, message)
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The client-visible JSON body for this error.
    #[must_use]
    pub fn to_body(&self) -> Value {
        json!({ "status": self.status, "message": self.message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_shape() {
        let err = HttpError::bad_request("missing parameter `id`");
        assert_eq!(err.status(), 400);
        assert_eq!(
            err.to_body(),
            json!({ "status": 400, "message": "missing parameter `id`" })
        );
    }

    #[test]
    #[should_panic(expected = "must be >= 400")]
    fn test_success_status_rejected() {
        let _ = HttpError::new(200, "not an error");
    }
}
