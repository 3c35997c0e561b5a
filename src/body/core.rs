use crate::error::HttpError;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Strip media-type parameters from a `Content-Type` header value.
///
/// `application/json; charset=utf-8` → `application/json`.
#[must_use]
pub fn content_type_essence(value: &str) -> &str {
    value.split(';').next().unwrap_or(value).trim()
}

/// Strategy for decoding a raw request body into a JSON value.
pub trait BodyConverter: Send + Sync + std::fmt::Debug {
    /// Decode the raw body text.
    ///
    /// # Errors
    ///
    /// Returns a 400-class [`HttpError`] when the body does not parse
    /// against this converter's content type.
    fn decode(&self, raw: &str) -> Result<Value, HttpError>;
}

/// `application/json` bodies.
#[derive(Debug)]
pub struct JsonBodyConverter;

impl BodyConverter for JsonBodyConverter {
    fn decode(&self, raw: &str) -> Result<Value, HttpError> {
        serde_json::from_str(raw)
            .map_err(|e| HttpError::bad_request(format!("request body is not valid JSON: {e}")))
    }
}

/// `text/plain` bodies, passed through as a JSON string.
#[derive(Debug)]
pub struct TextBodyConverter;

impl BodyConverter for TextBodyConverter {
    fn decode(&self, raw: &str) -> Result<Value, HttpError> {
        Ok(Value::String(raw.to_string()))
    }
}

/// Registry of body converters, built once at startup and shared read-only
/// by every bound body resolver.
pub struct BodyConverters {
    by_type: HashMap<String, Arc<dyn BodyConverter>>,
    default_type: String,
}

impl BodyConverters {
    /// Create a registry with the JSON and plain-text converters installed.
    ///
    /// `default_type` is used for requests that carry no `Content-Type`
    /// header.
    #[must_use]
    pub fn new(default_type: &str) -> Self {
        let mut by_type: HashMap<String, Arc<dyn BodyConverter>> = HashMap::new();
        by_type.insert("application/json".to_string(), Arc::new(JsonBodyConverter));
        by_type.insert("text/plain".to_string(), Arc::new(TextBodyConverter));
        Self {
            by_type,
            default_type: content_type_essence(default_type).to_string(),
        }
    }

    /// Install or replace the converter for a content type.
    pub fn register(&mut self, content_type: &str, converter: Arc<dyn BodyConverter>) {
        self.by_type
            .insert(content_type_essence(content_type).to_string(), converter);
    }

    #[must_use]
    pub fn default_type(&self) -> &str {
        &self.default_type
    }

    /// Select the converter for a request's content type.
    ///
    /// # Errors
    ///
    /// Returns 415 when no converter is registered for the type.
    pub fn converter_for(
        &self,
        content_type: Option<&str>,
    ) -> Result<Arc<dyn BodyConverter>, HttpError> {
        let essence = content_type
            .map(content_type_essence)
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.default_type);
        self.by_type.get(essence).cloned().ok_or_else(|| {
            HttpError::unsupported_media_type(format!("unsupported content type `{essence}`"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_essence_strips_parameters() {
        assert_eq!(
            content_type_essence("application/json; charset=utf-8"),
            "application/json"
        );
        assert_eq!(content_type_essence("text/plain"), "text/plain");
    }

    #[test]
    fn test_json_decode() {
        let converters = BodyConverters::new("application/json");
        let conv = converters
            .converter_for(Some("application/json; charset=utf-8"))
            .expect("converter");
        assert_eq!(conv.decode(r#"{"a":1}"#).expect("decode"), json!({"a": 1}));
        assert_eq!(conv.decode("{nope").expect_err("reject").status(), 400);
    }

    #[test]
    fn test_missing_content_type_falls_back_to_default() {
        let converters = BodyConverters::new("application/json");
        assert!(converters.converter_for(None).is_ok());
    }

    #[test]
    fn test_unknown_content_type_is_415() {
        let converters = BodyConverters::new("application/json");
        let err = converters
            .converter_for(Some("application/xml"))
            .expect_err("unregistered");
        assert_eq!(err.status(), 415);
    }
}
