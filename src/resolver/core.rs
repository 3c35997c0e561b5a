use crate::coerce::{DeclaredType, ParamValue};
use crate::dispatcher::RequestContext;
use crate::error::HttpError;
use serde_json::Value;
use std::sync::Arc;

/// Extraction function: request context in, raw-but-coerced value out.
/// `Ok(None)` means the source had no value for this parameter.
pub type ExtractFn =
    dyn Fn(&RequestContext) -> Result<Option<ParamValue>, HttpError> + Send + Sync;

/// Callback invoked when a required parameter resolves to nothing.
pub type MissingFn = dyn Fn(&ParamIdentity) -> HttpError + Send + Sync;

/// The identity of one formal parameter, carried for error messages.
#[derive(Debug, Clone)]
pub struct ParamIdentity {
    pub name: String,
    /// Zero-based position in the handler's parameter list.
    pub index: usize,
    pub declared: DeclaredType,
    /// The role the value is extracted from ("path", "query", ...).
    pub location: &'static str,
}

impl std::fmt::Display for ParamIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} parameter `{}` (#{}, {})",
            self.location, self.name, self.index, self.declared
        )
    }
}

/// One parameter's bound extraction strategy plus its null/optional
/// contract.
pub struct ParamResolver {
    identity: ParamIdentity,
    nullable: bool,
    optional: bool,
    extract: Box<ExtractFn>,
    on_missing: Option<Box<MissingFn>>,
}

impl ParamResolver {
    #[must_use]
    pub fn new(
        identity: ParamIdentity,
        nullable: bool,
        optional: bool,
        extract: Box<ExtractFn>,
    ) -> Self {
        Self {
            identity,
            nullable,
            optional,
            extract,
            on_missing: None,
        }
    }

    /// Install the handler invoked when a required parameter is absent.
    #[must_use]
    pub fn on_missing(mut self, f: Box<MissingFn>) -> Self {
        self.on_missing = Some(f);
        self
    }

    #[must_use]
    pub fn identity(&self) -> &ParamIdentity {
        &self.identity
    }

    /// Run the extraction and enforce the null/optional contract.
    ///
    /// # Errors
    ///
    /// Extraction failures propagate as-is. An absent value for a parameter
    /// that is neither nullable nor optional yields the missing-value
    /// handler's error, or a 500-class error naming the parameter when no
    /// handler was installed.
    pub fn resolve(&self, ctx: &RequestContext) -> Result<Option<ParamValue>, HttpError> {
        let value = (self.extract)(ctx)?;
        if value.is_none() && !self.nullable && !self.optional {
            return Err(match &self.on_missing {
                Some(f) => f(&self.identity),
                None => HttpError::internal(format!(
                    "no value resolved for {} and no missing-value handler installed",
                    self.identity
                )),
            });
        }
        Ok(value)
    }
}

/// The resolved arguments of one request, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Args {
    values: Vec<(Arc<str>, Option<ParamValue>)>,
}

impl Args {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, name: Arc<str>, value: Option<ParamValue>) {
        self.values.push((name, value));
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values
            .iter()
            .find(|(n, _)| n.as_ref() == name)
            .and_then(|(_, v)| v.as_ref())
    }

    #[must_use]
    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParamValue::as_str)
    }

    #[must_use]
    pub fn int(&self, name: &str) -> Option<i32> {
        self.get(name).and_then(ParamValue::as_int)
    }

    #[must_use]
    pub fn long(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(ParamValue::as_long)
    }

    #[must_use]
    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(ParamValue::as_bool)
    }

    #[must_use]
    pub fn float(&self, name: &str) -> Option<f32> {
        self.get(name).and_then(ParamValue::as_float)
    }

    #[must_use]
    pub fn double(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(ParamValue::as_double)
    }

    #[must_use]
    pub fn json(&self, name: &str) -> Option<&Value> {
        self.get(name).and_then(ParamValue::as_json)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
