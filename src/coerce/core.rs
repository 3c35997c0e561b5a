use serde_json::Value;
use std::fmt;

/// The target type a parameter is declared with.
///
/// `Json` is the declared type of body parameters; it matches no
/// [`ParamKind`] because body payloads bypass primitive coercion entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Str,
    Int,
    Long,
    Bool,
    Float,
    Double,
    Json,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueType::Str => "string",
            ValueType::Int => "int",
            ValueType::Long => "long",
            ValueType::Bool => "bool",
            ValueType::Float => "float",
            ValueType::Double => "double",
            ValueType::Json => "json",
        };
        write!(f, "{s}")
    }
}

/// A declared parameter type: target kind plus nullability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclaredType {
    pub ty: ValueType,
    pub nullable: bool,
}

impl DeclaredType {
    #[must_use]
    pub fn new(ty: ValueType) -> Self {
        Self { ty, nullable: false }
    }

    #[must_use]
    pub fn nullable(ty: ValueType) -> Self {
        Self { ty, nullable: true }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "{}?", self.ty)
        } else {
            write!(f, "{}", self.ty)
        }
    }
}

/// A coerced parameter value, as handed to handlers.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i32),
    Long(i64),
    Bool(bool),
    Float(f32),
    Double(f64),
    Json(Value),
}

impl ParamValue {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i32> {
        match self {
            ParamValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_long(&self) -> Option<i64> {
        match self {
            ParamValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f32> {
        match self {
            ParamValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_double(&self) -> Option<f64> {
        match self {
            ParamValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ParamValue::Json(v) => Some(v),
            _ => None,
        }
    }

    /// Render as a JSON value, for handlers that echo arguments into bodies.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            ParamValue::Str(s) => Value::String(s.clone()),
            ParamValue::Int(v) => Value::from(*v),
            ParamValue::Long(v) => Value::from(*v),
            ParamValue::Bool(v) => Value::from(*v),
            ParamValue::Float(v) => Value::from(f64::from(*v)),
            ParamValue::Double(v) => Value::from(*v),
            ParamValue::Json(v) => v.clone(),
        }
    }
}

/// One of the primitive kinds a request parameter can be coerced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Str,
    Int,
    Long,
    Bool,
    Float,
    Double,
}

impl ParamKind {
    pub const ALL: [ParamKind; 6] = [
        ParamKind::Str,
        ParamKind::Int,
        ParamKind::Long,
        ParamKind::Bool,
        ParamKind::Float,
        ParamKind::Double,
    ];

    #[must_use]
    pub fn value_type(self) -> ValueType {
        match self {
            ParamKind::Str => ValueType::Str,
            ParamKind::Int => ValueType::Int,
            ParamKind::Long => ValueType::Long,
            ParamKind::Bool => ValueType::Bool,
            ParamKind::Float => ValueType::Float,
            ParamKind::Double => ValueType::Double,
        }
    }

    /// Find the kind corresponding to a declared type.
    ///
    /// A nullable target matches the same kind as its non-null form.
    /// Returns `None` for declared types no primitive kind covers (`Json`).
    /// Runs once per parameter at registration time, never per request.
    #[must_use]
    pub fn matching(declared: &DeclaredType) -> Option<ParamKind> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.value_type() == declared.ty)
    }

    /// Coerce a raw value to this kind.
    ///
    /// A raw value that already has the exact target type passes through.
    /// String raws are parsed; boolean strings accept only `true`/`false`
    /// case-insensitively. Any failure yields `None` — conversion never
    /// errors.
    #[must_use]
    pub fn convert(self, raw: &Value) -> Option<ParamValue> {
        match (self, raw) {
            (ParamKind::Str, Value::String(s)) => Some(ParamValue::Str(s.clone())),

            (ParamKind::Int, Value::Number(n)) => n
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .map(ParamValue::Int),
            (ParamKind::Int, Value::String(s)) => s.parse::<i32>().ok().map(ParamValue::Int),

            (ParamKind::Long, Value::Number(n)) => n.as_i64().map(ParamValue::Long),
            (ParamKind::Long, Value::String(s)) => s.parse::<i64>().ok().map(ParamValue::Long),

            (ParamKind::Bool, Value::Bool(b)) => Some(ParamValue::Bool(*b)),
            (ParamKind::Bool, Value::String(s)) => {
                if s.eq_ignore_ascii_case("true") {
                    Some(ParamValue::Bool(true))
                } else if s.eq_ignore_ascii_case("false") {
                    Some(ParamValue::Bool(false))
                } else {
                    None
                }
            }

            (ParamKind::Float, Value::Number(n)) => {
                n.as_f64().map(|v| ParamValue::Float(v as f32))
            }
            (ParamKind::Float, Value::String(s)) => s.parse::<f32>().ok().map(ParamValue::Float),

            (ParamKind::Double, Value::Number(n)) => n.as_f64().map(ParamValue::Double),
            (ParamKind::Double, Value::String(s)) => {
                s.parse::<f64>().ok().map(ParamValue::Double)
            }

            _ => None,
        }
    }
}
