//! Typed scalar values produced by reference resolution.

use serde_json::Value;

/// A resolved reference value.
///
/// References occupy scalar positions — a URL path segment, a query value,
/// a JSON string leaf — so resolution always yields one of the JSON scalar
/// types. Objects and arrays are rejected at the resolution site, never
/// silently stringified.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// A string value.
    String(String),
    /// An integer value.
    Integer(i64),
    /// A floating-point value.
    Float(f64),
    /// A boolean value.
    Boolean(bool),
    /// A JSON null.
    Null,
}

impl Scalar {
    /// Coerces a positional-argument literal into its typed form.
    ///
    /// Priority order: integer parse, float parse, the literal strings
    /// `true`/`false`, else string — first success wins. Non-finite float
    /// spellings (`inf`, `NaN`) stay strings, since JSON cannot carry them.
    #[must_use]
    pub fn from_literal(raw: &str) -> Self {
        if let Ok(n) = raw.parse::<i64>() {
            return Self::Integer(n);
        }
        if let Ok(f) = raw.parse::<f64>() {
            if f.is_finite() {
                return Self::Float(f);
            }
        }
        match raw {
            "true" => Self::Boolean(true),
            "false" => Self::Boolean(false),
            _ => Self::String(raw.to_string()),
        }
    }

    /// Classifies a JSON value as a scalar.
    ///
    /// Returns `None` for objects and arrays, which have no scalar form.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Self::Null),
            Value::Bool(b) => Some(Self::Boolean(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Float)),
            Value::String(s) => Some(Self::String(s.clone())),
            Value::Object(_) | Value::Array(_) => None,
        }
    }

    /// Converts the scalar back into a JSON value.
    ///
    /// Substitution is type-preserving: a cached integer becomes a JSON
    /// number, never a quoted string.
    #[must_use]
    pub fn into_json(self) -> Value {
        match self {
            Self::String(s) => Value::String(s),
            Self::Integer(n) => Value::Number(n.into()),
            Self::Float(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
            Self::Boolean(b) => Value::Bool(b),
            Self::Null => Value::Null,
        }
    }

    /// Renders the scalar for URL interpolation.
    ///
    /// Strings, integers, floats and booleans all have a textual form;
    /// null does not and yields `None`.
    #[must_use]
    pub fn as_url_text(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            Self::Integer(n) => Some(n.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Boolean(b) => Some(b.to_string()),
            Self::Null => None,
        }
    }

    /// Returns the JSON type name of this scalar, for error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Integer(_) | Self::Float(_) => "number",
            Self::Boolean(_) => "boolean",
            Self::Null => "null",
        }
    }
}
