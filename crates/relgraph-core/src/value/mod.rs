mod coerce;
mod json;

#[cfg(test)]
mod tests;

use serde_json::{Number, Value as JsonValue};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

// re-exports
pub(crate) use coerce::json_label;
pub use coerce::{LiteralError, coerce_literal};
pub use json::{ANY_NULL, DB_NULL, JSON_NULL, NullContext, NullJsonError, NullableJson, json_depth};

///
/// Value
///
/// A validated scalar, typed by the field it was checked against.
///
/// Null  → the field holds no value (nullable fields only).
/// Json  → an arbitrary JSON document stored in a JSON field.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Enum(String),
    Float(f64),
    Int(i64),
    Json(JsonValue),
    Text(String),
    TextList(Vec<String>),
    Timestamp(OffsetDateTime),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Enum(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Short label used in diagnostics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Enum(_) => "enum",
            Self::Float(_) => "float",
            Self::Int(_) => "int",
            Self::Json(_) => "json",
            Self::Text(_) => "text",
            Self::TextList(_) => "text list",
            Self::Timestamp(_) => "timestamp",
        }
    }

    /// Render back into the raw JSON shape `coerce_literal` accepts.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Bool(b) => JsonValue::Bool(*b),
            Self::Enum(s) | Self::Text(s) => JsonValue::String(s.clone()),
            Self::Float(f) => Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
            Self::Int(n) => JsonValue::Number((*n).into()),
            Self::Json(v) => v.clone(),
            Self::TextList(items) => {
                JsonValue::Array(items.iter().cloned().map(JsonValue::String).collect())
            }
            Self::Timestamp(ts) => JsonValue::String(format_timestamp(*ts)),
        }
    }
}

// RFC 3339 covers every timestamp `coerce_literal` can produce.
pub(crate) fn format_timestamp(ts: OffsetDateTime) -> String {
    ts.format(&Rfc3339)
        .unwrap_or_else(|_| ts.unix_timestamp().to_string())
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}
