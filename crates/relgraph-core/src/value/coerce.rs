use crate::{error::IssueKind, model::FieldKind, value::Value};
use serde_json::Value as JsonValue;
use thiserror::Error as ThisError;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

///
/// LiteralError
///
/// A raw literal that does not fit the expected field kind.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum LiteralError {
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("'{value}' is not a variant of {enum_name} (expected one of: {allowed})")]
    EnumValueNotAllowed {
        enum_name: &'static str,
        value: String,
        allowed: String,
    },

    #[error("invalid timestamp '{value}': expected RFC 3339")]
    InvalidTimestamp { value: String },

    #[error("list element [{index}]: expected string, found {found}")]
    ListElement { index: usize, found: &'static str },
}

impl LiteralError {
    #[must_use]
    pub const fn kind(&self) -> IssueKind {
        match self {
            Self::EnumValueNotAllowed { .. } => IssueKind::EnumValueNotAllowed,
            Self::TypeMismatch { .. } | Self::InvalidTimestamp { .. } | Self::ListElement { .. } => {
                IssueKind::TypeMismatch
            }
        }
    }
}

/// Check a raw non-null literal against a field kind and produce its typed value.
///
/// Null handling belongs to the caller: nullability depends on the field and
/// on the context (entity, filter, mutation), not on the kind.
pub fn coerce_literal(kind: FieldKind, raw: &JsonValue) -> Result<Value, LiteralError> {
    match kind {
        FieldKind::Bool => raw
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| mismatch("bool", raw)),
        FieldKind::Int => raw
            .as_i64()
            .map(Value::Int)
            .ok_or_else(|| mismatch("integer", raw)),
        FieldKind::Float => raw
            .as_f64()
            .map(Value::Float)
            .ok_or_else(|| mismatch("number", raw)),
        FieldKind::Text => raw
            .as_str()
            .map(|s| Value::Text(s.to_string()))
            .ok_or_else(|| mismatch("string", raw)),
        FieldKind::Json => Ok(Value::Json(raw.clone())),
        FieldKind::Timestamp => {
            let s = raw.as_str().ok_or_else(|| mismatch("timestamp string", raw))?;

            OffsetDateTime::parse(s, &Rfc3339)
                .map(Value::Timestamp)
                .map_err(|_| LiteralError::InvalidTimestamp {
                    value: s.to_string(),
                })
        }
        FieldKind::Enum(model) => {
            let s = raw.as_str().ok_or_else(|| mismatch("enum string", raw))?;
            if model.contains(s) {
                Ok(Value::Enum(s.to_string()))
            } else {
                Err(LiteralError::EnumValueNotAllowed {
                    enum_name: model.name,
                    value: s.to_string(),
                    allowed: model.variants.join(", "),
                })
            }
        }
        FieldKind::TextList => {
            let items = raw.as_array().ok_or_else(|| mismatch("list of strings", raw))?;

            items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or(LiteralError::ListElement {
                            index,
                            found: json_label(item),
                        })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::TextList)
        }
    }
}

const fn mismatch(expected: &'static str, raw: &JsonValue) -> LiteralError {
    LiteralError::TypeMismatch {
        expected,
        found: json_label(raw),
    }
}

/// Short label for the JSON kind of a raw value.
#[must_use]
pub(crate) const fn json_label(raw: &JsonValue) -> &'static str {
    match raw {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
