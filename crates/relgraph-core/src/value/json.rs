use crate::error::IssueKind;
use derive_more::Display;
use serde_json::Value as JsonValue;
use thiserror::Error as ThisError;

///
/// CONSTANTS
///
/// Literal tags that select a null variant instead of being stored as text.
///

pub const DB_NULL: &str = "DbNull";
pub const JSON_NULL: &str = "JsonNull";
pub const ANY_NULL: &str = "AnyNull";

///
/// NullContext
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum NullContext {
    Filter,
    Mutation,
}

///
/// NullJsonError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum NullJsonError {
    #[error("'{ANY_NULL}' is only valid inside a filter, not in a {context} payload")]
    InvalidForContext { context: NullContext },

    #[error("JSON value nests deeper than {max} levels")]
    TooDeep { max: usize },
}

impl NullJsonError {
    #[must_use]
    pub const fn kind(&self) -> IssueKind {
        match self {
            Self::InvalidForContext { .. } => IssueKind::InvalidNullVariantForContext,
            Self::TooDeep { .. } => IssueKind::DepthLimitExceeded,
        }
    }
}

///
/// NullableJson
///
/// The normalized value of a JSON field.
///
/// Absent    → field not provided; leave it unset.
/// DbNull    → no value in the store (a database NULL).
/// JsonNull  → the JSON literal `null` stored as data.
/// AnyNull   → filters only; matches either kind of null.
/// Value     → any other JSON document.
///
/// DbNull and JsonNull select different rows and must never be merged.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum NullableJson {
    Absent,
    DbNull,
    JsonNull,
    AnyNull,
    Value(JsonValue),
}

impl NullableJson {
    /// Normalize a raw input slot.
    ///
    /// `raw` is `None` when the key was not provided at all.
    pub fn transform(
        raw: Option<&JsonValue>,
        context: NullContext,
        max_depth: usize,
    ) -> Result<Self, NullJsonError> {
        let Some(raw) = raw else {
            return Ok(Self::Absent);
        };

        match raw {
            JsonValue::Null => Ok(Self::DbNull),
            JsonValue::String(tag) if tag == DB_NULL => Ok(Self::DbNull),
            JsonValue::String(tag) if tag == JSON_NULL => Ok(Self::JsonNull),
            JsonValue::String(tag) if tag == ANY_NULL => match context {
                NullContext::Filter => Ok(Self::AnyNull),
                NullContext::Mutation => Err(NullJsonError::InvalidForContext { context }),
            },
            value => {
                if json_depth(value, max_depth).is_none() {
                    return Err(NullJsonError::TooDeep { max: max_depth });
                }

                Ok(Self::Value(value.clone()))
            }
        }
    }

    /// Re-check an already-normalized value in a context.
    ///
    /// Returns the value unchanged when it is legal there.
    pub fn normalize(self, context: NullContext, max_depth: usize) -> Result<Self, NullJsonError> {
        match self.to_raw() {
            Some(raw) => Self::transform(Some(&raw), context, max_depth),
            None => Ok(Self::Absent),
        }
    }

    /// Render back into the raw input alphabet (`None` for `Absent`).
    #[must_use]
    pub fn to_raw(&self) -> Option<JsonValue> {
        match self {
            Self::Absent => None,
            Self::DbNull => Some(JsonValue::String(DB_NULL.to_string())),
            Self::JsonNull => Some(JsonValue::String(JSON_NULL.to_string())),
            Self::AnyNull => Some(JsonValue::String(ANY_NULL.to_string())),
            Self::Value(value) => Some(value.clone()),
        }
    }

    #[must_use]
    pub const fn is_null_variant(&self) -> bool {
        matches!(self, Self::DbNull | Self::JsonNull | Self::AnyNull)
    }

    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Measure the nesting depth of a JSON value, giving up past `max`.
///
/// Scalars have depth 1. Returns `None` when the value is deeper than `max`.
#[must_use]
pub fn json_depth(value: &JsonValue, max: usize) -> Option<usize> {
    if max == 0 {
        return None;
    }

    let children = match value {
        JsonValue::Array(items) => items.iter().try_fold(0, |deepest, item| {
            json_depth(item, max - 1).map(|d| deepest.max(d))
        })?,
        JsonValue::Object(map) => map.values().try_fold(0, |deepest, item| {
            json_depth(item, max - 1).map(|d| deepest.max(d))
        })?,
        _ => 0,
    };

    Some(children + 1)
}
