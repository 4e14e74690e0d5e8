use crate::{config::ConfigError, validate::Path};
use derive_more::Display;
use std::fmt;
use thiserror::Error as ThisError;

///
/// Error
///
/// Top-level error for callers that do not care which layer failed.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

///
/// SchemaError
///
/// Construction-time failures. These are programmer errors in the entity
/// definitions, never data errors, and abort bootstrap.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SchemaError {
    #[error("entity '{entity}' resolves its own schema while it is being constructed")]
    Cycle { entity: String },

    #[error("entity '{name}' is defined more than once")]
    DuplicateEntity { name: String },

    #[error("entity '{entity}' declares member '{member}' more than once")]
    DuplicateMember { entity: String, member: String },

    #[error("entity '{entity}', field '{field}': {message}")]
    InvalidField {
        entity: String,
        field: String,
        message: String,
    },

    #[error("entity '{entity}', relation '{relation}': {message}")]
    InvalidRelation {
        entity: String,
        relation: String,
        message: String,
    },

    #[error("entity '{entity}', unique key '{label}': {message}")]
    InvalidUnique {
        entity: String,
        label: String,
        message: String,
    },

    #[error("thunk for '{expected}' produced a model named '{found}'")]
    NameMismatch { expected: String, found: String },

    #[error("entity '{entity}' has no unique field or compound key")]
    NoUniqueSelector { entity: String },

    #[error("unknown entity '{name}'")]
    UnknownEntity { name: String },
}

impl SchemaError {
    pub(crate) fn field(entity: &str, field: &str, message: impl Into<String>) -> Self {
        Self::InvalidField {
            entity: entity.to_string(),
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn relation(entity: &str, relation: &str, message: impl Into<String>) -> Self {
        Self::InvalidRelation {
            entity: entity.to_string(),
            relation: relation.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn unique(entity: &str, label: &str, message: impl Into<String>) -> Self {
        Self::InvalidUnique {
            entity: entity.to_string(),
            label: label.to_string(),
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_cycle(&self) -> bool {
        matches!(self, Self::Cycle { .. })
    }
}

///
/// IssueKind
///
/// Stable classification of a single validation failure.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[remain::sorted]
pub enum IssueKind {
    AmbiguousRelationOperation,
    AmbiguousUnionVariant,
    DepthLimitExceeded,
    EnumValueNotAllowed,
    InvalidNullVariantForContext,
    InvalidOperator,
    InvalidValue,
    MissingRequiredField,
    MissingRequiredRelation,
    NullOnRequiredRelation,
    TypeMismatch,
    UnknownKey,
}

///
/// Issue
///
/// One failure, located by its field path from the entity root.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Issue {
    pub path: Path,
    pub kind: IssueKind,
    pub message: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "[{}] {}", self.kind, self.message)
        } else {
            write!(f, "{}: [{}] {}", self.path, self.kind, self.message)
        }
    }
}

///
/// Issues
///
/// Ordered list of every failure found by one parse call.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Issues(Vec<Issue>);

impl Issues {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub(crate) fn push(&mut self, issue: Issue) {
        self.0.push(issue);
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Issue> {
        self.0.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Issue] {
        &self.0
    }

    /// Return whether any issue carries the given kind.
    #[must_use]
    pub fn has(&self, kind: IssueKind) -> bool {
        self.0.iter().any(|issue| issue.kind == kind)
    }

    /// Return the issues reported at the rendered path (e.g. `author.create.email`).
    #[must_use]
    pub fn at(&self, path: &str) -> Vec<&Issue> {
        self.0
            .iter()
            .filter(|issue| issue.path.to_string() == path)
            .collect()
    }
}

impl fmt::Display for Issues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{issue}")?;
        }

        Ok(())
    }
}

impl IntoIterator for Issues {
    type Item = Issue;
    type IntoIter = std::vec::IntoIter<Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Issues {
    type Item = &'a Issue;
    type IntoIter = std::slice::Iter<'a, Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

///
/// ValidationError
///
/// Returned by every `parse_*` entry point. `Invalid` carries the full issue
/// list; `Schema` only occurs when validating against a schema that was never
/// bootstrapped and fails to resolve.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ValidationError {
    #[error("validation failed with {} issue(s): {}", .0.len(), .0)]
    Invalid(Issues),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl ValidationError {
    /// Return the collected issues (empty for schema failures).
    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        match self {
            Self::Invalid(issues) => issues.as_slice(),
            Self::Schema(_) => &[],
        }
    }

    #[must_use]
    pub fn has(&self, kind: IssueKind) -> bool {
        self.issues().iter().any(|issue| issue.kind == kind)
    }
}
