//! Validation plumbing shared by every parser: issue paths, the per-call
//! context, and the `Validator` entry point.
//!
//! Each grammar module adds its own `parse_*` methods to `Validator`.

mod context;
mod scalar;


use crate::{
    config::ValidationConfig,
    error::ValidationError,
    model::EntityModel,
    obs::{Operation, ValidationEvent, sink::record},
    schema::{EntityRef, Schema},
};
use std::fmt::{self, Write};

// re-exports
pub(crate) use context::ValidateContext;
pub(crate) use scalar::{
    check_keys, expect_array, expect_bool, expect_count, expect_object,
    expect_string, expect_strings, field_value, json_value, keyed_list, required_key,
};

///
/// PathSegment
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(s: &str) -> Self {
        Self::Key(s.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(s: String) -> Self {
        Self::Key(s)
    }
}

impl From<usize> for PathSegment {
    fn from(i: usize) -> Self {
        Self::Index(i)
    }
}

///
/// Path
///
/// Location of an issue, rendered `a.b[0].c` from the entity root.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Path(Vec<PathSegment>);

impl Path {
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub(crate) fn push(&mut self, seg: PathSegment) {
        self.0.push(seg);
    }

    pub(crate) fn pop(&mut self) {
        self.0.pop();
    }

    #[must_use]
    pub(crate) fn child(&self, seg: PathSegment) -> Self {
        let mut path = self.clone();
        path.push(seg);
        path
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();

        for (i, seg) in self.0.iter().enumerate() {
            match seg {
                PathSegment::Key(key) => {
                    if i > 0 {
                        out.push('.');
                    }
                    out.push_str(key);
                }
                PathSegment::Index(index) => {
                    let _ = write!(out, "[{index}]");
                }
            }
        }

        f.write_str(&out)
    }
}

///
/// Validator
///
/// Entry point for every parse operation over one schema.
///

#[derive(Debug)]
pub struct Validator<'s> {
    schema: &'s Schema,
    config: ValidationConfig,
}

impl<'s> Validator<'s> {
    #[must_use]
    pub fn new(schema: &'s Schema) -> Self {
        Self::with_config(schema, ValidationConfig::default())
    }

    #[must_use]
    pub const fn with_config(schema: &'s Schema, config: ValidationConfig) -> Self {
        Self { schema, config }
    }

    #[must_use]
    pub const fn schema(&self) -> &'s Schema {
        self.schema
    }

    #[must_use]
    pub const fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Resolve `entity`, run one parse, then report it.
    pub(crate) fn run<T>(
        &self,
        operation: Operation,
        entity: EntityRef,
        parse: impl FnOnce(&mut ValidateContext<'_>, &EntityModel) -> Option<T>,
    ) -> Result<T, ValidationError> {
        let mut ctx = ValidateContext::new(self.schema, &self.config);
        let value = ctx.resolve(entity).and_then(|model| parse(&mut ctx, model));

        let issues = ctx.issue_count();
        tracing::debug!(%operation, entity = entity.name(), issues, "parse finished");
        record(ValidationEvent::ParseFinished {
            operation,
            entity: entity.name(),
            issues,
        });

        ctx.finish(value)
    }
}
