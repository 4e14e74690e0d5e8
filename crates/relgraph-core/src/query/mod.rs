//! Read arguments: `findMany` and `findUnique`, with nested relation
//! selections.

pub(crate) mod args;
mod select;

#[cfg(test)]
mod tests;

use crate::{
    error::ValidationError,
    obs::Operation,
    schema::EntityRef,
    validate::{Validator, expect_object},
};
use serde_json::Value as JsonValue;

// re-exports
pub use args::{FindManyArgs, FindUniqueArgs};
pub use select::{RelationSelection, Selection, SelectionMode};

impl Validator<'_> {
    /// Parse `{ where?, orderBy?, cursor?, take?, skip?, distinct?, select | include }`.
    pub fn parse_find_many(
        &self,
        entity: EntityRef,
        raw: &JsonValue,
    ) -> Result<FindManyArgs, ValidationError> {
        self.run(Operation::FindMany, entity, |ctx, model| {
            let map = expect_object(ctx, raw)?;
            args::find_many(ctx, model, map)
        })
    }

    /// Parse `{ where, select | include }` where `where` is a unique selector.
    pub fn parse_find_unique(
        &self,
        entity: EntityRef,
        raw: &JsonValue,
    ) -> Result<FindUniqueArgs, ValidationError> {
        self.run(Operation::FindUnique, entity, |ctx, model| {
            args::find_unique(ctx, model, raw)
        })
    }
}
