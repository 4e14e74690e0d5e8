//! Filter grammar: `where` and `having` predicates, unique selectors and
//! order specifications.

pub(crate) mod ast;
mod json;
pub(crate) mod order;
pub(crate) mod parse;
mod relation;
mod scalar;
pub(crate) mod unique;


use crate::{
    error::ValidationError,
    obs::Operation,
    schema::EntityRef,
    validate::Validator,
};
use serde_json::Value as JsonValue;

// re-exports
pub use ast::{
    AggregateFn, Condition, Filter, HavingFilter, JsonFilter, Junction, ListFilter, ListOps,
    RelationFilter, RelationTarget, ScalarFilter, ScalarOps, TextMode,
};
pub use order::{NullsOrder, OrderEntry, OrderSpec, SortOrder};
pub use unique::UniqueSelector;

impl Validator<'_> {
    /// Parse a `where` filter.
    pub fn parse_filter(&self, entity: EntityRef, raw: &JsonValue) -> Result<Filter, ValidationError> {
        self.run(Operation::Filter, entity, |ctx, model| {
            parse::filter(ctx, model, raw, parse::FilterMode::Where)
        })
    }

    /// Parse a standalone `having` filter. Without a `by` list any field may
    /// carry plain operators.
    pub fn parse_having(&self, entity: EntityRef, raw: &JsonValue) -> Result<Filter, ValidationError> {
        self.run(Operation::Having, entity, |ctx, model| {
            parse::filter(ctx, model, raw, parse::FilterMode::Having { by: None })
        })
    }

    pub fn parse_unique_selector(
        &self,
        entity: EntityRef,
        raw: &JsonValue,
    ) -> Result<UniqueSelector, ValidationError> {
        self.run(Operation::UniqueSelector, entity, |ctx, model| {
            unique::unique_selector(ctx, model, raw)
        })
    }

    pub fn parse_order_by(
        &self,
        entity: EntityRef,
        raw: &JsonValue,
    ) -> Result<OrderSpec, ValidationError> {
        self.run(Operation::OrderBy, entity, |ctx, model| {
            order::order_spec(ctx, model, raw, order::OrderMode::Find)
        })
    }
}
