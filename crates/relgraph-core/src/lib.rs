//! Runtime schema and validation engine for a cyclic relational entity
//! model: lazily-resolved entity schemas, filters, mutation payloads, find
//! and aggregation arguments, all checked against `EntityModel` metadata.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod aggregate;
pub mod config;
pub mod entity;
pub mod error;
pub mod filter;
pub mod model;
pub mod mutation;
pub mod obs;
pub mod query;
pub mod schema;
pub mod validate;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// Prelude
///
/// Prelude contains only domain vocabulary: models, handles, the validator
/// and the parsed shapes it returns.
///

pub mod prelude {
    pub use crate::{
        aggregate::{AggregateArgs, GroupBy},
        entity::{EntityValue, RelationValue},
        filter::{Filter, OrderSpec, UniqueSelector},
        model::{
            Cardinality, EntityModel, EnumModel, FieldKind, FieldModel, Generator, RelationModel,
            UniqueModel,
        },
        mutation::{CreatePayload, UpdatePayload},
        query::{FindManyArgs, FindUniqueArgs},
        schema::{EntityRef, Schema},
        validate::Validator,
        value::{NullableJson, Value},
    };
}
