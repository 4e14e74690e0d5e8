//! Entity metadata.
//!
//! Models are plain data: the grammar in `entity`, `filter`, `mutation` and
//! `aggregate` is implemented once and driven by these descriptions.

mod entity;
mod field;
mod relation;
mod unique;

#[cfg(test)]
mod tests;

// re-exports
pub use entity::{EntityModel, Member};
pub use field::{EnumModel, FieldDefault, FieldKind, FieldModel, Generator};
pub use relation::{Cardinality, RelationModel, RelationSide};
pub use unique::UniqueModel;
