use crate::schema::EntityRef;
use derive_more::{Display, FromStr};
use serde::Serialize;

///
/// Cardinality
///
/// One  → exactly one related entity.
/// Opt  → zero or one.
/// Many → any number.
///

#[derive(Clone, Copy, Debug, Default, Display, Eq, FromStr, PartialEq, Serialize)]
pub enum Cardinality {
    #[default]
    One,
    Opt,
    Many,
}

impl Cardinality {
    #[must_use]
    pub const fn is_to_one(self) -> bool {
        matches!(self, Self::One | Self::Opt)
    }

    #[must_use]
    pub const fn is_many(self) -> bool {
        matches!(self, Self::Many)
    }
}

///
/// RelationSide
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum RelationSide {
    /// This entity stores the foreign key: `fields` map positionally onto the
    /// target's `references`.
    OwnsForeignKey {
        fields: &'static [&'static str],
        references: &'static [&'static str],
    },
    ReferencedBy,
}

///
/// RelationModel
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RelationModel {
    pub name: &'static str,
    pub target: EntityRef,
    pub cardinality: Cardinality,
    pub side: RelationSide,
    pub back_reference: &'static str,
}

impl RelationModel {
    #[must_use]
    pub const fn new(
        name: &'static str,
        target: EntityRef,
        cardinality: Cardinality,
        back_reference: &'static str,
    ) -> Self {
        Self {
            name,
            target,
            cardinality,
            side: RelationSide::ReferencedBy,
            back_reference,
        }
    }

    #[must_use]
    pub const fn foreign_key(
        mut self,
        fields: &'static [&'static str],
        references: &'static [&'static str],
    ) -> Self {
        self.side = RelationSide::OwnsForeignKey { fields, references };
        self
    }

    #[must_use]
    pub const fn owns_foreign_key(&self) -> bool {
        matches!(self.side, RelationSide::OwnsForeignKey { .. })
    }

    /// Local foreign key fields (empty on the referenced side).
    #[must_use]
    pub const fn fk_fields(&self) -> &'static [&'static str] {
        match self.side {
            RelationSide::OwnsForeignKey { fields, .. } => fields,
            RelationSide::ReferencedBy => &[],
        }
    }

    #[must_use]
    pub const fn is_to_one(&self) -> bool {
        self.cardinality.is_to_one()
    }

    #[must_use]
    pub const fn is_many(&self) -> bool {
        self.cardinality.is_many()
    }

    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        matches!(self.cardinality, Cardinality::Opt)
    }

    #[must_use]
    pub const fn is_required(&self) -> bool {
        matches!(self.cardinality, Cardinality::One)
    }
}
