use crate::{
    filter::{Filter, UniqueSelector},
    schema::EntityRef,
    value::{NullableJson, Value},
};
use derive_more::Display;
use std::collections::BTreeMap;

///
/// WriteVariant
///
/// Checked   → relations are written through relation objects.
/// Unchecked → owning relations are written through their foreign key scalars.
///

#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq)]
pub enum WriteVariant {
    #[default]
    Checked,
    Unchecked,
}

///
/// FieldValue
///

#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Scalar(Value),
    Json(NullableJson),
}

///
/// FieldUpdate
///
/// One update operator. A bare value is `Set`.
///

#[derive(Clone, Debug, PartialEq)]
pub enum FieldUpdate {
    Set(FieldValue),
    Increment(Value),
    Decrement(Value),
    Multiply(Value),
    Divide(Value),
    Push(Vec<String>),
}

impl FieldUpdate {
    #[must_use]
    pub const fn operator(&self) -> &'static str {
        match self {
            Self::Set(_) => "set",
            Self::Increment(_) => "increment",
            Self::Decrement(_) => "decrement",
            Self::Multiply(_) => "multiply",
            Self::Divide(_) => "divide",
            Self::Push(_) => "push",
        }
    }
}

///
/// CreatePayload
///

#[derive(Clone, Debug, PartialEq)]
pub struct CreatePayload {
    pub entity: EntityRef,
    pub variant: WriteVariant,
    pub fields: BTreeMap<&'static str, FieldValue>,
    pub relations: BTreeMap<&'static str, RelationWrite>,
}

impl CreatePayload {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    #[must_use]
    pub fn relation(&self, name: &str) -> Option<&RelationWrite> {
        self.relations.get(name)
    }
}

///
/// UpdatePayload
///

#[derive(Clone, Debug, PartialEq)]
pub struct UpdatePayload {
    pub entity: EntityRef,
    pub variant: WriteVariant,
    pub fields: BTreeMap<&'static str, FieldUpdate>,
    pub relations: BTreeMap<&'static str, RelationWrite>,
}

impl UpdatePayload {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldUpdate> {
        self.fields.get(name)
    }

    #[must_use]
    pub fn relation(&self, name: &str) -> Option<&RelationWrite> {
        self.relations.get(name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.relations.is_empty()
    }
}

///
/// RelationWrite
///

#[derive(Clone, Debug, PartialEq)]
pub enum RelationWrite {
    One(ToOneWrite),
    Many(Box<ToManyWrite>),
}

impl RelationWrite {
    #[must_use]
    pub const fn as_one(&self) -> Option<&ToOneWrite> {
        match self {
            Self::One(write) => Some(write),
            Self::Many(_) => None,
        }
    }

    #[must_use]
    pub fn as_many(&self) -> Option<&ToManyWrite> {
        match self {
            Self::One(_) => None,
            Self::Many(write) => Some(write),
        }
    }
}

///
/// ToOneWrite
///
/// Exactly one operation on a to-one relation. `Clear` is the `null` form
/// accepted on nullable relations.
///

#[derive(Clone, Debug, PartialEq)]
pub enum ToOneWrite {
    Create(Box<CreatePayload>),
    Connect(UniqueSelector),
    ConnectOrCreate(ConnectOrCreate),
    Update(Box<UpdatePayload>),
    Upsert {
        create: Box<CreatePayload>,
        update: Box<UpdatePayload>,
    },
    Disconnect,
    Delete,
    Clear,
}

impl ToOneWrite {
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Connect(_) => "connect",
            Self::ConnectOrCreate(_) => "connectOrCreate",
            Self::Update(_) => "update",
            Self::Upsert { .. } => "upsert",
            Self::Disconnect => "disconnect",
            Self::Delete => "delete",
            Self::Clear => "null",
        }
    }
}

///
/// ConnectOrCreate
///

#[derive(Clone, Debug, PartialEq)]
pub struct ConnectOrCreate {
    pub where_: UniqueSelector,
    pub create: Box<CreatePayload>,
}

///
/// CreateMany
///
/// Scalar-only rows; nested relation writes are not accepted.
///

#[derive(Clone, Debug, PartialEq)]
pub struct CreateMany {
    pub data: Vec<CreatePayload>,
    pub skip_duplicates: bool,
}

///
/// UpdateWhere
///

#[derive(Clone, Debug, PartialEq)]
pub struct UpdateWhere {
    pub where_: UniqueSelector,
    pub data: UpdatePayload,
}

///
/// UpsertWhere
///

#[derive(Clone, Debug, PartialEq)]
pub struct UpsertWhere {
    pub where_: UniqueSelector,
    pub create: CreatePayload,
    pub update: UpdatePayload,
}

///
/// UpdateManyWhere
///

#[derive(Clone, Debug, PartialEq)]
pub struct UpdateManyWhere {
    pub where_: Filter,
    pub data: UpdatePayload,
}

///
/// ToManyWrite
///
/// Every key is an independent sub-operation on the same relation.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ToManyWrite {
    pub create: Vec<CreatePayload>,
    pub create_many: Option<CreateMany>,
    pub connect: Vec<UniqueSelector>,
    pub connect_or_create: Vec<ConnectOrCreate>,
    pub set: Option<Vec<UniqueSelector>>,
    pub update: Vec<UpdateWhere>,
    pub upsert: Vec<UpsertWhere>,
    pub delete: Vec<UniqueSelector>,
    pub delete_many: Vec<Filter>,
    pub disconnect: Vec<UniqueSelector>,
    pub update_many: Vec<UpdateManyWhere>,
}

impl ToManyWrite {
    /// Names of the sub-operations present, in a fixed order.
    #[must_use]
    pub fn operations(&self) -> Vec<&'static str> {
        let present = [
            ("create", !self.create.is_empty()),
            ("createMany", self.create_many.is_some()),
            ("connect", !self.connect.is_empty()),
            ("connectOrCreate", !self.connect_or_create.is_empty()),
            ("set", self.set.is_some()),
            ("update", !self.update.is_empty()),
            ("upsert", !self.upsert.is_empty()),
            ("delete", !self.delete.is_empty()),
            ("deleteMany", !self.delete_many.is_empty()),
            ("disconnect", !self.disconnect.is_empty()),
            ("updateMany", !self.update_many.is_empty()),
        ];

        present
            .into_iter()
            .filter_map(|(name, on)| on.then_some(name))
            .collect()
    }
}

///
/// CreateManyPayload
///

#[derive(Clone, Debug, PartialEq)]
pub struct CreateManyPayload {
    pub entity: EntityRef,
    pub data: Vec<CreatePayload>,
    pub skip_duplicates: bool,
}

///
/// UpdateManyArgs
///

#[derive(Clone, Debug, PartialEq)]
pub struct UpdateManyArgs {
    pub entity: EntityRef,
    pub where_: Option<Filter>,
    pub data: UpdatePayload,
}

///
/// UpsertArgs
///

#[derive(Clone, Debug, PartialEq)]
pub struct UpsertArgs {
    pub entity: EntityRef,
    pub where_: UniqueSelector,
    pub create: CreatePayload,
    pub update: UpdatePayload,
}
