use crate::{
    schema::EntityRef,
    value::{NullableJson, Value},
};
use derive_more::Display;
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;

///
/// Filter AST
///
/// Typed result of parsing a filter object against one entity. Every node
/// renders back into the raw shape it was parsed from, so the AND/NOT object
/// versus list choice survives a round trip.
///

///
/// Filter
///

#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    pub entity: EntityRef,
    pub and: Option<Junction>,
    pub or: Option<Vec<Self>>,
    pub not: Option<Junction>,
    pub conditions: BTreeMap<&'static str, Condition>,
}

impl Filter {
    #[must_use]
    pub const fn empty(entity: EntityRef) -> Self {
        Self {
            entity,
            and: None,
            or: None,
            not: None,
            conditions: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.and.is_none() && self.or.is_none() && self.not.is_none() && self.conditions.is_empty()
    }

    #[must_use]
    pub fn condition(&self, member: &str) -> Option<&Condition> {
        self.conditions.get(member)
    }

    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        let mut map = Map::new();

        if let Some(and) = &self.and {
            map.insert("AND".to_string(), and.to_json());
        }
        if let Some(or) = &self.or {
            map.insert(
                "OR".to_string(),
                JsonValue::Array(or.iter().map(Self::to_json).collect()),
            );
        }
        if let Some(not) = &self.not {
            map.insert("NOT".to_string(), not.to_json());
        }
        for (name, condition) in &self.conditions {
            map.insert((*name).to_string(), condition.to_json());
        }

        JsonValue::Object(map)
    }
}

///
/// Junction
///
/// Operand of AND / NOT: a single filter object or a list of them.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Junction {
    One(Box<Filter>),
    Many(Vec<Filter>),
}

impl Junction {
    /// Filters in this junction, regardless of shape.
    #[must_use]
    pub fn filters(&self) -> Vec<&Filter> {
        match self {
            Self::One(filter) => vec![filter],
            Self::Many(filters) => filters.iter().collect(),
        }
    }

    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::One(filter) => filter.to_json(),
            Self::Many(filters) => JsonValue::Array(filters.iter().map(Filter::to_json).collect()),
        }
    }
}

///
/// Condition
///

#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
    Scalar(ScalarFilter),
    List(ListFilter),
    Json(JsonFilter),
    Relation(RelationFilter),
    Having(HavingFilter),
}

impl Condition {
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Scalar(filter) => filter.to_json(),
            Self::List(filter) => filter.to_json(),
            Self::Json(filter) => filter.to_json(),
            Self::Relation(filter) => filter.to_json(),
            Self::Having(filter) => filter.to_json(),
        }
    }
}

///
/// ScalarFilter
///
/// Equals → the bare-value shorthand.
/// Ops    → an operator object.
///

#[derive(Clone, Debug, PartialEq)]
pub enum ScalarFilter {
    Equals(Value),
    Ops(ScalarOps),
}

impl ScalarFilter {
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Equals(value) => value.to_json(),
            Self::Ops(ops) => ops.to_json(),
        }
    }
}

///
/// TextMode
///

#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq)]
pub enum TextMode {
    #[default]
    #[display("default")]
    Default,
    #[display("insensitive")]
    Insensitive,
}

///
/// ScalarOps
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScalarOps {
    pub equals: Option<Value>,
    pub in_: Option<Vec<Value>>,
    pub not_in: Option<Vec<Value>>,
    pub lt: Option<Value>,
    pub lte: Option<Value>,
    pub gt: Option<Value>,
    pub gte: Option<Value>,
    pub contains: Option<Value>,
    pub starts_with: Option<Value>,
    pub ends_with: Option<Value>,
    pub mode: Option<TextMode>,
    pub not: Option<Box<ScalarFilter>>,
}

impl ScalarOps {
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        let mut map = Map::new();
        let list = |values: &[Value]| JsonValue::Array(values.iter().map(Value::to_json).collect());

        put(&mut map, "equals", self.equals.as_ref().map(Value::to_json));
        put(&mut map, "in", self.in_.as_deref().map(list));
        put(&mut map, "notIn", self.not_in.as_deref().map(list));
        put(&mut map, "lt", self.lt.as_ref().map(Value::to_json));
        put(&mut map, "lte", self.lte.as_ref().map(Value::to_json));
        put(&mut map, "gt", self.gt.as_ref().map(Value::to_json));
        put(&mut map, "gte", self.gte.as_ref().map(Value::to_json));
        put(&mut map, "contains", self.contains.as_ref().map(Value::to_json));
        put(&mut map, "startsWith", self.starts_with.as_ref().map(Value::to_json));
        put(&mut map, "endsWith", self.ends_with.as_ref().map(Value::to_json));
        put(
            &mut map,
            "mode",
            self.mode.map(|mode| JsonValue::String(mode.to_string())),
        );
        put(&mut map, "not", self.not.as_ref().map(|not| not.to_json()));

        JsonValue::Object(map)
    }
}

///
/// ListFilter
///

#[derive(Clone, Debug, PartialEq)]
pub enum ListFilter {
    Equals(Value),
    Ops(ListOps),
}

impl ListFilter {
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Equals(value) => value.to_json(),
            Self::Ops(ops) => ops.to_json(),
        }
    }
}

///
/// ListOps
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListOps {
    pub equals: Option<Value>,
    pub has: Option<String>,
    pub has_every: Option<Vec<String>>,
    pub has_some: Option<Vec<String>>,
    pub is_empty: Option<bool>,
}

impl ListOps {
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        let mut map = Map::new();
        let list = |items: &Vec<String>| {
            JsonValue::Array(items.iter().cloned().map(JsonValue::String).collect())
        };

        put(&mut map, "equals", self.equals.as_ref().map(Value::to_json));
        put(&mut map, "has", self.has.clone().map(JsonValue::String));
        put(&mut map, "hasEvery", self.has_every.as_ref().map(list));
        put(&mut map, "hasSome", self.has_some.as_ref().map(list));
        put(&mut map, "isEmpty", self.is_empty.map(JsonValue::Bool));

        JsonValue::Object(map)
    }
}

///
/// JsonFilter
///

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JsonFilter {
    pub equals: Option<NullableJson>,
    pub not: Option<NullableJson>,
    pub path: Option<Vec<String>>,
    pub string_contains: Option<String>,
    pub string_starts_with: Option<String>,
    pub string_ends_with: Option<String>,
    pub array_contains: Option<JsonValue>,
    pub array_starts_with: Option<JsonValue>,
    pub array_ends_with: Option<JsonValue>,
}

impl JsonFilter {
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        let mut map = Map::new();

        put(&mut map, "equals", self.equals.as_ref().and_then(NullableJson::to_raw));
        put(&mut map, "not", self.not.as_ref().and_then(NullableJson::to_raw));
        put(
            &mut map,
            "path",
            self.path
                .as_ref()
                .map(|path| JsonValue::Array(path.iter().cloned().map(JsonValue::String).collect())),
        );
        put(&mut map, "string_contains", self.string_contains.clone().map(JsonValue::String));
        put(
            &mut map,
            "string_starts_with",
            self.string_starts_with.clone().map(JsonValue::String),
        );
        put(&mut map, "string_ends_with", self.string_ends_with.clone().map(JsonValue::String));
        put(&mut map, "array_contains", self.array_contains.clone());
        put(&mut map, "array_starts_with", self.array_starts_with.clone());
        put(&mut map, "array_ends_with", self.array_ends_with.clone());

        JsonValue::Object(map)
    }
}

///
/// RelationFilter
///
/// Exists   → `true` / `false` shortcut on a to-one relation.
/// IsNull   → `null` on a nullable to-one relation.
/// Matches  → a nested filter over the target.
/// Is       → `{ is, isNot }` on a to-one relation.
/// Many     → `{ some, every, none }` on a to-many relation.
///

#[derive(Clone, Debug, PartialEq)]
pub enum RelationFilter {
    Exists(bool),
    IsNull,
    Matches(Box<Filter>),
    Is {
        is: Option<RelationTarget>,
        is_not: Option<RelationTarget>,
    },
    Many {
        some: Option<Box<Filter>>,
        every: Option<Box<Filter>>,
        none: Option<Box<Filter>>,
    },
}

impl RelationFilter {
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Exists(exists) => JsonValue::Bool(*exists),
            Self::IsNull => JsonValue::Null,
            Self::Matches(filter) => filter.to_json(),
            Self::Is { is, is_not } => {
                let mut map = Map::new();
                put(&mut map, "is", is.as_ref().map(RelationTarget::to_json));
                put(&mut map, "isNot", is_not.as_ref().map(RelationTarget::to_json));

                JsonValue::Object(map)
            }
            Self::Many { some, every, none } => {
                let mut map = Map::new();
                put(&mut map, "some", some.as_ref().map(|f| f.to_json()));
                put(&mut map, "every", every.as_ref().map(|f| f.to_json()));
                put(&mut map, "none", none.as_ref().map(|f| f.to_json()));

                JsonValue::Object(map)
            }
        }
    }
}

///
/// RelationTarget
///

#[derive(Clone, Debug, PartialEq)]
pub enum RelationTarget {
    Null,
    Filter(Box<Filter>),
}

impl RelationTarget {
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Filter(filter) => filter.to_json(),
        }
    }
}

///
/// AggregateFn
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum AggregateFn {
    #[display("_count")]
    Count,
    #[display("_avg")]
    Avg,
    #[display("_sum")]
    Sum,
    #[display("_min")]
    Min,
    #[display("_max")]
    Max,
}

impl AggregateFn {
    pub const ALL: [Self; 5] = [Self::Count, Self::Avg, Self::Sum, Self::Min, Self::Max];

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.to_string() == key)
    }
}

///
/// HavingFilter
///
/// A field condition inside `having`: plain scalar operators over the grouped
/// value and/or operators over aggregates of the field.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HavingFilter {
    pub ops: Option<ScalarOps>,
    pub aggregates: BTreeMap<AggregateFn, ScalarFilter>,
}

impl HavingFilter {
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        let mut map = match self.ops.as_ref().map(ScalarOps::to_json) {
            Some(JsonValue::Object(map)) => map,
            _ => Map::new(),
        };

        for (function, filter) in &self.aggregates {
            map.insert(function.to_string(), filter.to_json());
        }

        JsonValue::Object(map)
    }
}

fn put(map: &mut Map<String, JsonValue>, key: &str, value: Option<JsonValue>) {
    if let Some(value) = value {
        map.insert(key.to_string(), value);
    }
}
