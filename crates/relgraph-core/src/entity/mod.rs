//! Entity values: raw input checked against one `EntityModel`.
//!
//! The plain shape carries scalar fields only. The with-relations shape also
//! accepts embedded views of related entities, each parsed against the
//! target's model.

#[cfg(test)]
mod tests;

use crate::{
    error::{IssueKind, ValidationError},
    model::{EntityModel, FieldModel, Member, RelationModel},
    obs::Operation,
    schema::EntityRef,
    validate::{ValidateContext, Validator, expect_array, expect_object, field_value},
    value::Value,
};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;

///
/// EntityValue
///

#[derive(Clone, Debug, PartialEq)]
pub struct EntityValue {
    pub entity: EntityRef,
    pub fields: BTreeMap<&'static str, Value>,
    pub relations: BTreeMap<&'static str, RelationValue>,
}

impl EntityValue {
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    #[must_use]
    pub fn relation(&self, name: &str) -> Option<&RelationValue> {
        self.relations.get(name)
    }

    /// Render back into the raw shape accepted by the parser.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        let mut map = Map::new();

        for (name, value) in &self.fields {
            map.insert((*name).to_string(), value.to_json());
        }
        for (name, relation) in &self.relations {
            map.insert((*name).to_string(), relation.to_json());
        }

        JsonValue::Object(map)
    }
}

///
/// RelationValue
///
/// An embedded view of a relation. An absent relation was not loaded.
///

#[derive(Clone, Debug, PartialEq)]
pub enum RelationValue {
    One(Box<EntityValue>),
    Null,
    Many(Vec<EntityValue>),
}

impl RelationValue {
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::One(value) => value.to_json(),
            Self::Null => JsonValue::Null,
            Self::Many(values) => JsonValue::Array(values.iter().map(EntityValue::to_json).collect()),
        }
    }
}

impl Validator<'_> {
    /// Parse a plain entity value. Relation keys are unknown keys here.
    pub fn parse(&self, entity: EntityRef, raw: &JsonValue) -> Result<EntityValue, ValidationError> {
        self.run(Operation::Entity, entity, |ctx, model| {
            parse_entity(ctx, model, raw, false)
        })
    }

    /// Parse an entity value with embedded relation views.
    pub fn parse_with_relations(
        &self,
        entity: EntityRef,
        raw: &JsonValue,
    ) -> Result<EntityValue, ValidationError> {
        self.run(Operation::EntityWithRelations, entity, |ctx, model| {
            parse_entity(ctx, model, raw, true)
        })
    }
}

fn parse_entity(
    ctx: &mut ValidateContext<'_>,
    model: &EntityModel,
    raw: &JsonValue,
    with_relations: bool,
) -> Option<EntityValue> {
    let map = expect_object(ctx, raw)?;
    let mark = ctx.mark();

    let entity = ctx.entity_ref(model)?;
    let mut fields = BTreeMap::new();
    let mut relations = BTreeMap::new();

    for (key, raw) in map {
        match model.member(key) {
            Some(Member::Field(field)) => {
                if let Some(value) = ctx.at(key.as_str(), |ctx| field_value(ctx, field, raw)) {
                    fields.insert(field.name, value);
                }
            }
            Some(Member::Relation(relation)) if with_relations => {
                if let Some(value) =
                    ctx.nested(key.as_str(), |ctx| relation_view(ctx, relation, raw))
                {
                    relations.insert(relation.name, value);
                }
            }
            _ => ctx.unknown_key(key, &format!("a field of {}", model.name)),
        }
    }

    for field in &model.fields {
        if !map.contains_key(field.name)
            && let Some(value) = missing_field(ctx, field)
        {
            fields.insert(field.name, value);
        }
    }

    (!ctx.failed_since(mark)).then_some(EntityValue {
        entity,
        fields,
        relations,
    })
}

// Fill an omitted field: literal default, then null for nullable fields.
// Generated fields stay absent.
fn missing_field(ctx: &mut ValidateContext<'_>, field: &FieldModel) -> Option<Value> {
    if let Some(raw) = field.literal_default() {
        return ctx.at(field.name, |ctx| field_value(ctx, field, raw));
    }
    if field.is_generated() {
        return None;
    }
    if field.nullable {
        return Some(Value::Null);
    }

    ctx.issue_at(
        field.name,
        IssueKind::MissingRequiredField,
        format!("missing required field '{}'", field.name),
    );
    None
}

fn relation_view(
    ctx: &mut ValidateContext<'_>,
    relation: &RelationModel,
    raw: &JsonValue,
) -> Option<RelationValue> {
    let target = ctx.target(relation)?;

    if relation.is_many() {
        let items = expect_array(ctx, raw)?;
        let mark = ctx.mark();
        let values: Vec<_> = items
            .iter()
            .enumerate()
            .filter_map(|(i, raw)| ctx.at(i, |ctx| parse_entity(ctx, target, raw, true)))
            .collect();

        return (!ctx.failed_since(mark)).then_some(RelationValue::Many(values));
    }

    if raw.is_null() {
        if relation.is_nullable() {
            return Some(RelationValue::Null);
        }

        ctx.issue(
            IssueKind::NullOnRequiredRelation,
            format!("relation '{}' is required and cannot be null", relation.name),
        );
        return None;
    }

    parse_entity(ctx, target, raw, true).map(|value| RelationValue::One(Box::new(value)))
}
