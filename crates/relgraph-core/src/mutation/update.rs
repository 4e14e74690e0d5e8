use crate::{
    model::{EntityModel, Member},
    mutation::{
        Action, WriteScope,
        ast::UpdatePayload,
        field::field_update,
        relation::relation_write,
        write_member, write_variant,
    },
    validate::{ValidateContext, expect_object},
};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Parse an update payload over `model`. Every member is optional.
pub(crate) fn update_payload(
    ctx: &mut ValidateContext<'_>,
    model: &EntityModel,
    raw: &JsonValue,
    scope: WriteScope,
) -> Option<UpdatePayload> {
    let map = expect_object(ctx, raw)?;
    let entity = ctx.entity_ref(model)?;
    let mark = ctx.mark();

    let variant = write_variant(ctx, model, map, scope);
    let mut fields = BTreeMap::new();
    let mut relations = BTreeMap::new();

    for (key, raw) in map {
        match write_member(ctx, model, key, scope, variant) {
            Some(Member::Field(field)) => {
                if let Some(update) = ctx.at(key.as_str(), |ctx| field_update(ctx, field, raw)) {
                    fields.insert(field.name, update);
                }
            }
            Some(Member::Relation(relation)) => {
                if let Some(write) = ctx.nested(key.as_str(), |ctx| {
                    relation_write(ctx, relation, raw, Action::Update)
                }) {
                    relations.insert(relation.name, write);
                }
            }
            None => {}
        }
    }

    (!ctx.failed_since(mark)).then_some(UpdatePayload {
        entity,
        variant,
        fields,
        relations,
    })
}
