use crate::{
    error::IssueKind,
    model::{EntityModel, Member},
    mutation::{
        Action, WriteScope,
        ast::{CreatePayload, WriteVariant},
        field::write_value,
        relation::relation_write,
        write_member, write_variant,
    },
    validate::{ValidateContext, expect_object},
};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Parse a create payload over `model`.
///
/// Checked payloads must write every required to-one relation through a
/// relation object. Unchecked payloads must carry the required foreign key
/// scalars instead.
pub(crate) fn create_payload(
    ctx: &mut ValidateContext<'_>,
    model: &EntityModel,
    raw: &JsonValue,
    scope: WriteScope,
) -> Option<CreatePayload> {
    let map = expect_object(ctx, raw)?;
    let entity = ctx.entity_ref(model)?;
    let mark = ctx.mark();

    let variant = write_variant(ctx, model, map, scope);
    let mut fields = BTreeMap::new();
    let mut relations = BTreeMap::new();

    for (key, raw) in map {
        match write_member(ctx, model, key, scope, variant) {
            Some(Member::Field(field)) => {
                if let Some(value) = ctx.at(key.as_str(), |ctx| write_value(ctx, field, raw)) {
                    fields.insert(field.name, value);
                }
            }
            Some(Member::Relation(relation)) => {
                if let Some(write) = ctx.nested(key.as_str(), |ctx| {
                    relation_write(ctx, relation, raw, Action::Create)
                }) {
                    relations.insert(relation.name, write);
                }
            }
            None => {}
        }
    }

    let omitted = scope.omitted_fields(model);

    for field in &model.fields {
        if map.contains_key(field.name) || omitted.contains(&field.name) || !field.is_required() {
            continue;
        }
        if variant == WriteVariant::Checked && model.is_fk_field(field.name) {
            continue;
        }

        ctx.issue_at(
            field.name,
            IssueKind::MissingRequiredField,
            format!("missing required field '{}'", field.name),
        );
    }

    if variant == WriteVariant::Checked {
        for relation in &model.relations {
            if relation.is_required()
                && !scope.omits(relation.name)
                && !map.contains_key(relation.name)
            {
                ctx.issue_at(
                    relation.name,
                    IssueKind::MissingRequiredRelation,
                    format!(
                        "relation '{}' is required: provide one of create, connect, connectOrCreate",
                        relation.name
                    ),
                );
            }
        }
    }

    (!ctx.failed_since(mark)).then_some(CreatePayload {
        entity,
        variant,
        fields,
        relations,
    })
}
