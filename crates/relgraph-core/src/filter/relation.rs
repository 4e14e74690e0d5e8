use crate::{
    error::IssueKind,
    filter::{
        ast::{RelationFilter, RelationTarget},
        parse::{FilterMode, filter},
    },
    model::{EntityModel, RelationModel},
    validate::{ValidateContext, expect_object},
    value::json_label,
};
use serde_json::Value as JsonValue;

/// Parse a relation predicate.
///
/// To-many relations take `{ some, every, none }`. To-one relations take a
/// boolean existence check, `null` (nullable only), `{ is, isNot }`, or a
/// nested filter over the target, checked in that order.
pub(super) fn relation_filter(
    ctx: &mut ValidateContext<'_>,
    relation: &RelationModel,
    raw: &JsonValue,
) -> Option<RelationFilter> {
    let target = ctx.target(relation)?;

    if relation.is_many() {
        return to_many(ctx, relation, target, raw);
    }

    match raw {
        JsonValue::Bool(exists) => Some(RelationFilter::Exists(*exists)),
        JsonValue::Null => null_check(ctx, relation).then_some(RelationFilter::IsNull),
        JsonValue::Object(map) if map.contains_key("is") || map.contains_key("isNot") => {
            let mark = ctx.mark();
            let mut is = None;
            let mut is_not = None;

            for (key, raw) in map {
                match key.as_str() {
                    "is" => is = ctx.nested("is", |ctx| relation_target(ctx, relation, target, raw)),
                    "isNot" => {
                        is_not =
                            ctx.nested("isNot", |ctx| relation_target(ctx, relation, target, raw));
                    }
                    other => ctx.issue_at(
                        other,
                        IssueKind::AmbiguousUnionVariant,
                        format!(
                            "'{other}' cannot be combined with is/isNot on relation '{}'",
                            relation.name
                        ),
                    ),
                }
            }

            (!ctx.failed_since(mark)).then_some(RelationFilter::Is { is, is_not })
        }
        JsonValue::Object(_) => filter(ctx, target, raw, FilterMode::Where)
            .map(|f| RelationFilter::Matches(Box::new(f))),
        other => {
            ctx.issue(
                IssueKind::TypeMismatch,
                format!(
                    "expected object, bool or null for relation '{}', found {}",
                    relation.name,
                    json_label(other)
                ),
            );
            None
        }
    }
}

fn to_many(
    ctx: &mut ValidateContext<'_>,
    relation: &RelationModel,
    target: &EntityModel,
    raw: &JsonValue,
) -> Option<RelationFilter> {
    let map = expect_object(ctx, raw)?;
    let mark = ctx.mark();
    let (mut some, mut every, mut none) = (None, None, None);

    for (key, raw) in map {
        let key = key.as_str();
        let slot = match key {
            "some" => &mut some,
            "every" => &mut every,
            "none" => &mut none,
            _ => {
                ctx.unknown_key(
                    key,
                    &format!("some, every or none for relation '{}'", relation.name),
                );
                continue;
            }
        };

        *slot = ctx
            .nested(key, |ctx| filter(ctx, target, raw, FilterMode::Where))
            .map(Box::new);
    }

    (!ctx.failed_since(mark)).then_some(RelationFilter::Many { some, every, none })
}

fn relation_target(
    ctx: &mut ValidateContext<'_>,
    relation: &RelationModel,
    target: &EntityModel,
    raw: &JsonValue,
) -> Option<RelationTarget> {
    if raw.is_null() {
        return null_check(ctx, relation).then_some(RelationTarget::Null);
    }

    filter(ctx, target, raw, FilterMode::Where).map(|f| RelationTarget::Filter(Box::new(f)))
}

// Only nullable to-one relations can be tested against null.
fn null_check(ctx: &mut ValidateContext<'_>, relation: &RelationModel) -> bool {
    if relation.is_nullable() {
        return true;
    }

    ctx.issue(
        IssueKind::NullOnRequiredRelation,
        format!(
            "relation '{}' is required and is never null",
            relation.name
        ),
    );
    false
}
