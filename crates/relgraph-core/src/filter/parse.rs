use crate::{
    error::IssueKind,
    filter::{
        ast::{AggregateFn, Condition, Filter, HavingFilter, Junction},
        json::json_filter,
        relation::relation_filter,
        scalar::{list_filter, reject_operator, scalar_filter, scalar_ops, split_aggregates},
    },
    model::{EntityModel, FieldKind, FieldModel, Member},
    validate::{ValidateContext, expect_array, expect_object},
    value::json_label,
};
use serde_json::Value as JsonValue;

///
/// FilterMode
///
/// Where  → field and relation predicates.
/// Having → field predicates plus aggregate operators; no relations. When
///          `by` is known, plain field predicates must name a grouped field.
///

#[derive(Clone, Copy, Debug)]
pub(crate) enum FilterMode<'b> {
    Where,
    Having { by: Option<&'b [&'static str]> },
}

/// Parse one filter object over `model`.
pub(crate) fn filter(
    ctx: &mut ValidateContext<'_>,
    model: &EntityModel,
    raw: &JsonValue,
    mode: FilterMode<'_>,
) -> Option<Filter> {
    let map = expect_object(ctx, raw)?;
    let entity = ctx.entity_ref(model)?;
    let mark = ctx.mark();
    let mut out = Filter::empty(entity);

    for (key, raw) in map {
        match key.as_str() {
            "AND" => out.and = ctx.nested("AND", |ctx| junction(ctx, model, raw, mode)),
            "OR" => {
                out.or = ctx.nested("OR", |ctx| {
                    let items = expect_array(ctx, raw)?;
                    filters(ctx, model, items, mode)
                });
            }
            "NOT" => out.not = ctx.nested("NOT", |ctx| junction(ctx, model, raw, mode)),
            name => match (model.member(name), mode) {
                (Some(Member::Field(field)), _) => {
                    if let Some(condition) =
                        ctx.at(name, |ctx| field_condition(ctx, field, raw, mode))
                    {
                        out.conditions.insert(field.name, condition);
                    }
                }
                (Some(Member::Relation(relation)), FilterMode::Where) => {
                    if let Some(condition) = ctx.nested(name, |ctx| relation_filter(ctx, relation, raw))
                    {
                        out.conditions
                            .insert(relation.name, Condition::Relation(condition));
                    }
                }
                (Some(Member::Relation(relation)), FilterMode::Having { .. }) => ctx.issue_at(
                    name,
                    IssueKind::InvalidOperator,
                    format!("relation '{}' cannot be filtered in having", relation.name),
                ),
                (None, _) => ctx.unknown_key(
                    name,
                    &format!("AND, OR, NOT or a member of {}", model.name),
                ),
            },
        }
    }

    (!ctx.failed_since(mark)).then_some(out)
}

fn junction(
    ctx: &mut ValidateContext<'_>,
    model: &EntityModel,
    raw: &JsonValue,
    mode: FilterMode<'_>,
) -> Option<Junction> {
    match raw {
        JsonValue::Array(_) => {
            let items = expect_array(ctx, raw)?;
            filters(ctx, model, items, mode).map(Junction::Many)
        }
        JsonValue::Object(_) => filter(ctx, model, raw, mode).map(|f| Junction::One(Box::new(f))),
        other => {
            ctx.issue(
                IssueKind::TypeMismatch,
                format!("expected filter object or list, found {}", json_label(other)),
            );
            None
        }
    }
}

fn filters(
    ctx: &mut ValidateContext<'_>,
    model: &EntityModel,
    items: &[JsonValue],
    mode: FilterMode<'_>,
) -> Option<Vec<Filter>> {
    let mark = ctx.mark();
    let out: Vec<_> = items
        .iter()
        .enumerate()
        .filter_map(|(i, raw)| ctx.at(i, |ctx| filter(ctx, model, raw, mode)))
        .collect();

    (!ctx.failed_since(mark)).then_some(out)
}

fn field_condition(
    ctx: &mut ValidateContext<'_>,
    field: &FieldModel,
    raw: &JsonValue,
    mode: FilterMode<'_>,
) -> Option<Condition> {
    match mode {
        FilterMode::Where => match field.kind {
            FieldKind::Json => json_filter(ctx, field, raw).map(Condition::Json),
            FieldKind::TextList => list_filter(ctx, field, raw).map(Condition::List),
            _ => scalar_filter(ctx, field, raw).map(Condition::Scalar),
        },
        FilterMode::Having { by } => having_condition(ctx, field, raw, by),
    }
}

fn having_condition(
    ctx: &mut ValidateContext<'_>,
    field: &FieldModel,
    raw: &JsonValue,
    by: Option<&[&'static str]>,
) -> Option<Condition> {
    let grouped = by.is_none_or(|by| by.contains(&field.name));
    let plain_ops_allowed = !matches!(field.kind, FieldKind::Json | FieldKind::TextList);

    let Some(map) = raw.as_object() else {
        if !grouped {
            ungrouped(ctx, field);
            return None;
        }
        if !plain_ops_allowed {
            reject_operator(ctx, field, "equals");
            return None;
        }
        return scalar_filter(ctx, field, raw).map(Condition::Scalar);
    };

    let mark = ctx.mark();
    let (aggregate_entries, plain_entries) = split_aggregates(map);
    let mut having = HavingFilter::default();

    if !plain_entries.is_empty() {
        if !grouped {
            ungrouped(ctx, field);
        } else if plain_ops_allowed {
            having.ops = scalar_ops(ctx, field, plain_entries);
        } else {
            for (key, _) in plain_entries {
                reject_operator(ctx, field, key);
            }
        }
    }

    for (key, raw) in aggregate_entries {
        let Some(function) = AggregateFn::from_key(key) else {
            continue;
        };
        let Some(operand) = aggregate_operand(ctx, field, function, key) else {
            continue;
        };

        if let Some(filter) = ctx.nested(key.as_str(), |ctx| scalar_filter(ctx, &operand, raw)) {
            having.aggregates.insert(function, filter);
        }
    }

    (!ctx.failed_since(mark)).then_some(Condition::Having(having))
}

fn ungrouped(ctx: &mut ValidateContext<'_>, field: &FieldModel) {
    ctx.issue(
        IssueKind::InvalidValue,
        format!(
            "'{}' is not in `by`; filter it through an aggregate such as _count",
            field.name
        ),
    );
}

/// Field shape that an aggregate of `field` is compared against.
///
/// `_count` is a non-null integer. `_avg` and `_sum` need a numeric field and
/// compare as numbers. `_min` and `_max` need an ordered field and keep its
/// type. Every aggregate except `_count` is null over an empty group.
/// Unsupported pairs are reported at `key`.
pub(crate) fn aggregate_operand(
    ctx: &mut ValidateContext<'_>,
    field: &FieldModel,
    function: AggregateFn,
    key: &str,
) -> Option<FieldModel> {
    let scalar = field.scalar();
    let supported = match function {
        AggregateFn::Count => true,
        AggregateFn::Avg => scalar.supports_average(),
        AggregateFn::Sum => scalar.supports_arithmetic(),
        AggregateFn::Min | AggregateFn::Max => scalar.supports_ordering(),
    };
    if !supported {
        ctx.issue_at(
            key,
            IssueKind::InvalidOperator,
            format!(
                "'{function}' is not supported by {} field '{}'",
                field.scalar(),
                field.name
            ),
        );
        return None;
    }

    let operand = match function {
        AggregateFn::Count => FieldModel::new(field.name, FieldKind::Int),
        AggregateFn::Avg | AggregateFn::Sum => FieldModel::new(field.name, FieldKind::Float).nullable(),
        AggregateFn::Min | AggregateFn::Max => FieldModel::new(field.name, field.kind).nullable(),
    };

    Some(operand)
}
