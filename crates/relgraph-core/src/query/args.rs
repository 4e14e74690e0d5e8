use crate::{
    error::IssueKind,
    filter::{
        Filter, OrderSpec, UniqueSelector,
        order::{OrderMode, order_spec},
        parse::{FilterMode, filter},
        unique::unique_selector,
    },
    model::EntityModel,
    query::select::{Selection, selection_arg},
    schema::EntityRef,
    validate::{
        ValidateContext, check_keys, expect_count, expect_object, expect_string, keyed_list,
        required_key,
    },
};
use serde_json::{Map, Value as JsonValue};

const FIND_MANY_KEYS: &[&str] = &[
    "where", "orderBy", "cursor", "take", "skip", "distinct", "select", "include",
];
const FIND_UNIQUE_KEYS: &[&str] = &["where", "select", "include"];

///
/// FindManyArgs
///

#[derive(Clone, Debug, PartialEq)]
pub struct FindManyArgs {
    pub entity: EntityRef,
    pub where_: Option<Filter>,
    pub order_by: Option<OrderSpec>,
    pub cursor: Option<UniqueSelector>,
    pub take: Option<u64>,
    pub skip: Option<u64>,
    pub distinct: Vec<&'static str>,
    pub selection: Option<Selection>,
}

///
/// FindUniqueArgs
///

#[derive(Clone, Debug, PartialEq)]
pub struct FindUniqueArgs {
    pub entity: EntityRef,
    pub where_: UniqueSelector,
    pub selection: Option<Selection>,
}

/// Parse find-many arguments from an already-checked object.
pub(crate) fn find_many(
    ctx: &mut ValidateContext<'_>,
    model: &EntityModel,
    map: &Map<String, JsonValue>,
) -> Option<FindManyArgs> {
    let entity = ctx.entity_ref(model)?;
    let mark = ctx.mark();
    check_keys(ctx, map, FIND_MANY_KEYS);

    let where_ = where_arg(ctx, model, map);
    let order_by = map.get("orderBy").and_then(|raw| {
        ctx.nested("orderBy", |ctx| order_spec(ctx, model, raw, OrderMode::Find))
    });
    let cursor = map
        .get("cursor")
        .and_then(|raw| ctx.at("cursor", |ctx| unique_selector(ctx, model, raw)));
    let take = count_arg(ctx, map, "take");
    let skip = count_arg(ctx, map, "skip");
    let distinct = map
        .get("distinct")
        .and_then(|raw| ctx.at("distinct", |ctx| distinct(ctx, model, raw)))
        .unwrap_or_default();
    let selection = selection_arg(ctx, model, map);

    if ctx.failed_since(mark) {
        return None;
    }

    Some(FindManyArgs {
        entity,
        where_,
        order_by,
        cursor,
        take,
        skip,
        distinct,
        selection: selection?,
    })
}

pub(crate) fn find_unique(
    ctx: &mut ValidateContext<'_>,
    model: &EntityModel,
    raw: &JsonValue,
) -> Option<FindUniqueArgs> {
    let map = expect_object(ctx, raw)?;
    let entity = ctx.entity_ref(model)?;
    check_keys(ctx, map, FIND_UNIQUE_KEYS);

    let where_ = required_key(ctx, map, "where")
        .and_then(|raw| ctx.at("where", |ctx| unique_selector(ctx, model, raw)));
    let selection = selection_arg(ctx, model, map);

    Some(FindUniqueArgs {
        entity,
        where_: where_?,
        selection: selection?,
    })
}

/// Optional `where` filter.
pub(crate) fn where_arg(
    ctx: &mut ValidateContext<'_>,
    model: &EntityModel,
    map: &Map<String, JsonValue>,
) -> Option<Filter> {
    let raw = map.get("where")?;
    ctx.nested("where", |ctx| filter(ctx, model, raw, FilterMode::Where))
}

/// Optional non-negative count such as `take` or `skip`.
pub(crate) fn count_arg(
    ctx: &mut ValidateContext<'_>,
    map: &Map<String, JsonValue>,
    key: &str,
) -> Option<u64> {
    let raw = map.get(key)?;
    ctx.at(key, |ctx| expect_count(ctx, raw))
}

fn distinct(
    ctx: &mut ValidateContext<'_>,
    model: &EntityModel,
    raw: &JsonValue,
) -> Option<Vec<&'static str>> {
    keyed_list(ctx, raw, |ctx, raw| {
        let name = expect_string(ctx, raw)?;

        if let Some(field) = model.field(&name) {
            Some(field.name)
        } else {
            ctx.issue(
                IssueKind::UnknownKey,
                format!("'{name}' is not a field of {}", model.name),
            );
            None
        }
    })
    .map(|(fields, _)| fields)
}
