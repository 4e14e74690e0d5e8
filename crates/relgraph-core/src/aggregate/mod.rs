//! Grouped and ungrouped aggregation arguments.


use crate::{
    error::{IssueKind, ValidationError},
    filter::{
        AggregateFn, Filter, OrderSpec, UniqueSelector,
        order::{OrderMode, order_spec},
        parse::{FilterMode, aggregate_operand, filter},
        unique::unique_selector,
    },
    model::{EntityModel, FieldKind},
    obs::Operation,
    query::args::{count_arg, where_arg},
    schema::EntityRef,
    validate::{
        ValidateContext, Validator, check_keys, expect_bool, expect_object, expect_string,
        keyed_list, required_key,
    },
};
use serde_json::{Map, Value as JsonValue};
use std::collections::{BTreeMap, BTreeSet};

const SELECTION_KEYS: &[&str] = &["_count", "_avg", "_sum", "_min", "_max"];
const GROUP_BY_KEYS: &[&str] = &[
    "by", "where", "having", "orderBy", "take", "skip", "_count", "_avg", "_sum", "_min", "_max",
];
const AGGREGATE_KEYS: &[&str] = &[
    "where", "orderBy", "cursor", "take", "skip", "_count", "_avg", "_sum", "_min", "_max",
];

///
/// CountSelection
///
/// `_count: true` counts rows; `{ _all, field }` counts rows and non-null
/// values per field.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CountSelection {
    pub all: bool,
    pub fields: Vec<&'static str>,
}

///
/// AggregateSelection
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AggregateSelection {
    pub count: Option<CountSelection>,
    pub fields: BTreeMap<AggregateFn, Vec<&'static str>>,
}

impl AggregateSelection {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count.is_none() && self.fields.is_empty()
    }

    /// Fields selected for `function`.
    #[must_use]
    pub fn selected(&self, function: AggregateFn) -> &[&'static str] {
        self.fields
            .get(&function)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

///
/// GroupBy
///

#[derive(Clone, Debug, PartialEq)]
pub struct GroupBy {
    pub entity: EntityRef,
    pub by: Vec<&'static str>,
    pub where_: Option<Filter>,
    pub having: Option<Filter>,
    pub order_by: Option<OrderSpec>,
    pub take: Option<u64>,
    pub skip: Option<u64>,
    pub aggregates: AggregateSelection,
}

///
/// AggregateArgs
///

#[derive(Clone, Debug, PartialEq)]
pub struct AggregateArgs {
    pub entity: EntityRef,
    pub where_: Option<Filter>,
    pub order_by: Option<OrderSpec>,
    pub cursor: Option<UniqueSelector>,
    pub take: Option<u64>,
    pub skip: Option<u64>,
    pub aggregates: AggregateSelection,
}

impl Validator<'_> {
    /// Parse `groupBy` arguments.
    ///
    /// `having` and `orderBy` may only name grouped fields outside of
    /// aggregates, and paging needs an explicit order.
    pub fn parse_group_by(&self, entity: EntityRef, raw: &JsonValue) -> Result<GroupBy, ValidationError> {
        self.run(Operation::GroupBy, entity, |ctx, model| group_by(ctx, model, raw))
    }

    pub fn parse_aggregate(
        &self,
        entity: EntityRef,
        raw: &JsonValue,
    ) -> Result<AggregateArgs, ValidationError> {
        self.run(Operation::Aggregate, entity, |ctx, model| {
            let map = expect_object(ctx, raw)?;
            let mark = ctx.mark();
            check_keys(ctx, map, AGGREGATE_KEYS);

            let where_ = where_arg(ctx, model, map);
            let order_by = map.get("orderBy").and_then(|raw| {
                ctx.nested("orderBy", |ctx| order_spec(ctx, model, raw, OrderMode::Find))
            });
            let cursor = map
                .get("cursor")
                .and_then(|raw| ctx.at("cursor", |ctx| unique_selector(ctx, model, raw)));
            let take = count_arg(ctx, map, "take");
            let skip = count_arg(ctx, map, "skip");
            let aggregates = aggregate_selection(ctx, model, map);

            (!ctx.failed_since(mark)).then_some(AggregateArgs {
                entity,
                where_,
                order_by,
                cursor,
                take,
                skip,
                aggregates,
            })
        })
    }
}

fn group_by(ctx: &mut ValidateContext<'_>, model: &EntityModel, raw: &JsonValue) -> Option<GroupBy> {
    let map = expect_object(ctx, raw)?;
    let entity = ctx.entity_ref(model)?;
    let mark = ctx.mark();
    check_keys(ctx, map, GROUP_BY_KEYS);

    let by = required_key(ctx, map, "by")
        .and_then(|raw| ctx.at("by", |ctx| by_fields(ctx, model, raw)))
        .unwrap_or_default();

    let where_ = where_arg(ctx, model, map);
    let having = map.get("having").and_then(|raw| {
        let mode = FilterMode::Having {
            by: Some(by.as_slice()),
        };
        ctx.nested("having", |ctx| filter(ctx, model, raw, mode))
    });
    let order_by = map.get("orderBy").and_then(|raw| {
        ctx.nested("orderBy", |ctx| {
            order_spec(ctx, model, raw, OrderMode::GroupBy { by: by.as_slice() })
        })
    });
    let take = count_arg(ctx, map, "take");
    let skip = count_arg(ctx, map, "skip");
    let aggregates = aggregate_selection(ctx, model, map);

    if (take.is_some() || skip.is_some()) && !map.contains_key("orderBy") {
        ctx.issue_at(
            "orderBy",
            IssueKind::MissingRequiredField,
            "take and skip in groupBy require orderBy",
        );
    }

    (!ctx.failed_since(mark)).then_some(GroupBy {
        entity,
        by,
        where_,
        having,
        order_by,
        take,
        skip,
        aggregates,
    })
}

fn by_fields(
    ctx: &mut ValidateContext<'_>,
    model: &EntityModel,
    raw: &JsonValue,
) -> Option<Vec<&'static str>> {
    let (fields, _) = keyed_list(ctx, raw, |ctx, raw| {
        let name = expect_string(ctx, raw)?;

        match model.field(&name) {
            Some(field) if matches!(field.kind, FieldKind::Json) => {
                ctx.issue(
                    IssueKind::InvalidOperator,
                    format!("JSON field '{name}' cannot be grouped"),
                );
                None
            }
            Some(field) => Some(field.name),
            None => {
                ctx.issue(
                    IssueKind::UnknownKey,
                    format!("'{name}' is not a field of {}", model.name),
                );
                None
            }
        }
    })?;

    if fields.is_empty() {
        ctx.issue(IssueKind::InvalidValue, "by needs at least one field");
        return None;
    }

    let mut seen = BTreeSet::new();
    if let Some(dup) = fields.iter().find(|name| !seen.insert(**name)) {
        ctx.issue(
            IssueKind::InvalidValue,
            format!("'{dup}' is listed more than once"),
        );
        return None;
    }

    Some(fields)
}

// Selections are reported under their own key; failures surface through the
// caller's mark.
fn aggregate_selection(
    ctx: &mut ValidateContext<'_>,
    model: &EntityModel,
    map: &Map<String, JsonValue>,
) -> AggregateSelection {
    let mut out = AggregateSelection::default();

    for key in SELECTION_KEYS {
        let (Some(raw), Some(function)) = (map.get(*key), AggregateFn::from_key(key)) else {
            continue;
        };

        if function == AggregateFn::Count {
            out.count = ctx.at(*key, |ctx| count_selection(ctx, model, raw));
        } else if let Some(fields) = ctx.at(*key, |ctx| field_selection(ctx, model, function, raw)) {
            out.fields.insert(function, fields);
        }
    }

    out
}

fn count_selection(
    ctx: &mut ValidateContext<'_>,
    model: &EntityModel,
    raw: &JsonValue,
) -> Option<CountSelection> {
    if let JsonValue::Bool(all) = raw {
        return Some(CountSelection {
            all: *all,
            fields: Vec::new(),
        });
    }

    let map = expect_object(ctx, raw)?;
    let mark = ctx.mark();
    let mut out = CountSelection::default();

    for (key, raw) in map {
        let selected = ctx.at(key.as_str(), |ctx| expect_bool(ctx, raw)) == Some(true);

        if key == "_all" {
            out.all = selected;
        } else if let Some(field) = model.field(key) {
            if selected {
                out.fields.push(field.name);
            }
        } else {
            ctx.unknown_key(key, &format!("_all or a field of {}", model.name));
        }
    }

    (!ctx.failed_since(mark)).then_some(out)
}

fn field_selection(
    ctx: &mut ValidateContext<'_>,
    model: &EntityModel,
    function: AggregateFn,
    raw: &JsonValue,
) -> Option<Vec<&'static str>> {
    let map = expect_object(ctx, raw)?;
    let mark = ctx.mark();
    let mut out = Vec::new();

    for (key, raw) in map {
        let Some(field) = model.field(key) else {
            ctx.unknown_key(key, &format!("a field of {}", model.name));
            continue;
        };
        if aggregate_operand(ctx, field, function, key).is_none() {
            continue;
        }

        if ctx.at(key.as_str(), |ctx| expect_bool(ctx, raw)) == Some(true) {
            out.push(field.name);
        }
    }

    (!ctx.failed_since(mark)).then_some(out)
}
