use crate::{
    error::IssueKind,
    filter::{ast::AggregateFn, parse::aggregate_operand},
    model::{EntityModel, Member},
    schema::EntityRef,
    validate::{ValidateContext, expect_object},
    value::json_label,
};
use derive_more::Display;
use serde_json::{Map, Value as JsonValue};

///
/// SortOrder
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum SortOrder {
    #[display("asc")]
    Asc,
    #[display("desc")]
    Desc,
}

///
/// NullsOrder
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum NullsOrder {
    #[display("first")]
    First,
    #[display("last")]
    Last,
}

///
/// OrderEntry
///
/// Field          → `"asc"` or `{ sort, nulls }`.
/// Relation       → a to-one relation wrapping an entry of its target.
/// RelationCount  → `{ _count: asc }` on a to-many relation.
/// Aggregate      → `{ _avg: { field: asc } }` in grouped queries.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum OrderEntry {
    Field {
        field: &'static str,
        sort: SortOrder,
        nulls: Option<NullsOrder>,
    },
    Relation {
        relation: &'static str,
        nested: Box<Self>,
    },
    RelationCount {
        relation: &'static str,
        sort: SortOrder,
    },
    Aggregate {
        function: AggregateFn,
        field: &'static str,
        sort: SortOrder,
    },
}

impl OrderEntry {
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        let (key, value) = match self {
            Self::Field { field, sort, nulls } => {
                let value = match nulls {
                    Some(nulls) => serde_json::json!({
                        "sort": sort.to_string(),
                        "nulls": nulls.to_string(),
                    }),
                    None => JsonValue::String(sort.to_string()),
                };
                ((*field).to_string(), value)
            }
            Self::Relation { relation, nested } => ((*relation).to_string(), nested.to_json()),
            Self::RelationCount { relation, sort } => (
                (*relation).to_string(),
                serde_json::json!({ "_count": sort.to_string() }),
            ),
            Self::Aggregate {
                function,
                field,
                sort,
            } => (
                function.to_string(),
                JsonValue::Object(Map::from_iter([(
                    (*field).to_string(),
                    JsonValue::String(sort.to_string()),
                )])),
            ),
        };

        let mut map = Map::new();
        map.insert(key, value);

        JsonValue::Object(map)
    }
}

///
/// OrderSpec
///
/// Entries in priority order. `list` records whether the input was a list,
/// so a single-object spec renders back as an object.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OrderSpec {
    pub entity: EntityRef,
    pub entries: Vec<OrderEntry>,
    pub list: bool,
}

impl OrderSpec {
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match (self.list, self.entries.as_slice()) {
            (false, [entry]) => entry.to_json(),
            _ => JsonValue::Array(self.entries.iter().map(OrderEntry::to_json).collect()),
        }
    }
}

///
/// OrderMode
///
/// Find    → field, relation and relation-count entries.
/// GroupBy → grouped fields and aggregate entries only.
///

#[derive(Clone, Copy, Debug)]
pub(crate) enum OrderMode<'b> {
    Find,
    GroupBy { by: &'b [&'static str] },
}

/// Parse an order-by object or list of objects.
pub(crate) fn order_spec(
    ctx: &mut ValidateContext<'_>,
    model: &EntityModel,
    raw: &JsonValue,
    mode: OrderMode<'_>,
) -> Option<OrderSpec> {
    let entity = ctx.entity_ref(model)?;

    let (entries, list) = match raw {
        JsonValue::Array(items) => {
            if !ctx.check_list_len(items.len()) {
                return None;
            }

            let mark = ctx.mark();
            let entries: Vec<_> = items
                .iter()
                .enumerate()
                .filter_map(|(i, raw)| ctx.at(i, |ctx| order_entry(ctx, model, raw, mode)))
                .collect();
            if ctx.failed_since(mark) {
                return None;
            }

            (entries, true)
        }
        _ => {
            // a stripped key leaves no entry and no issue
            let mark = ctx.mark();
            let entry = order_entry(ctx, model, raw, mode);
            if ctx.failed_since(mark) {
                return None;
            }

            (entry.into_iter().collect(), false)
        }
    };

    Some(OrderSpec {
        entity,
        entries,
        list,
    })
}

fn order_entry(
    ctx: &mut ValidateContext<'_>,
    model: &EntityModel,
    raw: &JsonValue,
    mode: OrderMode<'_>,
) -> Option<OrderEntry> {
    let map = expect_object(ctx, raw)?;
    let mut entries = map.iter();

    let (Some((key, raw)), None) = (entries.next(), entries.next()) else {
        ctx.issue(
            IssueKind::AmbiguousUnionVariant,
            format!(
                "an order entry names exactly one key, found {}",
                map.len()
            ),
        );
        return None;
    };

    if let Some(function) = AggregateFn::from_key(key) {
        return match mode {
            OrderMode::GroupBy { .. } => {
                ctx.at(key.as_str(), |ctx| aggregate_entry(ctx, model, function, raw))
            }
            OrderMode::Find => {
                ctx.issue_at(
                    key.as_str(),
                    IssueKind::InvalidOperator,
                    format!("'{key}' ordering is only valid in groupBy"),
                );
                None
            }
        };
    }

    match (model.member(key), mode) {
        (Some(Member::Field(field)), OrderMode::GroupBy { by }) if !by.contains(&field.name) => {
            ctx.issue_at(
                key.as_str(),
                IssueKind::InvalidValue,
                format!("'{key}' is not in `by` and cannot order grouped results"),
            );
            None
        }
        (Some(Member::Field(field)), _) => ctx.at(key.as_str(), |ctx| {
            if !field.scalar().supports_sort() {
                ctx.issue(
                    IssueKind::InvalidOperator,
                    format!("{} field '{key}' cannot be sorted", field.scalar()),
                );
                return None;
            }

            let (sort, nulls) = field_order(ctx, raw)?;
            if nulls.is_some() && !field.nullable {
                ctx.issue_at(
                    "nulls",
                    IssueKind::InvalidOperator,
                    format!("'nulls' only applies to nullable fields; '{key}' is required"),
                );
                return None;
            }

            Some(OrderEntry::Field {
                field: field.name,
                sort,
                nulls,
            })
        }),
        (Some(Member::Relation(relation)), OrderMode::Find) => {
            ctx.nested(key.as_str(), |ctx| {
                if relation.is_many() {
                    let map = expect_object(ctx, raw)?;
                    return match map.get("_count") {
                        Some(sort) if map.len() == 1 => ctx.at("_count", |ctx| {
                            sort_order(ctx, sort).map(|sort| OrderEntry::RelationCount {
                                relation: relation.name,
                                sort,
                            })
                        }),
                        _ => {
                            ctx.issue(
                                IssueKind::TypeMismatch,
                                format!(
                                    "to-many relation '{key}' orders by {{ _count: asc | desc }}"
                                ),
                            );
                            None
                        }
                    };
                }

                let target = ctx.target(relation)?;
                order_entry(ctx, target, raw, OrderMode::Find).map(|nested| OrderEntry::Relation {
                    relation: relation.name,
                    nested: Box::new(nested),
                })
            })
        }
        (Some(Member::Relation(_)), OrderMode::GroupBy { .. }) => {
            ctx.issue_at(
                key.as_str(),
                IssueKind::InvalidOperator,
                format!("relation '{key}' cannot order grouped results"),
            );
            None
        }
        (None, _) => {
            ctx.unknown_key(key, &format!("a member of {}", model.name));
            None
        }
    }
}

fn aggregate_entry(
    ctx: &mut ValidateContext<'_>,
    model: &EntityModel,
    function: AggregateFn,
    raw: &JsonValue,
) -> Option<OrderEntry> {
    let map = expect_object(ctx, raw)?;
    let mut entries = map.iter();

    let (Some((key, raw)), None) = (entries.next(), entries.next()) else {
        ctx.issue(
            IssueKind::AmbiguousUnionVariant,
            format!("'{function}' orders by exactly one field, found {}", map.len()),
        );
        return None;
    };

    let Some(field) = model.field(key) else {
        ctx.unknown_key(key, &format!("a field of {}", model.name));
        return None;
    };

    aggregate_operand(ctx, field, function, key)?;

    ctx.at(key.as_str(), |ctx| sort_order(ctx, raw)).map(|sort| OrderEntry::Aggregate {
        function,
        field: field.name,
        sort,
    })
}

fn field_order(
    ctx: &mut ValidateContext<'_>,
    raw: &JsonValue,
) -> Option<(SortOrder, Option<NullsOrder>)> {
    let Some(map) = raw.as_object() else {
        return sort_order(ctx, raw).map(|sort| (sort, None));
    };

    let mark = ctx.mark();
    let mut sort = None;
    let mut nulls = None;

    for (key, raw) in map {
        match key.as_str() {
            "sort" => sort = ctx.at("sort", |ctx| sort_order(ctx, raw)),
            "nulls" => nulls = ctx.at("nulls", |ctx| nulls_order(ctx, raw)),
            other => ctx.unknown_key(other, "sort or nulls"),
        }
    }

    if !map.contains_key("sort") {
        ctx.issue_at(
            "sort",
            IssueKind::MissingRequiredField,
            "missing required field 'sort'",
        );
    }
    if ctx.failed_since(mark) {
        return None;
    }

    sort.map(|sort| (sort, nulls))
}

fn sort_order(ctx: &mut ValidateContext<'_>, raw: &JsonValue) -> Option<SortOrder> {
    match raw.as_str() {
        Some("asc") => Some(SortOrder::Asc),
        Some("desc") => Some(SortOrder::Desc),
        Some(other) => {
            ctx.issue(
                IssueKind::EnumValueNotAllowed,
                format!("'{other}' is not a sort order (expected one of: asc, desc)"),
            );
            None
        }
        None => {
            ctx.issue(
                IssueKind::TypeMismatch,
                format!("expected \"asc\" or \"desc\", found {}", json_label(raw)),
            );
            None
        }
    }
}

fn nulls_order(ctx: &mut ValidateContext<'_>, raw: &JsonValue) -> Option<NullsOrder> {
    match raw.as_str() {
        Some("first") => Some(NullsOrder::First),
        Some("last") => Some(NullsOrder::Last),
        Some(other) => {
            ctx.issue(
                IssueKind::EnumValueNotAllowed,
                format!("'{other}' is not a nulls order (expected one of: first, last)"),
            );
            None
        }
        None => {
            ctx.issue(
                IssueKind::TypeMismatch,
                format!("expected \"first\" or \"last\", found {}", json_label(raw)),
            );
            None
        }
    }
}
