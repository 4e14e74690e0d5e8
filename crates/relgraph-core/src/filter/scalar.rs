use crate::{
    error::IssueKind,
    filter::ast::{ListFilter, ListOps, ScalarFilter, ScalarOps, TextMode},
    model::FieldModel,
    validate::{
        ValidateContext, expect_array, expect_bool, expect_string, expect_strings, field_value,
    },
    value::{Value, json_label},
};
use serde_json::{Map, Value as JsonValue};

const SCALAR_OPS: &[&str] = &[
    "equals",
    "in",
    "notIn",
    "lt",
    "lte",
    "gt",
    "gte",
    "contains",
    "startsWith",
    "endsWith",
    "mode",
    "not",
];

const LIST_OPS: &[&str] = &["equals", "has", "hasEvery", "hasSome", "isEmpty"];

const JSON_OPS: &[&str] = &[
    "equals",
    "not",
    "path",
    "string_contains",
    "string_starts_with",
    "string_ends_with",
    "array_contains",
    "array_starts_with",
    "array_ends_with",
];

const AGGREGATE_OPS: &[&str] = &["_count", "_avg", "_sum", "_min", "_max"];

/// Report a key inside an operator object that this field does not accept.
///
/// Keys that are operators of some other field kind are `InvalidOperator`;
/// anything else is an unknown key.
pub(super) fn reject_operator(ctx: &mut ValidateContext<'_>, field: &FieldModel, key: &str) {
    let known = [SCALAR_OPS, LIST_OPS, JSON_OPS, AGGREGATE_OPS]
        .iter()
        .any(|ops| ops.contains(&key));

    if known {
        ctx.issue_at(
            key,
            IssueKind::InvalidOperator,
            format!(
                "operator '{key}' is not supported by {} field '{}'",
                field.scalar(),
                field.name
            ),
        );
    } else {
        ctx.unknown_key(key, &format!("an operator for field '{}'", field.name));
    }
}

/// Parse a scalar condition: a bare value (equals shorthand) or an operator object.
pub(super) fn scalar_filter(
    ctx: &mut ValidateContext<'_>,
    field: &FieldModel,
    raw: &JsonValue,
) -> Option<ScalarFilter> {
    match raw.as_object() {
        Some(map) => scalar_ops(ctx, field, map.iter()).map(ScalarFilter::Ops),
        None => field_value(ctx, field, raw).map(ScalarFilter::Equals),
    }
}

/// Parse the entries of a scalar operator object.
pub(super) fn scalar_ops<'v>(
    ctx: &mut ValidateContext<'_>,
    field: &FieldModel,
    entries: impl IntoIterator<Item = (&'v String, &'v JsonValue)>,
) -> Option<ScalarOps> {
    let scalar = field.scalar();
    let mark = ctx.mark();
    let mut ops = ScalarOps::default();

    for (key, raw) in entries {
        let key = key.as_str();
        let supported = match key {
            "equals" | "not" => scalar.supports_equality(),
            "in" | "notIn" => scalar.supports_membership(),
            "lt" | "lte" | "gt" | "gte" => scalar.supports_ordering(),
            "contains" | "startsWith" | "endsWith" | "mode" => scalar.supports_text_match(),
            _ => false,
        };
        if !supported {
            reject_operator(ctx, field, key);
            continue;
        }

        match key {
            "equals" => ops.equals = ctx.at(key, |ctx| field_value(ctx, field, raw)),
            "in" => ops.in_ = ctx.at(key, |ctx| value_list(ctx, field, raw)),
            "notIn" => ops.not_in = ctx.at(key, |ctx| value_list(ctx, field, raw)),
            "lt" => ops.lt = ctx.at(key, |ctx| comparable(ctx, field, key, raw)),
            "lte" => ops.lte = ctx.at(key, |ctx| comparable(ctx, field, key, raw)),
            "gt" => ops.gt = ctx.at(key, |ctx| comparable(ctx, field, key, raw)),
            "gte" => ops.gte = ctx.at(key, |ctx| comparable(ctx, field, key, raw)),
            "contains" => ops.contains = ctx.at(key, |ctx| text_operand(ctx, raw)),
            "startsWith" => ops.starts_with = ctx.at(key, |ctx| text_operand(ctx, raw)),
            "endsWith" => ops.ends_with = ctx.at(key, |ctx| text_operand(ctx, raw)),
            "mode" => ops.mode = ctx.at(key, |ctx| text_mode(ctx, raw)),
            "not" => {
                ops.not = ctx
                    .nested(key, |ctx| scalar_filter(ctx, field, raw))
                    .map(Box::new);
            }
            _ => {}
        }
    }

    (!ctx.failed_since(mark)).then_some(ops)
}

/// Parse a text list condition.
pub(super) fn list_filter(
    ctx: &mut ValidateContext<'_>,
    field: &FieldModel,
    raw: &JsonValue,
) -> Option<ListFilter> {
    let Some(map) = raw.as_object() else {
        return field_value(ctx, field, raw).map(ListFilter::Equals);
    };

    let mark = ctx.mark();
    let mut ops = ListOps::default();

    for (key, raw) in map {
        let key = key.as_str();
        match key {
            "equals" => ops.equals = ctx.at(key, |ctx| field_value(ctx, field, raw)),
            "has" => ops.has = ctx.at(key, |ctx| expect_string(ctx, raw)),
            "hasEvery" => ops.has_every = ctx.at(key, |ctx| expect_strings(ctx, raw)),
            "hasSome" => ops.has_some = ctx.at(key, |ctx| expect_strings(ctx, raw)),
            "isEmpty" => ops.is_empty = ctx.at(key, |ctx| expect_bool(ctx, raw)),
            _ => reject_operator(ctx, field, key),
        }
    }

    (!ctx.failed_since(mark)).then_some(ListFilter::Ops(ops))
}

fn value_list(ctx: &mut ValidateContext<'_>, field: &FieldModel, raw: &JsonValue) -> Option<Vec<Value>> {
    let items = expect_array(ctx, raw)?;
    let mark = ctx.mark();

    let out: Vec<_> = items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| ctx.at(i, |ctx| field_value(ctx, field, item)))
        .collect();

    (!ctx.failed_since(mark)).then_some(out)
}

// Ordering operands must be values; null has no order.
fn comparable(
    ctx: &mut ValidateContext<'_>,
    field: &FieldModel,
    op: &str,
    raw: &JsonValue,
) -> Option<Value> {
    if raw.is_null() {
        ctx.issue(
            IssueKind::TypeMismatch,
            format!("'{op}' needs a value, found null"),
        );
        return None;
    }

    field_value(ctx, field, raw)
}

fn text_operand(ctx: &mut ValidateContext<'_>, raw: &JsonValue) -> Option<Value> {
    expect_string(ctx, raw).map(Value::Text)
}

fn text_mode(ctx: &mut ValidateContext<'_>, raw: &JsonValue) -> Option<TextMode> {
    match raw.as_str() {
        Some("default") => Some(TextMode::Default),
        Some("insensitive") => Some(TextMode::Insensitive),
        Some(other) => {
            ctx.issue(
                IssueKind::EnumValueNotAllowed,
                format!("'{other}' is not a text mode (expected one of: default, insensitive)"),
            );
            None
        }
        None => {
            ctx.issue(
                IssueKind::TypeMismatch,
                format!("expected string, found {}", json_label(raw)),
            );
            None
        }
    }
}

/// Split an operator object into aggregate keys and the rest.
pub(super) fn split_aggregates(
    map: &Map<String, JsonValue>,
) -> (Vec<(&String, &JsonValue)>, Vec<(&String, &JsonValue)>) {
    map.iter()
        .partition(|(key, _)| AGGREGATE_OPS.contains(&key.as_str()))
}
