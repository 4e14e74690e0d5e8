use crate::{
    error::IssueKind,
    filter::{ast::JsonFilter, scalar::reject_operator},
    model::FieldModel,
    validate::{ValidateContext, expect_object, expect_string, expect_strings, json_value},
    value::{NullContext, json_depth},
};
use serde_json::Value as JsonValue;

/// Parse a JSON field condition. JSON fields take an operator object only.
pub(super) fn json_filter(
    ctx: &mut ValidateContext<'_>,
    field: &FieldModel,
    raw: &JsonValue,
) -> Option<JsonFilter> {
    let map = expect_object(ctx, raw)?;
    let mark = ctx.mark();
    let mut filter = JsonFilter::default();

    for (key, raw) in map {
        let key = key.as_str();
        match key {
            "equals" => {
                filter.equals = ctx.at(key, |ctx| json_value(ctx, field, raw, NullContext::Filter));
            }
            "not" => {
                filter.not = ctx.at(key, |ctx| json_value(ctx, field, raw, NullContext::Filter));
            }
            "path" => filter.path = ctx.at(key, |ctx| expect_strings(ctx, raw)),
            "string_contains" => filter.string_contains = ctx.at(key, |ctx| expect_string(ctx, raw)),
            "string_starts_with" => {
                filter.string_starts_with = ctx.at(key, |ctx| expect_string(ctx, raw));
            }
            "string_ends_with" => {
                filter.string_ends_with = ctx.at(key, |ctx| expect_string(ctx, raw));
            }
            "array_contains" => filter.array_contains = ctx.at(key, |ctx| json_operand(ctx, raw)),
            "array_starts_with" => {
                filter.array_starts_with = ctx.at(key, |ctx| json_operand(ctx, raw));
            }
            "array_ends_with" => {
                filter.array_ends_with = ctx.at(key, |ctx| json_operand(ctx, raw));
            }
            _ => reject_operator(ctx, field, key),
        }
    }

    (!ctx.failed_since(mark)).then_some(filter)
}

fn json_operand(ctx: &mut ValidateContext<'_>, raw: &JsonValue) -> Option<JsonValue> {
    let max = ctx.config.max_json_depth;
    if json_depth(raw, max).is_none() {
        ctx.issue(
            IssueKind::DepthLimitExceeded,
            format!("JSON value nests deeper than {max} levels"),
        );
        return None;
    }

    Some(raw.clone())
}
