use crate::{
    error::IssueKind,
    model::{FieldKind, FieldModel},
    validate::ValidateContext,
    value::{NullContext, NullableJson, Value, coerce_literal, json_depth, json_label},
};
use serde_json::{Map, Value as JsonValue};

/// Expect a JSON object.
pub(crate) fn expect_object<'v>(
    ctx: &mut ValidateContext<'_>,
    raw: &'v JsonValue,
) -> Option<&'v Map<String, JsonValue>> {
    if let Some(map) = raw.as_object() {
        Some(map)
    } else {
        ctx.issue(
            IssueKind::TypeMismatch,
            format!("expected object, found {}", json_label(raw)),
        );
        None
    }
}

/// Expect a JSON array no longer than the configured maximum.
pub(crate) fn expect_array<'v>(
    ctx: &mut ValidateContext<'_>,
    raw: &'v JsonValue,
) -> Option<&'v [JsonValue]> {
    let Some(items) = raw.as_array() else {
        ctx.issue(
            IssueKind::TypeMismatch,
            format!("expected list, found {}", json_label(raw)),
        );
        return None;
    };

    ctx.check_list_len(items.len()).then_some(items.as_slice())
}

pub(crate) fn expect_bool(ctx: &mut ValidateContext<'_>, raw: &JsonValue) -> Option<bool> {
    if let Some(b) = raw.as_bool() {
        Some(b)
    } else {
        ctx.issue(
            IssueKind::TypeMismatch,
            format!("expected bool, found {}", json_label(raw)),
        );
        None
    }
}

pub(crate) fn expect_string(ctx: &mut ValidateContext<'_>, raw: &JsonValue) -> Option<String> {
    if let Some(s) = raw.as_str() {
        Some(s.to_string())
    } else {
        ctx.issue(
            IssueKind::TypeMismatch,
            format!("expected string, found {}", json_label(raw)),
        );
        None
    }
}

/// Expect a list of strings.
pub(crate) fn expect_strings(ctx: &mut ValidateContext<'_>, raw: &JsonValue) -> Option<Vec<String>> {
    let items = expect_array(ctx, raw)?;
    let mark = ctx.mark();

    let out: Vec<_> = items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| ctx.at(i, |ctx| expect_string(ctx, item)))
        .collect();

    (!ctx.failed_since(mark)).then_some(out)
}

/// Parse a slot that takes either one item or a list of items.
///
/// List items are reported under their index. Every item is parsed even after
/// a failure. Returns the items and whether the input was a list.
pub(crate) fn keyed_list<R>(
    ctx: &mut ValidateContext<'_>,
    raw: &JsonValue,
    mut item: impl FnMut(&mut ValidateContext<'_>, &JsonValue) -> Option<R>,
) -> Option<(Vec<R>, bool)> {
    let Some(items) = raw.as_array() else {
        return item(ctx, raw).map(|one| (vec![one], false));
    };
    if !ctx.check_list_len(items.len()) {
        return None;
    }

    let mark = ctx.mark();
    let parsed: Vec<_> = items
        .iter()
        .enumerate()
        .filter_map(|(i, raw)| ctx.at(i, |ctx| item(ctx, raw)))
        .collect();

    (!ctx.failed_since(mark)).then_some((parsed, true))
}

/// Check a raw value against a field and produce its typed value.
///
/// `null` is accepted for nullable fields; a required JSON field keeps a
/// structural `null` as JSON data.
pub(crate) fn field_value(
    ctx: &mut ValidateContext<'_>,
    field: &FieldModel,
    raw: &JsonValue,
) -> Option<Value> {
    if raw.is_null() {
        if field.nullable {
            return Some(Value::Null);
        }
        if field.kind.is_json() {
            return Some(Value::Json(JsonValue::Null));
        }

        ctx.issue(
            IssueKind::TypeMismatch,
            format!("'{}' is not nullable", field.name),
        );
        return None;
    }

    match (field.kind, raw) {
        (FieldKind::TextList, JsonValue::Array(items)) if !ctx.check_list_len(items.len()) => {
            return None;
        }
        (FieldKind::Json, _) if json_depth(raw, ctx.config.max_json_depth).is_none() => {
            let max = ctx.config.max_json_depth;
            ctx.issue(
                IssueKind::DepthLimitExceeded,
                format!("JSON value nests deeper than {max} levels"),
            );
            return None;
        }
        _ => {}
    }

    match coerce_literal(field.kind, raw) {
        Ok(value) => Some(value),
        Err(err) => {
            ctx.issue(err.kind(), err.to_string());
            None
        }
    }
}

/// Normalize a JSON field slot in a filter or mutation.
///
/// Null variants are only accepted on nullable fields.
pub(crate) fn json_value(
    ctx: &mut ValidateContext<'_>,
    field: &FieldModel,
    raw: &JsonValue,
    context: NullContext,
) -> Option<NullableJson> {
    match NullableJson::transform(Some(raw), context, ctx.config.max_json_depth) {
        Ok(NullableJson::DbNull | NullableJson::AnyNull) if !field.nullable => {
            ctx.issue(
                IssueKind::TypeMismatch,
                format!(
                    "'{}' is not nullable; use \"JsonNull\" for a JSON null",
                    field.name
                ),
            );
            None
        }
        Ok(value) => Some(value),
        Err(err) => {
            ctx.issue(err.kind(), err.to_string());
            None
        }
    }
}

/// Expect a JSON integer.
pub(crate) fn expect_int(ctx: &mut ValidateContext<'_>, raw: &JsonValue) -> Option<i64> {
    if let Some(n) = raw.as_i64() {
        Some(n)
    } else {
        ctx.issue(
            IssueKind::TypeMismatch,
            format!("expected integer, found {}", json_label(raw)),
        );
        None
    }
}

/// Report every key of `map` outside `allowed`.
pub(crate) fn check_keys(ctx: &mut ValidateContext<'_>, map: &Map<String, JsonValue>, allowed: &[&str]) {
    for key in map.keys() {
        if !allowed.contains(&key.as_str()) {
            ctx.unknown_key(key, &allowed.join(", "));
        }
    }
}

/// Fetch a key that must be present.
pub(crate) fn required_key<'v>(
    ctx: &mut ValidateContext<'_>,
    map: &'v Map<String, JsonValue>,
    key: &str,
) -> Option<&'v JsonValue> {
    let raw = map.get(key);
    if raw.is_none() {
        ctx.issue_at(
            key,
            IssueKind::MissingRequiredField,
            format!("missing required field '{key}'"),
        );
    }

    raw
}

/// Expect a non-negative integer, such as `take` or `skip`.
pub(crate) fn expect_count(ctx: &mut ValidateContext<'_>, raw: &JsonValue) -> Option<u64> {
    let n = expect_int(ctx, raw)?;

    if let Ok(count) = u64::try_from(n) {
        Some(count)
    } else {
        ctx.issue(
            IssueKind::InvalidValue,
            format!("expected a non-negative integer, found {n}"),
        );
        None
    }
}
