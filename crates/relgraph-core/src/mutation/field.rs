use crate::{
    error::IssueKind,
    model::FieldModel,
    mutation::ast::{FieldUpdate, FieldValue},
    validate::{ValidateContext, expect_string, expect_strings, field_value, json_value},
    value::{NullContext, Value},
};
use serde_json::Value as JsonValue;

const UPDATE_OPS: &[&str] = &["set", "increment", "decrement", "multiply", "divide", "push"];

/// Value written to a field on create, or by `set`.
pub(super) fn write_value(
    ctx: &mut ValidateContext<'_>,
    field: &FieldModel,
    raw: &JsonValue,
) -> Option<FieldValue> {
    if field.kind.is_json() {
        return json_value(ctx, field, raw, NullContext::Mutation).map(FieldValue::Json);
    }

    field_value(ctx, field, raw).map(FieldValue::Scalar)
}

/// Parse a field update: a bare value, or an object naming one operator.
///
/// JSON fields only take bare values, since any object is valid JSON data.
pub(super) fn field_update(
    ctx: &mut ValidateContext<'_>,
    field: &FieldModel,
    raw: &JsonValue,
) -> Option<FieldUpdate> {
    let map = match raw {
        JsonValue::Object(map) if !field.kind.is_json() => map,
        _ => return write_value(ctx, field, raw).map(FieldUpdate::Set),
    };

    let mut entries = map.iter();
    let (Some((key, raw)), None) = (entries.next(), entries.next()) else {
        ctx.issue(
            IssueKind::AmbiguousUnionVariant,
            format!(
                "an update names exactly one operator ({}), found {}",
                allowed_ops(field).join(", "),
                map.len()
            ),
        );
        return None;
    };

    let key = key.as_str();
    if !allowed_ops(field).contains(&key) {
        if UPDATE_OPS.contains(&key) {
            ctx.issue_at(
                key,
                IssueKind::InvalidOperator,
                format!("operator '{key}' is not supported on {} field '{}'", field.scalar(), field.name),
            );
        } else {
            ctx.unknown_key(key, &allowed_ops(field).join(", "));
        }
        return None;
    }

    ctx.at(key, |ctx| match key {
        "set" => write_value(ctx, field, raw).map(FieldUpdate::Set),
        "push" => push_operand(ctx, raw).map(FieldUpdate::Push),
        op => arithmetic(ctx, field, op, raw),
    })
}

fn allowed_ops(field: &FieldModel) -> Vec<&'static str> {
    let scalar = field.scalar();

    UPDATE_OPS
        .iter()
        .copied()
        .filter(|op| match *op {
            "set" => true,
            "push" => scalar.supports_list_ops(),
            _ => scalar.supports_arithmetic(),
        })
        .collect()
}

fn push_operand(ctx: &mut ValidateContext<'_>, raw: &JsonValue) -> Option<Vec<String>> {
    match raw {
        JsonValue::Array(_) => expect_strings(ctx, raw),
        _ => expect_string(ctx, raw).map(|s| vec![s]),
    }
}

fn arithmetic(
    ctx: &mut ValidateContext<'_>,
    field: &FieldModel,
    op: &str,
    raw: &JsonValue,
) -> Option<FieldUpdate> {
    // operands are never null, even on nullable fields
    let operand = FieldModel::new(field.name, field.kind);
    let value = field_value(ctx, &operand, raw)?;

    let zero = match value {
        Value::Int(n) => n == 0,
        Value::Float(f) => f == 0.0,
        _ => false,
    };
    if op == "divide" && zero {
        ctx.issue(IssueKind::InvalidValue, "cannot divide by zero");
        return None;
    }

    let update = match op {
        "increment" => FieldUpdate::Increment(value),
        "decrement" => FieldUpdate::Decrement(value),
        "multiply" => FieldUpdate::Multiply(value),
        _ => FieldUpdate::Divide(value),
    };

    Some(update)
}
