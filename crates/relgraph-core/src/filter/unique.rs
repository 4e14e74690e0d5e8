use crate::{
    error::IssueKind,
    model::{EntityModel, FieldModel, UniqueModel},
    validate::{ValidateContext, expect_object, field_value},
    value::Value,
};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;

///
/// UniqueSelector
///
/// Identifies at most one entity: a single unique field, or every member of
/// one compound key nested under its label.
///

#[derive(Clone, Debug, PartialEq)]
pub enum UniqueSelector {
    Field {
        field: &'static str,
        value: Value,
    },
    Compound {
        label: String,
        values: BTreeMap<&'static str, Value>,
    },
}

impl UniqueSelector {
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        let mut map = Map::new();

        match self {
            Self::Field { field, value } => {
                map.insert((*field).to_string(), value.to_json());
            }
            Self::Compound { label, values } => {
                let inner = values
                    .iter()
                    .map(|(name, value)| ((*name).to_string(), value.to_json()))
                    .collect();
                map.insert(label.clone(), JsonValue::Object(inner));
            }
        }

        JsonValue::Object(map)
    }
}

///
/// Candidate
///

enum Candidate<'m> {
    Field(&'m FieldModel),
    Compound(&'m UniqueModel),
}

/// Parse a unique selector over `model`.
pub(crate) fn unique_selector(
    ctx: &mut ValidateContext<'_>,
    model: &EntityModel,
    raw: &JsonValue,
) -> Option<UniqueSelector> {
    let map = expect_object(ctx, raw)?;
    let mark = ctx.mark();
    let mut candidates = Vec::new();

    for (key, raw) in map {
        if let Some(unique) = model.compound(key) {
            candidates.push((Candidate::Compound(unique), raw));
            continue;
        }

        match model.field(key) {
            Some(field) if field.unique => candidates.push((Candidate::Field(field), raw)),
            Some(field) => not_unique(ctx, model, field),
            None => ctx.unknown_key(key, &unique_choices(model)),
        }
    }

    if ctx.failed_since(mark) {
        return None;
    }

    match candidates.as_slice() {
        [] => {
            ctx.issue(
                IssueKind::AmbiguousUnionVariant,
                format!("expected exactly one of: {}", unique_choices(model)),
            );
            None
        }
        [(candidate, raw)] => {
            match candidate {
                Candidate::Field(field) => ctx.at(field.name, |ctx| field_selector(ctx, field, raw)),
                Candidate::Compound(unique) => {
                    ctx.at(unique.label.as_str(), |ctx| compound_selector(ctx, model, unique, raw))
                }
            }
        }
        _ => {
            let names: Vec<_> = map
                .keys()
                .filter(|key| model.compound(key).is_some() || model.field(key).is_some())
                .map(String::as_str)
                .collect();
            ctx.issue(
                IssueKind::AmbiguousUnionVariant,
                format!(
                    "selector names more than one unique key ({}); expected exactly one",
                    names.join(", ")
                ),
            );
            None
        }
    }
}

fn not_unique(ctx: &mut ValidateContext<'_>, model: &EntityModel, field: &FieldModel) {
    let message = match model.uniques.iter().find(|u| u.contains(field.name)) {
        Some(unique) => format!(
            "'{}' is only unique together with the other members of '{}'",
            field.name, unique.label
        ),
        None => format!("'{}' is not a unique field", field.name),
    };

    ctx.issue_at(field.name, IssueKind::AmbiguousUnionVariant, message);
}

fn unique_choices(model: &EntityModel) -> String {
    model
        .unique_fields()
        .map(|f| f.name.to_string())
        .chain(model.uniques.iter().map(|u| u.label.clone()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn field_selector(
    ctx: &mut ValidateContext<'_>,
    field: &FieldModel,
    raw: &JsonValue,
) -> Option<UniqueSelector> {
    key_value(ctx, field, raw).map(|value| UniqueSelector::Field {
        field: field.name,
        value,
    })
}

fn compound_selector(
    ctx: &mut ValidateContext<'_>,
    model: &EntityModel,
    unique: &UniqueModel,
    raw: &JsonValue,
) -> Option<UniqueSelector> {
    let map = expect_object(ctx, raw)?;
    let mark = ctx.mark();
    let mut values = BTreeMap::new();

    for key in map.keys() {
        if !unique.contains(key) {
            ctx.unknown_key(key, &format!("a member of '{}'", unique.label));
        }
    }

    for name in &unique.fields {
        let Some(field) = model.field(name) else {
            continue;
        };

        match map.get(*name) {
            Some(raw) => {
                if let Some(value) = ctx.at(*name, |ctx| key_value(ctx, field, raw)) {
                    values.insert(field.name, value);
                }
            }
            None => ctx.issue_at(
                *name,
                IssueKind::MissingRequiredField,
                format!("compound key '{}' is missing '{name}'", unique.label),
            ),
        }
    }

    (!ctx.failed_since(mark)).then(|| UniqueSelector::Compound {
        label: unique.label.clone(),
        values,
    })
}

// Keys never match null.
fn key_value(ctx: &mut ValidateContext<'_>, field: &FieldModel, raw: &JsonValue) -> Option<Value> {
    if raw.is_null() {
        ctx.issue(
            IssueKind::TypeMismatch,
            format!("unique key '{}' cannot be null", field.name),
        );
        return None;
    }

    field_value(ctx, field, raw)
}
