use crate::{
    error::IssueKind,
    model::{EntityModel, Member, RelationModel},
    query::args::{FindManyArgs, find_many},
    validate::{ValidateContext, check_keys, expect_bool, expect_object, required_key},
    value::json_label,
};
use derive_more::Display;
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;

///
/// SelectionMode
///
/// Select  → exactly the named fields and relations.
/// Include → every scalar field plus the named relations.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum SelectionMode {
    #[display("select")]
    Select,
    #[display("include")]
    Include,
}

///
/// Selection
///

#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    pub mode: SelectionMode,
    pub fields: Vec<&'static str>,
    pub relations: BTreeMap<&'static str, RelationSelection>,
    pub count: Option<Vec<&'static str>>,
}

impl Selection {
    #[must_use]
    pub fn relation(&self, name: &str) -> Option<&RelationSelection> {
        self.relations.get(name)
    }
}

///
/// RelationSelection
///
/// All  → `true`: the related entities with default fields.
/// Many → find-many arguments over a to-many relation.
/// One  → a nested select or include over a to-one relation.
///

#[derive(Clone, Debug, PartialEq)]
pub enum RelationSelection {
    All,
    Many(Box<FindManyArgs>),
    One(Box<Selection>),
}

/// Read `select` or `include` out of an argument object. Naming both is
/// ambiguous.
pub(crate) fn selection_arg(
    ctx: &mut ValidateContext<'_>,
    model: &EntityModel,
    map: &Map<String, JsonValue>,
) -> Option<Option<Selection>> {
    match (map.get("select"), map.get("include")) {
        (Some(_), Some(_)) => {
            ctx.issue(
                IssueKind::AmbiguousUnionVariant,
                "select and include cannot be combined",
            );
            None
        }
        (Some(raw), None) => ctx
            .at("select", |ctx| selection(ctx, model, raw, SelectionMode::Select))
            .map(Some),
        (None, Some(raw)) => ctx
            .at("include", |ctx| selection(ctx, model, raw, SelectionMode::Include))
            .map(Some),
        (None, None) => Some(None),
    }
}

fn selection(
    ctx: &mut ValidateContext<'_>,
    model: &EntityModel,
    raw: &JsonValue,
    mode: SelectionMode,
) -> Option<Selection> {
    let map = expect_object(ctx, raw)?;
    let mark = ctx.mark();
    let mut out = Selection {
        mode,
        fields: Vec::new(),
        relations: BTreeMap::new(),
        count: None,
    };

    for (key, raw) in map {
        if key == "_count" {
            out.count = ctx.at("_count", |ctx| count_selection(ctx, model, raw));
            continue;
        }

        match model.member(key) {
            Some(Member::Field(field)) => {
                if mode == SelectionMode::Include {
                    ctx.issue_at(
                        key.as_str(),
                        IssueKind::InvalidOperator,
                        format!("include takes relations only; '{key}' is a field"),
                    );
                    continue;
                }

                if ctx.at(key.as_str(), |ctx| expect_bool(ctx, raw)) == Some(true) {
                    out.fields.push(field.name);
                }
            }
            Some(Member::Relation(relation)) => {
                if let Some(selected) = ctx
                    .nested(key.as_str(), |ctx| relation_selection(ctx, relation, raw))
                    .flatten()
                {
                    out.relations.insert(relation.name, selected);
                }
            }
            None => ctx.unknown_key(key, &format!("_count or a member of {}", model.name)),
        }
    }

    (!ctx.failed_since(mark)).then_some(out)
}

// `false` selects nothing and yields `Some(None)`.
fn relation_selection(
    ctx: &mut ValidateContext<'_>,
    relation: &RelationModel,
    raw: &JsonValue,
) -> Option<Option<RelationSelection>> {
    let target = ctx.target(relation)?;

    match raw {
        JsonValue::Bool(true) => Some(Some(RelationSelection::All)),
        JsonValue::Bool(false) => Some(None),
        JsonValue::Object(map) if relation.is_many() => find_many(ctx, target, map)
            .map(|args| Some(RelationSelection::Many(Box::new(args)))),
        JsonValue::Object(map) => {
            check_keys(ctx, map, &["select", "include"]);

            match selection_arg(ctx, target, map)? {
                Some(selection) => Some(Some(RelationSelection::One(Box::new(selection)))),
                None => Some(Some(RelationSelection::All)),
            }
        }
        other => {
            ctx.issue(
                IssueKind::TypeMismatch,
                format!(
                    "expected bool or object for relation '{}', found {}",
                    relation.name,
                    json_label(other)
                ),
            );
            None
        }
    }
}

// `true` counts every to-many relation; `{ select: { posts: true } }` counts
// the named ones.
fn count_selection(
    ctx: &mut ValidateContext<'_>,
    model: &EntityModel,
    raw: &JsonValue,
) -> Option<Vec<&'static str>> {
    if let JsonValue::Bool(all) = raw {
        let relations = model
            .relations
            .iter()
            .filter(|r| *all && r.is_many())
            .map(|r| r.name)
            .collect();
        return Some(relations);
    }

    let map = expect_object(ctx, raw)?;
    check_keys(ctx, map, &["select"]);

    let raw = required_key(ctx, map, "select")?;
    ctx.at("select", |ctx| {
        let map = expect_object(ctx, raw)?;
        let mark = ctx.mark();
        let mut out = Vec::new();

        for (key, raw) in map {
            match model.relation(key) {
                Some(relation) if relation.is_many() => {
                    if ctx.at(key.as_str(), |ctx| expect_bool(ctx, raw)) == Some(true) {
                        out.push(relation.name);
                    }
                }
                Some(relation) => ctx.issue_at(
                    key.as_str(),
                    IssueKind::InvalidOperator,
                    format!("only to-many relations can be counted; '{}' is to-one", relation.name),
                ),
                None => ctx.unknown_key(key, &format!("a to-many relation of {}", model.name)),
            }
        }

        (!ctx.failed_since(mark)).then_some(out)
    })
}
