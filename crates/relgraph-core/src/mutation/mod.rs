//! Mutation payloads: create, update, upsert and their bulk forms, with
//! nested writes through relations.
//!
//! A nested payload is parsed against the relation's target with the
//! back-reference relation (and its foreign key fields) left out, since the
//! parent supplies that side.

pub(crate) mod ast;
mod create;
mod field;
mod relation;
mod update;

#[cfg(test)]
mod tests;

use crate::{
    error::{IssueKind, ValidationError},
    filter::{
        parse::{FilterMode, filter},
        unique::unique_selector,
    },
    model::{EntityModel, Member, RelationModel},
    obs::Operation,
    schema::EntityRef,
    validate::{ValidateContext, Validator, check_keys, expect_object, required_key},
};
use serde_json::{Map, Value as JsonValue};

// re-exports
pub use ast::{
    ConnectOrCreate, CreateMany, CreateManyPayload, CreatePayload, FieldUpdate, FieldValue,
    RelationWrite, ToManyWrite, ToOneWrite, UpdateManyArgs, UpdateManyWhere, UpdatePayload,
    UpdateWhere, UpsertArgs, UpsertWhere, WriteVariant,
};
pub(crate) use create::create_payload;
pub(crate) use update::update_payload;

///
/// Action
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Action {
    Create,
    Update,
}

///
/// WriteScope
///
/// Members a payload may not name: the back-reference of the relation it is
/// nested under, and every relation in scalar-only bulk rows.
///

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct WriteScope {
    without: Option<&'static str>,
    scalars: bool,
}

impl WriteScope {
    pub(crate) const TOP: Self = Self {
        without: None,
        scalars: false,
    };

    pub(crate) const fn nested(back_reference: &'static str) -> Self {
        Self {
            without: Some(back_reference),
            scalars: false,
        }
    }

    pub(crate) const fn scalars_only(self) -> Self {
        Self {
            without: self.without,
            scalars: true,
        }
    }

    pub(crate) fn omits(self, relation: &str) -> bool {
        self.without.is_some_and(|name| name == relation)
    }

    /// Foreign key fields of the omitted back-reference.
    pub(crate) fn omitted_fields(self, model: &EntityModel) -> &'static [&'static str] {
        self.without
            .and_then(|name| model.relation(name))
            .map(RelationModel::fk_fields)
            .unwrap_or_default()
    }
}

/// Decide between the checked and unchecked variant.
///
/// Naming a foreign key scalar selects the unchecked variant, which rules out
/// every owning relation object in the same payload.
pub(crate) fn write_variant(
    ctx: &mut ValidateContext<'_>,
    model: &EntityModel,
    map: &Map<String, JsonValue>,
    scope: WriteScope,
) -> WriteVariant {
    if scope.scalars {
        return WriteVariant::Unchecked;
    }

    let omitted = scope.omitted_fields(model);
    let fk: Vec<_> = map
        .keys()
        .map(String::as_str)
        .filter(|key| model.is_fk_field(key) && !omitted.contains(key))
        .collect();

    if fk.is_empty() {
        return WriteVariant::Checked;
    }

    for relation in &model.relations {
        if relation.owns_foreign_key()
            && !scope.omits(relation.name)
            && map.contains_key(relation.name)
        {
            ctx.issue_at(
                relation.name,
                IssueKind::AmbiguousUnionVariant,
                format!(
                    "relation '{}' cannot be written together with foreign key fields ({})",
                    relation.name,
                    fk.join(", ")
                ),
            );
        }
    }

    WriteVariant::Unchecked
}

/// Look up a writable member, reporting keys the payload may not name.
pub(crate) fn write_member<'m>(
    ctx: &mut ValidateContext<'_>,
    model: &'m EntityModel,
    key: &str,
    scope: WriteScope,
    variant: WriteVariant,
) -> Option<Member<'m>> {
    let omitted = scope.omits(key) || scope.omitted_fields(model).contains(&key);

    match model.member(key).filter(|_| !omitted) {
        Some(Member::Relation(relation)) if scope.scalars => {
            ctx.issue_at(
                key,
                IssueKind::InvalidOperator,
                format!("relation '{}' cannot be written in a bulk payload", relation.name),
            );
            None
        }
        // already reported by write_variant
        Some(Member::Relation(relation))
            if variant == WriteVariant::Unchecked && relation.owns_foreign_key() =>
        {
            None
        }
        Some(member) => Some(member),
        None => {
            ctx.unknown_key(key, &format!("a writable member of {}", model.name));
            None
        }
    }
}

impl Validator<'_> {
    pub fn parse_create_payload(
        &self,
        entity: EntityRef,
        raw: &JsonValue,
    ) -> Result<CreatePayload, ValidationError> {
        self.run(Operation::Create, entity, |ctx, model| {
            create_payload(ctx, model, raw, WriteScope::TOP)
        })
    }

    /// Parse `{ data: [...], skipDuplicates? }`. Rows carry scalars only.
    pub fn parse_create_many(
        &self,
        entity: EntityRef,
        raw: &JsonValue,
    ) -> Result<CreateManyPayload, ValidationError> {
        self.run(Operation::CreateMany, entity, |ctx, model| {
            let many = relation::create_many(ctx, model, raw, WriteScope::TOP.scalars_only())?;

            Some(CreateManyPayload {
                entity,
                data: many.data,
                skip_duplicates: many.skip_duplicates,
            })
        })
    }

    pub fn parse_update_payload(
        &self,
        entity: EntityRef,
        raw: &JsonValue,
    ) -> Result<UpdatePayload, ValidationError> {
        self.run(Operation::Update, entity, |ctx, model| {
            update_payload(ctx, model, raw, WriteScope::TOP)
        })
    }

    /// Parse `{ where?, data }`. `data` carries scalar updates only.
    pub fn parse_update_many(
        &self,
        entity: EntityRef,
        raw: &JsonValue,
    ) -> Result<UpdateManyArgs, ValidationError> {
        self.run(Operation::UpdateMany, entity, |ctx, model| {
            let map = expect_object(ctx, raw)?;
            let mark = ctx.mark();
            check_keys(ctx, map, &["where", "data"]);

            let where_ = map
                .get("where")
                .and_then(|raw| ctx.nested("where", |ctx| filter(ctx, model, raw, FilterMode::Where)));
            let data = required_key(ctx, map, "data").and_then(|raw| {
                ctx.nested("data", |ctx| {
                    update_payload(ctx, model, raw, WriteScope::TOP.scalars_only())
                })
            });

            if ctx.failed_since(mark) {
                return None;
            }

            Some(UpdateManyArgs {
                entity,
                where_,
                data: data?,
            })
        })
    }

    /// Parse `{ where, create, update }`.
    pub fn parse_upsert(&self, entity: EntityRef, raw: &JsonValue) -> Result<UpsertArgs, ValidationError> {
        self.run(Operation::Upsert, entity, |ctx, model| {
            let map = expect_object(ctx, raw)?;
            check_keys(ctx, map, &["where", "create", "update"]);

            let where_ = required_key(ctx, map, "where")
                .and_then(|raw| ctx.at("where", |ctx| unique_selector(ctx, model, raw)));
            let create = required_key(ctx, map, "create").and_then(|raw| {
                ctx.nested("create", |ctx| create_payload(ctx, model, raw, WriteScope::TOP))
            });
            let update = required_key(ctx, map, "update").and_then(|raw| {
                ctx.nested("update", |ctx| update_payload(ctx, model, raw, WriteScope::TOP))
            });

            Some(UpsertArgs {
                entity,
                where_: where_?,
                create: create?,
                update: update?,
            })
        })
    }
}
