use crate::{
    error::IssueKind,
    filter::{
        UniqueSelector,
        parse::{FilterMode, filter},
        unique::unique_selector,
    },
    model::{EntityModel, RelationModel},
    mutation::{
        Action, WriteScope,
        ast::{
            ConnectOrCreate, CreateMany, CreatePayload, RelationWrite, ToManyWrite, ToOneWrite,
            UpdateManyWhere, UpdatePayload, UpdateWhere, UpsertWhere,
        },
        create::create_payload,
        update::update_payload,
    },
    validate::{
        ValidateContext, check_keys, expect_array, expect_bool, expect_object, keyed_list,
        required_key,
    },
};
use serde_json::{Map, Value as JsonValue};

const TO_ONE_CREATE: &[&str] = &["create", "connect", "connectOrCreate"];
const TO_ONE_UPDATE: &[&str] = &["update", "upsert"];
const TO_ONE_NULLABLE: &[&str] = &["disconnect", "delete"];

const TO_MANY_CREATE: &[&str] = &["create", "createMany", "connect", "connectOrCreate", "set"];
const TO_MANY_UPDATE: &[&str] = &[
    "update",
    "upsert",
    "delete",
    "deleteMany",
    "disconnect",
    "updateMany",
];

/// Parse the write attached to one relation key.
pub(super) fn relation_write(
    ctx: &mut ValidateContext<'_>,
    relation: &RelationModel,
    raw: &JsonValue,
    action: Action,
) -> Option<RelationWrite> {
    let target = ctx.target(relation)?;
    let scope = WriteScope::nested(relation.back_reference);

    if relation.is_many() {
        to_many(ctx, relation, target, raw, action, scope).map(|w| RelationWrite::Many(Box::new(w)))
    } else {
        to_one(ctx, relation, target, raw, action, scope).map(RelationWrite::One)
    }
}

// ----------------------------------------------------------------------
// To-one
// ----------------------------------------------------------------------

fn to_one(
    ctx: &mut ValidateContext<'_>,
    relation: &RelationModel,
    target: &EntityModel,
    raw: &JsonValue,
    action: Action,
    scope: WriteScope,
) -> Option<ToOneWrite> {
    if raw.is_null() {
        if relation.is_nullable() {
            return Some(ToOneWrite::Clear);
        }

        ctx.issue(
            IssueKind::NullOnRequiredRelation,
            format!("relation '{}' is required and cannot be set to null", relation.name),
        );
        return None;
    }

    let map = expect_object(ctx, raw)?;
    let allowed = to_one_ops(relation, action);
    let mark = ctx.mark();
    let mut ops = Vec::new();

    for (key, raw) in map {
        let key = key.as_str();

        if allowed.contains(&key) {
            ops.push((key, raw));
        } else if let Some(message) = misplaced_to_one(relation, key, action) {
            ctx.issue_at(key, IssueKind::InvalidOperator, message);
        } else {
            ctx.unknown_key(key, &allowed.join(", "));
        }
    }

    let (key, raw) = match ops.as_slice() {
        [] => {
            if !ctx.failed_since(mark) {
                missing_to_one(ctx, relation, action, &allowed);
            }
            return None;
        }
        [one] => *one,
        _ => {
            let names: Vec<_> = ops.iter().map(|(key, _)| *key).collect();
            ctx.issue(
                IssueKind::AmbiguousRelationOperation,
                format!(
                    "relation '{}' takes exactly one operation, found {}",
                    relation.name,
                    names.join(", ")
                ),
            );
            return None;
        }
    };

    let write = ctx.at(key, |ctx| to_one_op(ctx, target, key, raw, scope))?;

    (!ctx.failed_since(mark)).then_some(write)
}

fn to_one_ops(relation: &RelationModel, action: Action) -> Vec<&'static str> {
    let mut ops = TO_ONE_CREATE.to_vec();

    if action == Action::Update {
        ops.extend_from_slice(TO_ONE_UPDATE);
        if relation.is_nullable() {
            ops.extend_from_slice(TO_ONE_NULLABLE);
        }
    }

    ops
}

fn misplaced_to_one(relation: &RelationModel, key: &str, action: Action) -> Option<String> {
    if TO_ONE_UPDATE.contains(&key) || TO_ONE_NULLABLE.contains(&key) {
        if action == Action::Create {
            return Some(format!("'{key}' is only valid when updating"));
        }

        return Some(format!(
            "'{key}' is only valid on a nullable relation; '{}' is required",
            relation.name
        ));
    }

    None
}

fn missing_to_one(
    ctx: &mut ValidateContext<'_>,
    relation: &RelationModel,
    action: Action,
    allowed: &[&str],
) {
    let (kind, message) = match action {
        Action::Create if relation.is_required() => (
            IssueKind::MissingRequiredRelation,
            format!(
                "relation '{}' is required: provide one of {}",
                relation.name,
                allowed.join(", ")
            ),
        ),
        _ => (
            IssueKind::AmbiguousUnionVariant,
            format!(
                "relation '{}' needs exactly one of {}",
                relation.name,
                allowed.join(", ")
            ),
        ),
    };

    ctx.issue(kind, message);
}

fn to_one_op(
    ctx: &mut ValidateContext<'_>,
    target: &EntityModel,
    key: &str,
    raw: &JsonValue,
    scope: WriteScope,
) -> Option<ToOneWrite> {
    match key {
        "create" => create_payload(ctx, target, raw, scope).map(|p| ToOneWrite::Create(Box::new(p))),
        "connect" => unique_selector(ctx, target, raw).map(ToOneWrite::Connect),
        "connectOrCreate" => {
            connect_or_create(ctx, target, raw, scope).map(ToOneWrite::ConnectOrCreate)
        }
        "update" => update_payload(ctx, target, raw, scope).map(|p| ToOneWrite::Update(Box::new(p))),
        "upsert" => {
            let map = expect_object(ctx, raw)?;
            check_keys(ctx, map, &["create", "update"]);

            let create = create_arg(ctx, map, target, scope);
            let update = update_arg(ctx, map, target, scope);

            Some(ToOneWrite::Upsert {
                create: Box::new(create?),
                update: Box::new(update?),
            })
        }
        "disconnect" => flag(ctx, key, raw).then_some(ToOneWrite::Disconnect),
        _ => flag(ctx, key, raw).then_some(ToOneWrite::Delete),
    }
}

// `disconnect` and `delete` only take `true`.
fn flag(ctx: &mut ValidateContext<'_>, key: &str, raw: &JsonValue) -> bool {
    match expect_bool(ctx, raw) {
        Some(true) => true,
        Some(false) => {
            ctx.issue(
                IssueKind::InvalidValue,
                format!("'{key}' only accepts true; omit it instead"),
            );
            false
        }
        None => false,
    }
}

// ----------------------------------------------------------------------
// To-many
// ----------------------------------------------------------------------

fn to_many(
    ctx: &mut ValidateContext<'_>,
    relation: &RelationModel,
    target: &EntityModel,
    raw: &JsonValue,
    action: Action,
    scope: WriteScope,
) -> Option<ToManyWrite> {
    let map = expect_object(ctx, raw)?;
    let mark = ctx.mark();
    let mut write = ToManyWrite::default();

    let mut allowed = TO_MANY_CREATE.to_vec();
    if action == Action::Update {
        allowed.extend_from_slice(TO_MANY_UPDATE);
    }

    for (key, raw) in map {
        let key = key.as_str();

        if !allowed.contains(&key) {
            if TO_MANY_UPDATE.contains(&key) {
                ctx.issue_at(
                    key,
                    IssueKind::InvalidOperator,
                    format!("'{key}' is only valid when updating"),
                );
            } else {
                ctx.unknown_key(key, &allowed.join(", "));
            }
            continue;
        }

        ctx.at(key, |ctx| {
            to_many_op(ctx, target, key, raw, scope, &mut write);
        });
    }

    if map.is_empty() {
        ctx.issue(
            IssueKind::AmbiguousUnionVariant,
            format!(
                "relation '{}' needs at least one of {}",
                relation.name,
                allowed.join(", ")
            ),
        );
    }

    (!ctx.failed_since(mark)).then_some(write)
}

fn to_many_op(
    ctx: &mut ValidateContext<'_>,
    target: &EntityModel,
    key: &str,
    raw: &JsonValue,
    scope: WriteScope,
    write: &mut ToManyWrite,
) {
    let selectors = |ctx: &mut ValidateContext<'_>| {
        keyed_list(ctx, raw, |ctx, raw| unique_selector(ctx, target, raw)).map(|(items, _)| items)
    };

    match key {
        "create" => {
            if let Some((items, _)) =
                keyed_list(ctx, raw, |ctx, raw| create_payload(ctx, target, raw, scope))
            {
                write.create = items;
            }
        }
        "createMany" => write.create_many = create_many(ctx, target, raw, scope.scalars_only()),
        "connect" => write.connect = selectors(ctx).unwrap_or_default(),
        "connectOrCreate" => {
            if let Some((items, _)) =
                keyed_list(ctx, raw, |ctx, raw| connect_or_create(ctx, target, raw, scope))
            {
                write.connect_or_create = items;
            }
        }
        "set" => write.set = selectors(ctx),
        "update" => {
            if let Some((items, _)) = keyed_list(ctx, raw, |ctx, raw| {
                let map = expect_object(ctx, raw)?;
                check_keys(ctx, map, &["where", "data"]);

                let where_ = where_arg(ctx, map, target);
                let data = data_arg(ctx, map, target, scope);

                Some(UpdateWhere {
                    where_: where_?,
                    data: data?,
                })
            }) {
                write.update = items;
            }
        }
        "upsert" => {
            if let Some((items, _)) = keyed_list(ctx, raw, |ctx, raw| {
                let map = expect_object(ctx, raw)?;
                check_keys(ctx, map, &["where", "create", "update"]);

                let where_ = where_arg(ctx, map, target);
                let create = create_arg(ctx, map, target, scope);
                let update = update_arg(ctx, map, target, scope);

                Some(UpsertWhere {
                    where_: where_?,
                    create: create?,
                    update: update?,
                })
            }) {
                write.upsert = items;
            }
        }
        "delete" => write.delete = selectors(ctx).unwrap_or_default(),
        "deleteMany" => {
            if let Some((items, _)) =
                keyed_list(ctx, raw, |ctx, raw| filter(ctx, target, raw, FilterMode::Where))
            {
                write.delete_many = items;
            }
        }
        "disconnect" => write.disconnect = selectors(ctx).unwrap_or_default(),
        _ => {
            if let Some((items, _)) = keyed_list(ctx, raw, |ctx, raw| {
                let map = expect_object(ctx, raw)?;
                check_keys(ctx, map, &["where", "data"]);

                let where_ = required_key(ctx, map, "where").and_then(|raw| {
                    ctx.nested("where", |ctx| filter(ctx, target, raw, FilterMode::Where))
                });
                let data = data_arg(ctx, map, target, scope.scalars_only());

                Some(UpdateManyWhere {
                    where_: where_?,
                    data: data?,
                })
            }) {
                write.update_many = items;
            }
        }
    }
}

// ----------------------------------------------------------------------
// Shared arguments
// ----------------------------------------------------------------------

/// Parse `{ data, skipDuplicates? }` rows under `scope`.
pub(super) fn create_many(
    ctx: &mut ValidateContext<'_>,
    target: &EntityModel,
    raw: &JsonValue,
    scope: WriteScope,
) -> Option<CreateMany> {
    let map = expect_object(ctx, raw)?;
    check_keys(ctx, map, &["data", "skipDuplicates"]);

    let skip_duplicates = match map.get("skipDuplicates") {
        Some(raw) => ctx.at("skipDuplicates", |ctx| expect_bool(ctx, raw))?,
        None => false,
    };

    let raw = required_key(ctx, map, "data")?;
    let data = ctx.at("data", |ctx| {
        let items = expect_array(ctx, raw)?;
        let mark = ctx.mark();
        let rows: Vec<_> = items
            .iter()
            .enumerate()
            .filter_map(|(i, raw)| ctx.at(i, |ctx| create_payload(ctx, target, raw, scope)))
            .collect();

        (!ctx.failed_since(mark)).then_some(rows)
    })?;

    Some(CreateMany {
        data,
        skip_duplicates,
    })
}

fn connect_or_create(
    ctx: &mut ValidateContext<'_>,
    target: &EntityModel,
    raw: &JsonValue,
    scope: WriteScope,
) -> Option<ConnectOrCreate> {
    let map = expect_object(ctx, raw)?;
    check_keys(ctx, map, &["where", "create"]);

    let where_ = where_arg(ctx, map, target);
    let create = create_arg(ctx, map, target, scope);

    Some(ConnectOrCreate {
        where_: where_?,
        create: Box::new(create?),
    })
}

fn where_arg(
    ctx: &mut ValidateContext<'_>,
    map: &Map<String, JsonValue>,
    target: &EntityModel,
) -> Option<UniqueSelector> {
    let raw = required_key(ctx, map, "where")?;
    ctx.at("where", |ctx| unique_selector(ctx, target, raw))
}

fn create_arg(
    ctx: &mut ValidateContext<'_>,
    map: &Map<String, JsonValue>,
    target: &EntityModel,
    scope: WriteScope,
) -> Option<CreatePayload> {
    let raw = required_key(ctx, map, "create")?;
    ctx.nested("create", |ctx| create_payload(ctx, target, raw, scope))
}

fn update_arg(
    ctx: &mut ValidateContext<'_>,
    map: &Map<String, JsonValue>,
    target: &EntityModel,
    scope: WriteScope,
) -> Option<UpdatePayload> {
    let raw = required_key(ctx, map, "update")?;
    ctx.nested("update", |ctx| update_payload(ctx, target, raw, scope))
}

fn data_arg(
    ctx: &mut ValidateContext<'_>,
    map: &Map<String, JsonValue>,
    target: &EntityModel,
    scope: WriteScope,
) -> Option<UpdatePayload> {
    let raw = required_key(ctx, map, "data")?;
    ctx.nested("data", |ctx| update_payload(ctx, target, raw, scope))
}
