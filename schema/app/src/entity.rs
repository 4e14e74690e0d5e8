use crate::{
    LEAD, MESSAGE, ROOM, ROOM_MEMBER, SUBSCRIPTION, USER,
    enums::{LEAD_STATUS, PLAN, ROOM_ROLE, SUBSCRIPTION_STATUS},
};
use relgraph_core::{
    error::SchemaError,
    model::{
        Cardinality, EntityModel, FieldKind, FieldModel, Generator, RelationModel, UniqueModel,
    },
    schema::Schema,
};
use serde_json::json;

fn id() -> FieldModel {
    FieldModel::new("id", FieldKind::Text).id().generated(Generator::Cuid)
}

fn created_at() -> FieldModel {
    FieldModel::new("createdAt", FieldKind::Timestamp).generated(Generator::Now)
}

fn updated_at() -> FieldModel {
    FieldModel::new("updatedAt", FieldKind::Timestamp).generated(Generator::UpdatedAt)
}

///
/// User
///

pub fn user(s: &Schema) -> Result<EntityModel, SchemaError> {
    Ok(EntityModel::new(USER)
        .with_field(id())
        .with_field(FieldModel::new("email", FieldKind::Text).unique())
        .with_field(FieldModel::new("name", FieldKind::Text).nullable())
        .with_field(FieldModel::new("avatarUrl", FieldKind::Text).nullable())
        .with_field(FieldModel::new("preferences", FieldKind::Json).nullable())
        .with_field(created_at())
        .with_field(updated_at())
        .with_relation(RelationModel::new("messages", s.lookup(MESSAGE)?, Cardinality::Many, "author"))
        .with_relation(RelationModel::new("ownedRooms", s.lookup(ROOM)?, Cardinality::Many, "owner"))
        .with_relation(RelationModel::new(
            "memberships",
            s.lookup(ROOM_MEMBER)?,
            Cardinality::Many,
            "user",
        ))
        .with_relation(RelationModel::new("leads", s.lookup(LEAD)?, Cardinality::Many, "owner"))
        .with_relation(RelationModel::new(
            "subscription",
            s.lookup(SUBSCRIPTION)?,
            Cardinality::Opt,
            "user",
        )))
}

///
/// Message
///
/// Messages may live outside a room (direct notes) and may reply to another
/// message.
///

pub fn message(s: &Schema) -> Result<EntityModel, SchemaError> {
    Ok(EntityModel::new(MESSAGE)
        .with_field(id())
        .with_field(FieldModel::new("text", FieldKind::Text))
        .with_field(FieldModel::new("attachments", FieldKind::TextList).default_value(json!([])))
        .with_field(FieldModel::new("metadata", FieldKind::Json).nullable())
        .with_field(FieldModel::new("authorId", FieldKind::Text))
        .with_field(FieldModel::new("roomId", FieldKind::Text).nullable())
        .with_field(FieldModel::new("replyToId", FieldKind::Text).nullable())
        .with_field(FieldModel::new("editedAt", FieldKind::Timestamp).nullable())
        .with_field(created_at())
        .with_relation(
            RelationModel::new("author", s.lookup(USER)?, Cardinality::One, "messages")
                .foreign_key(&["authorId"], &["id"]),
        )
        .with_relation(
            RelationModel::new("room", s.lookup(ROOM)?, Cardinality::Opt, "messages")
                .foreign_key(&["roomId"], &["id"]),
        )
        .with_relation(
            RelationModel::new("replyTo", s.lookup(MESSAGE)?, Cardinality::Opt, "replies")
                .foreign_key(&["replyToId"], &["id"]),
        )
        .with_relation(RelationModel::new("replies", s.lookup(MESSAGE)?, Cardinality::Many, "replyTo")))
}

///
/// Room
///

pub fn room(s: &Schema) -> Result<EntityModel, SchemaError> {
    Ok(EntityModel::new(ROOM)
        .with_field(id())
        .with_field(FieldModel::new("name", FieldKind::Text))
        .with_field(FieldModel::new("slug", FieldKind::Text).unique())
        .with_field(FieldModel::new("isPrivate", FieldKind::Bool).default_value(json!(false)))
        .with_field(FieldModel::new("settings", FieldKind::Json).default_value(json!({})))
        .with_field(FieldModel::new("ownerId", FieldKind::Text))
        .with_field(created_at())
        .with_relation(
            RelationModel::new("owner", s.lookup(USER)?, Cardinality::One, "ownedRooms")
                .foreign_key(&["ownerId"], &["id"]),
        )
        .with_relation(RelationModel::new("messages", s.lookup(MESSAGE)?, Cardinality::Many, "room"))
        .with_relation(RelationModel::new(
            "members",
            s.lookup(ROOM_MEMBER)?,
            Cardinality::Many,
            "room",
        )))
}

///
/// RoomMember
///
/// Join entity keyed only by (roomId, userId).
///

pub fn room_member(s: &Schema) -> Result<EntityModel, SchemaError> {
    Ok(EntityModel::new(ROOM_MEMBER)
        .with_field(FieldModel::new("roomId", FieldKind::Text))
        .with_field(FieldModel::new("userId", FieldKind::Text))
        .with_field(FieldModel::new("role", FieldKind::Enum(&ROOM_ROLE)).default_value(json!("MEMBER")))
        .with_field(FieldModel::new("mutedUntil", FieldKind::Timestamp).nullable())
        .with_field(FieldModel::new("joinedAt", FieldKind::Timestamp).generated(Generator::Now))
        .with_relation(
            RelationModel::new("room", s.lookup(ROOM)?, Cardinality::One, "members")
                .foreign_key(&["roomId"], &["id"]),
        )
        .with_relation(
            RelationModel::new("user", s.lookup(USER)?, Cardinality::One, "memberships")
                .foreign_key(&["userId"], &["id"]),
        )
        .with_unique(UniqueModel::new(&["roomId", "userId"])))
}

///
/// Lead
///

pub fn lead(s: &Schema) -> Result<EntityModel, SchemaError> {
    Ok(EntityModel::new(LEAD)
        .with_field(id())
        .with_field(FieldModel::new("email", FieldKind::Text).unique())
        .with_field(FieldModel::new("name", FieldKind::Text).nullable())
        .with_field(FieldModel::new("company", FieldKind::Text).nullable())
        .with_field(FieldModel::new("status", FieldKind::Enum(&LEAD_STATUS)).default_value(json!("COLD")))
        .with_field(FieldModel::new("score", FieldKind::Int).default_value(json!(0)))
        .with_field(FieldModel::new("technologies", FieldKind::TextList).default_value(json!([])))
        .with_field(FieldModel::new("enrichment", FieldKind::Json).nullable())
        .with_field(FieldModel::new("ownerId", FieldKind::Text).nullable())
        .with_field(created_at())
        .with_relation(
            RelationModel::new("owner", s.lookup(USER)?, Cardinality::Opt, "leads")
                .foreign_key(&["ownerId"], &["id"]),
        ))
}

///
/// Subscription
///

pub fn subscription(s: &Schema) -> Result<EntityModel, SchemaError> {
    Ok(EntityModel::new(SUBSCRIPTION)
        .with_field(id())
        .with_field(FieldModel::new("userId", FieldKind::Text).unique())
        .with_field(FieldModel::new("plan", FieldKind::Enum(&PLAN)).default_value(json!("FREE")))
        .with_field(
            FieldModel::new("status", FieldKind::Enum(&SUBSCRIPTION_STATUS))
                .default_value(json!("TRIALING")),
        )
        .with_field(FieldModel::new("seats", FieldKind::Int).default_value(json!(1)))
        .with_field(FieldModel::new("currentPeriodEnd", FieldKind::Timestamp).nullable())
        .with_field(FieldModel::new("cancelAtPeriodEnd", FieldKind::Bool).default_value(json!(false)))
        .with_field(created_at())
        .with_field(updated_at())
        .with_relation(
            RelationModel::new("user", s.lookup(USER)?, Cardinality::One, "subscription")
                .foreign_key(&["userId"], &["id"]),
        ))
}
