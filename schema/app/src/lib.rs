//! Application entity schema.
//!
//! Users chat in rooms; messages thread through replies; leads and
//! subscriptions hang off users. The graph is cyclic (User → Message → Room →
//! User, and Message → Message), so every entity is defined as a thunk and
//! relations only carry `EntityRef` handles.

pub mod entity;
pub mod enums;

use relgraph_core::{
    config::ValidationConfig,
    error::SchemaError,
    schema::{EntityRef, Schema},
    validate::Validator,
};
use std::sync::LazyLock;

///
/// CONSTANTS
///

pub const USER: &str = "User";
pub const MESSAGE: &str = "Message";
pub const ROOM: &str = "Room";
pub const ROOM_MEMBER: &str = "RoomMember";
pub const LEAD: &str = "Lead";
pub const SUBSCRIPTION: &str = "Subscription";

static SCHEMA: LazyLock<Schema> = LazyLock::new(|| match bootstrapped() {
    Ok(schema) => schema,
    Err(err) => panic!("application schema failed to bootstrap: {err}"),
});

/// Build the schema without resolving any entity.
pub fn build() -> Result<Schema, SchemaError> {
    Schema::builder()
        .define(USER, entity::user)
        .define(MESSAGE, entity::message)
        .define(ROOM, entity::room)
        .define(ROOM_MEMBER, entity::room_member)
        .define(LEAD, entity::lead)
        .define(SUBSCRIPTION, entity::subscription)
        .build()
}

/// Build, resolve and check every entity.
pub fn bootstrapped() -> Result<Schema, SchemaError> {
    let schema = build()?;
    schema.bootstrap()?;
    tracing::info!(entities = schema.len(), "application schema ready");

    Ok(schema)
}

/// Process-wide schema, bootstrapped on first use.
///
/// # Panics
///
/// Panics if the schema is inconsistent; the process cannot serve anything
/// without it.
#[must_use]
pub fn schema() -> &'static Schema {
    &SCHEMA
}

#[must_use]
pub fn validator() -> Validator<'static> {
    Validator::new(schema())
}

#[must_use]
pub fn validator_with(config: ValidationConfig) -> Validator<'static> {
    Validator::with_config(schema(), config)
}

/// Handle for an entity of the application schema.
pub fn entity(name: &str) -> Result<EntityRef, SchemaError> {
    schema().lookup(name)
}
