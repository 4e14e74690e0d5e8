use crate::{
    model::{
        Cardinality, EntityModel, EnumModel, FieldKind, FieldModel, Generator, RelationModel,
        UniqueModel,
    },
    schema::{EntityRef, Schema},
    validate::Validator,
};
use serde_json::json;
use std::sync::LazyLock;

///
/// Blog schema
///
/// User ─┬─< Post ─< Comment >─┐
///       ├── Profile           │
///       ├─< Membership        │
///       └─────────────────────┘
///
/// Post carries a compound key (authorId, title); Membership has only a
/// compound key.
///

pub(crate) static ROLE: EnumModel = EnumModel::new("Role", &["ADMIN", "MEMBER"]);

static BLOG: LazyLock<Schema> = LazyLock::new(|| {
    let schema = blog_schema();
    schema.bootstrap().expect("blog schema should bootstrap");
    schema
});

/// Shared, bootstrapped blog schema.
pub(crate) fn blog() -> &'static Schema {
    &BLOG
}

pub(crate) fn validator() -> Validator<'static> {
    Validator::new(blog())
}

pub(crate) fn entity(name: &str) -> EntityRef {
    blog().lookup(name).expect("fixture entity should exist")
}

/// A fresh, unresolved copy of the blog schema.
pub(crate) fn blog_schema() -> Schema {
    Schema::builder()
        .define("User", |s| {
            Ok(EntityModel::new("User")
                .with_field(FieldModel::new("id", FieldKind::Int).id().generated(Generator::Autoincrement))
                .with_field(FieldModel::new("email", FieldKind::Text).unique())
                .with_field(FieldModel::new("name", FieldKind::Text).nullable())
                .with_field(FieldModel::new("role", FieldKind::Enum(&ROLE)).default_value(json!("MEMBER")))
                .with_field(FieldModel::new("tags", FieldKind::TextList).default_value(json!([])))
                .with_field(FieldModel::new("settings", FieldKind::Json).nullable())
                .with_field(FieldModel::new("createdAt", FieldKind::Timestamp).generated(Generator::Now))
                .with_relation(RelationModel::new("posts", s.lookup("Post")?, Cardinality::Many, "author"))
                .with_relation(RelationModel::new("profile", s.lookup("Profile")?, Cardinality::Opt, "user"))
                .with_relation(RelationModel::new("comments", s.lookup("Comment")?, Cardinality::Many, "author"))
                .with_relation(RelationModel::new(
                    "memberships",
                    s.lookup("Membership")?,
                    Cardinality::Many,
                    "user",
                )))
        })
        .define("Post", |s| {
            Ok(EntityModel::new("Post")
                .with_field(FieldModel::new("id", FieldKind::Int).id().generated(Generator::Autoincrement))
                .with_field(FieldModel::new("title", FieldKind::Text))
                .with_field(FieldModel::new("body", FieldKind::Text).nullable())
                .with_field(FieldModel::new("published", FieldKind::Bool).default_value(json!(false)))
                .with_field(FieldModel::new("views", FieldKind::Int).default_value(json!(0)))
                .with_field(FieldModel::new("rating", FieldKind::Float).nullable())
                .with_field(FieldModel::new("meta", FieldKind::Json).nullable())
                .with_field(FieldModel::new("authorId", FieldKind::Int))
                .with_field(FieldModel::new("createdAt", FieldKind::Timestamp).generated(Generator::Now))
                .with_relation(
                    RelationModel::new("author", s.lookup("User")?, Cardinality::One, "posts")
                        .foreign_key(&["authorId"], &["id"]),
                )
                .with_relation(RelationModel::new("comments", s.lookup("Comment")?, Cardinality::Many, "post"))
                .with_unique(UniqueModel::new(&["authorId", "title"])))
        })
        .define("Profile", |s| {
            Ok(EntityModel::new("Profile")
                .with_field(FieldModel::new("id", FieldKind::Int).id().generated(Generator::Autoincrement))
                .with_field(FieldModel::new("bio", FieldKind::Text).nullable())
                .with_field(FieldModel::new("userId", FieldKind::Int).unique())
                .with_relation(
                    RelationModel::new("user", s.lookup("User")?, Cardinality::One, "profile")
                        .foreign_key(&["userId"], &["id"]),
                ))
        })
        .define("Comment", |s| {
            Ok(EntityModel::new("Comment")
                .with_field(FieldModel::new("id", FieldKind::Int).id().generated(Generator::Autoincrement))
                .with_field(FieldModel::new("text", FieldKind::Text))
                .with_field(FieldModel::new("postId", FieldKind::Int))
                .with_field(FieldModel::new("authorId", FieldKind::Int).nullable())
                .with_relation(
                    RelationModel::new("post", s.lookup("Post")?, Cardinality::One, "comments")
                        .foreign_key(&["postId"], &["id"]),
                )
                .with_relation(
                    RelationModel::new("author", s.lookup("User")?, Cardinality::Opt, "comments")
                        .foreign_key(&["authorId"], &["id"]),
                ))
        })
        .define("Membership", |s| {
            Ok(EntityModel::new("Membership")
                .with_field(FieldModel::new("userId", FieldKind::Int))
                .with_field(FieldModel::new("group", FieldKind::Text))
                .with_field(FieldModel::new("joinedAt", FieldKind::Timestamp).generated(Generator::Now))
                .with_relation(
                    RelationModel::new("user", s.lookup("User")?, Cardinality::One, "memberships")
                        .foreign_key(&["userId"], &["id"]),
                )
                .with_unique(UniqueModel::new(&["userId", "group"])))
        })
        .build()
        .expect("blog schema should build")
}
