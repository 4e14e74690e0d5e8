use super::*;
use crate::{error::SchemaError, test_fixtures::blog};
use serde_json::json;

fn keyed(name: &'static str) -> EntityModel {
    EntityModel::new(name).with_field(FieldModel::new("id", FieldKind::Int).id())
}

fn user_ref() -> crate::schema::EntityRef {
    blog().lookup("User").expect("User is defined")
}

#[test]
fn blog_models_pass_their_own_checks() {
    for model in blog().describe().expect("blog schema resolves") {
        model
            .check()
            .unwrap_or_else(|err| panic!("{} should check: {err}", model.name));
    }
}

#[test]
fn member_lookup_covers_fields_and_relations() {
    let post = blog().model("Post").expect("Post resolves");

    assert!(matches!(post.member("title"), Some(Member::Field(_))));
    assert!(matches!(post.member("author"), Some(Member::Relation(_))));
    assert!(post.member("missing").is_none());
    assert_eq!(post.owner_of_fk("authorId").map(|r| r.name), Some("author"));
    assert!(!post.is_fk_field("title"));
    assert_eq!(post.compound("authorId_title").map(|u| u.fields.len()), Some(2));
}

#[test]
fn duplicate_member_is_rejected() {
    let model = keyed("Thing").with_field(FieldModel::new("id", FieldKind::Text));

    assert!(matches!(
        model.check(),
        Err(SchemaError::DuplicateMember { member, .. }) if member == "id"
    ));
}

#[test]
fn nullable_identifier_is_rejected() {
    let model = EntityModel::new("Thing").with_field(FieldModel::new("id", FieldKind::Int).id().nullable());

    assert!(matches!(model.check(), Err(SchemaError::InvalidField { .. })));
}

#[test]
fn json_field_cannot_be_unique() {
    let model = keyed("Thing").with_field(FieldModel::new("doc", FieldKind::Json).unique());

    assert!(matches!(
        model.check(),
        Err(SchemaError::InvalidField { field, .. }) if field == "doc"
    ));
}

#[test]
fn literal_default_must_coerce() {
    let model = keyed("Thing").with_field(FieldModel::new("count", FieldKind::Int).default_value(json!("ten")));

    assert!(matches!(
        model.check(),
        Err(SchemaError::InvalidField { field, .. }) if field == "count"
    ));
}

#[test]
fn null_default_is_fine_on_nullable_fields() {
    let model = keyed("Thing").with_field(FieldModel::new("note", FieldKind::Text).nullable().default_value(json!(null)));

    model.check().expect("null default on a nullable field");
}

#[test]
fn compound_key_needs_two_fields() {
    let model = keyed("Thing").with_unique(UniqueModel::new(&["id"]));

    assert!(matches!(model.check(), Err(SchemaError::InvalidUnique { .. })));
}

#[test]
fn compound_label_cannot_shadow_a_member() {
    let model = keyed("Thing")
        .with_field(FieldModel::new("a", FieldKind::Int))
        .with_field(FieldModel::new("b", FieldKind::Int))
        .with_unique(UniqueModel::new(&["a", "b"]).with_label("a"));

    assert!(matches!(
        model.check(),
        Err(SchemaError::InvalidUnique { label, .. }) if label == "a"
    ));
}

#[test]
fn compound_members_must_be_keyable_fields() {
    let model = keyed("Thing")
        .with_field(FieldModel::new("a", FieldKind::Int))
        .with_field(FieldModel::new("tags", FieldKind::TextList))
        .with_unique(UniqueModel::new(&["a", "tags"]));

    assert!(matches!(model.check(), Err(SchemaError::InvalidUnique { .. })));
}

#[test]
fn entity_without_unique_selector_is_rejected() {
    let model = EntityModel::new("Loose").with_field(FieldModel::new("a", FieldKind::Int));

    assert!(matches!(
        model.check(),
        Err(SchemaError::NoUniqueSelector { entity }) if entity == "Loose"
    ));
}

#[test]
fn foreign_key_nullability_follows_cardinality() {
    let model = keyed("Thing")
        .with_field(FieldModel::new("ownerId", FieldKind::Int))
        .with_relation(
            RelationModel::new("owner", user_ref(), Cardinality::Opt, "things")
                .foreign_key(&["ownerId"], &["id"]),
        );

    assert!(matches!(
        model.check(),
        Err(SchemaError::InvalidRelation { relation, .. }) if relation == "owner"
    ));
}

#[test]
fn to_many_relation_cannot_own_a_foreign_key() {
    let model = keyed("Thing")
        .with_field(FieldModel::new("ownerId", FieldKind::Int))
        .with_relation(
            RelationModel::new("owners", user_ref(), Cardinality::Many, "things")
                .foreign_key(&["ownerId"], &["id"]),
        );

    assert!(matches!(model.check(), Err(SchemaError::InvalidRelation { .. })));
}

#[test]
fn missing_foreign_key_field_is_rejected() {
    let model = keyed("Thing").with_relation(
        RelationModel::new("owner", user_ref(), Cardinality::One, "things")
            .foreign_key(&["ownerId"], &["id"]),
    );

    assert!(matches!(model.check(), Err(SchemaError::InvalidRelation { .. })));
}

#[test]
fn cardinality_helpers() {
    assert!(Cardinality::One.is_to_one());
    assert!(Cardinality::Opt.is_to_one());
    assert!(Cardinality::Many.is_many());
    assert_eq!("Opt".parse::<Cardinality>().ok(), Some(Cardinality::Opt));
}

#[test]
fn required_fields_have_no_default_and_are_not_nullable() {
    let post = blog().model("Post").expect("Post resolves");
    let required: Vec<_> = post
        .fields
        .iter()
        .filter(|f| f.is_required())
        .map(|f| f.name)
        .collect();

    assert_eq!(required, ["title", "authorId"]);
}

#[test]
fn models_serialize_with_entity_names() {
    let post = blog().model("Post").expect("Post resolves");
    let json = serde_json::to_value(post).expect("model serializes");

    assert_eq!(json["name"], "Post");
    assert_eq!(json["relations"][0]["target"], "User");
    assert_eq!(json["uniques"][0]["label"], "authorId_title");
}
