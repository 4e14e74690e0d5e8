use super::*;
use crate::{
    error::Issues,
    filter::UniqueSelector,
    test_fixtures::{entity, validator},
    value::{NullableJson, Value},
};
use proptest::prelude::*;
use serde_json::json;

fn issues(err: ValidationError) -> Issues {
    match err {
        ValidationError::Invalid(issues) => issues,
        ValidationError::Schema(err) => panic!("unexpected schema error: {err}"),
    }
}

fn kind_at(err: ValidationError, path: &str) -> IssueKind {
    let issues = issues(err);
    let found = issues.at(path);
    assert!(!found.is_empty(), "no issue at '{path}': {issues}");

    found[0].kind
}

fn create(name: &str, raw: &JsonValue) -> Result<CreatePayload, ValidationError> {
    validator().parse_create_payload(entity(name), raw)
}

fn update(name: &str, raw: &JsonValue) -> Result<UpdatePayload, ValidationError> {
    validator().parse_update_payload(entity(name), raw)
}

proptest! {
    #[test]
    fn divide_rejects_only_zero(n in any::<i64>()) {
        let parsed = update("Post", &json!({ "views": { "divide": n } }));

        prop_assert_eq!(parsed.is_ok(), n != 0);
        if let Ok(payload) = parsed {
            prop_assert_eq!(payload.field("views"), Some(&FieldUpdate::Divide(Value::Int(n))));
        }
    }
}

///
/// CREATE
///

#[test]
fn create_connects_a_required_relation() {
    let payload = create("Post", &json!({ "title": "t", "author": { "connect": { "email": "a@b.c" } } }))
        .expect("checked create");

    assert_eq!(payload.variant, WriteVariant::Checked);
    assert_eq!(
        payload.relation("author").and_then(RelationWrite::as_one),
        Some(&ToOneWrite::Connect(UniqueSelector::Field {
            field: "email",
            value: Value::Text("a@b.c".to_string()),
        }))
    );
    assert!(payload.field("authorId").is_none());
}

#[test]
fn missing_required_relation_names_the_relation() {
    let err = create("Post", &json!({ "title": "t" })).expect_err("no author");
    let issues = issues(err);

    assert_eq!(issues.len(), 1);
    assert_eq!(issues.at("author")[0].kind, IssueKind::MissingRequiredRelation);
}

#[test]
fn empty_relation_object_on_create_is_a_missing_relation() {
    let err = create("Post", &json!({ "title": "t", "author": {} })).expect_err("no operation");

    assert_eq!(kind_at(err, "author"), IssueKind::MissingRequiredRelation);
}

#[test]
fn foreign_key_scalars_select_the_unchecked_variant() {
    let payload = create("Post", &json!({ "title": "t", "authorId": 1 })).expect("unchecked create");
    assert_eq!(payload.variant, WriteVariant::Unchecked);
    assert_eq!(payload.field("authorId"), Some(&FieldValue::Scalar(Value::Int(1))));

    let raw = json!({ "title": "t", "authorId": 1, "author": { "connect": { "id": 1 } } });
    let err = create("Post", &raw).expect_err("both variants");
    assert_eq!(kind_at(err, "author"), IssueKind::AmbiguousUnionVariant);
}

#[test]
fn to_one_takes_exactly_one_operation() {
    let raw = json!({
        "title": "t",
        "author": { "connect": { "id": 1 }, "create": { "email": "a@b.c" } },
    });
    let err = create("Post", &raw).expect_err("two operations");

    assert_eq!(kind_at(err, "author"), IssueKind::AmbiguousRelationOperation);
}

#[test]
fn update_operations_are_misplaced_on_create() {
    let raw = json!({ "title": "t", "author": { "update": { "name": "x" } } });
    let issues = issues(create("Post", &raw).expect_err("update inside create"));

    assert_eq!(issues.len(), 1);
    assert_eq!(issues.at("author.update")[0].kind, IssueKind::InvalidOperator);
}

#[test]
fn connect_or_create_carries_both_sides() {
    let raw = json!({
        "title": "t",
        "author": { "connectOrCreate": { "where": { "email": "a@b.c" }, "create": { "email": "a@b.c" } } },
    });
    let payload = create("Post", &raw).expect("connectOrCreate");

    let Some(ToOneWrite::ConnectOrCreate(write)) = payload.relation("author").and_then(RelationWrite::as_one)
    else {
        panic!("author should be connectOrCreate");
    };
    assert_eq!(write.create.entity, entity("User"));
    assert!(write.create.relation("posts").is_none());
}

#[test]
fn nested_create_leaves_out_the_back_reference() {
    let raw = json!({ "email": "a@b.c", "posts": { "create": [{ "title": "one" }] } });
    let payload = create("User", &raw).expect("nested post without author");

    let posts = payload.relation("posts").and_then(RelationWrite::as_many).expect("to-many write");
    assert_eq!(posts.create.len(), 1);
    assert_eq!(posts.create[0].variant, WriteVariant::Checked);
    assert_eq!(posts.create[0].entity, entity("Post"));
}

#[test]
fn nested_create_cannot_name_the_back_reference() {
    let raw = json!({ "email": "a@b.c", "posts": { "create": { "title": "one", "authorId": 1 } } });
    let err = create("User", &raw).expect_err("foreign key of the parent");
    assert_eq!(kind_at(err, "posts.create.authorId"), IssueKind::UnknownKey);

    let raw = json!({
        "email": "a@b.c",
        "posts": { "create": { "title": "one", "author": { "connect": { "id": 1 } } } },
    });
    let err = create("User", &raw).expect_err("back-reference relation");
    assert_eq!(kind_at(err, "posts.create.author"), IssueKind::UnknownKey);
}

#[test]
fn to_many_update_operations_are_misplaced_on_create() {
    let raw = json!({ "email": "a@b.c", "posts": { "deleteMany": [{}] } });
    let err = create("User", &raw).expect_err("deleteMany inside create");

    assert_eq!(kind_at(err, "posts.deleteMany"), IssueKind::InvalidOperator);
}

#[test]
fn json_fields_keep_their_null_variant() {
    let payload = create("User", &json!({ "email": "a@b.c", "settings": "JsonNull" })).expect("JsonNull");
    assert_eq!(payload.field("settings"), Some(&FieldValue::Json(NullableJson::JsonNull)));

    let payload = create("User", &json!({ "email": "a@b.c", "settings": null })).expect("DbNull");
    assert_eq!(payload.field("settings"), Some(&FieldValue::Json(NullableJson::DbNull)));

    let err = create("User", &json!({ "email": "a@b.c", "settings": "AnyNull" })).expect_err("AnyNull");
    assert_eq!(kind_at(err, "settings"), IssueKind::InvalidNullVariantForContext);
}

///
/// UPDATE
///

#[test]
fn to_many_update_keeps_each_operation() {
    let raw = json!({
        "posts": {
            "create": [{ "title": "hi" }],
            "deleteMany": [{ "createdAt": { "lt": "2024-01-01T00:00:00Z" } }],
        },
    });
    let payload = update("User", &raw).expect("create and deleteMany");

    let posts = payload.relation("posts").and_then(RelationWrite::as_many).expect("to-many write");
    assert_eq!(posts.operations(), ["create", "deleteMany"]);
    assert_eq!(posts.create.len(), 1);
    assert_eq!(posts.delete_many.len(), 1);
}

#[test]
fn disconnect_only_takes_true() {
    let payload = update("Comment", &json!({ "author": { "disconnect": true } })).expect("disconnect");
    assert_eq!(
        payload.relation("author"),
        Some(&RelationWrite::One(ToOneWrite::Disconnect))
    );

    let err = update("Comment", &json!({ "author": { "disconnect": false } })).expect_err("false");
    assert_eq!(kind_at(err, "author.disconnect"), IssueKind::InvalidValue);
}

#[test]
fn required_relations_cannot_be_detached() {
    let err = update("Post", &json!({ "author": { "disconnect": true } })).expect_err("disconnect");
    assert_eq!(kind_at(err, "author.disconnect"), IssueKind::InvalidOperator);

    let err = update("Post", &json!({ "author": null })).expect_err("null author");
    assert_eq!(kind_at(err, "author"), IssueKind::NullOnRequiredRelation);

    let payload = update("Comment", &json!({ "author": null })).expect("nullable author");
    assert_eq!(payload.relation("author"), Some(&RelationWrite::One(ToOneWrite::Clear)));
}

#[test]
fn update_operators_follow_field_capabilities() {
    let payload = update("Post", &json!({ "views": { "increment": 2 } })).expect("increment");
    assert_eq!(payload.field("views"), Some(&FieldUpdate::Increment(Value::Int(2))));

    let payload = update("User", &json!({ "tags": { "push": "rust" } })).expect("push");
    assert_eq!(payload.field("tags"), Some(&FieldUpdate::Push(vec!["rust".to_string()])));

    let err = update("Post", &json!({ "title": { "increment": 1 } })).expect_err("text increment");
    assert_eq!(kind_at(err, "title.increment"), IssueKind::InvalidOperator);

    let err = update("Post", &json!({ "views": { "sparkle": 1 } })).expect_err("made up");
    assert_eq!(kind_at(err, "views.sparkle"), IssueKind::UnknownKey);
}

#[test]
fn update_operands_are_checked() {
    let err = update("Post", &json!({ "views": { "divide": 0 } })).expect_err("zero");
    assert_eq!(kind_at(err, "views.divide"), IssueKind::InvalidValue);

    let err = update("Post", &json!({ "rating": { "multiply": null } })).expect_err("null operand");
    assert_eq!(kind_at(err, "rating.multiply"), IssueKind::TypeMismatch);

    let err = update("Post", &json!({ "views": { "increment": 1, "decrement": 1 } })).expect_err("two");
    assert_eq!(kind_at(err, "views"), IssueKind::AmbiguousUnionVariant);
}

#[test]
fn json_updates_take_objects_as_data() {
    let payload = update("User", &json!({ "settings": { "set": 1 } })).expect("json object");

    assert_eq!(
        payload.field("settings"),
        Some(&FieldUpdate::Set(FieldValue::Json(NullableJson::Value(json!({ "set": 1 })))))
    );
}

#[test]
fn to_one_update_and_upsert() {
    let payload = update("Post", &json!({ "author": { "update": { "name": "x" } } })).expect("update");
    assert!(matches!(
        payload.relation("author").and_then(RelationWrite::as_one),
        Some(ToOneWrite::Update(_))
    ));

    let raw = json!({ "author": { "upsert": { "create": { "email": "a@b.c" }, "update": { "name": "x" } } } });
    let payload = update("Post", &raw).expect("upsert");
    assert_eq!(
        payload.relation("author").and_then(RelationWrite::as_one).map(ToOneWrite::operation),
        Some("upsert")
    );
}

///
/// BULK AND UPSERT
///

#[test]
fn create_many_rows_are_scalar_only() {
    let post = entity("Post");

    let payload = validator()
        .parse_create_many(post, &json!({ "data": [{ "title": "a", "authorId": 1 }], "skipDuplicates": true }))
        .expect("one row");
    assert_eq!(payload.data.len(), 1);
    assert!(payload.skip_duplicates);
    assert_eq!(payload.data[0].variant, WriteVariant::Unchecked);

    let raw = json!({ "data": [{ "title": "a", "authorId": 1, "author": { "connect": { "id": 1 } } }] });
    let err = validator().parse_create_many(post, &raw).expect_err("relation in a row");
    assert_eq!(kind_at(err, "data[0].author"), IssueKind::InvalidOperator);

    let err = validator()
        .parse_create_many(post, &json!({ "data": [{ "title": "a" }] }))
        .expect_err("missing foreign key");
    assert_eq!(kind_at(err, "data[0].authorId"), IssueKind::MissingRequiredField);
}

#[test]
fn update_many_filters_and_updates_scalars() {
    let post = entity("Post");

    let args = validator()
        .parse_update_many(post, &json!({ "where": { "published": false }, "data": { "views": { "increment": 1 } } }))
        .expect("updateMany");
    assert!(args.where_.is_some());
    assert_eq!(args.data.fields.len(), 1);

    let err = validator()
        .parse_update_many(post, &json!({ "data": { "author": { "connect": { "id": 1 } } } }))
        .expect_err("relation in data");
    assert_eq!(kind_at(err, "data.author"), IssueKind::InvalidOperator);

    let err = validator()
        .parse_update_many(post, &json!({ "where": {} }))
        .expect_err("no data");
    assert_eq!(kind_at(err, "data"), IssueKind::MissingRequiredField);
}

#[test]
fn upsert_needs_all_three_parts() {
    let user = entity("User");

    let args = validator()
        .parse_upsert(
            user,
            &json!({ "where": { "email": "a@b.c" }, "create": { "email": "a@b.c" }, "update": { "name": "n" } }),
        )
        .expect("upsert");
    assert_eq!(args.create.entity, user);
    assert!(!args.update.is_empty());

    let err = validator()
        .parse_upsert(user, &json!({ "create": { "email": "a@b.c" }, "update": {} }))
        .expect_err("no where");
    assert_eq!(kind_at(err, "where"), IssueKind::MissingRequiredField);
}
