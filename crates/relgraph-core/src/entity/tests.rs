use super::*;
use crate::{
    error::{IssueKind, Issues},
    test_fixtures::{entity, validator},
};
use proptest::prelude::*;
use serde_json::json;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

fn issues(err: ValidationError) -> Issues {
    match err {
        ValidationError::Invalid(issues) => issues,
        ValidationError::Schema(err) => panic!("unexpected schema error: {err}"),
    }
}

fn arb_post() -> impl Strategy<Value = JsonValue> {
    (
        "[a-z ]{1,12}",
        prop::option::of("[a-z]{0,12}"),
        any::<bool>(),
        any::<i64>(),
        prop::option::of(-1.0e6..1.0e6f64),
        any::<i64>(),
        prop::option::of(0i64..4_000_000_000),
    )
        .prop_map(|(title, body, published, views, rating, author, created)| {
            let mut raw = json!({
                "title": title,
                "body": body,
                "published": published,
                "views": views,
                "rating": rating,
                "authorId": author,
            });

            if let Some(secs) = created {
                let ts = OffsetDateTime::from_unix_timestamp(secs).expect("in range");
                raw["createdAt"] = json!(ts.format(&Rfc3339).expect("formats"));
            }

            raw
        })
}

proptest! {
    #[test]
    fn parse_round_trips_through_to_json(raw in arb_post()) {
        let post = entity("Post");
        let first = validator().parse(post, &raw).expect("generated posts are valid");
        let second = validator()
            .parse(post, &first.to_json())
            .expect("rendered posts are valid");

        prop_assert_eq!(first, second);
    }
}

///
/// DEFAULTS
///

#[test]
fn omitted_fields_take_defaults_or_null() {
    let value = validator()
        .parse(entity("Post"), &json!({ "title": "hello", "authorId": 7 }))
        .expect("minimal post");

    assert_eq!(value.get("published"), Some(&Value::Bool(false)));
    assert_eq!(value.get("views"), Some(&Value::Int(0)));
    assert_eq!(value.get("body"), Some(&Value::Null));
    assert_eq!(value.get("meta"), Some(&Value::Null));
}

#[test]
fn generated_fields_stay_absent() {
    let value = validator()
        .parse(entity("Post"), &json!({ "title": "hello", "authorId": 7 }))
        .expect("minimal post");

    assert!(value.get("id").is_none());
    assert!(value.get("createdAt").is_none());
}

#[test]
fn missing_required_fields_are_each_reported() {
    let issues = issues(validator().parse(entity("Post"), &json!({})).expect_err("empty post"));

    assert_eq!(issues.len(), 2);
    assert_eq!(issues.at("title")[0].kind, IssueKind::MissingRequiredField);
    assert_eq!(issues.at("authorId")[0].kind, IssueKind::MissingRequiredField);
}

#[test]
fn null_on_a_required_field_is_a_type_mismatch() {
    let raw = json!({ "title": null, "authorId": 1 });
    let issues = issues(validator().parse(entity("Post"), &raw).expect_err("null title"));

    assert_eq!(issues.at("title")[0].kind, IssueKind::TypeMismatch);
}

#[test]
fn plain_parse_rejects_relation_keys() {
    let raw = json!({ "title": "t", "authorId": 1, "author": { "email": "a@b.c" } });
    let issues = issues(validator().parse(entity("Post"), &raw).expect_err("relation key"));

    assert_eq!(issues.at("author")[0].kind, IssueKind::UnknownKey);
}

///
/// RELATION VIEWS
///

#[test]
fn relation_views_nest_target_entities() {
    let raw = json!({
        "email": "a@b.c",
        "profile": null,
        "posts": [{ "title": "one", "authorId": 1 }, { "title": "two", "authorId": 1 }],
    });
    let user = validator()
        .parse_with_relations(entity("User"), &raw)
        .expect("user with posts");

    assert_eq!(user.relation("profile"), Some(&RelationValue::Null));
    let Some(RelationValue::Many(posts)) = user.relation("posts") else {
        panic!("posts should be a list");
    };
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[1].get("title"), Some(&Value::Text("two".to_string())));
    assert_eq!(posts[1].entity, entity("Post"));
}

#[test]
fn required_relation_view_cannot_be_null() {
    let raw = json!({ "title": "t", "authorId": 1, "author": null });
    let issues = issues(
        validator()
            .parse_with_relations(entity("Post"), &raw)
            .expect_err("author is required"),
    );

    assert_eq!(issues.at("author")[0].kind, IssueKind::NullOnRequiredRelation);
}

#[test]
fn relation_views_render_back() {
    let raw = json!({
        "title": "t",
        "authorId": 1,
        "author": { "email": "a@b.c" },
    });
    let post = validator()
        .parse_with_relations(entity("Post"), &raw)
        .expect("post with author");

    let rendered = post.to_json();
    assert_eq!(rendered["author"]["email"], "a@b.c");
    assert_eq!(rendered["author"]["role"], "MEMBER");
    assert_eq!(
        validator().parse_with_relations(entity("Post"), &rendered),
        Ok(post)
    );
}
