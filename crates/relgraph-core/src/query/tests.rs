use super::*;
use crate::{
    error::{IssueKind, Issues},
    filter::UniqueSelector,
    test_fixtures::{entity, validator},
    value::Value,
};
use serde_json::json;

fn kind_at(err: ValidationError, path: &str) -> IssueKind {
    let issues: Issues = match err {
        ValidationError::Invalid(issues) => issues,
        ValidationError::Schema(err) => panic!("unexpected schema error: {err}"),
    };
    let found = issues.at(path);
    assert!(!found.is_empty(), "no issue at '{path}': {issues}");

    found[0].kind
}

fn find_many(name: &str, raw: &JsonValue) -> Result<FindManyArgs, ValidationError> {
    validator().parse_find_many(entity(name), raw)
}

///
/// FIND MANY
///

#[test]
fn find_many_parses_every_argument() {
    let raw = json!({
        "where": { "published": true },
        "orderBy": { "createdAt": "desc" },
        "cursor": { "id": 5 },
        "take": 10,
        "skip": 5,
        "distinct": ["title"],
        "select": { "title": true, "body": false, "author": true },
    });
    let args = find_many("Post", &raw).expect("full argument set");

    assert!(args.where_.is_some());
    assert!(args.order_by.is_some());
    assert_eq!(
        args.cursor,
        Some(UniqueSelector::Field {
            field: "id",
            value: Value::Int(5)
        })
    );
    assert_eq!((args.take, args.skip), (Some(10), Some(5)));
    assert_eq!(args.distinct, ["title"]);

    let selection = args.selection.expect("select was given");
    assert_eq!(selection.mode, SelectionMode::Select);
    assert_eq!(selection.fields, ["title"]);
    assert_eq!(selection.relation("author"), Some(&RelationSelection::All));
}

#[test]
fn empty_arguments_are_fine() {
    let args = find_many("Post", &json!({})).expect("no arguments");

    assert!(args.where_.is_none() && args.selection.is_none());
    assert!(args.distinct.is_empty());
}

#[test]
fn paging_counts_are_non_negative_integers() {
    let err = find_many("Post", &json!({ "take": -1 })).expect_err("negative take");
    assert_eq!(kind_at(err, "take"), IssueKind::InvalidValue);

    let err = find_many("Post", &json!({ "skip": "ten" })).expect_err("text skip");
    assert_eq!(kind_at(err, "skip"), IssueKind::TypeMismatch);
}

#[test]
fn distinct_names_fields() {
    let args = find_many("Post", &json!({ "distinct": "title" })).expect("single field");
    assert_eq!(args.distinct, ["title"]);

    let err = find_many("Post", &json!({ "distinct": ["ghost"] })).expect_err("unknown field");
    assert_eq!(kind_at(err, "distinct[0]"), IssueKind::UnknownKey);
}

#[test]
fn unknown_arguments_are_reported() {
    let err = find_many("Post", &json!({ "limit": 3 })).expect_err("unknown key");

    assert_eq!(kind_at(err, "limit"), IssueKind::UnknownKey);
}

///
/// SELECTIONS
///

#[test]
fn select_and_include_are_exclusive() {
    let raw = json!({ "select": { "title": true }, "include": { "author": true } });
    let err = find_many("Post", &raw).expect_err("both");

    assert_eq!(kind_at(err, ""), IssueKind::AmbiguousUnionVariant);
}

#[test]
fn include_takes_relations_only() {
    let err = find_many("Post", &json!({ "include": { "title": true } })).expect_err("field");

    assert_eq!(kind_at(err, "include.title"), IssueKind::InvalidOperator);
}

#[test]
fn to_many_selection_takes_find_arguments() {
    let raw = json!({
        "include": {
            "posts": { "where": { "published": true }, "take": 2, "select": { "title": true } },
            "profile": false,
        },
    });
    let args = find_many("User", &raw).expect("nested find arguments");
    let selection = args.selection.expect("include was given");

    let Some(RelationSelection::Many(posts)) = selection.relation("posts") else {
        panic!("posts should carry find arguments");
    };
    assert_eq!(posts.entity, entity("Post"));
    assert_eq!(posts.take, Some(2));
    assert!(posts.where_.is_some());
    assert!(selection.relation("profile").is_none());
}

#[test]
fn to_one_selection_nests_a_selection() {
    let raw = json!({ "include": { "author": { "select": { "email": true } } } });
    let args = find_many("Post", &raw).expect("nested select");
    let selection = args.selection.expect("include was given");

    let Some(RelationSelection::One(author)) = selection.relation("author") else {
        panic!("author should carry a selection");
    };
    assert_eq!(author.fields, ["email"]);

    let err = find_many("Post", &json!({ "include": { "author": { "where": {} } } }))
        .expect_err("find arguments on a to-one relation");
    assert_eq!(kind_at(err, "include.author.where"), IssueKind::UnknownKey);
}

#[test]
fn relation_counts_cover_to_many_relations() {
    let args = find_many("User", &json!({ "select": { "_count": true } })).expect("count all");
    let selection = args.selection.expect("select was given");
    assert_eq!(
        selection.count.as_deref(),
        Some(&["posts", "comments", "memberships"][..])
    );

    let args = find_many("User", &json!({ "select": { "_count": { "select": { "posts": true } } } }))
        .expect("count posts");
    assert_eq!(args.selection.and_then(|s| s.count), Some(vec!["posts"]));

    let err = find_many("User", &json!({ "select": { "_count": { "select": { "profile": true } } } }))
        .expect_err("to-one count");
    assert_eq!(kind_at(err, "select._count.select.profile"), IssueKind::InvalidOperator);
}

///
/// FIND UNIQUE
///

#[test]
fn find_unique_needs_a_unique_selector() {
    let user = entity("User");

    let args = validator()
        .parse_find_unique(user, &json!({ "where": { "email": "a@b.c" }, "include": { "posts": true } }))
        .expect("by email");
    assert_eq!(args.entity, user);
    assert!(args.selection.is_some());

    let err = validator()
        .parse_find_unique(user, &json!({ "include": { "posts": true } }))
        .expect_err("no where");
    assert_eq!(kind_at(err, "where"), IssueKind::MissingRequiredField);

    let err = validator()
        .parse_find_unique(user, &json!({ "where": { "name": "x" } }))
        .expect_err("not unique");
    assert_eq!(kind_at(err, "where.name"), IssueKind::AmbiguousUnionVariant);
}
