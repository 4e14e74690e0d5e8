use relgraph_app::{LEAD, MESSAGE, USER, entity, validator};
use relgraph_core::{
    error::{IssueKind, ValidationError},
    mutation::{FieldValue, WriteVariant},
    value::{NullableJson, Value},
};
use serde_json::json;

fn issues_at(err: &ValidationError, path: &str) -> Vec<IssueKind> {
    assert!(!err.issues().is_empty(), "expected validation issues, got {err}");

    err.issues()
        .iter()
        .filter(|issue| issue.path.to_string() == path)
        .map(|issue| issue.kind)
        .collect()
}

///
/// LEADS
///

#[test]
fn new_lead_takes_its_defaults() {
    let lead = entity(LEAD).expect("Lead is defined");
    let value = validator()
        .parse(lead, &json!({ "email": "ada@example.com", "technologies": ["react"] }))
        .expect("valid lead");

    assert_eq!(value.get("status"), Some(&Value::Enum("COLD".to_string())));
    assert_eq!(value.get("score"), Some(&Value::Int(0)));
    assert_eq!(
        value.get("technologies"),
        Some(&Value::TextList(vec!["react".to_string()]))
    );
    assert_eq!(value.get("name"), Some(&Value::Null));
    assert!(value.get("id").is_none(), "generated ids stay absent");
}

#[test]
fn lead_status_is_checked_against_its_enum() {
    let lead = entity(LEAD).expect("Lead is defined");
    let err = validator()
        .parse(lead, &json!({ "email": "ada@example.com", "status": "LUKEWARM" }))
        .expect_err("unknown status");

    assert_eq!(issues_at(&err, "status"), [IssueKind::EnumValueNotAllowed]);
}

#[test]
fn hot_or_high_scoring_leads() {
    let lead = entity(LEAD).expect("Lead is defined");
    let raw = json!({ "OR": [{ "status": { "equals": "HOT" } }, { "score": { "gte": 80 } }] });

    let filter = validator().parse_filter(lead, &raw).expect("valid filter");
    let branches = filter.or.as_ref().expect("OR was given");
    assert_eq!(branches.len(), 2);

    for (i, branch) in branches.iter().enumerate() {
        let alone = validator()
            .parse_filter(lead, &branch.to_json())
            .expect("each branch parses alone");
        assert_eq!(&alone, branch);
        assert_eq!(alone.to_json(), raw["OR"][i]);
    }
}

#[test]
fn lead_search_filter_renders_back() {
    let lead = entity(LEAD).expect("Lead is defined");
    let raw = json!({
        "OR": [
            { "company": { "contains": "acme", "mode": "insensitive" } },
            { "score": { "gte": 50 }, "status": { "in": ["WARM", "HOT"] } },
        ],
        "technologies": { "hasSome": ["rust", "wasm"] },
    });

    let filter = validator().parse_filter(lead, &raw).expect("valid filter");
    assert_eq!(filter.or.as_ref().map(Vec::len), Some(2));
    assert_eq!(filter.to_json(), raw);

    let again = validator()
        .parse_filter(lead, &filter.to_json())
        .expect("rendered filter parses");
    assert_eq!(again, filter);
}

#[test]
fn lead_enrichment_distinguishes_null_variants() {
    let lead = entity(LEAD).expect("Lead is defined");
    let create = |enrichment| {
        validator().parse_create_payload(
            lead,
            &json!({ "email": "ada@example.com", "enrichment": enrichment }),
        )
    };

    let db_null = create(json!(null)).expect("null clears the column");
    assert_eq!(
        db_null.field("enrichment"),
        Some(&FieldValue::Json(NullableJson::DbNull))
    );

    let json_null = create(json!("JsonNull")).expect("stored JSON null");
    assert_eq!(
        json_null.field("enrichment"),
        Some(&FieldValue::Json(NullableJson::JsonNull))
    );

    let err = create(json!("AnyNull")).expect_err("AnyNull only filters");
    assert_eq!(
        issues_at(&err, "enrichment"),
        [IssueKind::InvalidNullVariantForContext]
    );
}

///
/// MESSAGES
///

#[test]
fn message_without_author_is_rejected() {
    let message = entity(MESSAGE).expect("Message is defined");
    let err = validator()
        .parse_create_payload(message, &json!({ "text": "hi" }))
        .expect_err("author is required");

    assert_eq!(issues_at(&err, "author"), [IssueKind::MissingRequiredRelation]);
}

#[test]
fn message_connects_its_author_or_names_the_key() {
    let message = entity(MESSAGE).expect("Message is defined");

    let checked = validator()
        .parse_create_payload(
            message,
            &json!({ "text": "hi", "author": { "connect": { "email": "ada@example.com" } } }),
        )
        .expect("connect by unique email");
    assert_eq!(checked.variant, WriteVariant::Checked);

    let unchecked = validator()
        .parse_create_payload(message, &json!({ "text": "hi", "authorId": "u1", "roomId": null }))
        .expect("foreign keys directly");
    assert_eq!(unchecked.variant, WriteVariant::Unchecked);

    let err = validator()
        .parse_create_payload(
            message,
            &json!({ "text": "hi", "authorId": "u1", "author": { "connect": { "id": "u1" } } }),
        )
        .expect_err("both shapes at once");
    assert!(err.has(IssueKind::AmbiguousUnionVariant));
}

#[test]
fn reply_threads_through_the_same_entity() {
    let message = entity(MESSAGE).expect("Message is defined");
    let raw = json!({
        "text": "agreed",
        "author": { "connect": { "id": "u1" } },
        "replyTo": { "connect": { "id": "m1" } },
        "room": { "connect": { "slug": "general" } },
    });

    let payload = validator().parse_create_payload(message, &raw).expect("reply");
    assert!(payload.relation("replyTo").and_then(|r| r.as_one()).is_some());
    assert!(payload.relation("room").and_then(|r| r.as_one()).is_some());
}

///
/// USERS
///

#[test]
fn user_update_creates_and_prunes_messages() {
    let user = entity(USER).expect("User is defined");
    let raw = json!({
        "name": "Ada",
        "messages": {
            "create": [{ "text": "hello" }],
            "deleteMany": [{ "createdAt": { "lt": "2026-01-01T00:00:00Z" } }],
        },
    });

    let payload = validator().parse_update_payload(user, &raw).expect("valid update");
    let messages = payload
        .relation("messages")
        .and_then(|r| r.as_many())
        .expect("to-many write");

    assert_eq!(messages.operations(), ["create", "deleteMany"]);
    assert!(messages.create[0].relation("author").is_none());
}

#[test]
fn user_update_reports_every_bad_member() {
    let user = entity(USER).expect("User is defined");
    let raw = json!({
        "email": 42,
        "nickname": "ada",
        "messages": { "create": { "text": "hi", "author": { "connect": { "id": "u1" } } } },
    });

    let err = validator().parse_update_payload(user, &raw).expect_err("three problems");

    assert_eq!(issues_at(&err, "email"), [IssueKind::TypeMismatch]);
    assert_eq!(issues_at(&err, "nickname"), [IssueKind::UnknownKey]);
    assert_eq!(
        issues_at(&err, "messages.create.author"),
        [IssueKind::UnknownKey]
    );
}

#[test]
fn user_inbox_query_nests_find_arguments() {
    let user = entity(USER).expect("User is defined");
    let raw = json!({
        "where": { "memberships": { "some": { "role": "OWNER" } } },
        "orderBy": [{ "createdAt": "desc" }],
        "take": 20,
        "include": {
            "messages": { "where": { "roomId": null }, "orderBy": { "createdAt": "desc" }, "take": 5 },
            "subscription": true,
            "_count": { "select": { "messages": true, "ownedRooms": true } },
        },
    });

    let args = validator().parse_find_many(user, &raw).expect("inbox query");
    assert_eq!(args.take, Some(20));

    let selection = args.selection.expect("include was given");
    assert_eq!(selection.count, Some(vec!["messages", "ownedRooms"]));
}
