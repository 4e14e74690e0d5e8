use super::*;
use crate::{
    error::IssueKind,
    model::{EnumModel, FieldKind},
};
use proptest::prelude::*;
use serde_json::json;

static COLOR: EnumModel = EnumModel::new("Color", &["RED", "GREEN"]);

fn arb_json() -> impl Strategy<Value = JsonValue> {
    let leaf = prop_oneof![
        any::<bool>().prop_map(JsonValue::Bool),
        any::<i64>().prop_map(|n| JsonValue::Number(n.into())),
        "[a-z]{0,6}".prop_map(JsonValue::String),
    ];

    leaf.prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(JsonValue::Array),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                .prop_map(|map| JsonValue::Object(map.into_iter().collect())),
        ]
    })
}

fn arb_nullable(context: NullContext) -> impl Strategy<Value = NullableJson> {
    let any_null = match context {
        NullContext::Filter => Just(NullableJson::AnyNull).boxed(),
        NullContext::Mutation => Just(NullableJson::DbNull).boxed(),
    };

    prop_oneof![
        Just(NullableJson::Absent),
        Just(NullableJson::DbNull),
        Just(NullableJson::JsonNull),
        any_null,
        arb_json().prop_map(NullableJson::Value),
    ]
}

///
/// NULL SEMANTICS
///

#[test]
fn null_alphabet_maps_to_variants() {
    let cases = [
        (json!(null), NullableJson::DbNull),
        (json!("DbNull"), NullableJson::DbNull),
        (json!("JsonNull"), NullableJson::JsonNull),
        (json!("AnyNull"), NullableJson::AnyNull),
        (json!({"a": 1}), NullableJson::Value(json!({"a": 1}))),
    ];

    for (raw, expected) in cases {
        let got = NullableJson::transform(Some(&raw), NullContext::Filter, 8)
            .expect("filter context accepts every tag");
        assert_eq!(got, expected, "raw input {raw}");
    }

    assert_eq!(
        NullableJson::transform(None, NullContext::Mutation, 8),
        Ok(NullableJson::Absent)
    );
}

#[test]
fn db_null_and_json_null_stay_distinct() {
    let db = NullableJson::transform(Some(&json!("DbNull")), NullContext::Mutation, 8);
    let js = NullableJson::transform(Some(&json!("JsonNull")), NullContext::Mutation, 8);

    assert_ne!(db, js);
}

#[test]
fn any_null_is_rejected_in_mutations() {
    let err = NullableJson::transform(Some(&json!("AnyNull")), NullContext::Mutation, 8)
        .expect_err("AnyNull must not be writable");

    assert_eq!(err.kind(), IssueKind::InvalidNullVariantForContext);
}

#[test]
fn deep_json_hits_the_depth_limit() {
    let deep = json!({"a": {"b": {"c": [1]}}});

    // three objects, one array, one scalar
    assert_eq!(json_depth(&deep, 10), Some(5));
    assert_eq!(json_depth(&deep, 5), Some(5));
    assert_eq!(json_depth(&deep, 4), None);

    let err = NullableJson::transform(Some(&deep), NullContext::Mutation, 4)
        .expect_err("too deep");
    assert_eq!(err.kind(), IssueKind::DepthLimitExceeded);
}

proptest! {
    #[test]
    fn transform_inverts_to_raw(value in arb_nullable(NullContext::Filter)) {
        let raw = value.to_raw();
        let back = NullableJson::transform(raw.as_ref(), NullContext::Filter, 16);

        prop_assert_eq!(back, Ok(value));
    }

    #[test]
    fn normalize_is_idempotent(value in arb_nullable(NullContext::Mutation)) {
        let once = value.clone().normalize(NullContext::Mutation, 16);
        prop_assert_eq!(&once, &Ok(value));

        let twice = once.clone().and_then(|v| v.normalize(NullContext::Mutation, 16));
        prop_assert_eq!(twice, once);
    }
}

///
/// LITERALS
///

#[test]
fn enum_literal_checks_membership() {
    let kind = FieldKind::Enum(&COLOR);

    assert_eq!(
        coerce_literal(kind, &json!("RED")),
        Ok(Value::Enum("RED".to_string()))
    );

    let err = coerce_literal(kind, &json!("BLUE")).expect_err("not a variant");
    assert_eq!(err.kind(), IssueKind::EnumValueNotAllowed);
    assert!(err.to_string().contains("RED, GREEN"));
}

#[test]
fn int_rejects_fractional_numbers() {
    let err = coerce_literal(FieldKind::Int, &json!(1.5)).expect_err("fractional");
    let integral = coerce_literal(FieldKind::Int, &json!(5.0)).expect_err("float literal");

    assert_eq!(integral, err);

    assert_eq!(
        err,
        LiteralError::TypeMismatch {
            expected: "integer",
            found: "number"
        }
    );
}

#[test]
fn text_list_reports_bad_element() {
    let err = coerce_literal(FieldKind::TextList, &json!(["a", 2])).expect_err("mixed list");

    assert_eq!(
        err,
        LiteralError::ListElement {
            index: 1,
            found: "number"
        }
    );
}

#[test]
fn timestamp_round_trips_through_json() {
    let raw = json!("2024-05-01T12:30:00Z");
    let value = coerce_literal(FieldKind::Timestamp, &raw).expect("valid timestamp");

    assert_eq!(coerce_literal(FieldKind::Timestamp, &value.to_json()), Ok(value));
    assert!(coerce_literal(FieldKind::Timestamp, &json!("yesterday")).is_err());
}
