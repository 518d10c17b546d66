//! Tests for value coercion

use crate::ProcgateError;
use crate::value::{ProcValue, coerce_number, coerce_number_text};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use pretty_assertions::assert_eq;
use rstest::rstest;
use rust_decimal::Decimal;
use serde_json::json;
use std::str::FromStr;

fn decimal(text: &str) -> ProcValue {
    ProcValue::Decimal(Decimal::from_str(text).unwrap())
}

#[rstest]
#[case::integer("42", ProcValue::Int(42))]
#[case::negative_integer("-7", ProcValue::Int(-7))]
#[case::padded_integer("  15 ", ProcValue::Int(15))]
#[case::i64_max("9223372036854775807", ProcValue::Int(i64::MAX))]
#[case::money("150.50", decimal("150.50"))]
#[case::integral_with_fraction("42.0", decimal("42.0"))]
#[case::beyond_i64("9223372036854775808", decimal("9223372036854775808"))]
#[case::scientific_small("1.5e2", decimal("150"))]
fn test_coerce_number_text_prefers_exact_types(#[case] text: &str, #[case] expected: ProcValue) {
    assert_eq!(coerce_number_text(text), Some(expected));
}

#[test]
fn test_coerce_number_text_falls_back_to_float() {
    match coerce_number_text("1e300") {
        Some(ProcValue::Float(v)) => assert_eq!(v, 1e300),
        other => panic!("expected float, got {:?}", other),
    }
}

#[rstest]
#[case::empty("")]
#[case::blank("   ")]
#[case::word("abc")]
#[case::overflow("1e400")]
#[case::nan("NaN")]
#[case::infinity("inf")]
fn test_coerce_number_text_rejects_non_numbers(#[case] text: &str) {
    assert_eq!(coerce_number_text(text), None);
}

#[test]
fn test_integer_text_never_becomes_float() {
    let value = coerce_number_text("42").unwrap();
    assert!(matches!(value, ProcValue::Int(42)));
    assert!(!matches!(value, ProcValue::Float(_)));
}

#[test]
fn test_coerce_json_number_integer() {
    let number = serde_json::Number::from(5);
    assert_eq!(coerce_number(&number).unwrap(), ProcValue::Int(5));
}

#[test]
fn test_coerce_json_number_decimal_is_exact() {
    let value = json!(150.50);
    let serde_json::Value::Number(number) = value else {
        panic!("expected number");
    };
    assert_eq!(coerce_number(&number).unwrap(), decimal("150.5"));
}

#[test]
fn test_from_json_scalars() {
    assert_eq!(ProcValue::from_json(&json!(null)).unwrap(), ProcValue::Null);
    assert_eq!(ProcValue::from_json(&json!(true)).unwrap(), ProcValue::Bool(true));
    assert_eq!(ProcValue::from_json(&json!(10)).unwrap(), ProcValue::Int(10));
    assert_eq!(
        ProcValue::from_json(&json!("EFECTIVO")).unwrap(),
        ProcValue::Text("EFECTIVO".to_string())
    );
}

#[test]
fn test_from_json_string_passes_through_unchanged() {
    assert_eq!(
        ProcValue::from_json(&json!("42")).unwrap(),
        ProcValue::Text("42".to_string())
    );
    assert_eq!(ProcValue::from_json(&json!("")).unwrap(), ProcValue::Text(String::new()));
}

#[test]
fn test_from_json_structured_values_become_raw_text() {
    let value = ProcValue::from_json(&json!({"a": [1, 2]})).unwrap();
    assert_eq!(value, ProcValue::Raw(r#"{"a":[1,2]}"#.to_string()));

    let value = ProcValue::from_json(&json!([1, "x"])).unwrap();
    assert_eq!(value, ProcValue::Raw(r#"[1,"x"]"#.to_string()));
}

#[test]
fn test_null_is_distinct_from_empty_text() {
    let null = ProcValue::from_json(&json!(null)).unwrap();
    let empty = ProcValue::from_json(&json!("")).unwrap();
    assert_ne!(null, empty);
    assert!(null.is_null());
    assert!(!empty.is_null());
}

#[test]
fn test_to_json_round_trips_null() {
    assert_eq!(ProcValue::Null.to_json(), json!(null));
    assert_eq!(ProcValue::from_json(&ProcValue::Null.to_json()).unwrap(), ProcValue::Null);
}

#[test]
fn test_to_json_renders_each_variant() {
    let timestamp = NaiveDateTime::new(
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
    );

    assert_eq!(ProcValue::Int(5).to_json(), json!(5));
    assert_eq!(ProcValue::Bool(false).to_json(), json!(false));
    assert_eq!(ProcValue::Text("x".into()).to_json(), json!("x"));
    assert_eq!(ProcValue::Float(2.5).to_json(), json!(2.5));
    assert_eq!(ProcValue::Float(f64::NAN).to_json(), json!(null));
    assert_eq!(
        ProcValue::Timestamp(timestamp).to_json(),
        json!("2024-03-15T10:30:00")
    );
    assert_eq!(ProcValue::Raw("[1,2]".into()).to_json(), json!([1, 2]));
    assert_eq!(ProcValue::Raw("not json".into()).to_json(), json!("not json"));
}

#[test]
fn test_decimal_renders_as_json_number() {
    let rendered = serde_json::to_string(&decimal("150.50")).unwrap();
    assert_eq!(rendered, "150.5");
}

#[test]
fn test_display() {
    assert_eq!(ProcValue::Null.to_string(), "NULL");
    assert_eq!(ProcValue::Int(3).to_string(), "3");
    assert_eq!(ProcValue::Text("ok".into()).to_string(), "ok");
}

#[test]
fn test_from_option() {
    assert_eq!(ProcValue::from(None::<i64>), ProcValue::Null);
    assert_eq!(ProcValue::from(Some("a")), ProcValue::Text("a".into()));
}

#[test]
fn test_coerce_json_number_out_of_range_is_rejected() {
    let number = serde_json::Number::from_str("1e400").unwrap();
    let err = coerce_number(&number).unwrap_err();
    assert!(matches!(err, ProcgateError::InvalidParameter(ref m) if m.contains("1e400")));
}
