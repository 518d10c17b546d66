//! Tests for rows and result sets

use crate::{ProcValue, ResultSet, ResultSets, Row};
use pretty_assertions::assert_eq;
use serde_json::json;

fn bank_set() -> ResultSet {
    let mut set = ResultSet::new(vec!["IdBanco".into(), "Nombre".into()]);
    set.push_values(vec![ProcValue::Int(5), ProcValue::Text("Banorte".into())]);
    set
}

#[test]
fn test_row_lookup_is_case_insensitive() {
    let set = bank_set();
    let row = &set.rows()[0];
    assert_eq!(row.get("idbanco"), Some(&ProcValue::Int(5)));
    assert_eq!(row.get("IDBANCO"), Some(&ProcValue::Int(5)));
    assert_eq!(row.get("nombre"), Some(&ProcValue::Text("Banorte".into())));
    assert_eq!(row.get("missing"), None);
}

#[test]
fn test_row_duplicate_column_overwrites_under_first_spelling() {
    let row = Row::from_pairs(vec![
        ("Total", ProcValue::Int(1)),
        ("TOTAL", ProcValue::Int(2)),
    ]);
    assert_eq!(row.len(), 1);
    assert_eq!(row.columns(), &["Total".to_string()]);
    assert_eq!(row.get("total"), Some(&ProcValue::Int(2)));
}

#[test]
fn test_row_lookup_ignores_case_of_non_ascii_names() {
    let row = Row::from_pairs(vec![
        ("Descripción", ProcValue::Text("alta".into())),
        ("AÑO", ProcValue::Int(2024)),
        ("año", ProcValue::Int(2025)),
    ]);
    assert_eq!(row.len(), 2);
    assert_eq!(row.get("DESCRIPCIÓN"), Some(&ProcValue::Text("alta".into())));
    assert_eq!(row.get("Año"), Some(&ProcValue::Int(2025)));
    assert_eq!(row.get("ano"), None);
}

#[test]
fn test_push_values_pads_missing_with_null() {
    let mut set = ResultSet::new(vec!["a".into(), "b".into()]);
    set.push_values(vec![ProcValue::Int(1)]);
    assert_eq!(set.rows()[0].get("b"), Some(&ProcValue::Null));
}

#[test]
fn test_null_column_is_not_empty_text() {
    let mut set = ResultSet::new(vec!["referencia".into()]);
    set.push_values(vec![ProcValue::Null]);
    let value = set.rows()[0].get("referencia").unwrap();
    assert!(value.is_null());
    assert_ne!(value, &ProcValue::Text(String::new()));
}

#[test]
fn test_result_sets_preserve_order_and_counts() {
    let mut sets = ResultSets::new();
    sets.push(bank_set());
    sets.push(ResultSet::new(vec!["x".into()]));
    let mut third = ResultSet::new(vec!["n".into()]);
    for n in 0..3 {
        third.push_values(vec![ProcValue::Int(n)]);
    }
    sets.push(third);

    assert_eq!(sets.len(), 3);
    assert_eq!(sets.row_counts(), vec![1, 0, 3]);
    assert_eq!(sets.total_rows(), 4);
    let ordered: Vec<i64> = sets
        .get(2)
        .unwrap()
        .rows()
        .iter()
        .filter_map(|row| row.get("n").and_then(ProcValue::as_i64))
        .collect();
    assert_eq!(ordered, vec![0, 1, 2]);
}

#[test]
fn test_result_sets_serialize_as_nested_arrays() {
    let mut sets = ResultSets::new();
    sets.push(bank_set());
    sets.push(ResultSet::new(vec!["x".into()]));

    let rendered = serde_json::to_value(&sets).unwrap();
    assert_eq!(
        rendered,
        json!([[{"IdBanco": 5, "Nombre": "Banorte"}], []])
    );
}

#[test]
fn test_empty_result_sets_serialize_as_empty_array() {
    let rendered = serde_json::to_value(ResultSets::new()).unwrap();
    assert_eq!(rendered, json!([]));
}

#[test]
fn test_row_serialization_keeps_column_order() {
    let row = Row::from_pairs(vec![
        ("z", ProcValue::Int(1)),
        ("a", ProcValue::Null),
    ]);
    let rendered = serde_json::to_string(&row).unwrap();
    assert_eq!(rendered, r#"{"z":1,"a":null}"#);
}
