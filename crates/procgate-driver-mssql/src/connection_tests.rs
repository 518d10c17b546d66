//! Tests for MS SQL Server connection module

use crate::connection::{
    MssqlConnectionError, TiberiusParam, column_data_to_value, params_to_tiberius,
    value_to_tiberius_param,
};
use chrono::{NaiveDate, NaiveDateTime};
use procgate_core::{ParamMap, ProcValue, ProcgateError};
use rust_decimal::Decimal;
use std::borrow::Cow;
use std::str::FromStr;
use tiberius::numeric::Numeric;
use tiberius::{ColumnData, ToSql};

fn leak<T>(value: T) -> &'static T {
    Box::leak(Box::new(value))
}

fn sample_timestamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 15)
        .unwrap()
        .and_hms_opt(10, 30, 0)
        .unwrap()
}

// Parameter conversion tests

#[test]
fn test_value_to_tiberius_null() {
    assert_eq!(value_to_tiberius_param(&ProcValue::Null), TiberiusParam::Null);
    assert!(matches!(
        TiberiusParam::Null.to_sql(),
        ColumnData::String(None)
    ));
}

#[test]
fn test_value_to_tiberius_int() {
    let param = value_to_tiberius_param(&ProcValue::Int(42));
    assert_eq!(param, TiberiusParam::I64(42));
    assert!(matches!(param.to_sql(), ColumnData::I64(Some(42))));
}

#[test]
fn test_value_to_tiberius_decimal_keeps_scale() {
    let decimal = Decimal::from_str("150.50").unwrap();
    let param = value_to_tiberius_param(&ProcValue::Decimal(decimal));
    assert_eq!(
        param,
        TiberiusParam::Numeric {
            value: 15050,
            scale: 2
        }
    );

    match param.to_sql() {
        ColumnData::Numeric(Some(n)) => {
            assert_eq!(n.value(), 15050);
            assert_eq!(n.scale(), 2);
        }
        other => panic!("expected numeric, got {:?}", other),
    }
}

#[test]
fn test_value_to_tiberius_float() {
    let param = value_to_tiberius_param(&ProcValue::Float(1e300));
    assert_eq!(param, TiberiusParam::F64(1e300));
}

#[test]
fn test_value_to_tiberius_text_and_raw() {
    assert_eq!(
        value_to_tiberius_param(&ProcValue::Text("hola".into())),
        TiberiusParam::String("hola".into())
    );
    assert_eq!(
        value_to_tiberius_param(&ProcValue::Raw("[1,2]".into())),
        TiberiusParam::String("[1,2]".into())
    );
}

#[test]
fn test_empty_string_is_not_null() {
    let param = value_to_tiberius_param(&ProcValue::Text(String::new()));
    assert!(matches!(
        param.to_sql(),
        ColumnData::String(Some(ref s)) if s.is_empty()
    ));
}

#[test]
fn test_value_to_tiberius_timestamp() {
    let ts = sample_timestamp();
    let param = value_to_tiberius_param(&ProcValue::Timestamp(ts));
    assert_eq!(param, TiberiusParam::DateTime(ts));
}

#[test]
fn test_params_to_tiberius_preserves_order() {
    let params = ParamMap::new()
        .with("b", 1i64)
        .unwrap()
        .with("a", true)
        .unwrap()
        .with("c", ProcValue::Null)
        .unwrap();

    assert_eq!(
        params_to_tiberius(&params),
        vec![
            TiberiusParam::I64(1),
            TiberiusParam::Bool(true),
            TiberiusParam::Null
        ]
    );
}

// Column decoding tests

#[test]
fn test_column_null_of_any_type() {
    for data in [
        ColumnData::I32(None),
        ColumnData::String(None),
        ColumnData::Numeric(None),
        ColumnData::Bit(None),
        ColumnData::F64(None),
    ] {
        assert_eq!(column_data_to_value(data).unwrap(), ProcValue::Null);
    }
}

#[test]
fn test_column_integers() {
    assert_eq!(
        column_data_to_value(ColumnData::U8(Some(7))).unwrap(),
        ProcValue::Int(7)
    );
    assert_eq!(
        column_data_to_value(ColumnData::I16(Some(-3))).unwrap(),
        ProcValue::Int(-3)
    );
    assert_eq!(
        column_data_to_value(ColumnData::I64(Some(9_999_999_999))).unwrap(),
        ProcValue::Int(9_999_999_999)
    );
}

#[test]
fn test_column_numeric_to_decimal() {
    let data = ColumnData::Numeric(Some(Numeric::new_with_scale(15050, 2)));
    assert_eq!(
        column_data_to_value(data).unwrap(),
        ProcValue::Decimal(Decimal::from_str("150.50").unwrap())
    );
}

#[test]
fn test_column_string() {
    let data = ColumnData::String(Some(Cow::Owned("Banco Central".to_string())));
    assert_eq!(
        column_data_to_value(data).unwrap(),
        ProcValue::Text("Banco Central".into())
    );
}

#[test]
fn test_column_binary_as_hex() {
    let data = ColumnData::Binary(Some(Cow::Owned(vec![0xde, 0xad, 0x01])));
    assert_eq!(
        column_data_to_value(data).unwrap(),
        ProcValue::Text("dead01".into())
    );
}

#[test]
fn test_column_bit() {
    assert_eq!(
        column_data_to_value(ColumnData::Bit(Some(true))).unwrap(),
        ProcValue::Bool(true)
    );
}

#[test]
fn test_column_datetime2() {
    let ts = leak(sample_timestamp());
    assert_eq!(
        column_data_to_value(ts.to_sql()).unwrap(),
        ProcValue::Timestamp(*ts)
    );
}

#[test]
fn test_column_date_at_midnight() {
    let date = leak(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    let expected = date.and_hms_opt(0, 0, 0).unwrap();
    assert_eq!(
        column_data_to_value(date.to_sql()).unwrap(),
        ProcValue::Timestamp(expected)
    );
}

// Error conversion tests

#[test]
fn test_error_connection_closed_maps_to_connection() {
    let err: ProcgateError = MssqlConnectionError::ConnectionClosed.into();
    assert!(matches!(err, ProcgateError::Connection(_)));
}

#[test]
fn test_error_type_conversion_maps_to_conversion() {
    let err: ProcgateError = MssqlConnectionError::TypeConversion("bad".into()).into();
    assert!(matches!(err, ProcgateError::Conversion(ref m) if m == "bad"));
}

#[test]
fn test_error_execution_maps_to_query() {
    let err: ProcgateError = MssqlConnectionError::ExecutionFailed("boom".into()).into();
    assert!(matches!(err, ProcgateError::Query(_)));
}

#[test]
fn test_error_display() {
    let err = MssqlConnectionError::AuthenticationFailed("login failed".into());
    assert_eq!(err.to_string(), "Authentication failed: login failed");
}
