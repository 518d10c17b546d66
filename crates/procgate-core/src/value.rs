//! Dynamically-typed values bound to procedure parameters and decoded from columns

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::str::FromStr;

use crate::ProcgateError;

/// Timestamp layout used when a `ProcValue::Timestamp` is rendered as text
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A value that can be bound as a procedure parameter or read from a result column
#[derive(Debug, Clone, PartialEq)]
pub enum ProcValue {
    /// SQL NULL; distinct from an empty string
    Null,
    /// 64-bit signed integer
    Int(i64),
    /// Exact decimal
    Decimal(Decimal),
    /// 64-bit floating point
    Float(f64),
    /// Boolean
    Bool(bool),
    /// UTF-8 string
    Text(String),
    /// Date and time without timezone
    Timestamp(NaiveDateTime),
    /// Serialized JSON of a structured (array/object) value
    Raw(String),
}

impl ProcValue {
    /// Convert a JSON value received from a caller.
    ///
    /// Numbers go through [`coerce_number`]; strings and booleans pass through
    /// unchanged; arrays and objects are kept as their serialized text.
    pub fn from_json(value: &JsonValue) -> crate::Result<Self> {
        Ok(match value {
            JsonValue::Null => ProcValue::Null,
            JsonValue::Bool(b) => ProcValue::Bool(*b),
            JsonValue::Number(n) => coerce_number(n)?,
            JsonValue::String(s) => ProcValue::Text(s.clone()),
            JsonValue::Array(_) | JsonValue::Object(_) => ProcValue::Raw(value.to_string()),
        })
    }

    /// Render the value as JSON for a response body
    pub fn to_json(&self) -> JsonValue {
        match self {
            ProcValue::Null => JsonValue::Null,
            ProcValue::Int(v) => JsonValue::from(*v),
            ProcValue::Decimal(v) => serde_json::Number::from_str(&v.normalize().to_string())
                .map(JsonValue::Number)
                .unwrap_or_else(|_| JsonValue::String(v.to_string())),
            ProcValue::Float(v) => serde_json::Number::from_f64(*v)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            ProcValue::Bool(v) => JsonValue::Bool(*v),
            ProcValue::Text(v) => JsonValue::String(v.clone()),
            ProcValue::Timestamp(v) => JsonValue::String(v.format(TIMESTAMP_FORMAT).to_string()),
            ProcValue::Raw(v) => {
                serde_json::from_str(v).unwrap_or_else(|_| JsonValue::String(v.clone()))
            }
        }
    }

    /// Check if the value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, ProcValue::Null)
    }

    /// Try to get as a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ProcValue::Text(s) | ProcValue::Raw(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ProcValue::Int(v) => Some(*v),
            ProcValue::Bool(v) => Some(*v as i64),
            _ => None,
        }
    }

    /// Try to get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ProcValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Short name of the variant, used in logs
    pub fn type_name(&self) -> &'static str {
        match self {
            ProcValue::Null => "null",
            ProcValue::Int(_) => "int",
            ProcValue::Decimal(_) => "decimal",
            ProcValue::Float(_) => "float",
            ProcValue::Bool(_) => "bool",
            ProcValue::Text(_) => "text",
            ProcValue::Timestamp(_) => "timestamp",
            ProcValue::Raw(_) => "raw",
        }
    }
}

/// Coerce a JSON number, preferring integer, then decimal, then float.
///
/// The number's own text is used so that `150.50` binds as an exact decimal
/// instead of passing through a binary float first. A number outside the
/// range of all three (such as `1e400`) is an `InvalidParameter` error.
pub fn coerce_number(number: &serde_json::Number) -> crate::Result<ProcValue> {
    if let Some(v) = number.as_i64() {
        return Ok(ProcValue::Int(v));
    }
    coerce_number_text(&number.to_string())
        .or_else(|| number.as_f64().map(ProcValue::Float))
        .ok_or_else(|| {
            ProcgateError::InvalidParameter(format!("number {} is out of range", number))
        })
}

/// Coerce numeric text, preferring integer, then decimal, then float.
///
/// Returns `None` when the text is not a finite number.
///
/// # Example
///
/// ```
/// use procgate_core::{coerce_number_text, ProcValue};
///
/// assert_eq!(coerce_number_text("42"), Some(ProcValue::Int(42)));
/// assert!(matches!(coerce_number_text("150.50"), Some(ProcValue::Decimal(_))));
/// assert!(matches!(coerce_number_text("1e300"), Some(ProcValue::Float(_))));
/// assert_eq!(coerce_number_text("abc"), None);
/// ```
pub fn coerce_number_text(text: &str) -> Option<ProcValue> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(v) = text.parse::<i64>() {
        return Some(ProcValue::Int(v));
    }

    let decimal = if text.contains(['e', 'E']) {
        Decimal::from_scientific(text).ok()
    } else {
        Decimal::from_str_exact(text).ok()
    };
    if let Some(v) = decimal {
        return Some(ProcValue::Decimal(v));
    }

    match text.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(ProcValue::Float(v)),
        _ => None,
    }
}

impl Serialize for ProcValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl std::fmt::Display for ProcValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcValue::Null => write!(f, "NULL"),
            ProcValue::Int(v) => write!(f, "{}", v),
            ProcValue::Decimal(v) => write!(f, "{}", v),
            ProcValue::Float(v) => write!(f, "{}", v),
            ProcValue::Bool(v) => write!(f, "{}", v),
            ProcValue::Text(v) => write!(f, "{}", v),
            ProcValue::Timestamp(v) => write!(f, "{}", v.format(TIMESTAMP_FORMAT)),
            ProcValue::Raw(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for ProcValue {
    fn from(v: i64) -> Self {
        ProcValue::Int(v)
    }
}

impl From<i32> for ProcValue {
    fn from(v: i32) -> Self {
        ProcValue::Int(v as i64)
    }
}

impl From<f64> for ProcValue {
    fn from(v: f64) -> Self {
        ProcValue::Float(v)
    }
}

impl From<Decimal> for ProcValue {
    fn from(v: Decimal) -> Self {
        ProcValue::Decimal(v)
    }
}

impl From<bool> for ProcValue {
    fn from(v: bool) -> Self {
        ProcValue::Bool(v)
    }
}

impl From<&str> for ProcValue {
    fn from(v: &str) -> Self {
        ProcValue::Text(v.to_string())
    }
}

impl From<String> for ProcValue {
    fn from(v: String) -> Self {
        ProcValue::Text(v)
    }
}

impl From<NaiveDateTime> for ProcValue {
    fn from(v: NaiveDateTime) -> Self {
        ProcValue::Timestamp(v)
    }
}

impl<T: Into<ProcValue>> From<Option<T>> for ProcValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(ProcValue::Null)
    }
}
