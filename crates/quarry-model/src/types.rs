//! Semantic column types and lenient value coercion.
//!
//! Coercion never fails loudly: a value that cannot be converted to its
//! column's semantic type becomes `None`, and the call site decides
//! whether that means "omit the column" or "bind NULL".

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Semantic type of a column, as reported by driver introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SemanticType {
    /// Free text; values pass through coercion untouched.
    Text,
    /// Integer or floating-point numbers.
    Numeric,
    /// Boolean flags.
    Boolean,
    /// Calendar date without time.
    Date,
    /// Date with time of day.
    DateTime,
    /// Time of day without date.
    Time,
    /// Type the driver could not classify; treated as text.
    Unknown,
}

impl SemanticType {
    /// Text and unclassified columns skip coercion entirely.
    #[must_use]
    pub fn is_text_like(self) -> bool {
        matches!(self, Self::Text | Self::Unknown)
    }
}

/// A column of a result set: name plus semantic type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name.
    pub name: String,
    /// Semantic type driving value coercion.
    #[serde(rename = "type")]
    pub semantic_type: SemanticType,
}

impl ColumnDescriptor {
    /// Creates a column descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self {
            name: name.into(),
            semantic_type,
        }
    }
}

/// Converts a raw value to a column's semantic type for safe binding.
///
/// Text-like columns pass the value through unchanged, absent and empty
/// included: both are meaningful text. For every other type, absent,
/// NULL, and empty string mean "no value", and an unparseable value
/// degrades to `None` rather than erroring.
#[must_use]
pub fn coerce(semantic_type: SemanticType, value: Option<&Value>) -> Option<Value> {
    if semantic_type.is_text_like() {
        return value.cloned();
    }
    let value = match value {
        None | Some(Value::Null) => return None,
        Some(Value::Text(s)) if s.is_empty() => return None,
        Some(v) => v,
    };
    match semantic_type {
        SemanticType::Numeric => coerce_numeric(value),
        SemanticType::Boolean => coerce_boolean(value),
        SemanticType::Date => coerce_date(value),
        SemanticType::DateTime => coerce_datetime(value),
        SemanticType::Time => coerce_time(value),
        SemanticType::Text | SemanticType::Unknown => Some(value.clone()),
    }
}

fn coerce_numeric(value: &Value) -> Option<Value> {
    match value {
        Value::Int(_) | Value::Float(_) => Some(value.clone()),
        Value::Bool(b) => Some(Value::Int(i64::from(*b))),
        Value::Text(s) => {
            let trimmed = s.trim();
            if let Ok(n) = trimmed.parse::<i64>() {
                return Some(Value::Int(n));
            }
            trimmed.parse::<f64>().ok().map(Value::Float)
        }
        _ => None,
    }
}

fn coerce_boolean(value: &Value) -> Option<Value> {
    match value {
        Value::Bool(_) => Some(value.clone()),
        Value::Int(n) => Some(Value::Bool(*n != 0)),
        Value::Float(f) => Some(Value::Bool(*f != 0.0)),
        Value::Text(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(Value::Bool(true)),
            "false" | "0" | "no" | "off" => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim().trim_end_matches('Z');
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    // A bare date is midnight of that day.
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn coerce_date(value: &Value) -> Option<Value> {
    let s = value.to_text();
    parse_datetime(&s).map(|dt| Value::Text(dt.date().format("%Y-%m-%d").to_string()))
}

fn coerce_datetime(value: &Value) -> Option<Value> {
    let s = value.to_text();
    parse_datetime(&s).map(|dt| Value::Text(dt.format("%Y-%m-%d %H:%M:%S").to_string()))
}

fn coerce_time(value: &Value) -> Option<Value> {
    let s = value.to_text();
    let s = s.trim();
    let parsed = NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()?;
    Some(Value::Text(parsed.format("%H:%M:%S").to_string()))
}
