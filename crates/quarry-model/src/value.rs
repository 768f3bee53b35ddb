//! Raw cell and bind values.
//!
//! Drivers hand every cell over in this uniform representation; the bind
//! normalizer and the diff/validation engines consume it without knowing
//! which engine produced it.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A named bind-value map, as supplied alongside a SQL string with
/// `:name` placeholders. An [`Value::Array`] entry marks an array-valued
/// parameter that expands to multiple placeholders.
pub type BindMap = BTreeMap<String, Value>;

/// A raw value as produced by a driver or typed into the grid editor.
///
/// The untagged serde mapping keeps the wire shape plain JSON: scalars
/// stay scalars, arrays stay arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Ordered sequence, used for array-valued bind parameters.
    Array(Vec<Value>),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the text content if this is a [`Value::Text`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns the elements if this is a [`Value::Array`].
    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Interprets this value as a number, if it has one.
    ///
    /// Integers, floats, and numeric-looking text all qualify; booleans
    /// and everything else do not.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(f) => Some(*f),
            Self::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Display form used by diff comparison and string predicates.
    ///
    /// `Null` renders empty so that a NULL cell and a missing cell
    /// compare equal in row diffs.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Int(n) => n.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => s.clone(),
            Self::Array(items) => {
                let parts: Vec<String> = items.iter().map(Value::to_text).collect();
                parts.join(",")
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(String::from(s))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Array(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

/// Interprets a value as an ordered sequence for `in`/`between`-style
/// operators.
///
/// A real array is taken as-is; a bracketed JSON-looking string is parsed;
/// any other text splits on commas. `Null` yields an empty sequence, and
/// remaining scalars a one-element one.
#[must_use]
pub fn parse_sequence(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::Null => Vec::new(),
        Value::Text(s) => {
            let trimmed = s.trim();
            if trimmed.starts_with('[') && trimmed.ends_with(']') {
                if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(trimmed) {
                    return items;
                }
            }
            trimmed
                .split(',')
                .map(|part| Value::Text(part.trim().to_string()))
                .collect()
        }
        other => vec![other.clone()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_text() {
        assert_eq!(Value::Null.to_text(), "");
        assert_eq!(Value::Bool(true).to_text(), "true");
        assert_eq!(Value::Int(42).to_text(), "42");
        assert_eq!(Value::Float(2.5).to_text(), "2.5");
        assert_eq!(Value::Text(String::from("abc")).to_text(), "abc");
        assert_eq!(
            Value::Array(vec![Value::Int(1), Value::Int(2)]).to_text(),
            "1,2"
        );
    }

    #[test]
    fn test_as_number() {
        assert_eq!(Value::Int(7).as_number(), Some(7.0));
        assert_eq!(Value::Float(1.5).as_number(), Some(1.5));
        assert_eq!(Value::Text(String::from(" 12 ")).as_number(), Some(12.0));
        assert_eq!(Value::Text(String::from("abc")).as_number(), None);
        assert_eq!(Value::Bool(true).as_number(), None);
        assert_eq!(Value::Null.as_number(), None);
    }

    #[test]
    fn test_from_conversions() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(42_i32), Value::Int(42));
        assert_eq!(Value::from("x"), Value::Text(String::from("x")));
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(1_i64)), Value::Int(1));
    }

    #[test]
    fn test_json_round_trip() {
        let v = Value::Array(vec![
            Value::Null,
            Value::Int(1),
            Value::Text(String::from("a")),
        ]);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#"[null,1,"a"]"#);
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn test_parse_sequence_array() {
        let v = Value::Array(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(parse_sequence(&v), vec![Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn test_parse_sequence_bracketed_string() {
        let v = Value::Text(String::from("[1, 2, 3]"));
        assert_eq!(
            parse_sequence(&v),
            vec![Value::Int(1), Value::Int(2), Value::Int(3)]
        );
    }

    #[test]
    fn test_parse_sequence_csv_string() {
        let v = Value::Text(String::from("a, b ,c"));
        assert_eq!(
            parse_sequence(&v),
            vec![
                Value::Text(String::from("a")),
                Value::Text(String::from("b")),
                Value::Text(String::from("c")),
            ]
        );
    }

    #[test]
    fn test_parse_sequence_null_and_scalar() {
        assert!(parse_sequence(&Value::Null).is_empty());
        assert_eq!(parse_sequence(&Value::Int(5)), vec![Value::Int(5)]);
    }
}
