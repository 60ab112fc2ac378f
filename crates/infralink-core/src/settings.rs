//! Scalar settings attached to a resource spec.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordered settings map. Iteration follows declaration order.
pub type Settings = IndexMap<String, SettingValue>;

/// A single scalar setting value.
///
/// Remote systems report settings as strings, so two values are considered
/// equal when their wire renderings match or both parse to the same number
/// (see [`SettingValue::matches`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl SettingValue {
    /// Returns `true` if both values render to the same wire string, or if
    /// both are numbers of equal value (`1.0` matches `"1"`).
    pub fn matches(&self, other: &SettingValue) -> bool {
        if self.to_string() == other.to_string() {
            return true;
        }
        if let (Some(a), Some(b)) = (self.as_i64(), other.as_i64()) {
            return a == b;
        }
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Returns the value as an integer, parsing string values if needed.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Str(s) => s.trim().parse().ok(),
            Self::Bool(_) | Self::Float(_) => None,
        }
    }

    /// Returns the value as a float, parsing string values if needed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Str(s) => s.trim().parse().ok(),
            Self::Bool(_) => None,
        }
    }

    /// Returns the string slice for string values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Converts to a JSON value, keeping numbers and booleans typed.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Bool(v) => Value::Bool(*v),
            Self::Int(v) => Value::from(*v),
            Self::Float(v) => Value::from(*v),
            Self::Str(s) => Value::String(s.clone()),
        }
    }

    /// Builds a setting value from a JSON scalar. Arrays, objects and null yield `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float)),
            Value::String(s) => Some(Self::Str(s.clone())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for SettingValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for SettingValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i16> for SettingValue {
    fn from(value: i16) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_matches_compares_wire_form() {
        assert!(SettingValue::Int(604800000).matches(&SettingValue::from("604800000")));
        assert!(SettingValue::Bool(true).matches(&SettingValue::from("true")));
        assert!(!SettingValue::Int(1).matches(&SettingValue::from("2")));
    }

    #[test]
    fn test_matches_compares_numbers_by_value() {
        assert!(SettingValue::Float(1.0).matches(&SettingValue::from("1.0")));
        assert!(SettingValue::from("1.0").matches(&SettingValue::Float(1.0)));
        assert!(SettingValue::Int(1).matches(&SettingValue::from("1.0")));
        assert!(SettingValue::Float(0.5).matches(&SettingValue::from("0.50")));
        assert!(!SettingValue::Float(0.5).matches(&SettingValue::from("0.6")));
        assert!(!SettingValue::Int(i64::MAX).matches(&SettingValue::Int(i64::MAX - 1)));
        assert!(!SettingValue::Bool(true).matches(&SettingValue::from("1")));
        assert!(!SettingValue::from("delete").matches(&SettingValue::from("compact")));
    }

    #[test]
    fn test_as_i64_parses_strings() {
        assert_eq!(SettingValue::from("6").as_i64(), Some(6));
        assert_eq!(SettingValue::Int(3).as_i64(), Some(3));
        assert_eq!(SettingValue::from("six").as_i64(), None);
        assert_eq!(SettingValue::Bool(true).as_i64(), None);
    }

    #[test]
    fn test_json_conversion() {
        assert_eq!(SettingValue::Int(2).to_json(), json!(2));
        assert_eq!(SettingValue::from("delete").to_json(), json!("delete"));
        assert_eq!(SettingValue::from_json(&json!(true)), Some(SettingValue::Bool(true)));
        assert_eq!(SettingValue::from_json(&json!({"a": 1})), None);
    }

    #[test]
    fn test_untagged_deserialize() {
        let settings: Settings =
            serde_json::from_value(json!({"retention.ms": 1000, "cleanup.policy": "compact"}))
                .unwrap();
        assert_eq!(settings["retention.ms"], SettingValue::Int(1000));
        assert_eq!(settings["cleanup.policy"], SettingValue::from("compact"));
        let keys: Vec<&str> = settings.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["retention.ms", "cleanup.policy"]);
    }
}
