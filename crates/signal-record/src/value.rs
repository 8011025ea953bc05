//! Signal Values

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Concrete value observed for a signal
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SignalValue {
    /// String value (free text or a closed-domain member)
    Text(String),
    /// Integer value
    Integer(i64),
    /// List of strings
    List(Vec<String>),
    /// Point in time
    Timestamp(DateTime<Utc>),
}

impl SignalValue {
    /// Get the string value, if this is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SignalValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the integer value, if this is an integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            SignalValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the list items, if this is a list
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            SignalValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get the timestamp, if this is a timestamp
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            SignalValue::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Whether the value carries content: non-empty text or list, nonzero integer
    pub fn is_truthy(&self) -> bool {
        match self {
            SignalValue::Text(s) => !s.is_empty(),
            SignalValue::Integer(n) => *n != 0,
            SignalValue::List(items) => !items.is_empty(),
            SignalValue::Timestamp(_) => true,
        }
    }
}

impl fmt::Display for SignalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalValue::Text(s) => f.write_str(s),
            SignalValue::Integer(n) => write!(f, "{}", n),
            SignalValue::List(items) => write!(f, "[{}]", items.join(", ")),
            SignalValue::Timestamp(t) => f.write_str(&t.to_rfc3339()),
        }
    }
}

impl From<&str> for SignalValue {
    fn from(value: &str) -> Self {
        SignalValue::Text(value.to_string())
    }
}

impl From<String> for SignalValue {
    fn from(value: String) -> Self {
        SignalValue::Text(value)
    }
}

impl From<i64> for SignalValue {
    fn from(value: i64) -> Self {
        SignalValue::Integer(value)
    }
}

impl From<i32> for SignalValue {
    fn from(value: i32) -> Self {
        SignalValue::Integer(i64::from(value))
    }
}

impl From<Vec<String>> for SignalValue {
    fn from(value: Vec<String>) -> Self {
        SignalValue::List(value)
    }
}

impl From<DateTime<Utc>> for SignalValue {
    fn from(value: DateTime<Utc>) -> Self {
        SignalValue::Timestamp(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_forms() {
        assert_eq!(SignalValue::from("hi").to_string(), "hi");
        assert_eq!(SignalValue::from(7).to_string(), "7");
        let list = SignalValue::from(vec!["paytm".to_string(), "phonepe".to_string()]);
        assert_eq!(list.to_string(), "[paytm, phonepe]");
    }

    #[test]
    fn test_truthiness() {
        assert!(!SignalValue::from("").is_truthy());
        assert!(!SignalValue::List(vec![]).is_truthy());
        assert!(!SignalValue::from(0).is_truthy());
        assert!(SignalValue::from("no").is_truthy());
    }
}
