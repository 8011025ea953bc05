//! Condition Operators
//!
//! Per-operator evaluation of a comparison literal against a signal value.
//! An absent signal never matches, whatever the operator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use signal_record::SignalValue;
use std::cmp::Ordering;
use std::fmt;

/// Comparison operator of a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equals,
    NotEquals,
    InSet,
    NotInSet,
    Between,
    GreaterThan,
    LessThan,
    Contains,
}

impl Operator {
    /// Resolve an operator name. `in` and `not_in` are accepted aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "equals" => Some(Operator::Equals),
            "not_equals" => Some(Operator::NotEquals),
            "in_set" | "in" => Some(Operator::InSet),
            "not_in_set" | "not_in" => Some(Operator::NotInSet),
            "between" => Some(Operator::Between),
            "greater_than" => Some(Operator::GreaterThan),
            "less_than" => Some(Operator::LessThan),
            "contains" => Some(Operator::Contains),
            _ => None,
        }
    }

    /// Canonical operator name
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "not_equals",
            Operator::InSet => "in_set",
            Operator::NotInSet => "not_in_set",
            Operator::Between => "between",
            Operator::GreaterThan => "greater_than",
            Operator::LessThan => "less_than",
            Operator::Contains => "contains",
        }
    }

    /// Check that a literal has a shape this operator can use
    pub fn check(&self, literal: &Literal) -> Result<(), String> {
        match self {
            Operator::Between => match literal {
                Literal::List(bounds) if bounds.len() == 2 && bounds.iter().all(Literal::is_scalar) => Ok(()),
                _ => Err("between requires a two-element [low, high] range".to_string()),
            },
            Operator::GreaterThan | Operator::LessThan if !literal.is_scalar() => {
                Err(format!("{} requires a single comparison value", self))
            }
            Operator::Contains => match literal {
                Literal::Text(_) => Ok(()),
                Literal::List(items) if items.iter().all(|i| matches!(i, Literal::Text(_))) => Ok(()),
                _ => Err("contains requires a string or a list of strings".to_string()),
            },
            _ => Ok(()),
        }
    }

    /// Apply the operator to a present signal value
    pub fn matches(&self, expected: &Literal, actual: &SignalValue) -> bool {
        match self {
            Operator::Equals => equals(expected, actual),
            Operator::NotEquals => !equals(expected, actual),
            Operator::InSet => in_set(expected, actual),
            Operator::NotInSet => !in_set(expected, actual),
            Operator::Between => match expected {
                Literal::List(bounds) if bounds.len() == 2 => {
                    matches!(compare(actual, &bounds[0]), Some(Ordering::Greater | Ordering::Equal))
                        && matches!(compare(actual, &bounds[1]), Some(Ordering::Less | Ordering::Equal))
                }
                _ => false,
            },
            Operator::GreaterThan => compare(actual, expected) == Some(Ordering::Greater),
            Operator::LessThan => compare(actual, expected) == Some(Ordering::Less),
            Operator::Contains => contains(expected, actual),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison value written in a rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<Literal>),
}

impl Literal {
    fn is_scalar(&self) -> bool {
        !matches!(self, Literal::List(_))
    }
}

/// Evaluate one condition. Returns `(matched, score)` where the score is the
/// weight on a match and `0.0` otherwise.
pub fn evaluate(operator: Operator, expected: &Literal, actual: Option<&SignalValue>, weight: f64) -> (bool, f64) {
    match actual {
        Some(value) if operator.matches(expected, value) => (true, weight),
        _ => (false, 0.0),
    }
}

fn equals(expected: &Literal, actual: &SignalValue) -> bool {
    match (expected, actual) {
        (Literal::Text(e), SignalValue::Text(a)) => e == a,
        (Literal::Integer(e), SignalValue::Integer(a)) => e == a,
        (Literal::Float(e), SignalValue::Integer(a)) => *e == *a as f64,
        (Literal::Text(e), SignalValue::Timestamp(a)) => parse_timestamp(e).is_some_and(|e| e == *a),
        (Literal::List(items), SignalValue::List(values)) => {
            items.len() == values.len()
                && items
                    .iter()
                    .zip(values)
                    .all(|(item, value)| matches!(item, Literal::Text(t) if t == value))
        }
        _ => false,
    }
}

fn in_set(expected: &Literal, actual: &SignalValue) -> bool {
    match expected {
        Literal::List(items) => items.iter().any(|item| equals(item, actual)),
        single => equals(single, actual),
    }
}

fn contains(expected: &Literal, actual: &SignalValue) -> bool {
    let needles: Vec<&str> = match expected {
        Literal::Text(t) => vec![t.as_str()],
        Literal::List(items) => items
            .iter()
            .filter_map(|item| match item {
                Literal::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect(),
        _ => return false,
    };

    match actual {
        SignalValue::Text(text) => needles.iter().any(|n| text.contains(n)),
        SignalValue::List(values) => values
            .iter()
            .any(|value| needles.iter().any(|n| value.contains(n))),
        _ => false,
    }
}

/// Orders a signal value against a scalar literal; `None` when the types do not compare
fn compare(actual: &SignalValue, expected: &Literal) -> Option<Ordering> {
    match (actual, expected) {
        (SignalValue::Integer(a), Literal::Integer(e)) => Some(a.cmp(e)),
        (SignalValue::Integer(a), Literal::Float(e)) => (*a as f64).partial_cmp(e),
        (SignalValue::Text(a), Literal::Text(e)) => Some(a.as_str().cmp(e.as_str())),
        (SignalValue::Timestamp(a), Literal::Text(e)) => parse_timestamp(e).map(|e| a.cmp(&e)),
        _ => None,
    }
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> SignalValue {
        SignalValue::Text(s.to_string())
    }

    fn lit(s: &str) -> Literal {
        Literal::Text(s.to_string())
    }

    fn list(items: &[&str]) -> Literal {
        Literal::List(items.iter().map(|s| lit(s)).collect())
    }

    #[test]
    fn test_absent_never_matches() {
        for op in [
            Operator::Equals,
            Operator::NotEquals,
            Operator::InSet,
            Operator::NotInSet,
            Operator::Between,
            Operator::GreaterThan,
            Operator::LessThan,
            Operator::Contains,
        ] {
            assert_eq!(evaluate(op, &lit("x"), None, 2.0), (false, 0.0), "{}", op);
        }
    }

    #[test]
    fn test_score_is_weight() {
        assert_eq!(evaluate(Operator::Equals, &lit("3g"), Some(&text("3g")), 2.5), (true, 2.5));
        assert_eq!(evaluate(Operator::Equals, &lit("4g"), Some(&text("3g")), 2.5), (false, 0.0));
    }

    #[test]
    fn test_not_equals_and_sets() {
        assert!(Operator::NotEquals.matches(&lit("en"), &text("hi")));
        assert!(!Operator::NotEquals.matches(&lit("hi"), &text("hi")));
        assert!(Operator::InSet.matches(&list(&["2g", "3g"]), &text("3g")));
        assert!(!Operator::InSet.matches(&list(&["2g", "3g"]), &text("wifi")));
        assert!(Operator::NotInSet.matches(&list(&["2g", "3g"]), &text("wifi")));
    }

    #[test]
    fn test_between_inclusive() {
        let range = Literal::List(vec![Literal::Integer(5), Literal::Integer(9)]);
        assert!(Operator::Between.matches(&range, &SignalValue::Integer(5)));
        assert!(Operator::Between.matches(&range, &SignalValue::Integer(9)));
        assert!(!Operator::Between.matches(&range, &SignalValue::Integer(10)));
        assert!(!Operator::Between.matches(&range, &SignalValue::Integer(4)));

        let short = Literal::List(vec![Literal::Integer(5)]);
        assert!(!Operator::Between.matches(&short, &SignalValue::Integer(5)));
    }

    #[test]
    fn test_type_mismatch_never_matches() {
        assert!(!Operator::GreaterThan.matches(&Literal::Integer(3), &text("10")));
        assert!(!Operator::LessThan.matches(&lit("b"), &SignalValue::Integer(1)));
        assert!(!Operator::Equals.matches(&Literal::Integer(7), &text("7")));
    }

    #[test]
    fn test_numeric_comparisons() {
        assert!(Operator::GreaterThan.matches(&Literal::Integer(3), &SignalValue::Integer(4)));
        assert!(!Operator::GreaterThan.matches(&Literal::Integer(4), &SignalValue::Integer(4)));
        assert!(Operator::LessThan.matches(&Literal::Float(2.5), &SignalValue::Integer(2)));
        assert!(Operator::Equals.matches(&Literal::Float(8.0), &SignalValue::Integer(8)));
    }

    #[test]
    fn test_contains() {
        assert!(Operator::Contains.matches(&lit("book"), &text("khatabook")));
        assert!(Operator::Contains.matches(&list(&["vyapar", "book"]), &text("khatabook")));

        let apps = SignalValue::List(vec!["khatabook".to_string(), "okcredit".to_string()]);
        assert!(Operator::Contains.matches(&lit("credit"), &apps));
        assert!(!Operator::Contains.matches(&lit("paytm"), &apps));
        assert!(!Operator::Contains.matches(&lit("1"), &SignalValue::Integer(1)));
    }

    #[test]
    fn test_timestamp_comparison() {
        let ts = DateTime::parse_from_rfc3339("2024-10-31T07:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let value = SignalValue::Timestamp(ts);
        assert!(Operator::GreaterThan.matches(&lit("2024-01-01T00:00:00Z"), &value));
        assert!(Operator::Equals.matches(&lit("2024-10-31T07:00:00Z"), &value));
        assert!(!Operator::GreaterThan.matches(&lit("not a date"), &value));
    }

    #[test]
    fn test_aliases_and_checks() {
        assert_eq!(Operator::from_name("in"), Some(Operator::InSet));
        assert_eq!(Operator::from_name("not_in"), Some(Operator::NotInSet));
        assert_eq!(Operator::from_name("regex"), None);

        assert!(Operator::Between.check(&Literal::Integer(5)).is_err());
        assert!(Operator::Between
            .check(&Literal::List(vec![Literal::Integer(1), Literal::Integer(2)]))
            .is_ok());
        assert!(Operator::GreaterThan.check(&list(&["a"])).is_err());
        assert!(Operator::Contains.check(&Literal::Integer(1)).is_err());
        assert!(Operator::Equals.check(&Literal::Integer(1)).is_ok());
    }
}
