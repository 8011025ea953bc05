//! Sparse Signal Record

use crate::signal::{SignalId, SUMMARY_CATEGORIES};
use crate::value::SignalValue;
use serde::Serialize;
use std::collections::BTreeMap;

/// Sparse set of observed signals. A missing key means "unknown".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SignalRecord {
    values: BTreeMap<SignalId, SignalValue>,
}

impl SignalRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, id: SignalId, value: impl Into<SignalValue>) -> Self {
        self.insert(id, value);
        self
    }

    /// Set a signal value, replacing any previous one
    pub fn insert(&mut self, id: SignalId, value: impl Into<SignalValue>) {
        self.values.insert(id, value.into());
    }

    /// Get a signal value, `None` when unknown
    pub fn get(&self, id: SignalId) -> Option<&SignalValue> {
        self.values.get(&id)
    }

    /// Whether the signal is known
    pub fn contains(&self, id: SignalId) -> bool {
        self.values.contains_key(&id)
    }

    /// Text value of a signal
    pub fn text(&self, id: SignalId) -> Option<&str> {
        self.get(id).and_then(SignalValue::as_text)
    }

    /// Integer value of a signal
    pub fn integer(&self, id: SignalId) -> Option<i64> {
        self.get(id).and_then(SignalValue::as_integer)
    }

    /// List value of a signal
    pub fn list(&self, id: SignalId) -> Option<&[String]> {
        self.get(id).and_then(SignalValue::as_list)
    }

    /// Whether a text signal equals `expected`
    pub fn is(&self, id: SignalId, expected: &str) -> bool {
        self.text(id) == Some(expected)
    }

    /// Whether a text signal is one of `options`
    pub fn is_one_of(&self, id: SignalId, options: &[&str]) -> bool {
        self.text(id).map_or(false, |v| options.contains(&v))
    }

    /// Whether the signal is a non-empty list
    pub fn has_items(&self, id: SignalId) -> bool {
        self.list(id).map_or(false, |items| !items.is_empty())
    }

    /// Whether an app signal names at least one app, as a list or as text
    pub fn has_apps(&self, id: SignalId) -> bool {
        self.has_items(id) || self.text(id).is_some_and(|t| !t.is_empty())
    }

    /// Whether the signal is known and carries content
    pub fn is_truthy(&self, id: SignalId) -> bool {
        self.get(id).map_or(false, SignalValue::is_truthy)
    }

    /// Number of known signals
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no signal is known
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate known signals in identifier order
    pub fn iter(&self) -> impl Iterator<Item = (SignalId, &SignalValue)> {
        self.values.iter().map(|(id, value)| (*id, value))
    }

    /// Count known signals per summary category, omitting empty categories
    pub fn category_summary(&self) -> Vec<(&'static str, usize)> {
        SUMMARY_CATEGORIES
            .iter()
            .filter_map(|(category, ids)| {
                let count = ids.iter().filter(|id| self.contains(**id)).count();
                (count > 0).then_some((*category, count))
            })
            .collect()
    }

    /// JSON snapshot keyed by wire name
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .values
            .iter()
            .map(|(id, value)| {
                let json = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
                (id.as_str().to_string(), json)
            })
            .collect();
        serde_json::Value::Object(map)
    }
}
