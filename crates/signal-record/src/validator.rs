//! Payload Validator
//!
//! Converts an inbound JSON payload into a typed [`SignalRecord`].

use crate::error::ValidationError;
use crate::record::SignalRecord;
use crate::signal::{SignalId, SignalKind};
use crate::value::SignalValue;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Reject payload keys that are not known signals
    pub reject_unknown: bool,
    /// Maximum characters in a text value
    pub max_text_len: usize,
    /// Maximum items in a list value
    pub max_list_items: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            reject_unknown: false,
            max_text_len: 512,
            max_list_items: 64,
        }
    }
}

/// Validator for inbound signal payloads
pub struct Validator {
    config: ValidationConfig,
    index: HashMap<&'static str, SignalId>,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        let index = SignalId::ALL.iter().map(|id| (id.as_str(), *id)).collect();
        Self { config, index }
    }

    /// Validate a payload into a signal record. `null` values are treated as absent.
    pub fn validate(&self, payload: &Value) -> Result<SignalRecord, ValidationError> {
        let object = payload.as_object().ok_or(ValidationError::NotAnObject)?;
        let mut record = SignalRecord::new();

        for (name, raw) in object {
            let Some(id) = self.index.get(name.as_str()).copied() else {
                if self.config.reject_unknown {
                    return Err(ValidationError::UnknownSignal(name.clone()));
                }
                debug!("Ignoring unknown signal: {}", name);
                continue;
            };

            if raw.is_null() {
                continue;
            }

            let value = self.convert(id, raw)?;
            record.insert(id, value);
        }

        debug!("Validated payload: {} known signals", record.len());
        Ok(record)
    }

    fn convert(&self, id: SignalId, raw: &Value) -> Result<SignalValue, ValidationError> {
        let signal = id.as_str();
        match id.kind() {
            SignalKind::Text => self.text(signal, raw).map(SignalValue::Text),
            SignalKind::Enumerated(allowed) => {
                let value = self.text(signal, raw)?;
                if allowed.contains(&value.as_str()) {
                    Ok(SignalValue::Text(value))
                } else {
                    Err(ValidationError::InvalidEnumValue {
                        signal,
                        value,
                        allowed: allowed.join(", "),
                    })
                }
            }
            SignalKind::Integer { min, max } => {
                let value = integer(signal, raw)?;
                if value < min || value > max {
                    Err(ValidationError::OutOfRange {
                        field: signal,
                        value,
                        min,
                        max,
                    })
                } else {
                    Ok(SignalValue::Integer(value))
                }
            }
            SignalKind::List => self.list(signal, raw).map(SignalValue::List),
            SignalKind::TextOrList => match raw {
                Value::Array(_) => self.list(signal, raw).map(SignalValue::List),
                _ => self
                    .text(signal, raw)
                    .map(SignalValue::Text)
                    .map_err(|_| ValidationError::InvalidType {
                        signal,
                        expected: "a string or a list of strings",
                    }),
            },
            SignalKind::Timestamp => timestamp(signal, raw).map(SignalValue::Timestamp),
        }
    }

    fn text(&self, signal: &'static str, raw: &Value) -> Result<String, ValidationError> {
        let value = raw.as_str().ok_or(ValidationError::InvalidType {
            signal,
            expected: "a string",
        })?;
        if value.chars().count() > self.config.max_text_len {
            return Err(ValidationError::TooLarge {
                signal,
                limit: self.config.max_text_len,
            });
        }
        Ok(value.to_string())
    }

    fn list(&self, signal: &'static str, raw: &Value) -> Result<Vec<String>, ValidationError> {
        let items = raw.as_array().ok_or(ValidationError::InvalidType {
            signal,
            expected: "a list of strings",
        })?;
        if items.len() > self.config.max_list_items {
            return Err(ValidationError::TooLarge {
                signal,
                limit: self.config.max_list_items,
            });
        }
        items
            .iter()
            .map(|item| {
                self.text(signal, item).map_err(|_| ValidationError::InvalidType {
                    signal,
                    expected: "a list of strings",
                })
            })
            .collect()
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

/// Accepts JSON integers and integral numeric strings
fn integer(signal: &'static str, raw: &Value) -> Result<i64, ValidationError> {
    let invalid = ValidationError::InvalidType {
        signal,
        expected: "an integer",
    };
    match raw {
        Value::Number(n) => n.as_i64().ok_or(invalid),
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| invalid),
        _ => Err(invalid),
    }
}

/// Accepts RFC 3339 strings and unix seconds
fn timestamp(signal: &'static str, raw: &Value) -> Result<DateTime<Utc>, ValidationError> {
    let invalid = || ValidationError::InvalidTimestamp {
        signal,
        value: raw.to_string(),
    };
    match raw {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|_| invalid()),
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .ok_or_else(invalid),
        _ => Err(invalid()),
    }
}
