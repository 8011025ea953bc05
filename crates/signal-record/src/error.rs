//! Validation Error Types

use thiserror::Error;

/// Errors while validating an inbound signal payload
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Payload is not a JSON object
    #[error("Signal payload must be a JSON object")]
    NotAnObject,

    /// Signal name not recognised (strict mode only)
    #[error("Unknown signal: {0}")]
    UnknownSignal(String),

    /// Value has the wrong JSON type for the signal
    #[error("{signal} must be {expected}")]
    InvalidType {
        signal: &'static str,
        expected: &'static str,
    },

    /// Value outside a closed domain
    #[error("{signal} value '{value}' is not one of [{allowed}]")]
    InvalidEnumValue {
        signal: &'static str,
        value: String,
        allowed: String,
    },

    /// Integer out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Timestamp could not be parsed
    #[error("{signal} value '{value}' is not a valid timestamp")]
    InvalidTimestamp { signal: &'static str, value: String },

    /// Text or list exceeds configured limits
    #[error("{signal} exceeds the maximum size of {limit}")]
    TooLarge { signal: &'static str, limit: usize },
}
