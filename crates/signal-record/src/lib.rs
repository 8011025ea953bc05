//! Signal Record
//!
//! Typed, sparse container for the behavioral signals reported by the mobile
//! client, plus validation of inbound payloads.

mod error;
mod record;
mod signal;
mod validator;
mod value;

pub use error::ValidationError;
pub use record::SignalRecord;
pub use signal::{SignalId, SignalKind, DEVICE_CLASSES, NETWORK_TYPES, SUMMARY_CATEGORIES, TIMES_OF_DAY};
pub use validator::{ValidationConfig, Validator};
pub use value::SignalValue;
