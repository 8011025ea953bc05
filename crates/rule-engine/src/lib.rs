//! Rule Engine
//!
//! Declarative weighted rules loaded from configuration, scored against a
//! signal record and resolved into a single decision with cascading fallback.

mod config;
mod operator;
mod resolver;
mod rule;
mod scorer;
mod store;

pub use config::{ConditionEntry, OutputConfig, OutputEntry, RuleConfig, RuleEntry, ScoringConfig};
pub use operator::{evaluate, Literal, Operator};
pub use resolver::{explain, recommend_actions, resolve, select, Decision, Selection, DEFAULT_RULE_NAME};
pub use rule::{Condition, LanguagePreference, OutputDescriptor, Rule, UiMode};
pub use scorer::{rank, score_all, score_rule, ScoredRule, MAX_EVIDENCE};
pub use store::{RuleStore, RuleStoreHandle};

use thiserror::Error;

/// Rule loading errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Rules file not found: {0}")]
    NotFound(String),

    #[error("Malformed rules configuration: {0}")]
    Malformed(String),

    #[error("Rule '{rule}': unknown operator '{operator}'")]
    UnknownOperator { rule: String, operator: String },

    #[error("Rule '{rule}': unknown signal '{signal}'")]
    UnknownSignal { rule: String, signal: String },

    #[error("Rule '{rule}': invalid condition on '{signal}': {reason}")]
    InvalidCondition {
        rule: String,
        signal: String,
        reason: String,
    },

    #[error("Rule '{rule}': weight must be positive and finite, got {weight}")]
    InvalidWeight { rule: String, weight: f64 },

    #[error("Rule '{rule}': confidence threshold must be non-negative, got {threshold}")]
    InvalidThreshold { rule: String, threshold: f64 },

    #[error("Duplicate rule name: {0}")]
    DuplicateRule(String),

    #[error("Invalid scoring bounds: {0}")]
    InvalidBounds(String),

    #[error("Default rule needs at least {required} recommended actions, found {found}")]
    InsufficientDefaultActions { required: usize, found: usize },
}
