//! Inference Engine
//!
//! Runs one inference end to end: rule scoring, the knowledge adapters in
//! order, score adjustment, decision resolution and the explanation trail.

mod adjust;
mod confidence;
mod correlation;
mod engine;
mod output;

pub use adjust::{adjust, KeywordMatcher, PatternMatcher, TableMatcher};
pub use confidence::{final_confidence, sources_agree, total_adjustment};
pub use correlation::{contextual_merge, correlations, decision_factors, ContextualMerge};
pub use engine::{InferenceEngine, EXTERNAL_REASONING_RULE};
pub use output::{BatchItem, InferenceOutput};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that stop an inference
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid signals: {0}")]
    Validation(#[from] signal_record::ValidationError),
    #[error("Rule error: {0}")]
    Rules(#[from] rule_engine::RuleError),
    #[error("Explanation error: {0}")]
    Explanation(#[from] explanation::ExplanationError),
}

/// Tuning of the adapter merge
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Cap on the summed adapter deltas added to the final confidence
    pub max_adjustment: f64,
    /// Added when all three adapter categories contributed
    pub agreement_bonus: f64,
    /// Domain prompt suggestions considered for the action list
    pub suggestion_count: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_adjustment: 2.0,
            agreement_bonus: 0.5,
            suggestion_count: 2,
        }
    }
}
