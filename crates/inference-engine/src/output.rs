//! Outbound decision payload

use rule_engine::{LanguagePreference, UiMode};
use serde::Serialize;
use uuid::Uuid;

/// Final result of one inference
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferenceOutput {
    pub user_need_state: String,
    /// Always within [0, 10]
    pub confidence: f64,
    pub ui_mode: UiMode,
    pub language_preference: LanguagePreference,
    pub recommended_actions: Vec<String>,
    pub explanation: String,
    pub matched_rule: String,
    pub matched_signals: Vec<String>,
    pub signal_count: usize,
    /// Set when a retrievable explanation trail was recorded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inference_id: Option<Uuid>,
}

/// Per-item outcome of a batch call
#[derive(Debug, Clone, Serialize)]
pub struct BatchItem {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<InferenceOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchItem {
    pub fn ok(output: InferenceOutput) -> Self {
        Self {
            success: true,
            data: Some(output),
            error: None,
        }
    }

    pub fn failed(error: impl ToString) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
        }
    }
}
