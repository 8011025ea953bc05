//! Adapter contract

use async_trait::async_trait;
use serde::Serialize;
use signal_record::SignalRecord;
use std::collections::BTreeMap;
use std::fmt;

/// Which enrichment source produced an output. Declaration order is the
/// order the pipeline runs them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterCategory {
    PatternMatching,
    DomainContext,
    ExternalReasoning,
}

impl AdapterCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdapterCategory::PatternMatching => "pattern_matching",
            AdapterCategory::DomainContext => "domain_context",
            AdapterCategory::ExternalReasoning => "external_reasoning",
        }
    }
}

impl fmt::Display for AdapterCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One traced reasoning step inside an adapter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReasoningStep {
    pub kind: String,
    pub pattern: String,
    pub reasoning: String,
    pub signals_used: Vec<String>,
}

/// Decision proposed by an external reasoning source. Untrusted: the engine
/// validates every field before using it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReasoningOverride {
    pub user_need_state: String,
    /// Clamped to `[0, 10]`
    pub confidence: f64,
    pub reasoning_summary: String,
    pub recommended_actions: Vec<String>,
    pub ui_mode: Option<String>,
    pub language_preference: Option<String>,
}

/// Contribution of one adapter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdapterOutput {
    pub category: AdapterCategory,
    pub insights: Vec<String>,
    /// Detected pattern or use case names
    pub detected: Vec<String>,
    pub confidence_adjustments: BTreeMap<String, f64>,
    pub prompt_suggestions: Vec<String>,
    pub reasoning_steps: Vec<ReasoningStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_decision: Option<ReasoningOverride>,
    /// Adapter-specific detail kept for the explanation trail
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,
}

impl AdapterOutput {
    /// Output with no contribution
    pub fn empty(category: AdapterCategory) -> Self {
        Self {
            category,
            insights: Vec::new(),
            detected: Vec::new(),
            confidence_adjustments: BTreeMap::new(),
            prompt_suggestions: Vec::new(),
            reasoning_steps: Vec::new(),
            override_decision: None,
            details: serde_json::Value::Null,
        }
    }

    /// Whether the adapter contributed anything to the decision
    pub fn is_empty(&self) -> bool {
        self.insights.is_empty()
            && self.detected.is_empty()
            && self.confidence_adjustments.is_empty()
            && self.override_decision.is_none()
    }

    /// Find the output of a given category among upstream outputs
    pub fn find(outputs: &[AdapterOutput], category: AdapterCategory) -> Option<&AdapterOutput> {
        outputs.iter().find(|o| o.category == category)
    }
}

/// Enrichment source
#[async_trait]
pub trait KnowledgeAdapter: Send + Sync {
    /// Category of the outputs this adapter produces
    fn category(&self) -> AdapterCategory;

    /// Analyze a record given the outputs of the adapters that ran before.
    /// Infallible: internal failures yield [`AdapterOutput::empty`].
    async fn analyze(&self, signals: &SignalRecord, upstream: &[AdapterOutput]) -> AdapterOutput;
}
