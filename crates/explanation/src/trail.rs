//! Explanation trail
//!
//! One trail per inference call. Steps are appended in pipeline order and
//! never rewritten; the trail also carries the summary blocks used by the
//! human-readable rendering.

use crate::ExplanationError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Pipeline stage, in recording order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    SignalSummary,
    PatternMatching,
    DomainContext,
    ExternalReasoning,
    ScoreAdjustment,
    SignalCorrelation,
    ContextualMerge,
    FinalDecision,
}

impl StepKind {
    pub const ALL: [StepKind; 8] = [
        StepKind::SignalSummary,
        StepKind::PatternMatching,
        StepKind::DomainContext,
        StepKind::ExternalReasoning,
        StepKind::ScoreAdjustment,
        StepKind::SignalCorrelation,
        StepKind::ContextualMerge,
        StepKind::FinalDecision,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::SignalSummary => "signal_summary",
            StepKind::PatternMatching => "pattern_matching",
            StepKind::DomainContext => "domain_context",
            StepKind::ExternalReasoning => "external_reasoning",
            StepKind::ScoreAdjustment => "score_adjustment",
            StepKind::SignalCorrelation => "signal_correlation",
            StepKind::ContextualMerge => "contextual_merge",
            StepKind::FinalDecision => "final_decision",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded pipeline stage
#[derive(Debug, Clone, Serialize)]
pub struct Step {
    #[serde(rename = "type")]
    pub kind: StepKind,
    /// 1-based position in the trail, assigned on record
    pub ordinal: usize,
    pub timestamp: DateTime<Utc>,
    pub description: String,
    pub input: Value,
    pub output: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

impl Step {
    pub fn new(kind: StepKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            ordinal: 0,
            timestamp: Utc::now(),
            description: description.into(),
            input: Value::Null,
            output: Value::Null,
            rationale: None,
        }
    }

    pub fn with_input(mut self, input: Value) -> Self {
        self.input = input;
        self
    }

    pub fn with_output(mut self, output: Value) -> Self {
        self.output = output;
        self
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        let rationale = rationale.into();
        if !rationale.is_empty() {
            self.rationale = Some(rationale);
        }
        self
    }
}

/// Insights contributed by one adapter category
#[derive(Debug, Clone, Serialize)]
pub struct InsightBlock {
    pub category: String,
    pub insights: Vec<String>,
}

/// Ranked rule score as shown in the trail
#[derive(Debug, Clone, Serialize)]
pub struct RuleScore {
    pub name: String,
    pub score: f64,
    pub matched_conditions: usize,
    pub top_signals: Vec<String>,
}

/// Append-only audit trail of one inference
#[derive(Debug, Clone, Serialize)]
pub struct ExplanationTrail {
    pub inference_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub signal_count: usize,
    pub signal_summary: Vec<(String, usize)>,
    pub insights: Vec<InsightBlock>,
    pub top_rules: Vec<RuleScore>,
    pub decision_factors: Vec<String>,
    pub final_need_state: Option<String>,
    pub final_confidence: Option<f64>,
    steps: Vec<Step>,
}

impl ExplanationTrail {
    /// Start a trail under a fresh v4 id
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    pub fn with_id(inference_id: Uuid) -> Self {
        Self {
            inference_id,
            created_at: Utc::now(),
            signal_count: 0,
            signal_summary: Vec::new(),
            insights: Vec::new(),
            top_rules: Vec::new(),
            decision_factors: Vec::new(),
            final_need_state: None,
            final_confidence: None,
            steps: Vec::with_capacity(StepKind::ALL.len()),
        }
    }

    /// Append a step. Stages may be skipped but never repeated or reordered.
    pub fn record(&mut self, mut step: Step) -> Result<usize, ExplanationError> {
        if self.steps.iter().any(|s| s.kind == step.kind) {
            return Err(ExplanationError::Duplicate(step.kind));
        }
        if let Some(last) = self.steps.last() {
            if step.kind < last.kind {
                return Err(ExplanationError::OutOfOrder {
                    last: last.kind,
                    attempted: step.kind,
                });
            }
        }

        step.ordinal = self.steps.len() + 1;
        let ordinal = step.ordinal;
        self.steps.push(step);
        Ok(ordinal)
    }

    /// Record an adapter's insights; empty lists are not shown
    pub fn add_insights(&mut self, category: impl Into<String>, insights: &[String]) {
        if insights.is_empty() {
            return;
        }
        self.insights.push(InsightBlock {
            category: category.into(),
            insights: insights.to_vec(),
        });
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step(&self, kind: StepKind) -> Option<&Step> {
        self.steps.iter().find(|s| s.kind == kind)
    }

    /// Every stage recorded
    pub fn is_complete(&self) -> bool {
        self.steps.len() == StepKind::ALL.len()
    }

    /// Human-readable rendering
    pub fn render(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Inference Process (ID: {})", self.inference_id));
        lines.push(format!(
            "Analyzed {} signals across {} categories",
            self.signal_count,
            self.signal_summary.len()
        ));
        lines.push(String::new());

        if !self.signal_summary.is_empty() {
            lines.push("Signal Analysis:".to_string());
            for (category, count) in &self.signal_summary {
                lines.push(format!("  - {}: {} signals", category, count));
            }
            lines.push(String::new());
        }

        for block in &self.insights {
            lines.push(format!("{} insights:", block.category));
            for insight in &block.insights {
                lines.push(format!("  - {}", insight));
            }
            lines.push(String::new());
        }

        if !self.top_rules.is_empty() {
            lines.push("Rule Scoring:".to_string());
            for (i, rule) in self.top_rules.iter().take(3).enumerate() {
                lines.push(format!("  {}. {}: {:.2} points", i + 1, rule.name, rule.score));
            }
            lines.push(String::new());
        }

        if !self.decision_factors.is_empty() {
            lines.push("Key Decision Factors:".to_string());
            for factor in &self.decision_factors {
                lines.push(format!("  - {}", factor));
            }
            lines.push(String::new());
        }

        if let Some(state) = &self.final_need_state {
            lines.push(format!("Final Inference: {}", state));
            lines.push(format!(
                "Confidence: {:.2}/10.0",
                self.final_confidence.unwrap_or_default()
            ));
        }

        if !self.steps.is_empty() {
            lines.push(String::new());
            lines.push("Inference Timeline:".to_string());
            for step in &self.steps {
                lines.push(format!("  [{}] {}: {}", step.ordinal, step.kind, step.description));
                if let Some(rationale) = &step.rationale {
                    lines.push(format!("      Reasoning: {}", rationale));
                }
            }
        }

        lines.join("\n")
    }

    /// Rendering followed by a per-step detail log
    pub fn detailed_log(&self) -> String {
        let mut out = self.render();
        out.push_str("\n\n");
        out.push_str(&"=".repeat(80));
        out.push_str("\n\nDetailed Event Log:\n");

        for step in &self.steps {
            out.push_str(&format!("\n[{}] {}\n", step.ordinal, step.kind));
            out.push_str(&format!("  Description: {}\n", step.description));
            if let Some(rationale) = &step.rationale {
                out.push_str(&format!("  Reasoning: {}\n", rationale));
            }
            if !step.output.is_null() {
                out.push_str(&format!("  Output: {}\n", step.output));
            }
        }
        out
    }
}

impl Default for ExplanationTrail {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_trail() -> ExplanationTrail {
        let mut trail = ExplanationTrail::new();
        for kind in StepKind::ALL {
            trail
                .record(Step::new(kind, format!("{} done", kind)))
                .unwrap();
        }
        trail
    }

    #[test]
    fn test_records_in_order() {
        let trail = full_trail();
        assert!(trail.is_complete());

        let ordinals: Vec<_> = trail.steps().iter().map(|s| s.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(trail.steps()[0].kind, StepKind::SignalSummary);
        assert_eq!(trail.steps()[7].kind, StepKind::FinalDecision);
    }

    #[test]
    fn test_rejects_duplicate() {
        let mut trail = ExplanationTrail::new();
        trail.record(Step::new(StepKind::SignalSummary, "a")).unwrap();
        let err = trail.record(Step::new(StepKind::SignalSummary, "b")).unwrap_err();
        assert!(matches!(err, ExplanationError::Duplicate(StepKind::SignalSummary)));
        assert_eq!(trail.steps().len(), 1);
    }

    #[test]
    fn test_rejects_out_of_order() {
        let mut trail = ExplanationTrail::new();
        trail.record(Step::new(StepKind::ScoreAdjustment, "a")).unwrap();
        let err = trail.record(Step::new(StepKind::PatternMatching, "b")).unwrap_err();
        assert!(matches!(
            err,
            ExplanationError::OutOfOrder {
                last: StepKind::ScoreAdjustment,
                attempted: StepKind::PatternMatching
            }
        ));
    }

    #[test]
    fn test_skipping_forward_is_allowed() {
        let mut trail = ExplanationTrail::new();
        trail.record(Step::new(StepKind::SignalSummary, "a")).unwrap();
        let ordinal = trail.record(Step::new(StepKind::FinalDecision, "b")).unwrap();
        assert_eq!(ordinal, 2);
        assert!(!trail.is_complete());
    }

    #[test]
    fn test_empty_rationale_is_dropped() {
        let step = Step::new(StepKind::ContextualMerge, "merge").with_rationale("");
        assert!(step.rationale.is_none());
    }

    #[test]
    fn test_render_sections() {
        let mut trail = full_trail();
        trail.signal_count = 4;
        trail.signal_summary = vec![("device".to_string(), 2), ("language".to_string(), 2)];
        trail.add_insights("Pattern matching", &["Morning devotional time".to_string()]);
        trail.add_insights("External reasoning", &[]);
        trail.top_rules = ["A", "B", "C", "D"]
            .iter()
            .enumerate()
            .map(|(i, name)| RuleScore {
                name: name.to_string(),
                score: 4.0 - i as f64,
                matched_conditions: 1,
                top_signals: Vec::new(),
            })
            .collect();
        trail.decision_factors = vec!["Rule 'A' scored 4.00 points".to_string()];
        trail.final_need_state = Some("Morning Devotional User".to_string());
        trail.final_confidence = Some(5.5);

        let text = trail.render();
        assert!(text.contains("Analyzed 4 signals across 2 categories"));
        assert!(text.contains("  - device: 2 signals"));
        assert!(text.contains("Pattern matching insights:"));
        assert!(!text.contains("External reasoning insights:"));
        assert!(text.contains("  3. C: 2.00 points"));
        assert!(!text.contains("D: 1.00"));
        assert!(text.contains("Key Decision Factors:"));
        assert!(text.contains("Final Inference: Morning Devotional User"));
        assert!(text.contains("Confidence: 5.50/10.0"));
        assert!(text.contains("  [8] final_decision: final_decision done"));
    }

    #[test]
    fn test_detailed_log_includes_outputs() {
        let mut trail = ExplanationTrail::new();
        trail
            .record(
                Step::new(StepKind::SignalCorrelation, "correlations")
                    .with_output(json!({"correlations": 1}))
                    .with_rationale("cross-category"),
            )
            .unwrap();

        let log = trail.detailed_log();
        assert!(log.contains(&"=".repeat(80)));
        assert!(log.contains("Detailed Event Log:"));
        assert!(log.contains("[1] signal_correlation"));
        assert!(log.contains("  Reasoning: cross-category"));
        assert!(log.contains(r#"  Output: {"correlations":1}"#));
    }

    #[test]
    fn test_serializes_step_type() {
        let trail = full_trail();
        let value = serde_json::to_value(&trail).unwrap();
        assert_eq!(value["steps"][2]["type"], "domain_context");
    }
}
