//! Final confidence

use crate::EngineConfig;
use knowledge::{AdapterCategory, AdapterOutput};
use std::collections::BTreeMap;

/// Upper bound of every reported confidence
pub const MAX_CONFIDENCE: f64 = 10.0;

/// Sum of all finite adapter deltas
pub fn total_adjustment(adjustments: &BTreeMap<String, f64>) -> f64 {
    adjustments.values().filter(|v| v.is_finite()).sum()
}

/// True when pattern, domain and reasoning adapters each contributed
pub fn sources_agree(outputs: &[AdapterOutput]) -> bool {
    let contributed = |category, check: fn(&AdapterOutput) -> bool| {
        AdapterOutput::find(outputs, category).is_some_and(check)
    };

    contributed(AdapterCategory::PatternMatching, |o| !o.detected.is_empty())
        && contributed(AdapterCategory::DomainContext, |o| !o.detected.is_empty())
        && contributed(AdapterCategory::ExternalReasoning, |o| !o.insights.is_empty())
}

/// `base + min(sum of deltas, cap) + agreement bonus`, clamped to [0, 10]
pub fn final_confidence(
    base: f64,
    adjustments: &BTreeMap<String, f64>,
    outputs: &[AdapterOutput],
    config: &EngineConfig,
) -> f64 {
    let base = if base.is_finite() { base } else { 0.0 };
    let mut confidence = base + total_adjustment(adjustments).min(config.max_adjustment);

    if sources_agree(outputs) {
        confidence += config.agreement_bonus;
    }
    confidence.clamp(0.0, MAX_CONFIDENCE)
}
