//! Cross-signal correlation, contextual merge and decision factors

use knowledge::{AdapterCategory, AdapterOutput};
use rule_engine::ScoredRule;
use serde::Serialize;
use signal_record::{SignalId, SignalRecord};

/// Strong correlations across signal categories
pub fn correlations(signals: &SignalRecord) -> Vec<String> {
    let mut found = Vec::new();

    if signals.has_apps(SignalId::BusinessApps)
        && signals.is(SignalId::WhatsappBusinessUsage, "yes")
        && signals.is_truthy(SignalId::PaymentAppsInstalled)
    {
        found.push("Strong correlation: Business apps + WhatsApp Business + Payment apps".to_string());
    }

    if signals.has_apps(SignalId::EducationApps)
        && signals.is(SignalId::SessionDuration, "long")
        && signals.is(SignalId::TextInputLength, "long")
    {
        found.push("Strong correlation: Education apps + Long sessions + Long text".to_string());
    }

    if signals.is(SignalId::OtpMessageFrequency, "high")
        && signals.is(SignalId::BankingSmsPresence, "yes")
        && signals.is_truthy(SignalId::PaymentAppsInstalled)
    {
        found.push("Strong correlation: High OTP + Banking SMS + Payment apps".to_string());
    }

    found
}

/// Result of merging the top rule with adapter context
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextualMerge {
    /// Need state of the top-ranked rule, if any rule exists
    pub user_need_state: Option<String>,
    pub reasoning: String,
    /// Signals confirmed by an adapter finding
    pub confirmations: Vec<String>,
}

fn detected(outputs: &[AdapterOutput], category: AdapterCategory) -> &[String] {
    AdapterOutput::find(outputs, category)
        .map(|o| o.detected.as_slice())
        .unwrap_or_default()
}

fn reasoning_steps(outputs: &[AdapterOutput]) -> usize {
    AdapterOutput::find(outputs, AdapterCategory::ExternalReasoning)
        .map(|o| o.reasoning_steps.len())
        .unwrap_or(0)
}

/// Combine the top rule with what the adapters found
pub fn contextual_merge(
    ranking: &[ScoredRule<'_>],
    outputs: &[AdapterOutput],
) -> ContextualMerge {
    let Some(top) = ranking.first() else {
        return ContextualMerge {
            user_need_state: None,
            reasoning: "No rules matched".to_string(),
            confirmations: Vec::new(),
        };
    };

    let mut parts = vec![format!("Rule '{}' scored {:.2}", top.name, top.score)];

    let patterns = detected(outputs, AdapterCategory::PatternMatching);
    if !patterns.is_empty() {
        parts.push(format!("Pattern matching detected {} patterns", patterns.len()));
    }
    let use_cases = detected(outputs, AdapterCategory::DomainContext);
    if !use_cases.is_empty() {
        parts.push(format!("Domain context detected {} use cases", use_cases.len()));
    }
    let steps = reasoning_steps(outputs);
    if steps > 0 {
        parts.push(format!("External reasoning applied {} reasoning steps", steps));
    }

    let mut confirmations = Vec::new();
    let both = |pattern: &str, use_case: &str| {
        patterns.iter().any(|p| p == pattern) && use_cases.iter().any(|u| u == use_case)
    };
    if both("business_apps_present", "business_accounting") {
        confirmations.push("Business apps confirmed by accounting use case".to_string());
    }
    if both("education_apps_present", "student_help") {
        confirmations.push("Education apps confirmed by student help use case".to_string());
    }
    parts.extend(confirmations.iter().cloned());

    ContextualMerge {
        user_need_state: Some(top.rule.output.user_need_state.clone()),
        reasoning: parts.join(". "),
        confirmations,
    }
}

/// Key factors behind the decision, most significant first
pub fn decision_factors(
    signals: &SignalRecord,
    ranking: &[ScoredRule<'_>],
    outputs: &[AdapterOutput],
) -> Vec<String> {
    let mut factors = Vec::new();

    if let Some(top) = ranking.first() {
        factors.push(format!("Rule '{}' scored {:.2} points", top.name, top.score));
    }

    let patterns = detected(outputs, AdapterCategory::PatternMatching).len();
    if patterns > 0 {
        factors.push(format!("Pattern matching: {} patterns detected", patterns));
    }
    let use_cases = detected(outputs, AdapterCategory::DomainContext).len();
    if use_cases > 0 {
        factors.push(format!("Domain context: {} use cases detected", use_cases));
    }
    let steps = reasoning_steps(outputs);
    if steps > 0 {
        factors.push(format!("External reasoning: {} reasoning steps applied", steps));
    }

    if signals.has_apps(SignalId::BusinessApps) {
        factors.push("Business apps present".to_string());
    }
    if signals.is(SignalId::WhatsappBusinessUsage, "yes") {
        factors.push("WhatsApp Business usage".to_string());
    }
    if signals.is(SignalId::OtpMessageFrequency, "high") {
        factors.push("High OTP frequency".to_string());
    }
    if signals.has_apps(SignalId::EducationApps) {
        factors.push("Education apps present".to_string());
    }

    factors
}
