//! Inference Engine Implementation

use crate::adjust::{adjust, KeywordMatcher, PatternMatcher};
use crate::confidence::{final_confidence, sources_agree, MAX_CONFIDENCE};
use crate::correlation::{contextual_merge, correlations, decision_factors};
use crate::output::{BatchItem, InferenceOutput};
use crate::{EngineConfig, EngineError};
use explanation::{ExplanationStore, ExplanationTrail, RuleScore, Step, StepKind};
use knowledge::{
    AdapterCategory, AdapterOutput, DomainAdapter, KnowledgeAdapter, PatternAdapter, ReasoningAdapter,
    ReasoningOverride,
};
use rule_engine::{
    explain, recommend_actions, resolve, score_all, Decision, LanguagePreference, OutputDescriptor, RuleStore,
    RuleStoreHandle, ScoredRule, UiMode,
};
use serde_json::{json, Value};
use signal_record::{SignalRecord, ValidationConfig, Validator};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// `matched_rule` reported when external reasoning decided
pub const EXTERNAL_REASONING_RULE: &str = "external_reasoning";

/// Rules shown in the trail's score table
const TRAIL_TOP_RULES: usize = 5;

/// Multi-source inference pipeline.
///
/// One instance per process, shared behind `Arc`. The rule store can be
/// swapped through its handle; every call works on the store current at its
/// start.
pub struct InferenceEngine {
    rules: Arc<RuleStoreHandle>,
    validator: Validator,
    pattern: Arc<dyn KnowledgeAdapter>,
    domain: Arc<dyn KnowledgeAdapter>,
    reasoning: Arc<dyn KnowledgeAdapter>,
    matcher: Arc<dyn PatternMatcher>,
    explanations: Arc<ExplanationStore>,
    config: EngineConfig,
}

impl InferenceEngine {
    /// Engine with the built-in pattern and domain adapters and no external
    /// reasoning backend
    pub fn new(rules: Arc<RuleStoreHandle>, explanations: Arc<ExplanationStore>) -> Self {
        info!("Creating inference engine with {} rules", rules.current().len());
        Self {
            rules,
            validator: Validator::new(ValidationConfig::default()),
            pattern: Arc::new(PatternAdapter::new()),
            domain: Arc::new(DomainAdapter::new()),
            reasoning: Arc::new(ReasoningAdapter::disabled()),
            matcher: Arc::new(KeywordMatcher),
            explanations,
            config: EngineConfig::default(),
        }
    }

    pub fn with_validation(mut self, config: ValidationConfig) -> Self {
        self.validator = Validator::new(config);
        self
    }

    pub fn with_pattern_adapter(mut self, adapter: Arc<dyn KnowledgeAdapter>) -> Self {
        self.pattern = adapter;
        self
    }

    pub fn with_domain_adapter(mut self, adapter: Arc<dyn KnowledgeAdapter>) -> Self {
        self.domain = adapter;
        self
    }

    pub fn with_reasoning_adapter(mut self, adapter: Arc<dyn KnowledgeAdapter>) -> Self {
        self.reasoning = adapter;
        self
    }

    pub fn with_matcher(mut self, matcher: Arc<dyn PatternMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn rules(&self) -> &Arc<RuleStoreHandle> {
        &self.rules
    }

    pub fn explanations(&self) -> &Arc<ExplanationStore> {
        &self.explanations
    }

    /// Validate a JSON payload into a signal record
    pub fn validate(&self, payload: &Value) -> Result<SignalRecord, EngineError> {
        Ok(self.validator.validate(payload)?)
    }

    /// Validate and run the full pipeline
    pub async fn infer_json(&self, payload: &Value) -> Result<InferenceOutput, EngineError> {
        let signals = self.validate(payload)?;
        self.infer(&signals).await
    }

    /// Run every payload through the full pipeline; failures stay per item
    pub async fn infer_batch(&self, payloads: &[Value]) -> Vec<BatchItem> {
        let mut items = Vec::with_capacity(payloads.len());
        for (index, payload) in payloads.iter().enumerate() {
            let item = match self.infer_json(payload).await {
                Ok(output) => BatchItem::ok(output),
                Err(e) => {
                    warn!("Batch item {} failed: {}", index, e);
                    BatchItem::failed(e)
                }
            };
            items.push(item);
        }
        info!("Processed batch of {} payloads", items.len());
        items
    }

    /// Scorer and resolver only: no adapters, no trail
    pub fn infer_rules_only(&self, signals: &SignalRecord) -> InferenceOutput {
        let store = self.rules.current();
        let ranking = score_all(&store, signals);
        let decision = resolve(&store, &ranking);
        let explanation = explain(&decision, store.output_config());
        let confidence = decision.confidence;

        debug!(
            "Rules-only inference: '{}' ({:.2})",
            decision.user_need_state, decision.confidence
        );
        into_output(decision, confidence, explanation, None)
    }

    /// Full pipeline with adapters and a retained explanation trail
    pub async fn infer(&self, signals: &SignalRecord) -> Result<InferenceOutput, EngineError> {
        let start = Instant::now();
        let store = self.rules.current();
        let mut trail = ExplanationTrail::new();

        self.record_summary(&mut trail, signals)?;

        let mut outputs: Vec<AdapterOutput> = Vec::with_capacity(3);
        let stages = [
            (StepKind::PatternMatching, &self.pattern),
            (StepKind::DomainContext, &self.domain),
            (StepKind::ExternalReasoning, &self.reasoning),
        ];
        for (kind, adapter) in stages {
            let output = adapter.analyze(signals, &outputs).await;
            trail.record(adapter_step(kind, &output, outputs.len()))?;
            trail.add_insights(insight_title(kind), &output.insights);
            outputs.push(output);
        }

        let adjustments = merged_adjustments(&outputs);
        let mut ranking = score_all(&store, signals);
        let detected = AdapterOutput::find(&outputs, AdapterCategory::PatternMatching)
            .map(|o| o.detected.as_slice())
            .unwrap_or_default();
        let applied = adjust(&mut ranking, detected, &adjustments, self.matcher.as_ref());
        trail.top_rules = ranking.iter().take(TRAIL_TOP_RULES).map(rule_score).collect();
        let top_three = json!(&trail.top_rules[..trail.top_rules.len().min(3)]);
        trail.record(
            Step::new(
                StepKind::ScoreAdjustment,
                match ranking.first() {
                    Some(top) => format!("Scored {} rules, top score: {:.2}", ranking.len(), top.score),
                    None => "No rules to score".to_string(),
                },
            )
            .with_input(json!({"rule_count": ranking.len(), "confidence_adjustments": adjustments}))
            .with_output(json!({"applied": applied, "top_rules": top_three}))
            .with_rationale("Rule scores adjusted by detected pattern deltas"),
        )?;

        let found = correlations(signals);
        trail.record(
            Step::new(
                StepKind::SignalCorrelation,
                format!("Analyzed signal correlations: {} correlations found", found.len()),
            )
            .with_input(json!({"signals_analyzed": signals.len()}))
            .with_output(json!({"correlations": found}))
            .with_rationale("Strong patterns across multiple signal categories"),
        )?;

        let merge = contextual_merge(&ranking, &outputs);
        trail.record(
            Step::new(
                StepKind::ContextualMerge,
                format!("Applied contextual merge: {}", merge.reasoning),
            )
            .with_input(json!({"ranked_rules": ranking.len(), "adapters": outputs.len()}))
            .with_output(json!({"inference": merge.user_need_state, "confirmations": merge.confirmations}))
            .with_rationale(merge.reasoning.clone()),
        )?;

        let mut decision = resolve(&store, &ranking);
        let proposal = AdapterOutput::find(&outputs, AdapterCategory::ExternalReasoning)
            .and_then(|o| o.override_decision.as_ref());
        if let Some(proposal) = proposal {
            apply_override(&store, &mut decision, proposal);
        }

        let base = decision.confidence;
        let confidence = if decision.is_default() {
            0.0
        } else {
            final_confidence(base, &adjustments, &outputs, &self.config)
        };
        self.enhance_actions(&store, &mut decision.recommended_actions, &outputs);

        trail.decision_factors = decision_factors(signals, &ranking, &outputs);
        trail.record(
            Step::new(
                StepKind::FinalDecision,
                format!(
                    "Final decision: {} (confidence: {:.2}/10.0)",
                    decision.user_need_state, confidence
                ),
            )
            .with_input(json!({"top_rule": decision.matched_rule, "base_confidence": base}))
            .with_output(json!({"user_need_state": decision.user_need_state, "confidence": confidence}))
            .with_rationale(format!(
                "Inferred from {} matching signals{}",
                decision.matched_conditions.len(),
                if sources_agree(&outputs) {
                    " with agreement from all knowledge adapters"
                } else {
                    ""
                }
            )),
        )?;
        trail.final_need_state = Some(decision.user_need_state.clone());
        trail.final_confidence = Some(confidence);

        let explanation = trail.render();
        let inference_id = trail.inference_id;
        self.explanations.insert(trail);

        info!(
            "Inferred '{}' ({:.2}) via {} in {}ms [{}]",
            decision.user_need_state,
            confidence,
            decision.matched_rule,
            start.elapsed().as_millis(),
            inference_id
        );
        Ok(into_output(decision, confidence, explanation, Some(inference_id)))
    }

    fn record_summary(&self, trail: &mut ExplanationTrail, signals: &SignalRecord) -> Result<(), EngineError> {
        let summary: Vec<(String, usize)> = signals
            .category_summary()
            .into_iter()
            .map(|(category, count)| (category.to_string(), count))
            .collect();
        let by_category: BTreeMap<&str, usize> = summary.iter().map(|(c, n)| (c.as_str(), *n)).collect();

        trail.signal_count = signals.len();
        trail.record(
            Step::new(
                StepKind::SignalSummary,
                format!(
                    "Extracted {} signals across {} categories",
                    signals.len(),
                    summary.len()
                ),
            )
            .with_input(signals.to_json())
            .with_output(json!({"signal_summary": by_category})),
        )?;
        trail.signal_summary = summary;
        Ok(())
    }

    /// Append the first domain prompt suggestions not already present
    fn enhance_actions(&self, store: &RuleStore, actions: &mut Vec<String>, outputs: &[AdapterOutput]) {
        let Some(domain) = AdapterOutput::find(outputs, AdapterCategory::DomainContext) else {
            return;
        };
        for suggestion in domain.prompt_suggestions.iter().take(self.config.suggestion_count) {
            if !actions.contains(suggestion) {
                actions.push(suggestion.clone());
            }
        }
        actions.truncate(store.output_config().max_recommended_actions);
    }
}

fn insight_title(kind: StepKind) -> &'static str {
    match kind {
        StepKind::PatternMatching => "Pattern Matching",
        StepKind::DomainContext => "Domain Context",
        _ => "External Reasoning",
    }
}

fn adapter_step(kind: StepKind, output: &AdapterOutput, upstream: usize) -> Step {
    let description = match kind {
        StepKind::PatternMatching => format!(
            "Matched {} signal patterns with {} insights",
            output.detected.len(),
            output.insights.len()
        ),
        StepKind::DomainContext => format!(
            "Detected {} use cases with {} insights",
            output.detected.len(),
            output.insights.len()
        ),
        _ if output.is_empty() => "External reasoning contributed nothing".to_string(),
        _ => format!(
            "External reasoning produced {} insights and {} reasoning steps",
            output.insights.len(),
            output.reasoning_steps.len()
        ),
    };
    let rationale = match kind {
        StepKind::PatternMatching => "Known meanings of signal combinations in the Indian context",
        StepKind::DomainContext => "Assistant use cases and regional knowledge",
        _ => "Cross-signal reasoning by an external model",
    };

    Step::new(kind, description)
        .with_input(json!({"upstream_outputs": upstream}))
        .with_output(serde_json::to_value(output).unwrap_or(Value::Null))
        .with_rationale(rationale)
}

fn merged_adjustments(outputs: &[AdapterOutput]) -> BTreeMap<String, f64> {
    outputs
        .iter()
        .flat_map(|o| o.confidence_adjustments.iter())
        .map(|(key, delta)| (key.clone(), *delta))
        .collect()
}

fn rule_score(scored: &ScoredRule<'_>) -> RuleScore {
    RuleScore {
        name: scored.name.to_string(),
        score: scored.score,
        matched_conditions: scored.matched.len(),
        top_signals: scored.evidence.iter().take(3).cloned().collect(),
    }
}

/// Replace the rule-derived decision with an external reasoning proposal.
/// Unparseable ui mode or language values keep the rule-derived ones.
fn apply_override(store: &RuleStore, decision: &mut Decision, proposal: &ReasoningOverride) {
    info!(
        "External reasoning overrides '{}' with '{}'",
        decision.user_need_state, proposal.user_need_state
    );

    decision.user_need_state = proposal.user_need_state.clone();
    decision.confidence = proposal.confidence.clamp(0.0, MAX_CONFIDENCE);
    decision.matched_rule = EXTERNAL_REASONING_RULE.to_string();

    if let Some(mode) = proposal.ui_mode.as_deref() {
        match UiMode::parse(mode) {
            Some(mode) => decision.ui_mode = mode,
            None => warn!("Ignoring unknown ui mode from external reasoning: {}", mode),
        }
    }
    if let Some(language) = proposal.language_preference.as_deref() {
        match LanguagePreference::parse(language) {
            Some(language) => decision.language_preference = language,
            None => warn!("Ignoring unknown language from external reasoning: {}", language),
        }
    }

    if !proposal.recommended_actions.is_empty() {
        let output = OutputDescriptor {
            recommended_actions: proposal.recommended_actions.clone(),
            ..store.default_output().clone()
        };
        decision.recommended_actions = recommend_actions(store, &output);
    }
}

fn into_output(
    decision: Decision,
    confidence: f64,
    explanation: String,
    inference_id: Option<Uuid>,
) -> InferenceOutput {
    InferenceOutput {
        user_need_state: decision.user_need_state,
        confidence,
        ui_mode: decision.ui_mode,
        language_preference: decision.language_preference,
        recommended_actions: decision.recommended_actions,
        explanation,
        signal_count: decision.matched_conditions.len(),
        matched_signals: decision.matched_conditions,
        matched_rule: decision.matched_rule,
        inference_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use knowledge::{KnowledgeError, ReasoningBackend, ReasoningRequest, ReasoningResponse};
    use rule_engine::DEFAULT_RULE_NAME;
    use signal_record::SignalId;
    use std::time::Duration;

    const RULES: &str = include_str!("../../../config/rules.yaml");

    struct Fixed(ReasoningResponse);

    #[async_trait]
    impl ReasoningBackend for Fixed {
        async fn infer(&self, _request: &ReasoningRequest) -> Result<ReasoningResponse, KnowledgeError> {
            Ok(self.0.clone())
        }
    }

    struct Sleepy;

    #[async_trait]
    impl ReasoningBackend for Sleepy {
        async fn infer(&self, _request: &ReasoningRequest) -> Result<ReasoningResponse, KnowledgeError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(ReasoningResponse {
                user_need_state: Some("Too Late".to_string()),
                ..Default::default()
            })
        }
    }

    fn engine() -> InferenceEngine {
        let store = RuleStore::from_yaml_str(RULES).unwrap();
        InferenceEngine::new(
            Arc::new(RuleStoreHandle::new(store)),
            Arc::new(ExplanationStore::default()),
        )
    }

    fn with_backend(backend: impl ReasoningBackend + 'static, timeout: Duration) -> InferenceEngine {
        let adapter = ReasoningAdapter::new(Arc::new(backend), timeout);
        engine().with_reasoning_adapter(Arc::new(adapter))
    }

    fn morning() -> SignalRecord {
        SignalRecord::new()
            .with(SignalId::TimeOfDay, "morning")
            .with(SignalId::SystemLanguage, "hi")
            .with(SignalId::FirstAction, "voice")
    }

    fn evening_shop() -> SignalRecord {
        SignalRecord::new()
            .with(SignalId::TimeOfDay, "evening")
            .with(SignalId::BusinessApps, vec!["khatabook".to_string()])
            .with(SignalId::WhatsappBusinessUsage, "yes")
            .with(SignalId::PaymentAppsInstalled, vec!["phonepe".to_string()])
    }

    #[test]
    fn test_morning_devotional_rules_only() {
        let output = engine().infer_rules_only(&morning());

        assert_eq!(output.user_need_state, "Morning Devotional User");
        assert_eq!(output.matched_rule, "morning_devotional");
        assert!((output.confidence - 5.5).abs() < 1e-9);
        assert_eq!(output.ui_mode, UiMode::VoiceFirst);
        assert_eq!(output.language_preference, LanguagePreference::Hindi);
        assert_eq!(output.signal_count, 3);
        assert!(output.inference_id.is_none());
        assert!(output.explanation.contains("confidence 5.5/10.0"));
    }

    #[tokio::test]
    async fn test_morning_devotional_full_pipeline() {
        let engine = engine();
        let output = engine.infer(&morning()).await.unwrap();

        assert_eq!(output.user_need_state, "Morning Devotional User");
        assert_eq!(output.ui_mode, UiMode::VoiceFirst);
        assert!(output.confidence >= 5.5 && output.confidence <= 10.0);
        assert!((3..=5).contains(&output.recommended_actions.len()));
        assert!(output.explanation.contains("Final Inference: Morning Devotional User"));

        let id = output.inference_id.unwrap();
        let trail = engine.explanations().get(&id).unwrap();
        assert!(trail.is_complete());
        let kinds: Vec<_> = trail.steps().iter().map(|s| s.kind).collect();
        assert_eq!(kinds, StepKind::ALL.to_vec());
        assert_eq!(trail.final_need_state.as_deref(), Some("Morning Devotional User"));
    }

    #[tokio::test]
    async fn test_zero_match_resolves_to_default() {
        let output = engine().infer(&SignalRecord::new()).await.unwrap();

        assert_eq!(output.user_need_state, "First-time AI Explorer");
        assert_eq!(output.matched_rule, DEFAULT_RULE_NAME);
        assert_eq!(output.confidence, 0.0);
        assert!(output.matched_signals.is_empty());
        assert!(output.recommended_actions.len() >= 3);
    }

    #[tokio::test]
    async fn test_empty_store_resolves_to_default() {
        let store = RuleStore::from_yaml_str(
            r#"
default_rule:
  user_need_state: "First-time AI Explorer"
  recommended_actions: ["a", "b", "c"]
rules: []
"#,
        )
        .unwrap();
        let engine = InferenceEngine::new(
            Arc::new(RuleStoreHandle::new(store)),
            Arc::new(ExplanationStore::default()),
        );

        let output = engine.infer(&morning()).await.unwrap();
        assert_eq!(output.matched_rule, DEFAULT_RULE_NAME);
        assert_eq!(output.confidence, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reasoning_timeout_keeps_rule_decision() {
        let engine = with_backend(Sleepy, Duration::from_millis(100));
        let output = engine.infer(&morning()).await.unwrap();
        let baseline = self::engine().infer(&morning()).await.unwrap();

        assert_eq!(output.user_need_state, "Morning Devotional User");
        assert_eq!(output.matched_rule, "morning_devotional");
        assert_eq!(output.confidence, baseline.confidence);

        let trail = engine.explanations().get(&output.inference_id.unwrap()).unwrap();
        let step = trail.step(StepKind::ExternalReasoning).unwrap();
        assert_eq!(step.description, "External reasoning contributed nothing");
        assert!(trail.insights.iter().all(|block| block.category != "External Reasoning"));
    }

    #[tokio::test]
    async fn test_reasoning_override() {
        let engine = with_backend(
            Fixed(ReasoningResponse {
                user_need_state: Some("Small Business Owner".to_string()),
                confidence: Some(12.0),
                reasoning_summary: Some("Shop apps in the evening".to_string()),
                recommended_actions: vec!["Track daily sales".to_string()],
                ui_mode: Some("lite".to_string()),
                language_preference: Some("klingon".to_string()),
            }),
            Duration::from_secs(5),
        );

        let output = engine.infer(&morning()).await.unwrap();

        assert_eq!(output.user_need_state, "Small Business Owner");
        assert_eq!(output.matched_rule, EXTERNAL_REASONING_RULE);
        assert_eq!(output.confidence, 10.0);
        assert_eq!(output.ui_mode, UiMode::Lite);
        assert_eq!(output.language_preference, LanguagePreference::Hindi);
        assert_eq!(output.recommended_actions[0], "Track daily sales");
        assert!(output.recommended_actions.len() >= 3);
    }

    #[tokio::test]
    async fn test_override_replaces_default_decision() {
        let engine = with_backend(
            Fixed(ReasoningResponse {
                user_need_state: Some("Small Business Owner".to_string()),
                confidence: Some(6.0),
                ..Default::default()
            }),
            Duration::from_secs(5),
        );

        // Nothing detected: the override confidence stands alone
        let empty = SignalRecord::new();
        assert_eq!(engine.infer_rules_only(&empty).matched_rule, DEFAULT_RULE_NAME);
        let output = engine.infer(&empty).await.unwrap();
        assert_eq!(output.user_need_state, "Small Business Owner");
        assert_eq!(output.matched_rule, EXTERNAL_REASONING_RULE);
        assert_eq!(output.confidence, 6.0);

        // One pattern, no use case: its delta is added, no agreement bonus
        let shop = SignalRecord::new().with(SignalId::BusinessApps, "khatabook");
        assert_eq!(engine.infer_rules_only(&shop).matched_rule, DEFAULT_RULE_NAME);
        let output = engine.infer(&shop).await.unwrap();
        assert_eq!(output.matched_rule, EXTERNAL_REASONING_RULE);
        assert!((output.confidence - 6.5).abs() < 1e-9);

        let trail = engine.explanations().get(&output.inference_id.unwrap()).unwrap();
        let adjustments = &trail.step(StepKind::ScoreAdjustment).unwrap().input["confidence_adjustments"];
        assert_eq!(adjustments["business_apps_present"], 0.5);
        assert_eq!(adjustments.as_object().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_override_is_ignored() {
        let engine = with_backend(
            Fixed(ReasoningResponse {
                user_need_state: Some("   ".to_string()),
                confidence: Some(9.0),
                ..Default::default()
            }),
            Duration::from_secs(5),
        );

        let output = engine.infer(&morning()).await.unwrap();
        assert_eq!(output.matched_rule, "morning_devotional");
    }

    #[tokio::test]
    async fn test_domain_suggestions_extend_actions() {
        let output = engine().infer(&evening_shop()).await.unwrap();

        assert_eq!(output.user_need_state, "Evening Ledger / Khatabook Mode User");
        assert_eq!(output.recommended_actions.len(), 5);
        assert_eq!(output.recommended_actions[4], "Show calculation and ledger prompts");
        assert!(output.confidence <= 10.0);
    }

    #[tokio::test]
    async fn test_identical_input_gives_identical_decision() {
        let engine = engine();
        let first = engine.infer(&evening_shop()).await.unwrap();
        let second = engine.infer(&evening_shop()).await.unwrap();

        assert_ne!(first.inference_id, second.inference_id);
        assert_eq!(first.user_need_state, second.user_need_state);
        assert_eq!(first.confidence, second.confidence);
        assert_eq!(first.ui_mode, second.ui_mode);
        assert_eq!(first.language_preference, second.language_preference);
        assert_eq!(first.recommended_actions, second.recommended_actions);
        assert_eq!(first.matched_rule, second.matched_rule);
        assert_eq!(first.matched_signals, second.matched_signals);
    }

    #[tokio::test]
    async fn test_batch_reports_each_item() {
        let engine = engine();
        let payloads = vec![
            json!({"time_of_day": "morning", "system_language": "hi", "first_action": "voice"}),
            json!({"time_of_day": "midnight"}),
            json!(["not", "an", "object"]),
        ];

        let items = engine.infer_batch(&payloads).await;

        assert_eq!(items.len(), 3);
        assert!(items[0].success);
        assert_eq!(
            items[0].data.as_ref().unwrap().user_need_state,
            "Morning Devotional User"
        );
        assert!(!items[1].success && items[1].error.is_some());
        assert!(!items[2].success);
    }

    #[tokio::test]
    async fn test_reloaded_rules_apply_to_next_call() {
        let engine = engine();
        let replacement = RuleStore::from_yaml_str(
            r#"
default_rule:
  user_need_state: "Replacement Default"
  recommended_actions: ["a", "b", "c"]
rules: []
"#,
        )
        .unwrap();

        engine.rules().replace(replacement);
        let output = engine.infer(&morning()).await.unwrap();

        assert_eq!(output.user_need_state, "Replacement Default");
    }

    #[tokio::test]
    async fn test_table_matcher_boosts_mapped_rule() {
        let signals = morning()
            .with(SignalId::HourOfDay, 6)
            .with(SignalId::KeyboardLanguage, "hi");
        let engine = engine().with_matcher(Arc::new(
            crate::TableMatcher::new().map("morning_activity_pattern", "hindi_first"),
        ));

        let output = engine.infer(&signals).await.unwrap();
        let trail = engine.explanations().get(&output.inference_id.unwrap()).unwrap();
        let hindi = trail.top_rules.iter().find(|r| r.name == "hindi_first").unwrap();

        // 2.0 + 1.5 from conditions, 0.3 from the mapped pattern
        assert!((hindi.score - 3.8).abs() < 1e-9);
    }
}
