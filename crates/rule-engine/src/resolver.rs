//! Decision Resolver
//!
//! Cascading threshold policy over a ranked rule list:
//! 1. no rules: default
//! 2. top rule clears its own threshold: top rule
//! 3. first rule clearing both its threshold and the global floor
//! 4. default
//!
//! A rule with no matched condition is never selected, so a record that
//! matches nothing always resolves to the default.

use crate::config::{OutputConfig, ScoringConfig};
use crate::rule::{LanguagePreference, OutputDescriptor, UiMode};
use crate::scorer::ScoredRule;
use crate::store::RuleStore;
use serde::Serialize;
use tracing::debug;

/// `matched_rule` value when the default descriptor is used
pub const DEFAULT_RULE_NAME: &str = "default";

/// Outcome of the cascade
#[derive(Debug, Clone, Copy)]
pub enum Selection<'r, 'a> {
    Rule {
        scored: &'r ScoredRule<'a>,
        confidence: f64,
    },
    Default,
}

/// Resolved decision before adapter enrichment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    pub user_need_state: String,
    pub confidence: f64,
    pub matched_rule: String,
    pub matched_conditions: Vec<String>,
    pub evidence: Vec<String>,
    pub ui_mode: UiMode,
    pub language_preference: LanguagePreference,
    pub recommended_actions: Vec<String>,
}

impl Decision {
    /// Default descriptor with zero confidence
    pub fn fallback(store: &RuleStore) -> Self {
        let output = store.default_output();
        Self {
            user_need_state: output.user_need_state.clone(),
            confidence: 0.0,
            matched_rule: DEFAULT_RULE_NAME.to_string(),
            matched_conditions: Vec::new(),
            evidence: Vec::new(),
            ui_mode: output.ui_mode,
            language_preference: output.language_preference,
            recommended_actions: recommend_actions(store, output),
        }
    }

    /// Whether the default descriptor was used
    pub fn is_default(&self) -> bool {
        self.matched_rule == DEFAULT_RULE_NAME
    }
}

fn clears_threshold(scored: &ScoredRule<'_>) -> bool {
    scored.score > 0.0 && scored.score >= scored.rule.output.confidence_threshold
}

/// Apply the cascade to a ranking sorted by descending score
pub fn select<'r, 'a>(ranking: &'r [ScoredRule<'a>], scoring: &ScoringConfig) -> Selection<'r, 'a> {
    let Some(top) = ranking.first() else {
        return Selection::Default;
    };

    let chosen = if clears_threshold(top) {
        Some(top)
    } else {
        debug!(
            "Top rule '{}' scored {:.2}, below its threshold {:.2}",
            top.name, top.score, top.rule.output.confidence_threshold
        );
        ranking
            .iter()
            .find(|candidate| clears_threshold(candidate) && candidate.score >= scoring.min_confidence)
    };

    match chosen {
        Some(scored) => Selection::Rule {
            scored,
            confidence: scored.score.min(scoring.max_confidence).max(0.0),
        },
        None => Selection::Default,
    }
}

/// Resolve a ranking into a decision
pub fn resolve(store: &RuleStore, ranking: &[ScoredRule<'_>]) -> Decision {
    match select(ranking, store.scoring()) {
        Selection::Rule { scored, confidence } => {
            let output = &scored.rule.output;
            Decision {
                user_need_state: output.user_need_state.clone(),
                confidence,
                matched_rule: scored.name.to_string(),
                matched_conditions: scored.matched_names(),
                evidence: scored.evidence.clone(),
                ui_mode: output.ui_mode,
                language_preference: output.language_preference,
                recommended_actions: recommend_actions(store, output),
            }
        }
        Selection::Default => Decision::fallback(store),
    }
}

/// Actions for an output: truncated to the configured maximum, then padded
/// from the default rule's actions up to the minimum.
pub fn recommend_actions(store: &RuleStore, output: &OutputDescriptor) -> Vec<String> {
    let limits = store.output_config();
    let mut actions: Vec<String> = output
        .recommended_actions
        .iter()
        .take(limits.max_recommended_actions)
        .cloned()
        .collect();

    for action in &store.default_output().recommended_actions {
        if actions.len() >= limits.min_recommended_actions {
            break;
        }
        if !actions.contains(action) {
            actions.push(action.clone());
        }
    }
    actions
}

/// Human-readable explanation of a rule-based decision. A configured
/// template takes precedence over the built-in wording.
pub fn explain(decision: &Decision, output: &OutputConfig) -> String {
    let top_signals = if decision.evidence.is_empty() {
        None
    } else {
        Some(decision.evidence.iter().take(3).cloned().collect::<Vec<_>>().join(", "))
    };

    if let Some(template) = &output.explanation_template {
        return template
            .replace("{user_need_state}", &decision.user_need_state)
            .replace("{confidence}", &format!("{:.1}", decision.confidence))
            .replace("{matched_conditions}", &decision.matched_conditions.len().to_string())
            .replace("{top_signals}", top_signals.as_deref().unwrap_or("system defaults"));
    }

    if decision.matched_conditions.is_empty() {
        format!(
            "Inferred '{}' using default rule. Confidence: {:.1}/10.0 (low - insufficient signals).",
            decision.user_need_state, decision.confidence
        )
    } else {
        let conditions: Vec<&str> = decision
            .matched_conditions
            .iter()
            .take(5)
            .map(String::as_str)
            .collect();
        format!(
            "Inferred '{}' with confidence {:.1}/10.0 based on {} matching signals: {}. Key indicators: {}.",
            decision.user_need_state,
            decision.confidence,
            decision.matched_conditions.len(),
            conditions.join(", "),
            top_signals.as_deref().unwrap_or("N/A")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::score_all;
    use signal_record::{SignalId, SignalRecord};

    const RULES: &str = r#"
default_rule:
  user_need_state: "First-time AI Explorer"
  ui_mode: "standard"
  recommended_actions: ["Try a sample question", "Explore examples", "Use voice input", "Read the guide"]
scoring:
  min_confidence: 3.0
  max_confidence: 10.0
rules:
  - name: "Morning Devotional User"
    conditions:
      - signal: time_of_day
        operator: in_set
        value: ["morning", "early_morning"]
        weight: 2.0
      - signal: system_language
        operator: equals
        value: "hi"
        weight: 2.0
      - signal: first_action
        operator: equals
        value: "voice"
        weight: 1.5
    output:
      user_need_state: "Morning Devotional User"
      ui_mode: "voice-first"
      language_preference: "hindi"
      recommended_actions: ["Play morning prayer", "Today's panchang"]
      confidence_threshold: 4.0
  - name: "Picky"
    conditions:
      - signal: network_type
        operator: equals
        value: "2g"
        weight: 5.0
      - signal: device_class
        operator: equals
        value: "low_end"
        weight: 1.0
    output:
      user_need_state: "Picky"
      confidence_threshold: 5.5
  - name: "Modest"
    conditions:
      - signal: network_type
        operator: equals
        value: "2g"
        weight: 3.0
    output:
      user_need_state: "Modest"
      ui_mode: "lite"
      recommended_actions: ["a1", "a2", "a3", "a4", "a5", "a6"]
      confidence_threshold: 1.0
"#;

    fn store() -> RuleStore {
        RuleStore::from_yaml_str(RULES).unwrap()
    }

    #[test]
    fn test_morning_devotional_scenario() {
        let store = store();
        let record = SignalRecord::new()
            .with(SignalId::TimeOfDay, "morning")
            .with(SignalId::HourOfDay, 7)
            .with(SignalId::SystemLanguage, "hi")
            .with(SignalId::FirstAction, "voice");

        let ranking = score_all(&store, &record);
        let decision = resolve(&store, &ranking);

        assert_eq!(decision.user_need_state, "Morning Devotional User");
        assert_eq!(decision.confidence, 5.5);
        assert_eq!(decision.ui_mode, UiMode::VoiceFirst);
        assert_eq!(decision.language_preference, LanguagePreference::Hindi);
        assert_eq!(
            decision.matched_conditions,
            vec!["time_of_day", "system_language", "first_action"]
        );
        // Padded from the default rule up to three actions
        assert_eq!(
            decision.recommended_actions,
            vec!["Play morning prayer", "Today's panchang", "Try a sample question"]
        );
    }

    #[test]
    fn test_zero_match_uses_default() {
        let store = store();
        let ranking = score_all(&store, &SignalRecord::new());
        let decision = resolve(&store, &ranking);

        assert!(decision.is_default());
        assert_eq!(decision.user_need_state, "First-time AI Explorer");
        assert_eq!(decision.confidence, 0.0);
        assert_eq!(decision.recommended_actions.len(), 3);
    }

    #[test]
    fn test_empty_store_uses_default() {
        let store = RuleStore::from_yaml_str(
            "default_rule:\n  user_need_state: \"Explorer\"\n  recommended_actions: [\"a\", \"b\", \"c\"]\n",
        )
        .unwrap();
        let decision = resolve(&store, &[]);
        assert_eq!(decision.matched_rule, "default");
        assert_eq!(decision.user_need_state, "Explorer");
        assert_eq!(decision.confidence, 0.0);
    }

    #[test]
    fn test_cascade_to_lower_ranked_rule() {
        let store = store();
        let record = SignalRecord::new().with(SignalId::NetworkType, "2g");
        let ranking = score_all(&store, &record);
        assert_eq!(ranking[0].name, "Picky");

        // Picky scores 5.0 under its 5.5 threshold; Modest clears 1.0 and the 3.0 floor
        let decision = resolve(&store, &ranking);
        assert_eq!(decision.matched_rule, "Modest");
        assert_eq!(decision.confidence, 3.0);
        assert_eq!(decision.ui_mode, UiMode::Lite);
        assert_eq!(decision.recommended_actions.len(), 5);
    }

    #[test]
    fn test_global_floor_blocks_cascade() {
        let mut store_source = RULES.to_string();
        store_source = store_source.replace("min_confidence: 3.0", "min_confidence: 4.0");
        let store = RuleStore::from_yaml_str(&store_source).unwrap();
        let record = SignalRecord::new().with(SignalId::NetworkType, "2g");
        let ranking = score_all(&store, &record);

        let decision = resolve(&store, &ranking);
        assert!(decision.is_default());
    }

    #[test]
    fn test_confidence_capped() {
        let source = RULES.replace("max_confidence: 10.0", "max_confidence: 5.0");
        let store = RuleStore::from_yaml_str(&source).unwrap();
        let record = SignalRecord::new()
            .with(SignalId::TimeOfDay, "morning")
            .with(SignalId::SystemLanguage, "hi")
            .with(SignalId::FirstAction, "voice");
        let decision = resolve(&store, &score_all(&store, &record));
        assert_eq!(decision.confidence, 5.0);
    }

    #[test]
    fn test_explanations() {
        let store = store();
        let fallback = Decision::fallback(&store);
        assert_eq!(
            explain(&fallback, store.output_config()),
            "Inferred 'First-time AI Explorer' using default rule. Confidence: 0.0/10.0 (low - insufficient signals)."
        );

        let record = SignalRecord::new()
            .with(SignalId::TimeOfDay, "morning")
            .with(SignalId::SystemLanguage, "hi");
        let decision = resolve(&store, &score_all(&store, &record));
        let text = explain(&decision, store.output_config());
        assert!(text.starts_with("Inferred 'Morning Devotional User' with confidence 4.0/10.0"));
        assert!(text.contains("Key indicators: time_of_day=morning, system_language=hi."));

        let templated = OutputConfig {
            explanation_template: Some("{user_need_state} from {matched_conditions} signals: {top_signals}".to_string()),
            ..Default::default()
        };
        assert_eq!(
            explain(&decision, &templated),
            "Morning Devotional User from 2 signals: time_of_day=morning, system_language=hi"
        );
    }
}
