//! Rule Store
//!
//! Immutable, ordered rule collection. Reloading builds a new store and swaps
//! it in through [`RuleStoreHandle`].

use crate::config::{OutputConfig, OutputEntry, RuleConfig, RuleEntry, ScoringConfig};
use crate::operator::Operator;
use crate::rule::{Condition, LanguagePreference, OutputDescriptor, Rule, UiMode};
use crate::RuleError;
use signal_record::SignalId;
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

/// Loaded, validated rules
#[derive(Debug, Clone)]
pub struct RuleStore {
    rules: Vec<Rule>,
    default_output: OutputDescriptor,
    scoring: ScoringConfig,
    output: OutputConfig,
}

impl RuleStore {
    /// Compile and validate a parsed configuration
    pub fn from_config(config: RuleConfig) -> Result<Self, RuleError> {
        let RuleConfig {
            rules: entries,
            default_rule,
            scoring,
            output,
        } = config;

        if !scoring.min_confidence.is_finite()
            || !scoring.max_confidence.is_finite()
            || scoring.min_confidence < 0.0
            || scoring.min_confidence > scoring.max_confidence
        {
            return Err(RuleError::InvalidBounds(format!(
                "min_confidence {} / max_confidence {}",
                scoring.min_confidence, scoring.max_confidence
            )));
        }
        if output.min_recommended_actions > output.max_recommended_actions {
            return Err(RuleError::InvalidBounds(format!(
                "min_recommended_actions {} > max_recommended_actions {}",
                output.min_recommended_actions, output.max_recommended_actions
            )));
        }

        let default_output = compile_output("default", default_rule)?;
        if default_output.recommended_actions.len() < output.min_recommended_actions {
            return Err(RuleError::InsufficientDefaultActions {
                required: output.min_recommended_actions,
                found: default_output.recommended_actions.len(),
            });
        }

        let mut seen = HashSet::new();
        let mut rules = Vec::with_capacity(entries.len());
        for entry in entries {
            if !seen.insert(entry.name.clone()) {
                return Err(RuleError::DuplicateRule(entry.name));
            }
            let rule = compile_rule(entry)?;
            if rule.conditions.is_empty() {
                warn!("Rule '{}' has no conditions and can only score 0", rule.name);
            }
            rules.push(rule);
        }

        Ok(Self {
            rules,
            default_output,
            scoring,
            output,
        })
    }

    /// Load and compile a rules file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RuleError> {
        let path = path.as_ref();
        let store = Self::from_config(RuleConfig::load(path)?)?;
        info!("Loaded {} rules from {}", store.len(), path.display());
        Ok(store)
    }

    /// Compile rules from a YAML string
    pub fn from_yaml_str(source: &str) -> Result<Self, RuleError> {
        Self::from_config(RuleConfig::from_yaml_str(source)?)
    }

    /// Rules in declaration order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Look up a rule by name
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Output used when no rule is selected
    pub fn default_output(&self) -> &OutputDescriptor {
        &self.default_output
    }

    pub fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }

    pub fn output_config(&self) -> &OutputConfig {
        &self.output
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn compile_rule(entry: RuleEntry) -> Result<Rule, RuleError> {
    let RuleEntry {
        name,
        description,
        conditions: raw_conditions,
        output,
    } = entry;

    let mut conditions = Vec::with_capacity(raw_conditions.len());
    for raw in raw_conditions {
        let signal = SignalId::from_name(&raw.signal).ok_or_else(|| RuleError::UnknownSignal {
            rule: name.clone(),
            signal: raw.signal.clone(),
        })?;
        let operator = Operator::from_name(&raw.operator).ok_or_else(|| RuleError::UnknownOperator {
            rule: name.clone(),
            operator: raw.operator.clone(),
        })?;
        operator
            .check(&raw.value)
            .map_err(|reason| RuleError::InvalidCondition {
                rule: name.clone(),
                signal: raw.signal.clone(),
                reason,
            })?;
        if !raw.weight.is_finite() || raw.weight <= 0.0 {
            return Err(RuleError::InvalidWeight {
                rule: name,
                weight: raw.weight,
            });
        }

        conditions.push(Condition {
            signal,
            operator,
            value: raw.value,
            weight: raw.weight,
        });
    }

    let output = compile_output(&name, output)?;
    Ok(Rule {
        name,
        description,
        conditions,
        output,
    })
}

fn compile_output(rule: &str, entry: OutputEntry) -> Result<OutputDescriptor, RuleError> {
    if !entry.confidence_threshold.is_finite() || entry.confidence_threshold < 0.0 {
        return Err(RuleError::InvalidThreshold {
            rule: rule.to_string(),
            threshold: entry.confidence_threshold,
        });
    }
    Ok(OutputDescriptor {
        user_need_state: entry.user_need_state,
        ui_mode: UiMode::parse_or_default(&entry.ui_mode),
        language_preference: LanguagePreference::parse_or_default(&entry.language_preference),
        recommended_actions: entry.recommended_actions,
        confidence_threshold: entry.confidence_threshold,
    })
}

/// Shared pointer to the current rule store. Reload swaps the whole store;
/// callers holding the previous `Arc` keep a consistent view.
#[derive(Debug)]
pub struct RuleStoreHandle {
    current: RwLock<Arc<RuleStore>>,
}

impl RuleStoreHandle {
    pub fn new(store: RuleStore) -> Self {
        Self {
            current: RwLock::new(Arc::new(store)),
        }
    }

    /// Snapshot of the current store
    pub fn current(&self) -> Arc<RuleStore> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Replace the current store
    pub fn replace(&self, store: RuleStore) {
        let store = Arc::new(store);
        match self.current.write() {
            Ok(mut guard) => *guard = store,
            Err(poisoned) => *poisoned.into_inner() = store,
        }
    }

    /// Reload from a file. On error the current store is kept.
    pub fn reload(&self, path: impl AsRef<Path>) -> Result<(), RuleError> {
        let store = RuleStore::load(path)?;
        self.replace(store);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const RULES: &str = r#"
default_rule:
  user_need_state: "First-time AI Explorer"
  recommended_actions: ["Try asking a question", "Explore examples", "Use voice input"]
rules:
  - name: "Hindi-first User"
    description: "Prefers Hindi content"
    conditions:
      - signal: system_language
        operator: equals
        value: "hi"
        weight: 2.0
    output:
      user_need_state: "Hindi-first User"
      language_preference: "hindi"
      recommended_actions: ["Show Hindi prompts"]
  - name: "Low-network Slow Device User"
    conditions:
      - signal: network_type
        operator: in
        value: ["2g", "3g"]
      - signal: hour_of_day
        operator: between
        value: [5, 9]
    output:
      user_need_state: "Low-network Slow Device User"
      ui_mode: "lite"
      confidence_threshold: 1.5
"#;

    fn with_rule(condition: &str) -> String {
        format!(
            r#"
default_rule:
  user_need_state: "Explorer"
  recommended_actions: ["a", "b", "c"]
rules:
  - name: "Broken"
    conditions:
{}
    output:
      user_need_state: "Broken"
"#,
            condition
        )
    }

    #[test]
    fn test_load_from_str() {
        let store = RuleStore::from_yaml_str(RULES).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.rules()[0].name, "Hindi-first User");
        assert_eq!(store.rules()[1].conditions[0].operator, Operator::InSet);
        assert_eq!(store.rules()[1].output.ui_mode, UiMode::Lite);
        assert_eq!(store.rules()[1].output.confidence_threshold, 1.5);
        assert_eq!(
            store.rule("Hindi-first User").unwrap().output.language_preference,
            LanguagePreference::Hindi
        );
        assert_eq!(store.default_output().user_need_state, "First-time AI Explorer");
    }

    #[test]
    fn test_unknown_operator_rejected() {
        let source = with_rule("      - signal: month\n        operator: regex\n        value: \"1\"");
        let err = RuleStore::from_yaml_str(&source).unwrap_err();
        assert!(matches!(err, RuleError::UnknownOperator { .. }));
    }

    #[test]
    fn test_unknown_signal_rejected() {
        let source = with_rule("      - signal: shoe_size\n        operator: equals\n        value: \"9\"");
        let err = RuleStore::from_yaml_str(&source).unwrap_err();
        assert!(matches!(err, RuleError::UnknownSignal { .. }));
    }

    #[test]
    fn test_bad_between_rejected() {
        let source = with_rule("      - signal: hour_of_day\n        operator: between\n        value: 5");
        let err = RuleStore::from_yaml_str(&source).unwrap_err();
        assert!(matches!(err, RuleError::InvalidCondition { .. }));
    }

    #[test]
    fn test_non_positive_weight_rejected() {
        let source = with_rule(
            "      - signal: month\n        operator: equals\n        value: 11\n        weight: 0",
        );
        let err = RuleStore::from_yaml_str(&source).unwrap_err();
        assert!(matches!(err, RuleError::InvalidWeight { .. }));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let source = r#"
default_rule:
  user_need_state: "Explorer"
  recommended_actions: ["a", "b", "c"]
rules:
  - name: "Same"
    output:
      user_need_state: "One"
  - name: "Same"
    output:
      user_need_state: "Two"
"#;
        let err = RuleStore::from_yaml_str(source).unwrap_err();
        assert!(matches!(err, RuleError::DuplicateRule(name) if name == "Same"));
    }

    #[test]
    fn test_default_needs_min_actions() {
        let source = r#"
default_rule:
  user_need_state: "Explorer"
  recommended_actions: ["only one"]
"#;
        let err = RuleStore::from_yaml_str(source).unwrap_err();
        assert!(matches!(
            err,
            RuleError::InsufficientDefaultActions { required: 3, found: 1 }
        ));
    }

    #[test]
    fn test_handle_reload() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(RULES.as_bytes()).unwrap();

        let handle = RuleStoreHandle::new(RuleStore::from_yaml_str(&with_rule(
            "      - signal: month\n        operator: equals\n        value: 11",
        )).unwrap());
        let before = handle.current();
        assert_eq!(before.len(), 1);

        handle.reload(file.path()).unwrap();
        assert_eq!(handle.current().len(), 2);
        // Earlier snapshots are unaffected
        assert_eq!(before.rules()[0].name, "Broken");

        assert!(handle.reload("/no/such/rules.yaml").is_err());
        assert_eq!(handle.current().len(), 2);
    }
}
