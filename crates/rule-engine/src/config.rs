//! Rule configuration file model
//!
//! Raw, untyped shape of the rules file as loaded by the `config` crate.
//! [`RuleStore::from_config`](crate::RuleStore::from_config) compiles it into
//! typed rules and rejects anything malformed.

use crate::operator::Literal;
use crate::RuleError;
use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level rules file
#[derive(Debug, Clone, Deserialize)]
pub struct RuleConfig {
    /// Ordered rule entries
    #[serde(default)]
    pub rules: Vec<RuleEntry>,
    /// Output used when no rule is selected
    pub default_rule: OutputEntry,
    /// Scoring bounds
    #[serde(default)]
    pub scoring: ScoringConfig,
    /// Output shaping
    #[serde(default)]
    pub output: OutputConfig,
}

/// One rule as written in the file
#[derive(Debug, Clone, Deserialize)]
pub struct RuleEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub conditions: Vec<ConditionEntry>,
    pub output: OutputEntry,
}

/// One condition as written in the file
#[derive(Debug, Clone, Deserialize)]
pub struct ConditionEntry {
    pub signal: String,
    pub operator: String,
    pub value: Literal,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

/// Output block of a rule or of the default rule
#[derive(Debug, Clone, Deserialize)]
pub struct OutputEntry {
    pub user_need_state: String,
    #[serde(default = "default_ui_mode")]
    pub ui_mode: String,
    #[serde(default = "default_language")]
    pub language_preference: String,
    #[serde(default)]
    pub recommended_actions: Vec<String>,
    #[serde(default)]
    pub confidence_threshold: f64,
}

fn default_ui_mode() -> String {
    "standard".to_string()
}

fn default_language() -> String {
    "system_default".to_string()
}

/// Scoring bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Floor a lower-ranked rule must clear to be selected
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
    /// Cap applied to selected rule scores
    #[serde(default = "default_max_confidence")]
    pub max_confidence: f64,
    /// Informational scoring method label
    #[serde(default = "default_method")]
    pub method: String,
}

fn default_min_confidence() -> f64 {
    3.0
}

fn default_max_confidence() -> f64 {
    10.0
}

fn default_method() -> String {
    "weighted_sum".to_string()
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            max_confidence: default_max_confidence(),
            method: default_method(),
        }
    }
}

/// Output shaping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_max_actions")]
    pub max_recommended_actions: usize,
    #[serde(default = "default_min_actions")]
    pub min_recommended_actions: usize,
    /// Optional template with `{user_need_state}`, `{confidence}`,
    /// `{matched_conditions}` and `{top_signals}` placeholders
    #[serde(default)]
    pub explanation_template: Option<String>,
}

fn default_max_actions() -> usize {
    5
}

fn default_min_actions() -> usize {
    3
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_recommended_actions: default_max_actions(),
            min_recommended_actions: default_min_actions(),
            explanation_template: None,
        }
    }
}

impl RuleConfig {
    /// Load a rules file. Format is inferred from the extension (yaml, json, toml).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RuleError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RuleError::NotFound(path.display().to_string()));
        }
        Config::builder()
            .add_source(File::from(path))
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|e| RuleError::Malformed(e.to_string()))
    }

    /// Parse rules from a YAML string
    pub fn from_yaml_str(source: &str) -> Result<Self, RuleError> {
        Self::from_str(source, FileFormat::Yaml)
    }

    /// Parse rules from a JSON string
    pub fn from_json_str(source: &str) -> Result<Self, RuleError> {
        Self::from_str(source, FileFormat::Json)
    }

    fn from_str(source: &str, format: FileFormat) -> Result<Self, RuleError> {
        Config::builder()
            .add_source(File::from_str(source, format))
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|e| RuleError::Malformed(e.to_string()))
    }
}
