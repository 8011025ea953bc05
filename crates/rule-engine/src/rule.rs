//! Compiled rules

use crate::operator::{self, Literal, Operator};
use serde::Serialize;
use signal_record::{SignalId, SignalRecord};
use std::fmt;
use tracing::warn;

/// A single weighted condition on one signal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    pub signal: SignalId,
    pub operator: Operator,
    pub value: Literal,
    pub weight: f64,
}

impl Condition {
    /// Evaluate against a record; see [`operator::evaluate`]
    pub fn evaluate(&self, record: &SignalRecord) -> (bool, f64) {
        operator::evaluate(self.operator, &self.value, record.get(self.signal), self.weight)
    }
}

/// Interface mode recommended to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UiMode {
    Standard,
    Lite,
    VoiceFirst,
}

impl UiMode {
    /// Parse a mode name, `None` if unknown
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "standard" => Some(UiMode::Standard),
            "lite" => Some(UiMode::Lite),
            "voice-first" | "voice_first" => Some(UiMode::VoiceFirst),
            _ => None,
        }
    }

    /// Parse a mode name, falling back to `standard` with a warning
    pub fn parse_or_default(name: &str) -> Self {
        Self::parse(name).unwrap_or_else(|| {
            warn!("Unknown ui_mode '{}', using standard", name);
            UiMode::Standard
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UiMode::Standard => "standard",
            UiMode::Lite => "lite",
            UiMode::VoiceFirst => "voice-first",
        }
    }
}

impl fmt::Display for UiMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content language recommended to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguagePreference {
    Hindi,
    English,
    Regional,
    Mixed,
    SystemDefault,
}

impl LanguagePreference {
    /// Parse a language name, `None` if unknown
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "hindi" => Some(LanguagePreference::Hindi),
            "english" => Some(LanguagePreference::English),
            "regional" => Some(LanguagePreference::Regional),
            "mixed" => Some(LanguagePreference::Mixed),
            "system_default" => Some(LanguagePreference::SystemDefault),
            _ => None,
        }
    }

    /// Parse a language name, falling back to `system_default` with a warning
    pub fn parse_or_default(name: &str) -> Self {
        Self::parse(name).unwrap_or_else(|| {
            warn!("Unknown language_preference '{}', using system_default", name);
            LanguagePreference::SystemDefault
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LanguagePreference::Hindi => "hindi",
            LanguagePreference::English => "english",
            LanguagePreference::Regional => "regional",
            LanguagePreference::Mixed => "mixed",
            LanguagePreference::SystemDefault => "system_default",
        }
    }
}

impl fmt::Display for LanguagePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a rule yields when selected
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputDescriptor {
    pub user_need_state: String,
    pub ui_mode: UiMode,
    pub language_preference: LanguagePreference,
    pub recommended_actions: Vec<String>,
    pub confidence_threshold: f64,
}

/// A named rule: ordered conditions plus output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    pub name: String,
    pub description: String,
    pub conditions: Vec<Condition>,
    pub output: OutputDescriptor,
}
