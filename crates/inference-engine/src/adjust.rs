//! Score adjustment
//!
//! Adds the confidence delta of each detected pattern to the rules that
//! pattern applies to, then re-ranks.

use rule_engine::{rank, Rule, ScoredRule};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Decides whether a detected pattern applies to a rule
pub trait PatternMatcher: Send + Sync {
    fn matches(&self, pattern: &str, rule: &Rule) -> bool;
}

/// Keyword heuristic over rule names
///
/// A business pattern applies to rules named for business, an education
/// pattern to rules named for students, a Hindi pattern to Hindi rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordMatcher;

const KEYWORDS: &[(&str, &str)] = &[("business", "business"), ("education", "student"), ("hindi", "hindi")];

impl PatternMatcher for KeywordMatcher {
    fn matches(&self, pattern: &str, rule: &Rule) -> bool {
        let rule_name = rule.name.to_lowercase();
        KEYWORDS
            .iter()
            .any(|(in_pattern, in_rule)| pattern.contains(in_pattern) && rule_name.contains(in_rule))
    }
}

/// Explicit pattern to rule-name table
#[derive(Debug, Clone, Default)]
pub struct TableMatcher {
    table: HashMap<String, Vec<String>>,
}

impl TableMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map(mut self, pattern: impl Into<String>, rule: impl Into<String>) -> Self {
        self.table.entry(pattern.into()).or_default().push(rule.into());
        self
    }
}

impl From<HashMap<String, Vec<String>>> for TableMatcher {
    fn from(table: HashMap<String, Vec<String>>) -> Self {
        Self { table }
    }
}

impl PatternMatcher for TableMatcher {
    fn matches(&self, pattern: &str, rule: &Rule) -> bool {
        self.table
            .get(pattern)
            .is_some_and(|rules| rules.iter().any(|name| name == &rule.name))
    }
}

/// Apply pattern deltas to the ranking and re-sort it.
/// Returns the number of (pattern, rule) adjustments applied.
pub fn adjust(
    ranking: &mut [ScoredRule<'_>],
    detected: &[String],
    adjustments: &BTreeMap<String, f64>,
    matcher: &dyn PatternMatcher,
) -> usize {
    let mut applied = 0;

    for pattern in detected {
        let Some(&delta) = adjustments.get(pattern) else {
            continue;
        };
        if delta == 0.0 || !delta.is_finite() {
            continue;
        }

        for scored in ranking.iter_mut() {
            if matcher.matches(pattern, scored.rule) {
                debug!("Pattern '{}' adjusts '{}' by {:+.2}", pattern, scored.name, delta);
                scored.score += delta;
                applied += 1;
            }
        }
    }

    if applied > 0 {
        rank(ranking);
    }
    applied
}
