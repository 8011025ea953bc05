//! Rule Scorer
//!
//! A rule's score is the plain sum of its matched condition weights. Rules
//! with more conditions can reach higher scores.

use crate::rule::Rule;
use crate::store::RuleStore;
use serde::Serialize;
use signal_record::{SignalId, SignalRecord};

/// Evidence strings kept per scored rule
pub const MAX_EVIDENCE: usize = 5;

/// Score of one rule against one record
#[derive(Debug, Clone, Serialize)]
pub struct ScoredRule<'a> {
    #[serde(skip)]
    pub rule: &'a Rule,
    pub name: &'a str,
    /// Declaration index in the store; breaks score ties
    #[serde(skip)]
    pub position: usize,
    pub score: f64,
    /// Matched condition signals in declaration order
    pub matched: Vec<SignalId>,
    /// `name=value` for the first matched conditions
    pub evidence: Vec<String>,
}

impl<'a> ScoredRule<'a> {
    /// Matched signal names in declaration order
    pub fn matched_names(&self) -> Vec<String> {
        self.matched.iter().map(|id| id.as_str().to_string()).collect()
    }
}

/// Score one rule
pub fn score_rule<'a>(rule: &'a Rule, record: &SignalRecord) -> ScoredRule<'a> {
    let mut score = 0.0;
    let mut matched = Vec::new();
    let mut evidence = Vec::new();

    for condition in &rule.conditions {
        let (hit, weight) = condition.evaluate(record);
        if !hit {
            continue;
        }
        score += weight;
        matched.push(condition.signal);
        if evidence.len() < MAX_EVIDENCE {
            if let Some(value) = record.get(condition.signal) {
                evidence.push(format!("{}={}", condition.signal, value));
            }
        }
    }

    ScoredRule {
        rule,
        name: &rule.name,
        position: 0,
        score,
        matched,
        evidence,
    }
}

/// Score every rule and rank by descending score; equal scores keep
/// declaration order.
pub fn score_all<'a>(store: &'a RuleStore, record: &SignalRecord) -> Vec<ScoredRule<'a>> {
    let mut ranking: Vec<ScoredRule<'a>> = store
        .rules()
        .iter()
        .enumerate()
        .map(|(position, rule)| ScoredRule {
            position,
            ..score_rule(rule, record)
        })
        .collect();
    rank(&mut ranking);
    ranking
}

/// Descending sort by score, ties by declaration position. Safe to call again
/// after scores change.
pub fn rank(ranking: &mut [ScoredRule<'_>]) {
    ranking.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.position.cmp(&b.position)));
}
