//! Knowledge Adapters
//!
//! Pluggable enrichment sources run in a fixed order after rule scoring:
//! signal pattern matching, app domain context and external reasoning. Each
//! adapter sees the outputs of the adapters before it. Adapters never fail
//! the pipeline; a failing source contributes an empty output.

mod adapter;
mod client;
mod domain;
mod pattern;
mod reasoning;
mod web;

pub use adapter::{AdapterCategory, AdapterOutput, KnowledgeAdapter, ReasoningOverride, ReasoningStep};
pub use client::{ChatClient, ChatConfig, ChatMessage};
pub use domain::DomainAdapter;
pub use pattern::{pattern_boost, PatternAdapter, PatternSpec, PATTERNS};
pub use reasoning::{HttpReasoningBackend, ReasoningAdapter, ReasoningBackend, ReasoningRequest, ReasoningResponse};
pub use web::{HttpWebInsight, WebInsightBackend};

use thiserror::Error;

/// Failures of external knowledge sources
#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Timed out after {0} ms")]
    Timeout(u64),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}
