//! External Reasoning
//!
//! Asks a remote model for a full decision. The reply is untrusted and the
//! call is bounded by a timeout; any failure yields an empty contribution.

use crate::adapter::{AdapterCategory, AdapterOutput, KnowledgeAdapter, ReasoningOverride, ReasoningStep};
use crate::client::{ChatClient, ChatConfig, ChatMessage};
use crate::KnowledgeError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use signal_record::SignalRecord;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Input handed to a reasoning backend
#[derive(Debug, Clone, Serialize)]
pub struct ReasoningRequest {
    /// Known signals keyed by wire name
    pub signals: serde_json::Value,
    /// Summary of upstream adapter outputs
    pub context: String,
}

/// Decision proposed by a backend, as parsed from its reply
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReasoningResponse {
    #[serde(default)]
    pub user_need_state: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub reasoning_summary: Option<String>,
    #[serde(default)]
    pub recommended_actions: Vec<String>,
    #[serde(default)]
    pub ui_mode: Option<String>,
    #[serde(default)]
    pub language_preference: Option<String>,
}

/// Remote reasoning capability
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    async fn infer(&self, request: &ReasoningRequest) -> Result<ReasoningResponse, KnowledgeError>;
}

const SYSTEM_PROMPT: &str = "You are an inference engine for a context-adaptive assistant serving Indian users. \
Analyze the mobile device signals and infer the user's need state (small business owner, student, and so on), \
considering smaller-city and cultural context. Use the upstream context as guidance. \
Reply with a JSON object with keys: user_need_state (string), confidence (number 0-10), \
reasoning_summary (string), recommended_actions (3-5 strings), ui_mode (\"standard\", \"lite\" or \"voice-first\"), \
language_preference (\"hindi\", \"english\", \"regional\", \"mixed\" or \"system_default\").";

/// Reasoning over a chat-completions endpoint in JSON mode
pub struct HttpReasoningBackend {
    client: ChatClient,
}

impl HttpReasoningBackend {
    pub fn new(config: ChatConfig) -> Self {
        Self {
            client: ChatClient::new(config),
        }
    }
}

/// Strip a surrounding markdown code fence, if any
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[async_trait]
impl ReasoningBackend for HttpReasoningBackend {
    async fn infer(&self, request: &ReasoningRequest) -> Result<ReasoningResponse, KnowledgeError> {
        let signals = serde_json::to_string_pretty(&request.signals)
            .map_err(|e| KnowledgeError::MalformedResponse(e.to_string()))?;
        let messages = [
            ChatMessage::system(format!("{}\n\nUpstream context:\n{}", SYSTEM_PROMPT, request.context)),
            ChatMessage::user(format!(
                "Here is the signal data for a user:\n{}\n\nAnalyze this user and provide the inference.",
                signals
            )),
        ];

        let content = self.client.complete(&messages, true).await?;
        serde_json::from_str(strip_code_fence(&content))
            .map_err(|e| KnowledgeError::MalformedResponse(format!("Reply is not the expected JSON object: {}", e)))
    }
}

/// External reasoning adapter. Without a backend it contributes nothing.
pub struct ReasoningAdapter {
    backend: Option<Arc<dyn ReasoningBackend>>,
    timeout: Duration,
}

impl ReasoningAdapter {
    pub fn new(backend: Arc<dyn ReasoningBackend>, timeout: Duration) -> Self {
        Self {
            backend: Some(backend),
            timeout,
        }
    }

    /// Adapter with no backend configured
    pub fn disabled() -> Self {
        Self {
            backend: None,
            timeout: Duration::ZERO,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    async fn call(&self, backend: &dyn ReasoningBackend, request: &ReasoningRequest) -> Option<ReasoningResponse> {
        let result = match tokio::time::timeout(self.timeout, backend.infer(request)).await {
            Ok(result) => result,
            Err(_) => Err(KnowledgeError::Timeout(self.timeout.as_millis() as u64)),
        };
        result
            .map_err(|e| warn!("External reasoning failed: {}", e))
            .ok()
    }
}

/// Compact summary of upstream outputs for the prompt
fn upstream_context(upstream: &[AdapterOutput]) -> String {
    upstream
        .iter()
        .map(|output| {
            let body = serde_json::json!({
                "insights": output.insights,
                "detected": output.detected,
                "confidence_adjustments": output.confidence_adjustments,
            });
            format!("{}: {}", output.category, body)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Validate a backend reply into an override
fn to_override(response: ReasoningResponse) -> Option<ReasoningOverride> {
    let user_need_state = response.user_need_state?.trim().to_string();
    if user_need_state.is_empty() {
        return None;
    }
    let confidence = response
        .confidence
        .filter(|c| c.is_finite())
        .unwrap_or(0.0)
        .clamp(0.0, 10.0);
    let recommended_actions = response
        .recommended_actions
        .into_iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect();

    Some(ReasoningOverride {
        user_need_state,
        confidence,
        reasoning_summary: response.reasoning_summary.unwrap_or_default(),
        recommended_actions,
        ui_mode: response.ui_mode.filter(|m| !m.trim().is_empty()),
        language_preference: response.language_preference.filter(|l| !l.trim().is_empty()),
    })
}

#[async_trait]
impl KnowledgeAdapter for ReasoningAdapter {
    fn category(&self) -> AdapterCategory {
        AdapterCategory::ExternalReasoning
    }

    async fn analyze(&self, signals: &SignalRecord, upstream: &[AdapterOutput]) -> AdapterOutput {
        let mut output = AdapterOutput::empty(AdapterCategory::ExternalReasoning);
        let Some(backend) = self.backend.as_deref() else {
            return output;
        };

        let request = ReasoningRequest {
            signals: signals.to_json(),
            context: upstream_context(upstream),
        };
        let Some(response) = self.call(backend, &request).await else {
            return output;
        };
        let Some(decision) = to_override(response) else {
            warn!("External reasoning reply had no need state, ignoring it");
            return output;
        };

        debug!(
            "External reasoning proposed '{}' ({:.1})",
            decision.user_need_state, decision.confidence
        );
        output
            .insights
            .push(format!("External reasoning: identified as {}", decision.user_need_state));
        output.reasoning_steps.push(ReasoningStep {
            kind: "external_inference".to_string(),
            pattern: decision.user_need_state.clone(),
            reasoning: if decision.reasoning_summary.is_empty() {
                "External reasoning applied".to_string()
            } else {
                decision.reasoning_summary.clone()
            },
            signals_used: signals.iter().map(|(id, _)| id.as_str().to_string()).collect(),
        });
        output.override_decision = Some(decision);
        output
    }
}
