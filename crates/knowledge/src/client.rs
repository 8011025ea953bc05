//! Chat-completions HTTP client
//!
//! Works with any OpenAI-compatible endpoint (OpenRouter, Perplexity, vLLM).

use crate::KnowledgeError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Endpoint configuration for a chat-completions backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Base URL; `/chat/completions` is appended
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    /// Upper bound on one call, enforced by the calling adapter
    pub timeout_ms: u64,
}

impl ChatConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Thin chat-completions client
pub struct ChatClient {
    client: reqwest::Client,
    config: ChatConfig,
}

impl ChatClient {
    pub fn new(config: ChatConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Send one completion request and return the first choice's content.
    /// With `json_object` set the backend is asked for a JSON object reply.
    pub async fn complete(&self, messages: &[ChatMessage], json_object: bool) -> Result<String, KnowledgeError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages,
            response_format: json_object.then_some(ResponseFormat { kind: "json_object" }),
        };

        let url = format!("{}/chat/completions", self.config.endpoint.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| KnowledgeError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(KnowledgeError::Status { status, body });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| KnowledgeError::MalformedResponse(format!("Failed to parse response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| KnowledgeError::MalformedResponse("No choices in response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn config(endpoint: String) -> ChatConfig {
        ChatConfig {
            endpoint,
            api_key: "test-key".to_string(),
            model: "test-model".to_string(),
            timeout_ms: 1_000,
        }
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "test-model",
                "response_format": {"type": "json_object"}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices": [{"message": {"role": "assistant", "content": "hello"}}]}"#)
            .create_async()
            .await;

        let client = ChatClient::new(config(server.url()));
        let content = client.complete(&[ChatMessage::user("hi")], true).await.unwrap();

        assert_eq!(content, "hello");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body("slow down")
            .create_async()
            .await;

        let client = ChatClient::new(config(server.url()));
        let err = client.complete(&[ChatMessage::user("hi")], false).await.unwrap_err();
        assert!(matches!(err, KnowledgeError::Status { status: 429, .. }));
    }

    #[tokio::test]
    async fn test_empty_choices() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let client = ChatClient::new(config(format!("{}/", server.url())));
        let err = client.complete(&[ChatMessage::user("hi")], false).await.unwrap_err();
        assert!(matches!(err, KnowledgeError::MalformedResponse(_)));
    }
}
