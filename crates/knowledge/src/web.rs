//! Web insight lookup
//!
//! Free-text research answers used only to enrich insight strings.

use crate::client::{ChatClient, ChatConfig, ChatMessage};
use crate::KnowledgeError;
use async_trait::async_trait;

const RESEARCH_PROMPT: &str =
    "You are a helpful research assistant focusing on Indian SMB and consumer trends.";

/// Source of free-text web insight
#[async_trait]
pub trait WebInsightBackend: Send + Sync {
    async fn lookup(&self, query: &str) -> Result<String, KnowledgeError>;
}

/// Web insight over a chat-completions endpoint
pub struct HttpWebInsight {
    client: ChatClient,
}

impl HttpWebInsight {
    pub fn new(config: ChatConfig) -> Self {
        Self {
            client: ChatClient::new(config),
        }
    }
}

#[async_trait]
impl WebInsightBackend for HttpWebInsight {
    async fn lookup(&self, query: &str) -> Result<String, KnowledgeError> {
        let messages = [ChatMessage::system(RESEARCH_PROMPT), ChatMessage::user(query)];
        self.client.complete(&messages, false).await
    }
}
