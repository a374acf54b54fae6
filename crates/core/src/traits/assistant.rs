//! Conversational AI provider and knowledge-base capabilities

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::IntegrationError;

/// Reply from the AI provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiReply {
    pub response: String,
    /// Conversation id the provider reports for this exchange
    #[serde(default)]
    pub conversation_id: String,
    /// Provider-defined conversation context, passed through as-is
    #[serde(default)]
    pub context: serde_json::Value,
    #[serde(default)]
    pub finished: bool,
}

/// Reply from the knowledge-base fallback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeReply {
    pub response: String,
    #[serde(default)]
    pub finished: bool,
}

#[async_trait]
pub trait ConversationalAi: Send + Sync {
    /// Send one user message within a conversation
    async fn send(&self, message: &str, conversation_id: &str) -> Result<AiReply, IntegrationError>;

    /// Provider name for logs and metrics
    fn name(&self) -> &str;
}

#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    async fn ask(&self, message: &str, conversation_id: &str)
        -> Result<KnowledgeReply, IntegrationError>;
}
