//! Fallback chains over collaborator adapters
//!
//! Chat: AI provider, then knowledge base, then error.
//! Calls: each provisioning tier in order, then the plain phone number.

use std::sync::Arc;

use thiserror::Error;

use bbq_assistant_core::{
    CallProvisioner, CallRequest, CallToken, ConversationalAi, IntegrationError, KnowledgeBase,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Provider,
    KnowledgeBase,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChainedReply {
    pub response: String,
    /// Provider-reported id, else the id the caller sent
    pub conversation_id: String,
    /// Provider context; absent for knowledge-base replies
    pub context: Option<serde_json::Value>,
    pub finished: bool,
    pub source: ReplySource,
}

/// Both reply sources failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("No reply available (provider: {provider}; knowledge base: {knowledge_base})")]
pub struct ChainError {
    pub provider: IntegrationError,
    pub knowledge_base: IntegrationError,
}

pub struct ReplyChain {
    provider: Arc<dyn ConversationalAi>,
    knowledge_base: Arc<dyn KnowledgeBase>,
}

impl ReplyChain {
    pub fn new(provider: Arc<dyn ConversationalAi>, knowledge_base: Arc<dyn KnowledgeBase>) -> Self {
        Self {
            provider,
            knowledge_base,
        }
    }

    pub async fn reply(&self, message: &str, conversation_id: &str) -> Result<ChainedReply, ChainError> {
        let provider_err = match self.provider.send(message, conversation_id).await {
            Ok(reply) => {
                let reply_id = if reply.conversation_id.is_empty() {
                    conversation_id.to_string()
                } else {
                    reply.conversation_id
                };
                return Ok(ChainedReply {
                    response: reply.response,
                    conversation_id: reply_id,
                    context: Some(reply.context),
                    finished: reply.finished,
                    source: ReplySource::Provider,
                })
            }
            Err(e) => e,
        };

        tracing::warn!(
            conversation_id,
            provider = self.provider.name(),
            error = %provider_err,
            "AI provider failed, falling back to knowledge base"
        );
        metrics::counter!("bbq_fallback_total", "chain" => "reply", "tier" => "knowledge_base")
            .increment(1);

        match self.knowledge_base.ask(message, conversation_id).await {
            Ok(reply) => Ok(ChainedReply {
                response: reply.response,
                conversation_id: conversation_id.to_string(),
                context: None,
                finished: reply.finished,
                source: ReplySource::KnowledgeBase,
            }),
            Err(kb_err) => {
                tracing::error!(conversation_id, error = %kb_err, "Knowledge base fallback failed");
                Err(ChainError {
                    provider: provider_err,
                    knowledge_base: kb_err,
                })
            }
        }
    }
}

/// Result of walking the provisioning tiers
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    Token { token: CallToken, tier: String },
    /// Every tier failed; disclose the number instead
    Phone {
        phone_number: String,
        failures: Vec<(String, IntegrationError)>,
    },
}

impl CallOutcome {
    /// One-line summary of tier failures
    pub fn failure_summary(&self) -> Option<String> {
        match self {
            CallOutcome::Token { .. } => None,
            CallOutcome::Phone { failures, .. } => Some(
                failures
                    .iter()
                    .map(|(tier, e)| format!("{}: {}", tier, e))
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
        }
    }
}

pub struct CallChain {
    tiers: Vec<Arc<dyn CallProvisioner>>,
    phone_number: String,
}

impl CallChain {
    pub fn new(phone_number: impl Into<String>) -> Self {
        Self {
            tiers: Vec::new(),
            phone_number: phone_number.into(),
        }
    }

    pub fn with_tier(mut self, tier: Arc<dyn CallProvisioner>) -> Self {
        self.tiers.push(tier);
        self
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    pub async fn provision(&self, request: &CallRequest) -> CallOutcome {
        let mut failures = Vec::new();

        for tier in &self.tiers {
            match tier.create_call(request).await {
                Ok(token) => {
                    if !failures.is_empty() {
                        metrics::counter!("bbq_fallback_total", "chain" => "call", "tier" => tier.tier().to_string())
                            .increment(1);
                    }
                    return CallOutcome::Token {
                        token,
                        tier: tier.tier().to_string(),
                    };
                }
                Err(e) => {
                    tracing::warn!(tier = tier.tier(), agent_id = %request.agent_id, error = %e, "Call provisioning tier failed");
                    failures.push((tier.tier().to_string(), e));
                }
            }
        }

        metrics::counter!("bbq_fallback_total", "chain" => "call", "tier" => "phone").increment(1);
        CallOutcome::Phone {
            phone_number: self.phone_number.clone(),
            failures,
        }
    }
}
