//! Application State
//!
//! Shared state across all handlers.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use bbq_assistant_agent::BookingFlow;
use bbq_assistant_config::Settings;
use bbq_assistant_core::{CallLogger, ConversationalAi, KnowledgeBase};
use bbq_assistant_integrations::{
    BatchCallProvisioner, CallChain, KnowledgeBaseClient, ReplyChain, RetellClient,
    WebCallProvisioner, WebhookCallLogger,
};

use crate::session::{ConversationStore, InMemoryConversationStore, TurnLocks};
use crate::ServerError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    /// Booking state machine
    pub flow: Arc<BookingFlow>,
    pub conversations: Arc<dyn ConversationStore>,
    pub turn_locks: Arc<TurnLocks>,
    /// Provider then knowledge base
    pub replies: Arc<ReplyChain>,
    /// Provisioning tiers then phone number
    pub calls: Arc<CallChain>,
    /// Absent when no webhook URL is configured
    pub call_logger: Option<Arc<dyn CallLogger>>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Wire every collaborator from configuration
    pub fn from_settings(settings: Settings) -> Result<Self, ServerError> {
        let flow = BookingFlow::from_config(&settings.booking)
            .map_err(|e| ServerError::MissingConfiguration(e.to_string()))?;

        let retell = Arc::new(
            RetellClient::new(&settings.retell).map_err(|e| ServerError::Internal(e.to_string()))?,
        );
        let knowledge_base = KnowledgeBaseClient::new(&settings.knowledge_base)
            .map_err(|e| ServerError::Internal(e.to_string()))?;

        let replies = ReplyChain::new(
            retell.clone() as Arc<dyn ConversationalAi>,
            Arc::new(knowledge_base) as Arc<dyn KnowledgeBase>,
        );
        let calls = CallChain::new(settings.calls.phone_number.clone())
            .with_tier(Arc::new(WebCallProvisioner::new(retell.clone())))
            .with_tier(Arc::new(BatchCallProvisioner::new(retell)));

        let call_logger = match settings.webhook.url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => {
                let logger =
                    WebhookCallLogger::new(url).map_err(|e| ServerError::Internal(e.to_string()))?;
                tracing::info!(url = logger.url(), "Transcript webhook enabled");
                Some(Arc::new(logger) as Arc<dyn CallLogger>)
            }
            _ => {
                tracing::warn!("No webhook URL configured, transcripts will not be logged");
                None
            }
        };

        let conversations = Arc::new(InMemoryConversationStore::from_config(&settings.sessions));

        Ok(Self {
            settings: Arc::new(settings),
            flow: Arc::new(flow),
            conversations,
            turn_locks: Arc::new(TurnLocks::new()),
            replies: Arc::new(replies),
            calls: Arc::new(calls),
            call_logger,
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    pub fn with_conversation_store(mut self, store: Arc<dyn ConversationStore>) -> Self {
        self.conversations = store;
        self
    }

    pub fn with_flow(mut self, flow: BookingFlow) -> Self {
        self.flow = Arc::new(flow);
        self
    }

    pub fn with_reply_chain(mut self, replies: ReplyChain) -> Self {
        self.replies = Arc::new(replies);
        self
    }

    pub fn with_call_chain(mut self, calls: CallChain) -> Self {
        self.calls = Arc::new(calls);
        self
    }

    pub fn with_call_logger(mut self, logger: Arc<dyn CallLogger>) -> Self {
        self.call_logger = Some(logger);
        self
    }

    /// Check if conversations survive across instances
    pub fn is_distributed_sessions(&self) -> bool {
        self.conversations.is_distributed()
    }
}
