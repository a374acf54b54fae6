//! External collaborator adapters
//!
//! - Retell conversational AI and call provisioning (primary and batch tiers)
//! - Knowledge-base fallback service
//! - Transcript webhook
//! - Fallback chains tying them together

pub mod fallback;
pub mod http;
pub mod knowledge_base;
pub mod retell;
pub mod webhook;

pub use fallback::{CallChain, CallOutcome, ChainError, ChainedReply, ReplyChain, ReplySource};
pub use http::RetryPolicy;
pub use knowledge_base::KnowledgeBaseClient;
pub use retell::{BatchCallProvisioner, RetellClient, WebCallProvisioner};
pub use webhook::{spawn_log, WebhookCallLogger};
