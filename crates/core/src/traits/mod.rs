//! Collaborator traits
//!
//! The booking flow never calls these; the HTTP layer does. Each capability
//! is a trait so providers can be swapped or mocked.
//!
//! ```text
//! Messaging:
//!   - ConversationalAi: message + conversation id -> reply
//!   - KnowledgeBase: fallback when the AI provider fails
//!
//! Calls:
//!   - CallProvisioner: browser/phone call session tokens
//!   - CallLogger: fire-and-forget transcript delivery
//! ```

mod assistant;
mod call_log;
mod calls;

pub use assistant::{AiReply, ConversationalAi, KnowledgeBase, KnowledgeReply};
pub use call_log::{CallLogEntry, CallLogger, Modality};
pub use calls::{CallProvisioner, CallRequest, CallToken};
