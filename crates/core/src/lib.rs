//! Core types for the reservation assistant
//!
//! - Conversation states and turn types
//! - Typed booking context
//! - Booking reference codes
//! - Collaborator traits (AI provider, knowledge base, call provisioning, call logging)
//! - Error types

pub mod context;
pub mod conversation;
pub mod error;
pub mod reference;
pub mod traits;

pub use context::{BookingContext, ContextKey};
pub use conversation::{ConversationState, Transition, TurnInput, TurnOutcome};
pub use error::{Error, IntegrationError, Result};
pub use reference::{BookingReference, REFERENCE_SPACE};

pub use traits::{
    AiReply, CallLogEntry, CallLogger, CallProvisioner, CallRequest, CallToken, ConversationalAi,
    KnowledgeBase, KnowledgeReply, Modality,
};
