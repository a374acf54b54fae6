//! Error types shared across crates

use thiserror::Error;

/// Core error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown conversation state: {0}")]
    UnknownState(String),

    #[error("Invalid booking reference: {0}")]
    InvalidReference(String),

    #[error("Integration error: {0}")]
    Integration(#[from] IntegrationError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failure of an external collaborator (AI provider, knowledge base, call provisioning, logging)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntegrationError {
    #[error("Not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl IntegrationError {
    /// Transient failures worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            IntegrationError::Network(_) | IntegrationError::Timeout(_) => true,
            IntegrationError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
