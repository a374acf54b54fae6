//! HTTP server for the reservation assistant
//!
//! Exposes the booking state machine, the chat fallback chain and call
//! provisioning over JSON endpoints.

pub mod auth;
pub mod http;
pub mod metrics;
pub mod session;
pub mod state;
pub mod webhook;

pub use crate::http::create_router;
pub use crate::metrics::init_metrics;
pub use session::{
    ConversationRecord, ConversationStore, InMemoryConversationStore, TurnGuard, TurnLocks,
};
pub use state::AppState;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    MissingConfiguration(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<&ServerError> for StatusCode {
    fn from(err: &ServerError) -> Self {
        match err {
            ServerError::InvalidRequest(_) | ServerError::MissingConfiguration(_) => {
                StatusCode::BAD_REQUEST
            }
            ServerError::Upstream(_) | ServerError::Session(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::InvalidRequest(format!("Invalid request: {}", rejection.body_text()))
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = StatusCode::from(&self);
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
