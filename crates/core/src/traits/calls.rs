//! Call session provisioning

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::IntegrationError;

/// Parameters for a new call session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRequest {
    pub agent_id: String,
    pub user_id: String,
    /// `phone`, `browser`, ...
    pub mode: String,
    #[serde(default)]
    pub context: serde_json::Map<String, serde_json::Value>,
}

impl CallRequest {
    pub fn new(agent_id: impl Into<String>, user_id: impl Into<String>, mode: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            user_id: user_id.into(),
            mode: mode.into(),
            context: serde_json::Map::new(),
        }
    }

    pub fn with_context_value(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// Token the client uses to join the call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallToken {
    pub access_token: String,
    /// Provider-formatted expiry
    #[serde(default)]
    pub expires_at: String,
}

/// One tier of a provisioning chain
#[async_trait]
pub trait CallProvisioner: Send + Sync {
    async fn create_call(&self, request: &CallRequest) -> Result<CallToken, IntegrationError>;

    /// Tier label (`primary`, `batch`, ...)
    fn tier(&self) -> &str;
}
