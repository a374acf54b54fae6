//! Transcript delivery to the logging webhook

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use bbq_assistant_core::{CallLogEntry, CallLogger, IntegrationError};

use crate::http::{build_client, transport_error};

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts entries to `{base_url}/chatbot-log`
pub struct WebhookCallLogger {
    client: Client,
    url: String,
}

impl WebhookCallLogger {
    pub fn new(base_url: &str) -> Result<Self, IntegrationError> {
        Ok(Self {
            client: build_client(WEBHOOK_TIMEOUT)?,
            url: format!("{}/chatbot-log", base_url.trim_end_matches('/')),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CallLogger for WebhookCallLogger {
    async fn log(&self, entry: &CallLogEntry) -> Result<(), IntegrationError> {
        let response = self
            .client
            .post(&self.url)
            .json(entry)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(IntegrationError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }
        Ok(())
    }
}

/// Deliver in the background; failures are logged and dropped.
pub fn spawn_log(logger: std::sync::Arc<dyn CallLogger>, entry: CallLogEntry) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match logger.log(&entry).await {
            Ok(()) => tracing::debug!(modality = ?entry.modality, "Transcript logged"),
            Err(e) => {
                metrics::counter!("bbq_call_log_failures_total").increment(1);
                tracing::warn!(
                    modality = ?entry.modality,
                    conversation_id = ?entry.conversation_id,
                    error = %e,
                    "Failed to deliver transcript to webhook"
                );
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_posts_chatbot_log() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chatbot-log"))
            .and(body_json(json!({
                "modality": "Chatbot",
                "conversation_id": "conv_9",
                "transcript": "user: hi\nagent: hello"
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let logger = WebhookCallLogger::new(&server.uri()).unwrap();
        logger
            .log(&CallLogEntry::chatbot("conv_9", "user: hi\nagent: hello"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_spawn_log_swallows_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let logger: Arc<dyn CallLogger> = Arc::new(WebhookCallLogger::new(&server.uri()).unwrap());
        let handle = spawn_log(logger, CallLogEntry::call("NA", "transcript"));
        assert!(handle.await.is_ok());
    }
}
