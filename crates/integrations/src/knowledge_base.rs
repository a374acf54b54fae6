//! Knowledge-base fallback client (`POST {endpoint}/kb/conversation`)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use bbq_assistant_config::KnowledgeBaseConfig;
use bbq_assistant_core::{IntegrationError, KnowledgeBase, KnowledgeReply};

use crate::http::{build_client, post_json};

#[derive(Debug, Serialize)]
struct KbRequest<'a> {
    message: &'a str,
    conversation_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct KbResponse {
    response: String,
    #[serde(default)]
    finished: bool,
}

pub struct KnowledgeBaseClient {
    client: Client,
    endpoint: String,
}

impl KnowledgeBaseClient {
    pub fn new(config: &KnowledgeBaseConfig) -> Result<Self, IntegrationError> {
        Ok(Self {
            client: build_client(Duration::from_secs(config.timeout_secs))?,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl KnowledgeBase for KnowledgeBaseClient {
    async fn ask(&self, message: &str, conversation_id: &str) -> Result<KnowledgeReply, IntegrationError> {
        let url = format!("{}/kb/conversation", self.endpoint);
        let body = KbRequest {
            message,
            conversation_id,
        };
        let resp: KbResponse = post_json(&self.client, &url, None, &body).await?;
        Ok(KnowledgeReply {
            response: resp.response,
            finished: resp.finished,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_ask() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/kb/conversation"))
            .and(body_json(json!({"message": "timings?", "conversation_id": "c1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": "We are open 12 to 11.",
                "conversation_id": "c1",
                "source": "knowledge_base",
                "finished": false
            })))
            .mount(&server)
            .await;

        let kb = KnowledgeBaseClient::new(&KnowledgeBaseConfig {
            endpoint: format!("{}/", server.uri()),
            timeout_secs: 5,
        })
        .unwrap();
        let reply = kb.ask("timings?", "c1").await.unwrap();
        assert_eq!(reply.response, "We are open 12 to 11.");
        assert!(!reply.finished);
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        let kb = KnowledgeBaseClient::new(&KnowledgeBaseConfig {
            endpoint: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
        })
        .unwrap();
        let err = kb.ask("hi", "c1").await.unwrap_err();
        assert!(matches!(err, IntegrationError::Network(_) | IntegrationError::Timeout(_)));
    }
}
