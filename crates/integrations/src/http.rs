//! Shared reqwest plumbing: client construction, error mapping, retries

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use bbq_assistant_core::IntegrationError;

/// Retry policy for transient failures
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Attempts after the first
    pub max_retries: u32,
    /// Doubles after each retry
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(100),
        }
    }
}

pub fn build_client(timeout: Duration) -> Result<Client, IntegrationError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| IntegrationError::NotConfigured(format!("Failed to create HTTP client: {}", e)))
}

pub fn transport_error(err: reqwest::Error) -> IntegrationError {
    if err.is_timeout() {
        IntegrationError::Timeout(err.to_string())
    } else {
        IntegrationError::Network(err.to_string())
    }
}

/// POST a JSON body, optionally with a bearer token, and decode a JSON reply.
pub async fn post_json<Req, Resp>(
    client: &Client,
    url: &str,
    bearer: Option<&str>,
    body: &Req,
) -> Result<Resp, IntegrationError>
where
    Req: Serialize + ?Sized,
    Resp: DeserializeOwned,
{
    let mut request = client.post(url).json(body);
    if let Some(token) = bearer {
        request = request.bearer_auth(token);
    }

    let response = request.send().await.map_err(transport_error)?;

    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(IntegrationError::Api {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json()
        .await
        .map_err(|e| IntegrationError::InvalidResponse(e.to_string()))
}

/// [`post_json`] with exponential backoff on retryable errors
pub async fn post_json_with_retry<Req, Resp>(
    client: &Client,
    url: &str,
    bearer: Option<&str>,
    body: &Req,
    policy: RetryPolicy,
) -> Result<Resp, IntegrationError>
where
    Req: Serialize + ?Sized,
    Resp: DeserializeOwned,
{
    let mut backoff = policy.initial_backoff;
    let mut attempt = 0;

    loop {
        match post_json(client, url, bearer, body).await {
            Ok(resp) => return Ok(resp),
            Err(e) if e.is_retryable() && attempt < policy.max_retries => {
                attempt += 1;
                tracing::warn!(
                    url,
                    error = %e,
                    "Request failed, retrying in {:?} (attempt {}/{})",
                    backoff,
                    attempt,
                    policy.max_retries
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }
            Err(e) => return Err(e),
        }
    }
}
