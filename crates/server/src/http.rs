//! HTTP Endpoints
//!
//! JSON API for the reservation assistant:
//! - `/api/chatbot/*`: conversations, chat fallback, call provisioning, state flow
//! - `/webhook`: provider call events
//! - `/health`, `/ready`, `/metrics`, `/`: operations

use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use bbq_assistant_config::constants::calls::MOCK_ACCESS_TOKEN;
use bbq_assistant_core::{BookingContext, CallLogEntry, CallRequest, ConversationState};
use bbq_assistant_integrations::{spawn_log, CallOutcome, ReplySource};

use crate::auth::auth_middleware;
use crate::metrics::{metrics_handler, record_booking_confirmed, record_turn, set_active_conversations};
use crate::session::ConversationRecord;
use crate::state::AppState;
use crate::webhook::handle_call_event;
use crate::ServerError;

const AGENT_REQUIRED: &str = "Agent ID is required but DEFAULT_AGENT_ID is not set in environment";

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let server = &state.settings.server;
    let cors_layer = build_cors_layer(&server.cors_origins, server.cors_enabled);
    let timeout = Duration::from_secs(server.timeout_seconds);

    Router::new()
        .route("/api/chatbot/start", post(start_conversation))
        .route("/api/chatbot/message", post(send_message))
        .route("/api/chatbot/end", post(end_conversation))
        .route("/api/chatbot/create-web-call", post(create_web_call))
        .route("/api/chatbot/state-flow", post(state_flow))
        .route("/api/debug", get(debug_info))
        .route("/webhook", post(handle_call_event))
        .route("/", get(service_info))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_handler))
        .layer(axum::middleware::from_fn(auth_middleware))
        .layer(Extension(state.settings.clone()))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns permissive layer (for dev)
/// - If cors_origins is empty, defaults to localhost:3000
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let localhost = || {
        CorsLayer::new()
            .allow_origin(HeaderValue::from_static("http://localhost:3000"))
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };

    if origins.is_empty() {
        tracing::info!("No CORS origins configured, defaulting to localhost:3000");
        return localhost();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::error!("All configured CORS origins are invalid, falling back to localhost");
        return localhost();
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ORIGIN])
        .allow_credentials(true)
}

/// Non-empty trimmed value
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn resolve_agent_id(state: &AppState, requested: Option<String>) -> Result<String, ServerError> {
    non_empty(requested)
        .or_else(|| non_empty(state.settings.retell.default_agent_id.clone()))
        .ok_or_else(|| ServerError::MissingConfiguration(AGENT_REQUIRED.to_string()))
}

#[derive(Debug, Default, Deserialize)]
pub struct StartRequest {
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

async fn start_conversation(
    State(state): State<AppState>,
    payload: Result<Json<StartRequest>, JsonRejection>,
) -> Result<Json<Value>, ServerError> {
    let Json(req) = payload?;
    let agent_id = resolve_agent_id(&state, req.agent_id)?;

    let conversation_id = format!("conv_{}", uuid::Uuid::new_v4().simple());
    state
        .conversations
        .save(ConversationRecord::new(&conversation_id))
        .await?;
    if let Ok(ids) = state.conversations.list_ids().await {
        set_active_conversations(ids.len());
    }

    tracing::info!(conversation_id = %conversation_id, agent_id = %agent_id, "Conversation started");

    Ok(Json(json!({
        "conversation_id": conversation_id,
        "agent_id": agent_id,
        "user_id": req.user_id.unwrap_or_default(),
    })))
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    #[serde(default)]
    pub conversation_id: String,
    #[serde(default)]
    pub message: String,
}

async fn send_message(
    State(state): State<AppState>,
    payload: Result<Json<MessageRequest>, JsonRejection>,
) -> Result<Response, ServerError> {
    let Json(req) = payload?;
    if req.conversation_id.is_empty() {
        return Err(ServerError::InvalidRequest("conversation_id is required".to_string()));
    }
    if req.message.is_empty() {
        return Err(ServerError::InvalidRequest("message is required".to_string()));
    }

    let reply = match state.replies.reply(&req.message, &req.conversation_id).await {
        Ok(reply) => reply,
        Err(e) => {
            return Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Both Retell API and knowledge base API failed",
                    "retell_error": e.provider.to_string(),
                    "kb_error": e.knowledge_base.to_string(),
                })),
            )
                .into_response())
        }
    };

    let body = match reply.source {
        ReplySource::KnowledgeBase => json!({
            "response": reply.response,
            "conversation_id": reply.conversation_id,
            "source": "knowledge_base",
            "finished": reply.finished,
        }),
        ReplySource::Provider => json!({
            "response": reply.response,
            "conversation_id": reply.conversation_id,
            "context": reply.context.unwrap_or(Value::Null),
            "finished": reply.finished,
        }),
    };
    Ok(Json(body).into_response())
}

#[derive(Debug, Deserialize)]
pub struct EndRequest {
    #[serde(default)]
    pub conversation_id: String,
    #[serde(default)]
    pub transcript: String,
}

async fn end_conversation(
    State(state): State<AppState>,
    payload: Result<Json<EndRequest>, JsonRejection>,
) -> Result<Json<Value>, ServerError> {
    let Json(req) = payload?;

    if !req.conversation_id.is_empty() {
        let _turn_guard = state.turn_locks.acquire(&req.conversation_id).await;
        state.conversations.remove(&req.conversation_id).await?;
    }

    match &state.call_logger {
        Some(logger) => {
            spawn_log(
                logger.clone(),
                CallLogEntry::chatbot(&req.conversation_id, req.transcript),
            );
        }
        None => tracing::debug!(conversation_id = %req.conversation_id, "No call logger configured"),
    }

    tracing::info!(conversation_id = %req.conversation_id, "Conversation ended");
    Ok(Json(json!({
        "status": "success",
        "message": "Conversation ended",
    })))
}

#[derive(Debug, Default, Deserialize)]
pub struct WebCallRequest {
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    /// Caller's own number, passed through to the call context
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub context: Option<Map<String, Value>>,
}

fn dial_in_message(phone_number: &str) -> String {
    format!("Please call the Barbeque Nation assistant at {}", phone_number)
}

async fn create_web_call(
    State(state): State<AppState>,
    payload: Result<Json<WebCallRequest>, JsonRejection>,
) -> Result<Json<Value>, ServerError> {
    let Json(req) = payload?;
    let settings = &state.settings;
    let phone_number = state.calls.phone_number().to_string();
    let agent_id = resolve_agent_id(&state, req.agent_id)?;

    if settings.calls.use_direct_phone {
        return Ok(Json(json!({
            "call_mode": "twilio_direct",
            "phone_number": phone_number,
            "message": dial_in_message(&phone_number),
        })));
    }

    if !settings.retell.has_usable_api_key() && settings.retell.mock_when_unconfigured {
        tracing::info!(agent_id = %agent_id, "Using mock web call token because API key is missing or placeholder");
        let expires_at = Utc::now() + chrono::Duration::minutes(settings.calls.token_ttl_minutes);
        return Ok(Json(json!({
            "call_mode": "twilio_via_retell",
            "access_token": MOCK_ACCESS_TOKEN,
            "expires_at": expires_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            "phone_number": phone_number,
            "agent_id": agent_id,
        })));
    }

    let mode = non_empty(req.mode).unwrap_or_else(|| settings.calls.default_mode.clone());
    let mut request = CallRequest::new(&agent_id, req.user_id.unwrap_or_default(), mode);
    if let Some(context) = req.context {
        request.context = context;
    }
    if let Some(caller) = non_empty(req.phone_number) {
        request = request.with_context_value("caller_phone_number", caller);
    }
    let request = request.with_context_value("phone_number", phone_number.as_str());

    let outcome = state.calls.provision(&request).await;
    let summary = outcome.failure_summary();
    match outcome {
        CallOutcome::Token { token, tier } => {
            tracing::info!(agent_id = %agent_id, tier = %tier, "Call token issued");
            Ok(Json(json!({
                "call_mode": "twilio_via_retell",
                "access_token": token.access_token,
                "expires_at": token.expires_at,
                "phone_number": phone_number,
                "agent_id": agent_id,
            })))
        }
        CallOutcome::Phone { phone_number, .. } => {
            let detail = summary.unwrap_or_default();
            tracing::warn!(agent_id = %agent_id, error = %detail, "All call tiers failed, returning phone number");
            Ok(Json(json!({
                "call_mode": "twilio_direct_fallback",
                "phone_number": phone_number,
                "message": dial_in_message(&phone_number),
                "error": format!("Could not get Retell token: {}", detail),
            })))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StateFlowRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub current_state: Option<String>,
    pub message: String,
    #[serde(default)]
    pub context: Option<BookingContext>,
}

impl StateFlowRequest {
    /// Conversation id, else user id
    fn session_key(&self) -> Option<String> {
        non_empty(self.conversation_id.clone()).or_else(|| non_empty(self.user_id.clone()))
    }
}

async fn state_flow(
    State(state): State<AppState>,
    payload: Result<Json<StateFlowRequest>, JsonRejection>,
) -> Result<Json<Value>, ServerError> {
    let Json(req) = payload?;
    let key = req.session_key();

    let _turn_guard = match &key {
        Some(key) => Some(state.turn_locks.acquire(key).await),
        None => None,
    };

    let stored = match &key {
        Some(key) => state.conversations.load(key).await?,
        None => None,
    };

    let resume = req.current_state.is_none() && req.context.is_none();
    let (state_name, context) = match (&stored, resume) {
        (Some(record), true) => (record.state.as_str(), record.context.clone()),
        _ => (
            req.current_state.as_deref().unwrap_or_default(),
            req.context.unwrap_or_default(),
        ),
    };

    let from = ConversationState::from_wire(state_name).unwrap_or_default();
    let outcome = state.flow.run_named_turn(state_name, req.message, context);

    record_turn(from, outcome.next_state);
    if from != ConversationState::End
        && outcome.next_state == ConversationState::End
        && outcome.context.booking_confirmed == Some(true)
    {
        record_booking_confirmed();
    }

    if let Some(key) = key {
        let mut record = stored.unwrap_or_else(|| ConversationRecord::new(&key));
        record.advance(outcome.next_state, outcome.context.clone());
        tracing::debug!(
            conversation_id = %key,
            from = %from,
            to = %outcome.next_state,
            turn = record.turn_count,
            "State flow turn"
        );
        state.conversations.save(record).await?;
    }

    serde_json::to_value(&outcome)
        .map(Json)
        .map_err(|e| ServerError::Internal(format!("Failed to encode turn: {}", e)))
}

async fn debug_info(State(state): State<AppState>) -> Json<Value> {
    let settings = &state.settings;
    Json(json!({
        "retell_api_key_set": settings.retell.api_key_set(),
        "default_agent_id": settings.retell.default_agent_id.clone().unwrap_or_default(),
        "webhook_url": settings.webhook.url.clone().unwrap_or_default(),
        "knowledge_base_id": settings.retell.knowledge_base_id.clone().unwrap_or_default(),
        "environment": settings.environment.as_str(),
    }))
}

async fn service_info() -> Json<Value> {
    Json(json!({
        "service": "bbq-assistant",
        "message": "Barbeque Nation Chatbot API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/api/chatbot/start",
            "/api/chatbot/message",
            "/api/chatbot/end",
            "/api/chatbot/create-web-call",
            "/api/chatbot/state-flow",
            "/api/debug",
            "/webhook",
            "/health",
            "/ready",
            "/metrics",
        ],
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

async fn readiness_check(State(state): State<AppState>) -> Response {
    match state.conversations.list_ids().await {
        Ok(ids) => Json(json!({
            "status": "ready",
            "conversations": ids.len(),
            "distributed_sessions": state.is_distributed_sessions(),
        }))
        .into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "not_ready", "error": e.to_string() })),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_key_prefers_conversation_id() {
        let req: StateFlowRequest = serde_json::from_value(json!({
            "user_id": "u1",
            "conversation_id": "conv_1",
            "message": "hi"
        }))
        .unwrap();
        assert_eq!(req.session_key().as_deref(), Some("conv_1"));

        let req: StateFlowRequest = serde_json::from_value(json!({
            "user_id": "u1",
            "conversation_id": "",
            "message": "hi"
        }))
        .unwrap();
        assert_eq!(req.session_key().as_deref(), Some("u1"));

        let req: StateFlowRequest =
            serde_json::from_value(json!({ "message": "hi" })).unwrap();
        assert!(req.session_key().is_none());
    }

    #[test]
    fn test_cors_layer_variants_build() {
        let _ = build_cors_layer(&[], false);
        let _ = build_cors_layer(&[], true);
        let _ = build_cors_layer(&["not a header\n".to_string()], true);
        let _ = build_cors_layer(&["https://bbq.example.com".to_string()], true);
    }
}
