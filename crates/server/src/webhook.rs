//! Provider call events
//!
//! `call_ended` and `call_analyzed` turn into transcript log entries,
//! `call_started` is only acknowledged. Unknown events get a warning reply.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use bbq_assistant_core::CallLogEntry;
use bbq_assistant_integrations::spawn_log;

use crate::state::AppState;
use crate::ServerError;

#[derive(Debug, Deserialize)]
pub struct CallEvent {
    pub event: String,
    pub call: CallDetails,
}

#[derive(Debug, Default, Deserialize)]
pub struct CallDetails {
    #[serde(default)]
    pub call_id: String,
    #[serde(default)]
    pub from_number: Option<String>,
    #[serde(default)]
    pub transcript_object: Option<Vec<TranscriptTurn>>,
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub call_analysis: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct TranscriptTurn {
    pub role: String,
    pub content: String,
}

impl CallDetails {
    /// Turn-by-turn lines when present, else the flat transcript
    pub fn transcript_text(&self) -> String {
        match &self.transcript_object {
            Some(turns) if !turns.is_empty() => turns
                .iter()
                .map(|t| format!("{}: {}", t.role, t.content))
                .collect::<Vec<_>>()
                .join("\n"),
            _ => self.transcript.clone().unwrap_or_default(),
        }
    }

    pub fn log_entry(&self) -> CallLogEntry {
        let phone = self
            .from_number
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or("NA");
        let mut entry = CallLogEntry::call(phone, self.transcript_text());
        if !self.call_id.is_empty() {
            entry = entry.with_conversation_id(&self.call_id);
        }
        entry
    }

    /// Log entry carrying the provider's post-call analysis
    pub fn analyzed_entry(&self) -> CallLogEntry {
        let analysis = self
            .call_analysis
            .clone()
            .unwrap_or_else(|| Value::Object(Default::default()));
        self.log_entry().with_analysis(analysis)
    }
}

fn deliver(state: &AppState, call_id: &str, entry: CallLogEntry) {
    match &state.call_logger {
        Some(logger) => {
            spawn_log(logger.clone(), entry);
        }
        None => tracing::debug!(call_id, "No call logger configured, dropping transcript"),
    }
}

pub async fn handle_call_event(
    State(state): State<AppState>,
    payload: Result<Json<CallEvent>, JsonRejection>,
) -> Result<Json<Value>, ServerError> {
    let Json(event) = payload?;
    let call_id = event.call.call_id.as_str();

    let body = match event.event.as_str() {
        "call_started" => {
            tracing::info!(call_id, "Call started");
            json!({ "status": "success", "message": "Call started event received" })
        }
        "call_ended" => {
            tracing::info!(call_id, "Call ended");
            deliver(&state, call_id, event.call.log_entry());
            json!({ "status": "success", "message": "Call ended event received" })
        }
        "call_analyzed" => {
            tracing::info!(call_id, "Call analyzed");
            deliver(&state, call_id, event.call.analyzed_entry());
            json!({ "status": "success", "message": "Call analyzed event received" })
        }
        other => {
            tracing::warn!(call_id, event = other, "Unknown call event");
            json!({ "status": "warning", "message": format!("Unknown event type: {}", other) })
        }
    };
    Ok(Json(body))
}
