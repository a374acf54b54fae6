//! Prometheus metrics
//!
//! The recorder is process-global; `init_metrics` installs it once and hands
//! back the handle that `/metrics` renders from.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use bbq_assistant_core::ConversationState;

use crate::state::AppState;
use crate::ServerError;

pub fn init_metrics() -> Result<PrometheusHandle, ServerError> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ServerError::Internal(format!("failed to install Prometheus recorder: {e}")))?;

    register_metrics();
    tracing::info!("Prometheus metrics recorder installed");
    Ok(handle)
}

fn register_metrics() {
    describe_counter!("bbq_turns_total", "State machine turns by source and target state");
    describe_counter!("bbq_fallback_total", "Fallback tier activations");
    describe_counter!("bbq_bookings_confirmed_total", "Bookings confirmed with a reference");
    describe_counter!("bbq_call_log_failures_total", "Transcript deliveries that failed");
    describe_gauge!("bbq_conversations_active", "Conversations held in the store");
}

pub fn record_turn(from: ConversationState, to: ConversationState) {
    metrics::counter!("bbq_turns_total", "from" => from.as_str(), "to" => to.as_str()).increment(1);
}

pub fn record_booking_confirmed() {
    metrics::counter!("bbq_bookings_confirmed_total").increment(1);
}

pub fn set_active_conversations(count: usize) {
    metrics::gauge!("bbq_conversations_active").set(count as f64);
}

pub async fn metrics_handler(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "Metrics disabled").into_response(),
    }
}
