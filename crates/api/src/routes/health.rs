//! Health and metrics routes

use axum::{extract::State, http::header, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;

use super::ApiResponse;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub rules_count: usize,
    pub explanations_retained: usize,
    pub reasoning_enabled: bool,
    pub web_insight_enabled: bool,
}

/// Health check handler
pub async fn health(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        rules_count: state.engine.rules().current().len(),
        explanations_retained: state.engine.explanations().len(),
        reasoning_enabled: state.settings.reasoning.chat_config().is_some(),
        web_insight_enabled: state.settings.web_insight.chat_config().is_some(),
    }))
}

/// Prometheus text exposition
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = state.metrics.as_ref().map(|handle| handle.render()).unwrap_or_default();
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}
