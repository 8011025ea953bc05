//! Inference Routes

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use inference_engine::{BatchItem, InferenceOutput};
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

use super::ApiResponse;
use crate::{ApiError, AppState};

/// One inference request
#[derive(Debug, Deserialize)]
pub struct InferRequest {
    /// Raw signal payload
    pub signals: Value,
}

#[derive(Debug, Deserialize)]
pub struct InferQuery {
    /// Run adapters and record a trail; `false` uses the rules only
    #[serde(default = "default_enhanced")]
    pub enhanced: bool,
}

fn default_enhanced() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub total_processed: usize,
    pub results: Vec<BatchItem>,
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Infer the user need state for one signal payload
pub async fn infer(
    State(state): State<Arc<AppState>>,
    Query(query): Query<InferQuery>,
    payload: Result<Json<InferRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<InferenceOutput>>, ApiError> {
    let start = Instant::now();
    let mode = if query.enhanced { "enhanced" } else { "rules_only" };
    counter!("inference_requests_total", "mode" => mode).increment(1);

    let result = match payload {
        Ok(Json(request)) if query.enhanced => state.engine.infer_json(&request.signals).await.map_err(ApiError::from),
        Ok(Json(request)) => state
            .engine
            .validate(&request.signals)
            .map(|signals| state.engine.infer_rules_only(&signals))
            .map_err(ApiError::from),
        Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
    };

    let elapsed = elapsed_ms(start);
    histogram!("inference_latency_ms", "mode" => mode).record(elapsed);

    match result {
        Ok(output) => Ok(Json(ApiResponse::ok(output).timed(elapsed))),
        Err(e) => {
            counter!("inference_failures_total", "mode" => mode).increment(1);
            warn!("Inference request failed: {}", e);
            Err(e)
        }
    }
}

/// Infer each payload independently
pub async fn infer_batch(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Vec<InferRequest>>, JsonRejection>,
) -> Result<Json<ApiResponse<BatchResponse>>, ApiError> {
    let start = Instant::now();
    let Json(requests) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    let limit = state.settings.server.max_batch_size;
    if requests.len() > limit {
        return Err(ApiError::BadRequest(format!(
            "Batch of {} exceeds the limit of {}",
            requests.len(),
            limit
        )));
    }

    let signals: Vec<Value> = requests.into_iter().map(|r| r.signals).collect();
    let results = state.engine.infer_batch(&signals).await;

    let failures = results.iter().filter(|item| !item.success).count();
    counter!("inference_requests_total", "mode" => "batch").increment(results.len() as u64);
    counter!("inference_failures_total", "mode" => "batch").increment(failures as u64);
    histogram!("inference_latency_ms", "mode" => "batch").record(elapsed_ms(start));

    let response = BatchResponse {
        total_processed: results.len(),
        results,
    };
    Ok(Json(ApiResponse::ok(response).timed(elapsed_ms(start))))
}
