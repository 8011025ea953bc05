//! Explanation Routes

use axum::{
    extract::{Path, State},
    Json,
};
use ::explanation::ExplanationError;
use serde::Serialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use super::ApiResponse;
use crate::{ApiError, AppState};

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub message: String,
    pub file_path: PathBuf,
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid inference ID: {}", raw)))
}

fn not_found(id: &Uuid) -> ApiError {
    ApiError::NotFound(format!("Explanation not found for inference ID: {}", id))
}

/// Structured trail plus its human-readable rendering
pub async fn get_explanation(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    let id = parse_id(&raw_id)?;
    let trail = state.engine.explanations().get(&id).ok_or_else(|| not_found(&id))?;

    Ok(Json(ApiResponse::ok(json!({
        "inference_id": id,
        "explanation": &*trail,
        "human_readable": trail.render(),
    }))))
}

/// Write the trail's detailed log under the configured export directory
pub async fn log_explanation(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<ApiResponse<ExportResponse>>, ApiError> {
    let id = parse_id(&raw_id)?;
    let store = Arc::clone(state.engine.explanations());
    let dir = state.settings.explanations.export_dir.clone();

    let exported = tokio::task::spawn_blocking(move || store.export(&id, &dir))
        .await
        .map_err(|e| ApiError::Internal(format!("Export task failed: {}", e)))?;

    match exported {
        Ok(file_path) => Ok(Json(ApiResponse::ok(ExportResponse {
            message: format!("Explanation logged for inference ID: {}", id),
            file_path,
        }))),
        Err(ExplanationError::NotFound(id)) => Err(not_found(&id)),
        Err(e) => Err(ApiError::Internal(e.to_string())),
    }
}
