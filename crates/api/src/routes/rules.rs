//! Rule Routes

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use super::ApiResponse;
use crate::{ApiError, AppState};

#[derive(Debug, Serialize)]
pub struct RuleSummary {
    pub name: String,
    pub description: String,
    pub user_need_state: String,
    pub confidence_threshold: f64,
    pub condition_count: usize,
}

#[derive(Debug, Serialize)]
pub struct RulesResponse {
    pub total_rules: usize,
    pub scoring_method: String,
    pub default_rule: String,
    pub rules: Vec<RuleSummary>,
}

/// Loaded rules in declaration order
pub async fn list_rules(State(state): State<Arc<AppState>>) -> Json<ApiResponse<RulesResponse>> {
    let store = state.engine.rules().current();

    let rules = store
        .rules()
        .iter()
        .map(|rule| RuleSummary {
            name: rule.name.clone(),
            description: rule.description.clone(),
            user_need_state: rule.output.user_need_state.clone(),
            confidence_threshold: rule.output.confidence_threshold,
            condition_count: rule.conditions.len(),
        })
        .collect();

    Json(ApiResponse::ok(RulesResponse {
        total_rules: store.len(),
        scoring_method: store.scoring().method.clone(),
        default_rule: store.default_output().user_need_state.clone(),
        rules,
    }))
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub total_rules: usize,
}

/// Re-read the rules file; the running rules stay in place on failure
pub async fn reload_rules(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse<ReloadResponse>>, ApiError> {
    let path = &state.settings.rules_path;
    state.engine.rules().reload(path).map_err(|e| {
        warn!("Rule reload from {} failed: {}", path.display(), e);
        ApiError::Internal(format!("Rule reload failed: {}", e))
    })?;

    let total_rules = state.engine.rules().current().len();
    info!("Reloaded {} rules", total_rules);
    Ok(Json(ApiResponse::ok(ReloadResponse { total_rules })))
}
