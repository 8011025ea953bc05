//! Context Engine API Server
//!
//! Thin HTTP surface over the inference engine: inference, batch inference,
//! explanation retrieval and export, rule listing, health and metrics.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use explanation::ExplanationStore;
use inference_engine::{EngineError, InferenceEngine};
use knowledge::{HttpReasoningBackend, HttpWebInsight, PatternAdapter, ReasoningAdapter};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use rule_engine::{RuleError, RuleStore, RuleStoreHandle};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tower_governor::GovernorLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod rate_limit;
mod routes;
pub mod settings;

pub use rate_limit::{create_governor_config, IpGovernorConfig, RateLimitConfig};
pub use routes::ApiResponse;
pub use settings::{LogFormat, LoggingSettings, Settings};

/// Request failures, rendered as `{success: false, error}`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Validation(_) => ApiError::BadRequest(err.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ApiResponse::<()>::failure(self.to_string()))).into_response()
    }
}

/// Application state shared across handlers
pub struct AppState {
    pub engine: InferenceEngine,
    pub settings: Settings,
    /// Absent when another recorder is already installed
    pub metrics: Option<PrometheusHandle>,
    pub version: String,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(engine: InferenceEngine, settings: Settings, metrics: Option<PrometheusHandle>) -> Self {
        Self {
            engine,
            settings,
            metrics,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
        }
    }
}

/// Assemble the engine described by the settings
pub fn build_engine(settings: &Settings) -> Result<InferenceEngine, RuleError> {
    let store = RuleStore::load(&settings.rules_path)?;
    let explanations = Arc::new(ExplanationStore::new(settings.explanations.store_config()));

    let mut pattern = PatternAdapter::new();
    if let Some(chat) = settings.web_insight.chat_config() {
        info!("Web insight enabled ({})", chat.endpoint);
        let timeout = chat.timeout();
        pattern = pattern.with_web_insight(Arc::new(HttpWebInsight::new(chat)), timeout);
    }

    let reasoning = match settings.reasoning.chat_config() {
        Some(chat) => {
            info!("External reasoning enabled ({}, model {})", chat.endpoint, chat.model);
            let timeout = chat.timeout();
            ReasoningAdapter::new(Arc::new(HttpReasoningBackend::new(chat)), timeout)
        }
        None => ReasoningAdapter::disabled(),
    };

    Ok(
        InferenceEngine::new(Arc::new(RuleStoreHandle::new(store)), explanations)
            .with_validation(settings.validation.clone())
            .with_config(settings.engine.clone())
            .with_pattern_adapter(Arc::new(pattern))
            .with_reasoning_adapter(Arc::new(reasoning)),
    )
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/infer", post(routes::infer::infer))
        .route("/v1/infer/batch", post(routes::infer::infer_batch))
        .route("/v1/infer/explanation/:id", get(routes::explanation::get_explanation))
        .route("/v1/infer/log/:id", post(routes::explanation::log_explanation))
        .route("/v1/rules", get(routes::rules::list_rules))
        .route("/v1/rules/reload", post(routes::rules::reload_rules))
        .route("/v1/health", get(routes::health::health))
        .route("/metrics", get(routes::health::metrics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Initialize logging. `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(settings: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let result = match settings.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
    if let Err(e) = result {
        eprintln!("Tracing subscriber already set: {}", e);
    }
}

/// Install the Prometheus recorder
pub fn install_metrics() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Metrics recorder not installed: {}", e);
            None
        }
    }
}

/// Run the server until it stops
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let engine = build_engine(&settings)?;
    let metrics = install_metrics();
    let addr = settings.server.address.clone();
    let governor = create_governor_config(&settings.rate_limit);

    let state = Arc::new(AppState::new(engine, settings, metrics));
    let mut app = create_router(state);
    match governor {
        Some(config) => app = app.layer(GovernorLayer { config }),
        None => warn!("Rate limiting disabled"),
    }

    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serde_json::{json, Value};
    use std::path::PathBuf;
    use tower::ServiceExt;

    fn settings(export_dir: PathBuf) -> Settings {
        let mut settings = Settings::default();
        settings.rules_path = PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/rules.yaml"));
        settings.explanations.export_dir = export_dir;
        settings.server.max_batch_size = 3;
        settings
    }

    fn app_with(export_dir: PathBuf) -> Router {
        let settings = settings(export_dir);
        let engine = build_engine(&settings).unwrap();
        create_router(Arc::new(AppState::new(engine, settings, None)))
    }

    fn app() -> Router {
        app_with(std::env::temp_dir().join("context-engine-test"))
    }

    async fn call(app: Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn morning_request() -> String {
        json!({"signals": {"time_of_day": "morning", "system_language": "hi", "first_action": "voice"}})
            .to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = call(app(), "GET", "/v1/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "healthy");
        assert_eq!(body["data"]["rules_count"], 8);
        assert_eq!(body["data"]["reasoning_enabled"], false);
    }

    #[tokio::test]
    async fn test_infer_then_fetch_explanation() {
        let app = app();
        let (status, body) = call(app.clone(), "POST", "/v1/infer", Some(&morning_request())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["user_need_state"], "Morning Devotional User");
        assert_eq!(body["data"]["ui_mode"], "voice-first");
        assert!(body["processing_time_ms"].is_number());

        let id = body["data"]["inference_id"].as_str().unwrap().to_string();
        let (status, body) = call(app, "GET", &format!("/v1/infer/explanation/{}", id), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["inference_id"], id.as_str());
        assert_eq!(body["data"]["explanation"]["steps"].as_array().unwrap().len(), 8);
        assert!(body["data"]["human_readable"]
            .as_str()
            .unwrap()
            .contains("Final Inference: Morning Devotional User"));
    }

    #[tokio::test]
    async fn test_rules_only_mode() {
        let (status, body) = call(app(), "POST", "/v1/infer?enhanced=false", Some(&morning_request())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["confidence"], 5.5);
        assert!(body["data"].get("inference_id").is_none());
    }

    #[tokio::test]
    async fn test_invalid_signals_rejected() {
        let payload = json!({"signals": {"time_of_day": "midnight"}}).to_string();
        let (status, body) = call(app(), "POST", "/v1/infer", Some(&payload)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("time_of_day"));
    }

    #[tokio::test]
    async fn test_malformed_json_uses_envelope() {
        let (status, body) = call(app(), "POST", "/v1/infer", Some("{not json")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_batch() {
        let payload = json!([
            {"signals": {"system_language": "hi", "keyboard_language": "hi"}},
            {"signals": {"hour_of_day": 42}}
        ])
        .to_string();
        let (status, body) = call(app(), "POST", "/v1/infer/batch", Some(&payload)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total_processed"], 2);
        let results = body["data"]["results"].as_array().unwrap();
        assert_eq!(results[0]["success"], true);
        assert_eq!(results[0]["data"]["user_need_state"], "Hindi-first User");
        assert_eq!(results[1]["success"], false);
    }

    #[tokio::test]
    async fn test_batch_too_large() {
        let item = json!({"signals": {}});
        let payload = Value::Array(vec![item; 4]).to_string();
        let (status, body) = call(app(), "POST", "/v1/infer/batch", Some(&payload)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_unknown_and_malformed_explanation_ids() {
        let unknown = uuid::Uuid::new_v4();
        let (status, body) = call(app(), "GET", &format!("/v1/infer/explanation/{}", unknown), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);

        let (status, _) = call(app(), "GET", "/v1/infer/explanation/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_export_explanation_log() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(dir.path().to_path_buf());

        let (_, body) = call(app.clone(), "POST", "/v1/infer", Some(&morning_request())).await;
        let id = body["data"]["inference_id"].as_str().unwrap().to_string();

        let (status, body) = call(app, "POST", &format!("/v1/infer/log/{}", id), None).await;

        assert_eq!(status, StatusCode::OK);
        let path = PathBuf::from(body["data"]["file_path"].as_str().unwrap());
        assert_eq!(path, dir.path().join(format!("{}.log", id)));
        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.contains("Detailed Event Log:"));
    }

    #[tokio::test]
    async fn test_list_rules() {
        let (status, body) = call(app(), "GET", "/v1/rules", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total_rules"], 8);
        assert_eq!(body["data"]["default_rule"], "First-time AI Explorer");
        assert_eq!(body["data"]["scoring_method"], "weighted_sum");
        assert_eq!(body["data"]["rules"][0]["name"], "morning_devotional");
        assert_eq!(body["data"]["rules"][0]["condition_count"], 3);
    }

    #[tokio::test]
    async fn test_reload_rules() {
        let (status, body) = call(app(), "POST", "/v1/rules/reload", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total_rules"], 8);
    }

    #[tokio::test]
    async fn test_metrics_without_recorder() {
        let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
