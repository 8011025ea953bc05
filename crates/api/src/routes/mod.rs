//! Route handlers

pub mod explanation;
pub mod health;
pub mod infer;
pub mod rules;

use serde::Serialize;

/// Response envelope shared by every JSON route
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<f64>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            processing_time_ms: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            processing_time_ms: None,
        }
    }

    pub fn timed(mut self, elapsed_ms: f64) -> Self {
        self.processing_time_ms = Some(elapsed_ms);
        self
    }
}
