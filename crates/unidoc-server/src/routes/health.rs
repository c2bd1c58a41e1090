//! Health check endpoint.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub version: String,
}

/// Health check endpoint.
/// GET / and GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "success".to_string(),
        message: "UniDoc Medical Transcription API is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
