//! Route definitions for the HTTP API.

mod consultations;
mod health;
mod reports;

use axum::{
    extract::rejection::JsonRejection,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Deserializer};

use crate::error::ApiError;
use crate::state::AppState;

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/", get(health::health_check))
        .route("/health", get(health::health_check))
        // Extraction and storage
        .route("/process", post(consultations::process))
        .route("/save", post(consultations::save))
        // Reports
        .route("/generate_pdf", post(reports::generate_pdf))
        .route("/:file_name", get(reports::download_report))
        .fallback(not_found)
        // Attach state
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::not_found("Endpoint not found")
}

/// Unwrap a JSON body.
///
/// A missing or unparsable body is "No JSON data received"; a well-formed body
/// with a wrongly typed field reports the deserialization error.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(JsonRejection::JsonDataError(e)) => Err(ApiError::bad_request(e.body_text())),
        Err(_) => Err(ApiError::bad_request("No JSON data received")),
    }
}

/// Accept a string, a number or null for an identity field.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

pub use consultations::*;
pub use health::*;
pub use reports::*;
