//! Report generation and download endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use unidoc_core::{ExtractedRecord, PatientInfo, UnidocError};

use super::{json_body, lenient_string};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Request body for report generation.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReportRequest {
    #[serde(deserialize_with = "lenient_string")]
    pub patient_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub patient_age: String,
    #[serde(deserialize_with = "lenient_string")]
    pub consult_id: String,
    pub extracted_data: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub status: String,
    /// Report file name inside the reports directory
    pub file_path: String,
}

/// Render a PDF report for an extracted record.
/// POST /generate_pdf
pub async fn generate_pdf(
    State(state): State<AppState>,
    payload: Result<Json<ReportRequest>, JsonRejection>,
) -> ApiResult<Json<GenerateResponse>> {
    let request = json_body(payload)?;
    let patient = PatientInfo::new(
        &request.consult_id,
        &request.patient_name,
        &request.patient_age,
    );

    let mut missing =
        unidoc_core::missing_fields(&[("patient_name", patient.patient_name.as_str())]);
    if !ExtractedRecord::payload_present(request.extracted_data.as_ref()) {
        missing.push("extracted_data");
    }
    if !missing.is_empty() {
        return Err(UnidocError::missing_fields(&missing).into());
    }
    let record = ExtractedRecord::from_payload(request.extracted_data.as_ref())?;

    let report = state
        .run_blocking(move |core| core.generate_report(&patient, &record))
        .await?;

    Ok(Json(GenerateResponse {
        status: "success".to_string(),
        file_path: report.file_name,
    }))
}

fn content_type(file_name: &str) -> &'static str {
    if file_name.to_ascii_lowercase().ends_with(".pdf") {
        "application/pdf"
    } else {
        "application/octet-stream"
    }
}

/// Download a generated report as an attachment.
/// GET /:file_name
pub async fn download_report(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> ApiResult<Response> {
    let requested = file_name.clone();
    let path = state
        .run_blocking(move |core| core.locate_report(&requested))
        .await?;

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to read report: {}", e)))?;

    let safe_name: String = file_name
        .chars()
        .map(|c| if c.is_ascii_graphic() && c != '"' { c } else { '_' })
        .collect();

    Ok((
        [
            (header::CONTENT_TYPE, content_type(&file_name).to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", safe_name),
            ),
        ],
        bytes,
    )
        .into_response())
}
