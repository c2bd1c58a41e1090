//! Extraction and storage endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use unidoc_core::{ConsultationNote, ExtractedRecord, PatientInfo, ProcessedConsultation, UnidocError};

use super::{json_body, lenient_string};
use crate::error::ApiResult;
use crate::state::AppState;

/// Request body for processing a note.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProcessRequest {
    pub medical_text: String,
    #[serde(deserialize_with = "lenient_string")]
    pub consult_id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub patient_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub patient_age: String,
}

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub status: String,
    pub message: String,
    pub data: ProcessedConsultation,
}

/// Request body for saving an extracted record.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SaveRequest {
    #[serde(deserialize_with = "lenient_string")]
    pub consult_id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub patient_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub patient_age: String,
    pub extracted_data: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

/// Extract a structured record from a note.
/// POST /process
pub async fn process(
    State(state): State<AppState>,
    payload: Result<Json<ProcessRequest>, JsonRejection>,
) -> ApiResult<Json<ProcessResponse>> {
    let request = json_body(payload)?;
    let note = ConsultationNote::new(
        &request.consult_id,
        &request.patient_name,
        &request.patient_age,
        &request.medical_text,
    );
    debug!(consult_id = %note.consult_id, chars = note.text.len(), "Processing note");

    let data = state.run_blocking(move |core| core.process(&note)).await?;

    Ok(Json(ProcessResponse {
        status: "success".to_string(),
        message: "Medical text processed successfully".to_string(),
        data,
    }))
}

/// Save an extracted record, replacing any earlier save for the consult id.
/// POST /save
pub async fn save(
    State(state): State<AppState>,
    payload: Result<Json<SaveRequest>, JsonRejection>,
) -> ApiResult<Json<StatusResponse>> {
    let request = json_body(payload)?;
    let patient = PatientInfo::new(
        &request.consult_id,
        &request.patient_name,
        &request.patient_age,
    );

    let mut missing = unidoc_core::missing_fields(&[
        ("consult_id", patient.consult_id.as_str()),
        ("patient_name", patient.patient_name.as_str()),
    ]);
    if !ExtractedRecord::payload_present(request.extracted_data.as_ref()) {
        missing.push("extracted_data");
    }
    if !missing.is_empty() {
        return Err(UnidocError::missing_fields(&missing).into());
    }
    let record = ExtractedRecord::from_payload(request.extracted_data.as_ref())?;

    state
        .run_blocking(move |core| core.save(&patient, &record))
        .await?;

    Ok(Json(StatusResponse {
        status: "success".to_string(),
        message: "Data saved successfully".to_string(),
    }))
}
