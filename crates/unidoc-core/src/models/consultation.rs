//! Consultation notes, patient identity and stored consultation rows.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::record::ExtractedRecord;
use crate::UnidocError;

/// A raw consultation note as submitted for processing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsultationNote {
    /// Consultation id
    pub consult_id: String,
    /// Patient name
    pub patient_name: String,
    /// Patient age (free text, may be empty)
    pub patient_age: String,
    /// Free-text clinical note
    pub text: String,
}

impl ConsultationNote {
    /// Create a note, trimming every field.
    pub fn new(consult_id: &str, patient_name: &str, patient_age: &str, text: &str) -> Self {
        Self {
            consult_id: consult_id.trim().to_string(),
            patient_name: patient_name.trim().to_string(),
            patient_age: patient_age.trim().to_string(),
            text: text.trim().to_string(),
        }
    }

    /// Ensure text, consult id and patient name are present.
    pub fn validate(&self) -> Result<(), UnidocError> {
        crate::require_fields(&[
            ("medical_text", self.text.as_str()),
            ("consult_id", self.consult_id.as_str()),
            ("patient_name", self.patient_name.as_str()),
        ])
    }

    /// Identity fields of this note.
    pub fn patient(&self) -> PatientInfo {
        PatientInfo {
            consult_id: self.consult_id.clone(),
            patient_name: self.patient_name.clone(),
            patient_age: self.patient_age.clone(),
        }
    }
}

/// Identity fields shared by save and report generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatientInfo {
    pub consult_id: String,
    pub patient_name: String,
    pub patient_age: String,
}

impl PatientInfo {
    pub fn new(consult_id: &str, patient_name: &str, patient_age: &str) -> Self {
        Self {
            consult_id: consult_id.trim().to_string(),
            patient_name: patient_name.trim().to_string(),
            patient_age: patient_age.trim().to_string(),
        }
    }
}

/// Extraction output enriched with the identity fields of the request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProcessedConsultation {
    #[serde(flatten)]
    pub record: ExtractedRecord,
    pub patient_name: String,
    pub patient_age: String,
    pub consult_id: String,
}

impl ProcessedConsultation {
    pub fn new(patient: PatientInfo, record: ExtractedRecord) -> Self {
        Self {
            record,
            patient_name: patient.patient_name,
            patient_age: patient.patient_age,
            consult_id: patient.consult_id,
        }
    }
}

/// One persisted consultation row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredConsultation {
    /// Unique key
    pub consult_id: String,
    pub patient_name: String,
    pub patient_age: String,
    /// Flattened vitals
    pub bp_measured: String,
    pub pr: String,
    pub rbs: String,
    /// Date the vitals were recorded (YYYY-MM-DD)
    pub bp_date: String,
    /// Date of the measurement entry (YYYY-MM-DD)
    pub date_measures: String,
    /// Save timestamp (YYYY-MM-DD HH:MM:SS)
    pub created_at: String,
    /// Full record as JSON
    pub complete_data: String,
    /// SHA-256 of `complete_data`, hex encoded
    pub record_digest: String,
}

impl StoredConsultation {
    /// Build a row for `record` saved at `saved_at`.
    pub fn new(
        patient: &PatientInfo,
        record: &ExtractedRecord,
        saved_at: NaiveDateTime,
    ) -> Result<Self, serde_json::Error> {
        let complete_data = serde_json::to_string(record)?;
        let date = saved_at.format("%Y-%m-%d").to_string();
        Ok(Self {
            consult_id: patient.consult_id.clone(),
            patient_name: patient.patient_name.clone(),
            patient_age: patient.patient_age.clone(),
            bp_measured: record.vitals.bp.clone(),
            pr: record.vitals.pr.clone(),
            rbs: record.vitals.rbs.clone(),
            bp_date: date.clone(),
            date_measures: date,
            created_at: saved_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            record_digest: hash_data(complete_data.as_bytes()),
            complete_data,
        })
    }

    /// Deserialize the stored record.
    pub fn record(&self) -> Result<ExtractedRecord, serde_json::Error> {
        serde_json::from_str(&self.complete_data)
    }

    /// Check `complete_data` against its digest.
    pub fn verify_digest(&self) -> bool {
        hash_data(self.complete_data.as_bytes()) == self.record_digest
    }
}

/// Hex-encoded SHA-256 of `data`.
pub fn hash_data(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
