//! UniDoc Core Library
//!
//! Rule-based extraction of structured records from free-text clinical
//! consultation notes, with a SQLite record store and PDF report rendering.
//!
//! # Architecture
//!
//! ```text
//! ConsultationNote ── validate ──▶ Extractor (ordered pattern chains + catalog)
//!                                        │
//!                                  ExtractedRecord
//!                                        │
//!                    ┌───────────────────┴───────────────────┐
//!                    ▼                                       ▼
//!        ┌───────────────────────┐               ┌───────────────────────┐
//!        │   Store (consult_bp)  │               │  Renderer             │
//!        │  upsert by consult id │               │  layout → PDF → temp  │
//!        │  + SHA-256 digest     │               │  file → rename        │
//!        └───────────────────────┘               └───────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`models`]: Domain types (ConsultationNote, ExtractedRecord, Catalog, etc.)
//! - [`extractor`]: Pattern chains and field extractors
//! - [`db`]: SQLite consultation store
//! - [`report`]: Report layout, PDF rendering and download lookup

pub mod db;
pub mod extractor;
pub mod models;
pub mod report;

// Re-export commonly used types
pub use db::{Database, DbError};
pub use extractor::{extract, Extractor};
pub use models::{
    hash_data, Catalog, ConsultationNote, ExtractedRecord, Investigation, InvestigationEntry,
    Medication, MedicationTemplate, MedicineTemplate, PatientInfo, ProcessedConsultation,
    StoredConsultation, SuperTemplate, Vitals,
};
pub use report::{GeneratedReport, ReportConfig, ReportError, ReportRenderer};

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{Local, NaiveDateTime};
use tracing::info;

// =========================================================================
// Error Type
// =========================================================================

#[derive(Debug, thiserror::Error)]
pub enum UnidocError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Report error: {0}")]
    ReportError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl UnidocError {
    /// `InvalidInput` naming the missing fields, in the given order.
    pub fn missing_fields(fields: &[&str]) -> Self {
        UnidocError::InvalidInput(format!("Missing required fields: {}", fields.join(", ")))
    }
}

impl From<db::DbError> for UnidocError {
    fn from(e: db::DbError) -> Self {
        UnidocError::DatabaseError(e.to_string())
    }
}

impl From<serde_json::Error> for UnidocError {
    fn from(e: serde_json::Error) -> Self {
        UnidocError::SerializationError(e.to_string())
    }
}

impl From<report::ReportError> for UnidocError {
    fn from(e: report::ReportError) -> Self {
        match e {
            report::ReportError::NotFound(name) => {
                UnidocError::NotFound(format!("File not found: {name}"))
            }
            report::ReportError::Forbidden(_) => UnidocError::Forbidden("Access denied".into()),
            other => UnidocError::ReportError(other.to_string()),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for UnidocError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        UnidocError::Internal(format!("Lock poisoned: {}", e))
    }
}

/// Names of the fields whose (already trimmed) value is empty.
pub fn missing_fields<'a>(fields: &[(&'a str, &str)]) -> Vec<&'a str> {
    fields
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| *name)
        .collect()
}

/// Fail with [`UnidocError::missing_fields`] if any value is empty.
pub fn require_fields(fields: &[(&str, &str)]) -> Result<(), UnidocError> {
    let missing = missing_fields(fields);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(UnidocError::missing_fields(&missing))
    }
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe service facade over extractor, store and renderer.
pub struct UnidocCore {
    db: Arc<Mutex<Database>>,
    extractor: Extractor,
    renderer: ReportRenderer,
}

impl UnidocCore {
    pub fn new(db: Database, extractor: Extractor, renderer: ReportRenderer) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            extractor,
            renderer,
        }
    }

    /// In-memory store and built-in catalog (for testing).
    pub fn open_in_memory(renderer: ReportRenderer) -> Result<Self, UnidocError> {
        Ok(Self::new(Database::open_in_memory()?, Extractor::new(), renderer))
    }

    // =========================================================================
    // Extraction
    // =========================================================================

    /// Validate a note and extract its record.
    pub fn process(&self, note: &ConsultationNote) -> Result<ProcessedConsultation, UnidocError> {
        note.validate()?;
        let record = self.extractor.extract(&note.text);
        Ok(ProcessedConsultation::new(note.patient(), record))
    }

    // =========================================================================
    // Store
    // =========================================================================

    /// Save `record` under the patient's consult id, replacing any earlier save.
    pub fn save(
        &self,
        patient: &PatientInfo,
        record: &ExtractedRecord,
    ) -> Result<StoredConsultation, UnidocError> {
        self.save_at(patient, record, Local::now().naive_local())
    }

    /// [`save`](Self::save) with an explicit timestamp.
    pub fn save_at(
        &self,
        patient: &PatientInfo,
        record: &ExtractedRecord,
        saved_at: NaiveDateTime,
    ) -> Result<StoredConsultation, UnidocError> {
        require_fields(&[
            ("consult_id", patient.consult_id.as_str()),
            ("patient_name", patient.patient_name.as_str()),
        ])?;

        let stored = StoredConsultation::new(patient, record, saved_at)?;
        let db = self.db.lock()?;
        db.upsert_consultation(&stored)?;

        info!(
            consult_id = %stored.consult_id,
            created_at = %stored.created_at,
            "Saved consultation"
        );
        Ok(stored)
    }

    /// Stored consultation by id.
    pub fn get_consultation(&self, consult_id: &str) -> Result<StoredConsultation, UnidocError> {
        let db = self.db.lock()?;
        db.get_consultation(consult_id)?
            .ok_or_else(|| UnidocError::NotFound(format!("Consultation not found: {consult_id}")))
    }

    // =========================================================================
    // Reports
    // =========================================================================

    /// Render the report for `record` into the reports directory.
    pub fn generate_report(
        &self,
        patient: &PatientInfo,
        record: &ExtractedRecord,
    ) -> Result<GeneratedReport, UnidocError> {
        require_fields(&[("patient_name", patient.patient_name.as_str())])?;
        Ok(self
            .renderer
            .render(patient, record, Local::now().naive_local())?)
    }

    /// Resolve a report download to a file inside the reports directory.
    pub fn locate_report(&self, file_name: &str) -> Result<PathBuf, UnidocError> {
        Ok(self.renderer.locate(file_name)?)
    }
}
