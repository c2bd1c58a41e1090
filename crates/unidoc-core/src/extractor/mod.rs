//! Rule-based extraction of a structured record from a free-text note.
//!
//! Every field has an ordered chain of patterns; the first match wins and a
//! fixed fallback applies when nothing matches. Extraction never fails.

mod catalog;
mod fields;
mod matcher;
mod normalizer;
mod vitals;

use std::sync::LazyLock;

use tracing::debug;

pub use catalog::CatalogMatcher;
pub use fields::{
    ADVICE_SENTENCE, DEFAULT_CHIEF_COMPLAINT, DEFAULT_CONSULT_SUMMARY, DEFAULT_VISIT_TYPE,
};
pub use normalizer::normalize_whitespace;
pub use vitals::{extract_vitals, strip_vitals_fragments};

use crate::models::{Catalog, ExtractedRecord};

static DEFAULT_EXTRACTOR: LazyLock<Extractor> = LazyLock::new(Extractor::new);

/// Extractor bound to a medication/investigation catalog.
#[derive(Debug, Clone)]
pub struct Extractor {
    catalog: CatalogMatcher,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    /// Extractor over the built-in catalog.
    pub fn new() -> Self {
        Self::with_catalog(&Catalog::builtin())
    }

    pub fn with_catalog(catalog: &Catalog) -> Self {
        Self {
            catalog: CatalogMatcher::new(catalog),
        }
    }

    /// Extract a record from `text`. Pure and deterministic.
    pub fn extract(&self, text: &str) -> ExtractedRecord {
        let text = normalize_whitespace(text);
        let lower = text.to_lowercase();

        let record = ExtractedRecord {
            chief_complaint: fields::chief_complaint(&text),
            consult_summary: fields::consult_summary(&text, &lower),
            vitals: extract_vitals(&text),
            medications: self.catalog.medications(&text),
            investigations: self.catalog.investigations(&lower),
            medicine_templates: fields::medicine_templates(&text),
            super_templates: fields::super_templates(&text),
            advice: fields::advice(&lower),
            follow_up_day: fields::follow_up_day(&text),
            follow_up_mode: fields::follow_up_mode(&lower),
            visit_type: fields::visit_type(&lower),
            extra: Default::default(),
        };

        debug!(
            chars = text.len(),
            medications = record.medications.len(),
            investigations = record.investigations.len(),
            templates = record.medicine_templates.len() + record.super_templates.len(),
            has_vitals = !record.vitals.is_empty(),
            "Extracted consultation record"
        );

        record
    }
}

/// Extract with the built-in catalog.
pub fn extract(text: &str) -> ExtractedRecord {
    DEFAULT_EXTRACTOR.extract(text)
}
