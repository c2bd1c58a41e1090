//! Catalog lookups: medications and investigations.

use regex::Regex;
use tracing::warn;

use super::normalizer::normalize_strength;
use crate::models::{Catalog, Investigation, InvestigationEntry, Medication, MedicationTemplate};

/// A catalog compiled for matching.
#[derive(Debug, Clone)]
pub struct CatalogMatcher {
    medications: Vec<(MedicationTemplate, Vec<Regex>)>,
    investigations: Vec<InvestigationEntry>,
}

impl CatalogMatcher {
    pub fn new(catalog: &Catalog) -> Self {
        let medications = catalog
            .medications
            .iter()
            .map(|template| {
                let patterns = template
                    .spellings()
                    .filter(|s| !s.trim().is_empty())
                    .filter_map(|spelling| {
                        let source = format!(
                            r"(?i){}(?:\s*(\d+\s*mg)\b)?",
                            regex::escape(spelling.trim())
                        );
                        Regex::new(&source)
                            .map_err(|e| warn!(spelling, error = %e, "Skipping medication spelling"))
                            .ok()
                    })
                    .collect();
                (template.clone(), patterns)
            })
            .collect();

        Self {
            medications,
            investigations: catalog.investigations.clone(),
        }
    }

    /// Medications mentioned in `text`, in catalog order, numbered from 1.
    pub fn medications(&self, text: &str) -> Vec<Medication> {
        self.medications
            .iter()
            .filter_map(|(template, patterns)| {
                let caps = patterns.iter().find_map(|re| re.captures(text))?;
                let strength = caps
                    .get(1)
                    .map(|m| normalize_strength(m.as_str()))
                    .unwrap_or_else(|| template.default_strength.clone());
                Some((template, strength))
            })
            .enumerate()
            .map(|(index, (template, strength))| Medication {
                name: format!("{} {}", template.name, strength),
                dose: template.dose.clone(),
                duration: template.duration.clone(),
                timing: template.timing.clone(),
                id: (index + 1).to_string(),
            })
            .collect()
    }

    /// Investigations mentioned in already-lowercased text, in catalog order.
    pub fn investigations(&self, text_lower: &str) -> Vec<Investigation> {
        self.investigations
            .iter()
            .filter(|entry| entry.is_mentioned_in(text_lower))
            .map(|entry| Investigation {
                name: entry.name.clone(),
                id: entry.id.clone(),
            })
            .collect()
    }
}
