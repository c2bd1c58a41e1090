//! Medication and investigation catalogs.

use serde::{Deserialize, Serialize};

/// A known medication and the prescription template emitted when it is mentioned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicationTemplate {
    /// Canonical drug name as printed in the record
    pub name: String,
    /// Alternative spellings that also trigger this template
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Strength used when the note gives none (e.g., "500mg")
    pub default_strength: String,
    /// Dose pattern (e.g., "1-0-1")
    pub dose: String,
    /// Course duration (e.g., "5 days", "ongoing")
    pub duration: String,
    /// When to take it (e.g., "After food")
    pub timing: String,
}

/// A known investigation with its fixed catalog id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvestigationEntry {
    /// Canonical test name
    pub name: String,
    /// Alternative spellings that also trigger this entry
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Catalog id reported with the investigation
    pub id: String,
}

/// Lookup tables driving medication and investigation extraction.
///
/// `Catalog::default()` is empty; [`Catalog::builtin`] holds the shipped rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Catalog {
    #[serde(default)]
    pub medications: Vec<MedicationTemplate>,
    #[serde(default)]
    pub investigations: Vec<InvestigationEntry>,
}

impl MedicationTemplate {
    /// Create a template with no aliases.
    pub fn new(
        name: &str,
        default_strength: &str,
        dose: &str,
        duration: &str,
        timing: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            aliases: Vec::new(),
            default_strength: default_strength.to_string(),
            dose: dose.to_string(),
            duration: duration.to_string(),
            timing: timing.to_string(),
        }
    }

    /// All spellings that trigger this template, canonical name first.
    pub fn spellings(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

impl InvestigationEntry {
    /// Create an entry with no aliases.
    pub fn new(name: &str, id: &str) -> Self {
        Self {
            name: name.to_string(),
            aliases: Vec::new(),
            id: id.to_string(),
        }
    }

    /// Check whether any spelling of this test occurs in already-lowercased text.
    pub fn is_mentioned_in(&self, text_lower: &str) -> bool {
        std::iter::once(&self.name)
            .chain(self.aliases.iter())
            .filter(|s| !s.is_empty())
            .any(|s| text_lower.contains(&s.to_lowercase()))
    }
}

impl Catalog {
    /// The shipped catalog.
    pub fn builtin() -> Self {
        Self {
            medications: vec![
                MedicationTemplate::new("Paracetamol", "500mg", "1-0-1", "5 days", "After food"),
                MedicationTemplate::new("Metformin", "500mg", "1-0-1", "ongoing", "Before food"),
            ],
            investigations: vec![
                InvestigationEntry::new("HbA1c", "0"),
                InvestigationEntry::new("Lipid Profile", "329"),
                InvestigationEntry::new("CBC", "127"),
                InvestigationEntry::new("Liver Function Test", "234"),
            ],
        }
    }

    /// Append rows from another catalog, keeping existing rows first.
    ///
    /// Rows whose canonical name already exists (case-insensitive) are skipped.
    pub fn extend(&mut self, other: Catalog) {
        for med in other.medications {
            if !self
                .medications
                .iter()
                .any(|m| m.name.eq_ignore_ascii_case(&med.name))
            {
                self.medications.push(med);
            }
        }
        for inv in other.investigations {
            if !self
                .investigations
                .iter()
                .any(|i| i.name.eq_ignore_ascii_case(&inv.name))
            {
                self.investigations.push(inv);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.medications.is_empty() && self.investigations.is_empty()
    }
}
