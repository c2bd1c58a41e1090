//! Structured record extracted from a consultation note.

use serde::{Deserialize, Serialize};

use crate::UnidocError;

/// Vital signs as captured from the note. Empty strings mean "not recorded".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Vitals {
    /// Blood pressure, "systolic/diastolic"
    pub bp: String,
    /// Pulse rate
    pub pr: String,
    /// Random blood sugar
    pub rbs: String,
}

impl Vitals {
    /// True when no vital was recorded.
    pub fn is_empty(&self) -> bool {
        self.bp.is_empty() && self.pr.is_empty() && self.rbs.is_empty()
    }
}

/// A prescribed medication line.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Medication {
    /// Drug name with strength (e.g., "Metformin 500mg")
    #[serde(rename = "medication", alias = "name")]
    pub name: String,
    pub dose: String,
    pub duration: String,
    #[serde(rename = "medication_when", alias = "timing")]
    pub timing: String,
    #[serde(rename = "medication_id", alias = "id")]
    pub id: String,
}

/// A recommended investigation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Investigation {
    #[serde(rename = "investigation", alias = "name")]
    pub name: String,
    #[serde(rename = "investigation_id", alias = "id")]
    pub id: String,
}

/// A referenced medicine template (a prescribing macro).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MedicineTemplate {
    #[serde(rename = "template_name", alias = "name")]
    pub name: String,
    #[serde(rename = "medicine_template_id", alias = "id")]
    pub id: String,
}

/// A referenced super template (a macro bundling whole care plans).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SuperTemplate {
    #[serde(rename = "template_name", alias = "name")]
    pub name: String,
    #[serde(rename = "super_template_id", alias = "id")]
    pub id: String,
}

/// Result of extraction. Every field is always present; "nothing found" is an
/// empty string or list, never null.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExtractedRecord {
    pub chief_complaint: String,
    pub consult_summary: String,
    #[serde(rename = "vitals_examination", alias = "vitals")]
    pub vitals: Vitals,
    #[serde(rename = "medication_data", alias = "medications")]
    pub medications: Vec<Medication>,
    pub investigations: Vec<Investigation>,
    pub medicine_templates: Vec<MedicineTemplate>,
    pub super_templates: Vec<SuperTemplate>,
    pub advice: String,
    pub follow_up_day: String,
    pub follow_up_mode: String,
    pub visit_type: String,
    /// Client keys this model does not know, kept verbatim on save
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ExtractedRecord {
    /// True unless the payload is absent, null, or an empty object.
    pub fn payload_present(payload: Option<&serde_json::Value>) -> bool {
        match payload {
            None | Some(serde_json::Value::Null) => false,
            Some(serde_json::Value::Object(map)) => !map.is_empty(),
            Some(_) => true,
        }
    }

    /// Parse a client-supplied `extracted_data` payload.
    ///
    /// A missing, null, or empty-object payload counts as missing.
    pub fn from_payload(payload: Option<&serde_json::Value>) -> Result<Self, UnidocError> {
        let value = payload
            .filter(|_| Self::payload_present(payload))
            .ok_or_else(|| UnidocError::missing_fields(&["extracted_data"]))?;

        serde_json::from_value(value.clone())
            .map_err(|e| UnidocError::InvalidInput(format!("Invalid extracted_data: {}", e)))
    }
}
