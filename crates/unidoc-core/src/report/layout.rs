//! Report layout: an ordered list of blocks built from a record.
//!
//! Layout is independent of PDF output so section rules can be tested on
//! plain data.

use chrono::NaiveDateTime;

use super::ReportConfig;
use crate::models::{ExtractedRecord, PatientInfo};

pub const NOT_SPECIFIED: &str = "Not specified";
pub const NOT_RECORDED: &str = "Not recorded";

/// One layout element, top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportBlock {
    /// Facility name, large and bold
    Title(String),
    /// Line under the title
    Subtitle(String),
    /// Horizontal rule
    Rule,
    /// Section heading
    Heading(String),
    /// Wrapped body text
    Paragraph(String),
    /// Label/value rows without a header
    KeyValue(Vec<(String, String)>),
    /// Table with a header row; `widths` are column widths in millimetres
    Table {
        columns: Vec<String>,
        widths: Vec<f32>,
        rows: Vec<Vec<String>>,
    },
    /// Small grey lines at the end of the document
    Footer(Vec<String>),
    /// Vertical gap in millimetres
    Spacer(f32),
}

/// A laid-out report ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    /// Document title (PDF metadata)
    pub title: String,
    pub blocks: Vec<ReportBlock>,
}

impl ReportDocument {
    /// Section headings in order.
    pub fn headings(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                ReportBlock::Heading(h) => Some(h.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Body of the section under `heading`, up to the next heading.
    pub fn section(&self, heading: &str) -> Option<&[ReportBlock]> {
        let start = self
            .blocks
            .iter()
            .position(|b| matches!(b, ReportBlock::Heading(h) if h == heading))?
            + 1;
        let end = self.blocks[start..]
            .iter()
            .position(|b| matches!(b, ReportBlock::Heading(_) | ReportBlock::Rule))
            .map_or(self.blocks.len(), |offset| start + offset);
        Some(&self.blocks[start..end])
    }
}

const SECTION_GAP: f32 = 4.0;

fn text_section(blocks: &mut Vec<ReportBlock>, heading: &str, body: String) {
    blocks.push(ReportBlock::Heading(heading.to_string()));
    blocks.push(ReportBlock::Paragraph(body));
    blocks.push(ReportBlock::Spacer(SECTION_GAP));
}

fn table_section(
    blocks: &mut Vec<ReportBlock>,
    heading: &str,
    columns: &[&str],
    widths: &[f32],
    rows: Vec<Vec<String>>,
) {
    blocks.push(ReportBlock::Heading(heading.to_string()));
    blocks.push(ReportBlock::Table {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        widths: widths.to_vec(),
        rows,
    });
    blocks.push(ReportBlock::Spacer(SECTION_GAP));
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}

/// Lay out the report for `record`. Sections for empty fields are omitted.
pub fn build(
    patient: &PatientInfo,
    record: &ExtractedRecord,
    generated_at: NaiveDateTime,
    config: &ReportConfig,
) -> ReportDocument {
    let mut blocks = vec![
        ReportBlock::Title(config.facility_name.clone()),
        ReportBlock::Subtitle(config.subtitle.clone()),
        ReportBlock::Rule,
        ReportBlock::Spacer(5.0),
        ReportBlock::Heading("PATIENT INFORMATION".into()),
        ReportBlock::KeyValue(vec![
            ("Patient Name:".into(), patient.patient_name.clone()),
            ("Age:".into(), or_placeholder(&patient.patient_age, NOT_SPECIFIED)),
            ("Consultation ID:".into(), patient.consult_id.clone()),
            ("Date of Report:".into(), generated_at.format("%Y-%m-%d").to_string()),
            ("Time Generated:".into(), generated_at.format("%H:%M:%S").to_string()),
        ]),
        ReportBlock::Spacer(SECTION_GAP),
    ];

    if !record.chief_complaint.is_empty() {
        text_section(&mut blocks, "CHIEF COMPLAINT", record.chief_complaint.clone());
    }

    if !record.consult_summary.is_empty() {
        text_section(&mut blocks, "CLINICAL EXAMINATION", record.consult_summary.clone());
    }

    let vitals = &record.vitals;
    if !vitals.is_empty() {
        let row = |label: &str, value: &str, unit: &str| {
            vec![
                label.to_string(),
                or_placeholder(value, NOT_RECORDED),
                if value.is_empty() { String::new() } else { unit.to_string() },
            ]
        };
        table_section(
            &mut blocks,
            "VITAL SIGNS",
            &["Parameter", "Value", "Unit"],
            &[63.5, 51.0, 51.0],
            vec![
                row("Blood Pressure", &vitals.bp, "mmHg"),
                row("Pulse Rate", &vitals.pr, "bpm"),
                row("Random Blood Sugar", &vitals.rbs, "mg/dL"),
            ],
        );
    }

    if !record.medications.is_empty() {
        table_section(
            &mut blocks,
            "PRESCRIBED MEDICATIONS",
            &["Medication", "Dosage", "Duration", "Instructions"],
            &[51.0, 38.0, 38.0, 38.5],
            record
                .medications
                .iter()
                .map(|m| vec![m.name.clone(), m.dose.clone(), m.duration.clone(), m.timing.clone()])
                .collect(),
        );
    }

    if !record.investigations.is_empty() {
        table_section(
            &mut blocks,
            "RECOMMENDED INVESTIGATIONS",
            &["Investigation", "ID"],
            &[101.5, 64.0],
            record
                .investigations
                .iter()
                .map(|i| vec![i.name.clone(), i.id.clone()])
                .collect(),
        );
    }

    if !record.medicine_templates.is_empty() {
        table_section(
            &mut blocks,
            "MEDICINE TEMPLATES",
            &["Template Name", "ID"],
            &[101.5, 64.0],
            record
                .medicine_templates
                .iter()
                .map(|t| vec![t.name.clone(), t.id.clone()])
                .collect(),
        );
    }

    if !record.super_templates.is_empty() {
        table_section(
            &mut blocks,
            "SUPER TEMPLATES",
            &["Template Name", "ID"],
            &[101.5, 64.0],
            record
                .super_templates
                .iter()
                .map(|t| vec![t.name.clone(), t.id.clone()])
                .collect(),
        );
    }

    if !record.advice.is_empty() {
        text_section(&mut blocks, "MEDICAL ADVICE", record.advice.clone());
    }

    let mut follow_up = Vec::new();
    if !record.follow_up_day.is_empty() {
        follow_up.push(format!("Next consultation: {}", record.follow_up_day));
    }
    if !record.follow_up_mode.is_empty() {
        follow_up.push(format!("Mode: {}", record.follow_up_mode));
    }
    if !follow_up.is_empty() {
        text_section(
            &mut blocks,
            "FOLLOW-UP INSTRUCTIONS",
            format!("{}.", follow_up.join(". ")),
        );
    }

    if !record.visit_type.is_empty() {
        text_section(
            &mut blocks,
            "CONSULTATION TYPE",
            format!("Visit Type: {}", record.visit_type),
        );
    }

    blocks.push(ReportBlock::Rule);
    blocks.push(ReportBlock::Footer(vec![
        "This is a computer-generated medical report.".into(),
        "Generated by UniDoc Medical Transcription System".into(),
        format!(
            "Report ID: {} | Generated on: {}",
            patient.consult_id,
            generated_at.format("%Y-%m-%d %H:%M:%S")
        ),
    ]));

    ReportDocument {
        title: format!("{} - {}", config.subtitle, patient.patient_name),
        blocks,
    }
}

/// Greedy word wrap at `max_chars`. Always returns at least one line.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + word.chars().count() + 1 > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Investigation, Medication, MedicineTemplate, SuperTemplate, Vitals};
    use chrono::NaiveDate;

    fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(14, 7, 9)
            .unwrap()
    }

    fn patient(age: &str) -> PatientInfo {
        PatientInfo::new("C1", "Jane Doe", age)
    }

    fn full_record() -> ExtractedRecord {
        ExtractedRecord {
            chief_complaint: "fever".into(),
            consult_summary: "chest clear.".into(),
            vitals: Vitals {
                bp: "120/80".into(),
                pr: String::new(),
                rbs: "110".into(),
            },
            medications: vec![Medication {
                name: "Paracetamol 500mg".into(),
                dose: "1-0-1".into(),
                duration: "5 days".into(),
                timing: "After food".into(),
                id: "1".into(),
            }],
            investigations: vec![Investigation {
                name: "CBC".into(),
                id: "127".into(),
            }],
            medicine_templates: vec![MedicineTemplate {
                name: "Diabetes Care".into(),
                id: "1".into(),
            }],
            super_templates: vec![SuperTemplate {
                name: "Cardiac Rehab".into(),
                id: "1".into(),
            }],
            advice: "Rest.".into(),
            follow_up_day: "1 Week".into(),
            follow_up_mode: "Clinic Visit".into(),
            visit_type: "In Person".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_full_record_sections_in_order() {
        let doc = build(&patient("34"), &full_record(), generated_at(), &ReportConfig::default());
        assert_eq!(
            doc.headings(),
            vec![
                "PATIENT INFORMATION",
                "CHIEF COMPLAINT",
                "CLINICAL EXAMINATION",
                "VITAL SIGNS",
                "PRESCRIBED MEDICATIONS",
                "RECOMMENDED INVESTIGATIONS",
                "MEDICINE TEMPLATES",
                "SUPER TEMPLATES",
                "MEDICAL ADVICE",
                "FOLLOW-UP INSTRUCTIONS",
                "CONSULTATION TYPE",
            ]
        );
        assert_eq!(doc.blocks[0], ReportBlock::Title("UNIDOC MEDICAL CENTER".into()));
        assert_eq!(
            doc.blocks[1],
            ReportBlock::Subtitle("Advanced Medical Consultation Report".into())
        );
    }

    #[test]
    fn test_empty_record_has_only_patient_information() {
        let doc = build(
            &patient(""),
            &ExtractedRecord::default(),
            generated_at(),
            &ReportConfig::default(),
        );
        assert_eq!(doc.headings(), vec!["PATIENT INFORMATION"]);

        let section = doc.section("PATIENT INFORMATION").unwrap();
        let ReportBlock::KeyValue(rows) = &section[0] else {
            panic!("expected key/value block, got {:?}", section[0]);
        };
        assert_eq!(rows[1], ("Age:".to_string(), NOT_SPECIFIED.to_string()));
        assert_eq!(rows[3].1, "2024-03-05");
        assert_eq!(rows[4].1, "14:07:09");
    }

    #[test]
    fn test_vitals_placeholders() {
        let doc = build(&patient("34"), &full_record(), generated_at(), &ReportConfig::default());
        let section = doc.section("VITAL SIGNS").unwrap();
        let ReportBlock::Table { rows, columns, .. } = &section[0] else {
            panic!("expected table");
        };
        assert_eq!(columns, &["Parameter", "Value", "Unit"]);
        assert_eq!(rows[0], vec!["Blood Pressure", "120/80", "mmHg"]);
        assert_eq!(rows[1], vec!["Pulse Rate", NOT_RECORDED, ""]);
        assert_eq!(rows[2], vec!["Random Blood Sugar", "110", "mg/dL"]);
    }

    #[test]
    fn test_template_tables() {
        let doc = build(&patient("34"), &full_record(), generated_at(), &ReportConfig::default());
        let section = doc.section("SUPER TEMPLATES").unwrap();
        let ReportBlock::Table { rows, columns, .. } = &section[0] else {
            panic!("expected table");
        };
        assert_eq!(columns, &["Template Name", "ID"]);
        assert_eq!(rows, &vec![vec!["Cardiac Rehab".to_string(), "1".to_string()]]);
    }

    #[test]
    fn test_follow_up_text() {
        let mut record = ExtractedRecord::default();
        record.follow_up_mode = "Teleconsultation".into();
        let doc = build(&patient("34"), &record, generated_at(), &ReportConfig::default());
        assert_eq!(
            doc.section("FOLLOW-UP INSTRUCTIONS").unwrap()[0],
            ReportBlock::Paragraph("Mode: Teleconsultation.".into())
        );

        let doc = build(&patient("34"), &full_record(), generated_at(), &ReportConfig::default());
        assert_eq!(
            doc.section("FOLLOW-UP INSTRUCTIONS").unwrap()[0],
            ReportBlock::Paragraph("Next consultation: 1 Week. Mode: Clinic Visit.".into())
        );
    }

    #[test]
    fn test_footer() {
        let doc = build(&patient("34"), &full_record(), generated_at(), &ReportConfig::default());
        let Some(ReportBlock::Footer(lines)) = doc.blocks.last() else {
            panic!("expected footer last");
        };
        assert_eq!(lines[2], "Report ID: C1 | Generated on: 2024-03-05 14:07:09");
    }

    #[test]
    fn test_custom_facility_name() {
        let config = ReportConfig {
            facility_name: "NORTH CLINIC".into(),
            ..ReportConfig::default()
        };
        let doc = build(&patient("34"), &full_record(), generated_at(), &config);
        assert_eq!(doc.blocks[0], ReportBlock::Title("NORTH CLINIC".into()));
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("one two three", 7), vec!["one two", "three"]);
        assert_eq!(wrap_text("", 10), vec![""]);
        assert_eq!(wrap_text("supercalifragilistic", 5), vec!["supercalifragilistic"]);
    }
}
