//! Integration tests for report rendering and download lookup.

use std::fs;
use std::path::Path;

use unidoc_core::report::ReportError;
use unidoc_core::{extract, PatientInfo, ReportConfig, ReportRenderer, UnidocCore, UnidocError};

const NOTE: &str = "Patient came with complaints of fever. On examination, BP 120/80, PR 78, \
    chest clear. Start Paracetamol 650mg. Check CBC. Advised rest. \
    Follow up in 1 week via clinic visit.";

fn renderer(dir: &Path) -> ReportRenderer {
    ReportRenderer::new(ReportConfig {
        output_dir: dir.to_path_buf(),
        ..ReportConfig::default()
    })
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_render_writes_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let patient = PatientInfo::new("C1", "Jane Doe", "34");
    let generated_at = chrono::NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();

    let report = renderer(dir.path())
        .render(&patient, &extract(NOTE), generated_at)
        .unwrap();

    assert_eq!(report.file_name, "Medical_Report_Jane_Doe_C1.pdf");
    assert_eq!(report.pages, 1);
    let bytes = fs::read(&report.path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    assert_eq!(file_names(dir.path()), vec![report.file_name]);
}

#[test]
fn test_file_name_is_sanitized() {
    let dir = tempfile::tempdir().unwrap();
    let core = UnidocCore::open_in_memory(renderer(dir.path())).unwrap();
    let patient = PatientInfo::new("../../etc/C 1", "Zoë O'Neil / admin", "");

    let report = core.generate_report(&patient, &extract("fever")).unwrap();

    assert!(report
        .file_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')));
    assert!(report.file_name.starts_with("Medical_Report_"));
    assert!(report.file_name.ends_with(".pdf"));
    assert_eq!(report.path.parent().unwrap(), dir.path());
}

#[test]
fn test_rerender_replaces_report() {
    let dir = tempfile::tempdir().unwrap();
    let core = UnidocCore::open_in_memory(renderer(dir.path())).unwrap();
    let patient = PatientInfo::new("C1", "Jane Doe", "34");

    let first = core.generate_report(&patient, &extract("fever")).unwrap();
    let second = core.generate_report(&patient, &extract(NOTE)).unwrap();

    assert_eq!(first.file_name, second.file_name);
    assert_eq!(file_names(dir.path()), vec![second.file_name]);
}

#[test]
fn test_reports_directory_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("out").join("reports");
    let core = UnidocCore::open_in_memory(renderer(&nested)).unwrap();

    let report = core
        .generate_report(&PatientInfo::new("C1", "Jane", ""), &extract(""))
        .unwrap();
    assert!(nested.join(&report.file_name).is_file());
}

#[test]
fn test_generate_requires_patient_name() {
    let dir = tempfile::tempdir().unwrap();
    let core = UnidocCore::open_in_memory(renderer(dir.path())).unwrap();

    let err = core
        .generate_report(&PatientInfo::new("C1", "  ", "34"), &extract("fever"))
        .unwrap_err();
    assert_eq!(err.to_string(), "Missing required fields: patient_name");
    assert!(file_names(dir.path()).is_empty());
}

#[test]
fn test_locate_only_serves_reports_directory() {
    let dir = tempfile::tempdir().unwrap();
    let core = UnidocCore::open_in_memory(renderer(dir.path())).unwrap();
    let report = core
        .generate_report(&PatientInfo::new("C1", "Jane", ""), &extract("fever"))
        .unwrap();

    let located = core.locate_report(&report.file_name).unwrap();
    assert_eq!(fs::read(located).unwrap(), fs::read(&report.path).unwrap());

    assert!(matches!(
        core.locate_report("../x"),
        Err(UnidocError::Forbidden(_))
    ));
    assert!(matches!(
        core.locate_report("nope.pdf"),
        Err(UnidocError::NotFound(_))
    ));
    assert!(matches!(
        renderer(dir.path()).locate("x%2F..%2Fy"),
        Err(ReportError::NotFound(_))
    ));
}
