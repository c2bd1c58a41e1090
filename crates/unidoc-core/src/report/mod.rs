//! Consultation report rendering.
//!
//! A record is laid out as a [`ReportDocument`], rendered to PDF bytes and
//! written atomically into the reports directory. Downloads are resolved with
//! [`ReportRenderer::locate`], which only hands out files inside that directory.

mod layout;
mod pdf;

pub use layout::{build, wrap_text, ReportBlock, ReportDocument, NOT_RECORDED, NOT_SPECIFIED};
pub use pdf::render_pdf;

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{ExtractedRecord, PatientInfo};

/// Report errors.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Report not found: {0}")]
    NotFound(String),
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_facility_name() -> String {
    "UNIDOC MEDICAL CENTER".to_string()
}

fn default_subtitle() -> String {
    "Advanced Medical Consultation Report".to_string()
}

/// Where reports go and what their header says.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_facility_name")]
    pub facility_name: String,
    #[serde(default = "default_subtitle")]
    pub subtitle: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            facility_name: default_facility_name(),
            subtitle: default_subtitle(),
        }
    }
}

/// A report written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedReport {
    /// Bare file name inside the reports directory
    pub file_name: String,
    /// Full path of the written file
    pub path: PathBuf,
    pub pages: usize,
}

/// Replace every character outside `[A-Za-z0-9_-]` with `_`.
pub fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `Medical_Report_<name>_<consult_id>.pdf` with both parts sanitized.
pub fn report_file_name(patient_name: &str, consult_id: &str) -> String {
    format!(
        "Medical_Report_{}_{}.pdf",
        sanitize(patient_name),
        sanitize(consult_id)
    )
}

/// Write through a hidden temp file in `dir`, then rename into place.
fn write_atomic(dir: &Path, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
    let target = dir.join(file_name);
    let tmp = dir.join(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

    let result = fs::write(&tmp, bytes).and_then(|()| fs::rename(&tmp, &target));
    if let Err(e) = result {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(target)
}

/// Renders reports into a configured directory.
#[derive(Debug, Clone, Default)]
pub struct ReportRenderer {
    config: ReportConfig,
}

impl ReportRenderer {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// Lay out a report without rendering it.
    pub fn layout(
        &self,
        patient: &PatientInfo,
        record: &ExtractedRecord,
        generated_at: NaiveDateTime,
    ) -> ReportDocument {
        build(patient, record, generated_at, &self.config)
    }

    /// Render and write the report, replacing any earlier report of the same name.
    pub fn render(
        &self,
        patient: &PatientInfo,
        record: &ExtractedRecord,
        generated_at: NaiveDateTime,
    ) -> Result<GeneratedReport, ReportError> {
        let document = self.layout(patient, record, generated_at);
        let (bytes, pages) = render_pdf(&document)?;

        fs::create_dir_all(&self.config.output_dir)?;
        let file_name = report_file_name(&patient.patient_name, &patient.consult_id);
        let path = write_atomic(&self.config.output_dir, &file_name, &bytes)?;

        info!(
            file_name = %file_name,
            consult_id = %patient.consult_id,
            pages,
            bytes = bytes.len(),
            "Rendered consultation report"
        );

        Ok(GeneratedReport {
            file_name,
            path,
            pages,
        })
    }

    /// Resolve a requested file name to an existing file inside the reports directory.
    ///
    /// Only a single plain, non-hidden path component is accepted, and the
    /// resolved path (after following symlinks) must stay inside the directory.
    pub fn locate(&self, file_name: &str) -> Result<PathBuf, ReportError> {
        let refuse = |reason: &str| {
            warn!(file_name, reason, "Refused report download");
            Err(ReportError::Forbidden(file_name.to_string()))
        };

        if file_name.starts_with('.') || file_name.contains(['/', '\\']) {
            return refuse("not a plain file name");
        }
        let mut components = Path::new(file_name).components();
        let name = match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => name,
            _ => return refuse("not a plain file name"),
        };

        let not_found = || ReportError::NotFound(file_name.to_string());
        let dir = fs::canonicalize(&self.config.output_dir).map_err(|_| not_found())?;
        let resolved = match fs::canonicalize(dir.join(name)) {
            Ok(path) => path,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(e.into()),
        };

        if !resolved.starts_with(&dir) {
            return refuse("resolves outside the reports directory");
        }
        if !resolved.is_file() {
            return Err(not_found());
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer(dir: &Path) -> ReportRenderer {
        ReportRenderer::new(ReportConfig {
            output_dir: dir.to_path_buf(),
            ..ReportConfig::default()
        })
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("Jane Doe"), "Jane_Doe");
        assert_eq!(sanitize("O'Brien/../x"), "O_Brien____x");
        assert_eq!(sanitize("Zoë"), "Zo_");
        assert_eq!(sanitize("abc-DEF_09"), "abc-DEF_09");
    }

    #[test]
    fn test_report_file_name() {
        assert_eq!(
            report_file_name("Jane Doe", "C1"),
            "Medical_Report_Jane_Doe_C1.pdf"
        );
        assert_eq!(
            report_file_name("Jane", "../C 2"),
            "Medical_Report_Jane____C_2.pdf"
        );
    }

    #[test]
    fn test_config_defaults_from_empty_object() {
        let config: ReportConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ReportConfig::default());
        assert_eq!(config.output_dir, PathBuf::from("reports"));
    }

    #[test]
    fn test_write_atomic_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_atomic(dir.path(), "a.pdf", b"%PDF-1.3").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"%PDF-1.3");

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.pdf"]);
    }

    #[test]
    fn test_write_atomic_failure_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        // Renaming a file over a non-empty directory fails.
        fs::create_dir(dir.path().join("a.pdf")).unwrap();
        fs::write(dir.path().join("a.pdf").join("keep"), b"x").unwrap();

        assert!(write_atomic(dir.path(), "a.pdf", b"%PDF").is_err());
        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.pdf"]);
    }

    #[test]
    fn test_locate_existing_report() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("r.pdf"), b"%PDF").unwrap();
        let path = renderer(dir.path()).locate("r.pdf").unwrap();
        assert!(path.ends_with("r.pdf"));
    }

    #[test]
    fn test_locate_refuses_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = renderer(dir.path());
        for name in ["../x", "..", "a/b.pdf", "/etc/passwd", ".hidden", "a\\b"] {
            assert!(
                matches!(renderer.locate(name), Err(ReportError::Forbidden(_))),
                "{name} should be refused"
            );
        }
    }

    #[test]
    fn test_locate_missing_report() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            renderer(dir.path()).locate("missing.pdf"),
            Err(ReportError::NotFound(_))
        ));
        assert!(matches!(
            renderer(&dir.path().join("absent")).locate("missing.pdf"),
            Err(ReportError::NotFound(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_locate_refuses_symlink_escape() {
        let outside = tempfile::tempdir().unwrap();
        fs::write(outside.path().join("secret.pdf"), b"%PDF").unwrap();
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path().join("secret.pdf"), dir.path().join("link.pdf"))
            .unwrap();

        assert!(matches!(
            renderer(dir.path()).locate("link.pdf"),
            Err(ReportError::Forbidden(_))
        ));
    }
}
