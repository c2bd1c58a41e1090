//! SQLite schema definition.

/// Schema for the consultation store.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Consultations (one row per consult id, flattened vitals + full record)
-- ============================================================================

CREATE TABLE IF NOT EXISTS consult_bp (
    consult_id TEXT PRIMARY KEY,
    patient_name TEXT NOT NULL,
    patient_age TEXT NOT NULL DEFAULT '',
    bp_measured TEXT NOT NULL DEFAULT '',
    pr TEXT NOT NULL DEFAULT '',
    rbs TEXT NOT NULL DEFAULT '',
    bp_date TEXT NOT NULL,                        -- YYYY-MM-DD
    date_measures TEXT NOT NULL,                  -- YYYY-MM-DD
    created_at TEXT NOT NULL,                     -- YYYY-MM-DD HH:MM:SS
    complete_data TEXT NOT NULL,                  -- ExtractedRecord JSON
    record_digest TEXT NOT NULL                   -- SHA-256 of complete_data
);

CREATE INDEX IF NOT EXISTS idx_consult_patient_name ON consult_bp(patient_name);
"#;

/// Upgrade for a `consult_bp` table created before digests were recorded.
///
/// Older rows may hold NULLs in the text columns; they become empty strings.
pub const ADD_RECORD_DIGEST: &str = r#"
ALTER TABLE consult_bp ADD COLUMN record_digest TEXT NOT NULL DEFAULT '';

UPDATE consult_bp SET
    patient_name = COALESCE(patient_name, ''),
    patient_age = COALESCE(patient_age, ''),
    bp_measured = COALESCE(bp_measured, ''),
    pr = COALESCE(pr, ''),
    rbs = COALESCE(rbs, ''),
    bp_date = COALESCE(bp_date, ''),
    date_measures = COALESCE(date_measures, ''),
    created_at = COALESCE(created_at, ''),
    complete_data = COALESCE(complete_data, '{}');
"#;
