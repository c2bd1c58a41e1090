//! Consultation database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::StoredConsultation;

const SELECT_COLUMNS: &str = r#"
    SELECT consult_id, patient_name, patient_age, bp_measured, pr, rbs,
           bp_date, date_measures, created_at, complete_data, record_digest
    FROM consult_bp
"#;

fn row_to_consultation(row: &Row<'_>) -> rusqlite::Result<StoredConsultation> {
    Ok(StoredConsultation {
        consult_id: row.get(0)?,
        patient_name: row.get(1)?,
        patient_age: row.get(2)?,
        bp_measured: row.get(3)?,
        pr: row.get(4)?,
        rbs: row.get(5)?,
        bp_date: row.get(6)?,
        date_measures: row.get(7)?,
        created_at: row.get(8)?,
        complete_data: row.get(9)?,
        record_digest: row.get(10)?,
    })
}

impl Database {
    /// Insert a consultation, replacing every column of an existing row with the same id.
    pub fn upsert_consultation(&self, consultation: &StoredConsultation) -> DbResult<()> {
        if consultation.consult_id.is_empty() {
            return Err(DbError::Constraint("consult_id must not be empty".into()));
        }
        self.conn.execute(
            r#"
            INSERT INTO consult_bp (
                consult_id, patient_name, patient_age, bp_measured, pr, rbs,
                bp_date, date_measures, created_at, complete_data, record_digest
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(consult_id) DO UPDATE SET
                patient_name = excluded.patient_name,
                patient_age = excluded.patient_age,
                bp_measured = excluded.bp_measured,
                pr = excluded.pr,
                rbs = excluded.rbs,
                bp_date = excluded.bp_date,
                date_measures = excluded.date_measures,
                created_at = excluded.created_at,
                complete_data = excluded.complete_data,
                record_digest = excluded.record_digest
            "#,
            params![
                consultation.consult_id,
                consultation.patient_name,
                consultation.patient_age,
                consultation.bp_measured,
                consultation.pr,
                consultation.rbs,
                consultation.bp_date,
                consultation.date_measures,
                consultation.created_at,
                consultation.complete_data,
                consultation.record_digest,
            ],
        )?;
        Ok(())
    }

    /// Get a consultation by id, verifying its record digest.
    pub fn get_consultation(&self, consult_id: &str) -> DbResult<Option<StoredConsultation>> {
        let sql = format!("{SELECT_COLUMNS} WHERE consult_id = ?");
        let consultation = self
            .conn
            .query_row(&sql, [consult_id], row_to_consultation)
            .optional()?;

        match consultation {
            Some(c) if !c.verify_digest() => Err(DbError::Integrity(c.consult_id)),
            other => Ok(other),
        }
    }

    /// Consultations for a patient name, newest first.
    pub fn consultations_for_patient(&self, patient_name: &str) -> DbResult<Vec<StoredConsultation>> {
        let sql = format!("{SELECT_COLUMNS} WHERE patient_name = ? ORDER BY created_at DESC, consult_id");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([patient_name], row_to_consultation)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Number of stored consultations.
    pub fn count_consultations(&self) -> DbResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM consult_bp", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExtractedRecord, PatientInfo, Vitals};
    use chrono::NaiveDate;

    fn saved_at(hour: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(hour, 30, 0)
            .unwrap()
    }

    fn sample(consult_id: &str, bp: &str, hour: u32) -> StoredConsultation {
        let patient = PatientInfo::new(consult_id, "Jane Doe", "34");
        let record = ExtractedRecord {
            chief_complaint: "fever".into(),
            vitals: Vitals {
                bp: bp.into(),
                pr: "78".into(),
                rbs: "110".into(),
            },
            ..Default::default()
        };
        StoredConsultation::new(&patient, &record, saved_at(hour)).unwrap()
    }

    #[test]
    fn test_upsert_and_get() {
        let db = Database::open_in_memory().unwrap();
        let row = sample("C1", "120/80", 9);
        db.upsert_consultation(&row).unwrap();

        let loaded = db.get_consultation("C1").unwrap().unwrap();
        assert_eq!(loaded, row);
        assert_eq!(loaded.created_at, "2024-03-05 09:30:00");
        assert_eq!(loaded.bp_date, "2024-03-05");
        assert_eq!(loaded.record().unwrap().chief_complaint, "fever");
    }

    #[test]
    fn test_upsert_replaces_existing_row() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_consultation(&sample("C1", "120/80", 9)).unwrap();
        db.upsert_consultation(&sample("C1", "140/90", 10)).unwrap();

        assert_eq!(db.count_consultations().unwrap(), 1);
        let loaded = db.get_consultation("C1").unwrap().unwrap();
        assert_eq!(loaded.bp_measured, "140/90");
        assert_eq!(loaded.created_at, "2024-03-05 10:30:00");
        assert!(loaded.verify_digest());
    }

    #[test]
    fn test_get_missing_consultation() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_consultation("nope").unwrap().is_none());
    }

    #[test]
    fn test_empty_consult_id_rejected() {
        let db = Database::open_in_memory().unwrap();
        let result = db.upsert_consultation(&sample("", "120/80", 9));
        assert!(matches!(result, Err(DbError::Constraint(_))));
        assert_eq!(db.count_consultations().unwrap(), 0);
    }

    #[test]
    fn test_tampered_record_detected() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_consultation(&sample("C1", "120/80", 9)).unwrap();
        db.conn()
            .execute(
                "UPDATE consult_bp SET complete_data = '{}' WHERE consult_id = 'C1'",
                [],
            )
            .unwrap();

        let result = db.get_consultation("C1");
        assert!(matches!(result, Err(DbError::Integrity(id)) if id == "C1"));
    }

    #[test]
    fn test_consultations_for_patient() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_consultation(&sample("C1", "120/80", 9)).unwrap();
        db.upsert_consultation(&sample("C2", "130/85", 11)).unwrap();

        let rows = db.consultations_for_patient("Jane Doe").unwrap();
        let ids: Vec<&str> = rows.iter().map(|r| r.consult_id.as_str()).collect();
        assert_eq!(ids, vec!["C2", "C1"]);
        assert!(db.consultations_for_patient("John").unwrap().is_empty());
    }
}
