//! Database layer for consultation records.

mod consultations;
mod schema;

pub use schema::*;

use rusqlite::{params, Connection};
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::models::hash_data;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Integrity check failed for consultation {0}")]
    Integrity(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        if !self.has_column("consult_bp", "record_digest")? {
            self.add_record_digest()?;
        }
        Ok(())
    }

    fn has_column(&self, table: &str, column: &str) -> DbResult<bool> {
        let mut stmt = self.conn.prepare(&format!("PRAGMA table_info({table})"))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names.iter().any(|name| name == column))
    }

    /// Add the digest column to an existing store and hash every row's data.
    fn add_record_digest(&self) -> DbResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute_batch(ADD_RECORD_DIGEST)?;

        let rows: Vec<(String, String)> = {
            let mut stmt = tx.prepare("SELECT consult_id, complete_data FROM consult_bp")?;
            let rows = stmt
                .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };
        for (consult_id, complete_data) in &rows {
            tx.execute(
                "UPDATE consult_bp SET record_digest = ?1 WHERE consult_id = ?2",
                params![hash_data(complete_data.as_bytes()), consult_id],
            )?;
        }
        tx.commit()?;

        info!(rows = rows.len(), "Added record digests to existing consultations");
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}
