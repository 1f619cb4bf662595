//! SQLite patient source
//!
//! The lookup database is built by importing a Cliniko patient CSV export
//! into an empty SQLite file (`.mode csv` / `.import patients.csv patients`),
//! so column names are whatever the CSV header said. Records are therefore
//! read by column position and typed here, at the boundary.

use super::PatientSource;
use crate::config::PatientStoreConfig;
use crate::domain::{PatientId, PatientRecord, Result, UploaderError};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};

/// Reads patients from a SQLite table by column position
pub struct SqlitePatientSource {
    path: PathBuf,
    table: String,
    id_column: usize,
    reference_column: usize,
}

impl SqlitePatientSource {
    /// Create a source from configuration
    ///
    /// The database is opened lazily, once per call to [`PatientSource::patients`].
    pub fn new(config: &PatientStoreConfig) -> Self {
        Self {
            path: PathBuf::from(&config.database_path),
            table: config.table.clone(),
            id_column: config.id_column,
            reference_column: config.reference_column,
        }
    }

    /// Path of the backing database
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<Connection> {
        if !self.path.exists() {
            return Err(UploaderError::PatientStore(format!(
                "Patient database not found: {}",
                self.path.display()
            )));
        }

        Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| {
            UploaderError::PatientStore(format!(
                "Failed to open patient database {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

impl PatientSource for SqlitePatientSource {
    fn patients(&self) -> Result<Vec<PatientRecord>> {
        let conn = self.open()?;

        // Table name is validated as a plain identifier by the config layer.
        let sql = format!("SELECT * FROM \"{}\"", self.table);
        let mut stmt = conn.prepare(&sql).map_err(|e| {
            UploaderError::PatientStore(format!("Failed to query table '{}': {}", self.table, e))
        })?;

        let column_count = stmt.column_count();
        let needed = self.id_column.max(self.reference_column) + 1;
        if column_count < needed {
            return Err(UploaderError::PatientStore(format!(
                "Table '{}' has {} columns but column {} is configured",
                self.table,
                column_count,
                needed - 1
            )));
        }

        let id_column = self.id_column;
        let reference_column = self.reference_column;
        let rows = stmt.query_map([], |row| {
            let id = column_text(row.get_ref(id_column)?);
            let reference = column_text(row.get_ref(reference_column)?);
            Ok((id, reference))
        })?;

        let mut records = Vec::new();
        for (index, row) in rows.enumerate() {
            let (id, reference) = row?;
            let Some(id) = id.and_then(|raw| PatientId::new(raw).ok()) else {
                tracing::warn!(row = index, "Skipping patient row without an ID");
                continue;
            };
            records.push(PatientRecord::new(id, reference.as_deref()));
        }

        tracing::debug!(
            path = %self.path.display(),
            count = records.len(),
            "Loaded patient records"
        );

        Ok(records)
    }

    fn describe(&self) -> String {
        format!("{} (table {})", self.path.display(), self.table)
    }
}

/// Converts a column value to text; NULL and blobs read as absent
fn column_text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_db(dir: &TempDir, rows: &[(&str, Option<&str>)]) -> PathBuf {
        let path = dir.path().join("patients.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE patients (id, first_name, reference)")
            .unwrap();
        for (id, reference) in rows {
            conn.execute(
                "INSERT INTO patients VALUES (?1, 'x', ?2)",
                rusqlite::params![id, reference],
            )
            .unwrap();
        }
        path
    }

    fn config(path: &Path) -> PatientStoreConfig {
        PatientStoreConfig {
            database_path: path.display().to_string(),
            table: "patients".to_string(),
            id_column: 0,
            reference_column: 2,
        }
    }

    #[test]
    fn test_reads_records_in_insertion_order() {
        let dir = TempDir::new().unwrap();
        let path = create_db(&dir, &[("7", Some("R1")), ("8", None), ("9", Some(""))]);

        let source = SqlitePatientSource::new(&config(&path));
        let records = source.patients().unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].id.as_str(), "7");
        assert_eq!(records[0].reference_number.as_ref().unwrap().as_str(), "R1");
        assert!(!records[1].has_reference());
        assert!(!records[2].has_reference());
    }

    #[test]
    fn test_integer_columns_are_stringified() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("patients.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE patients (id INTEGER, first_name, reference INTEGER);
             INSERT INTO patients VALUES (1234, 'x', 5678);",
        )
        .unwrap();
        drop(conn);

        let records = SqlitePatientSource::new(&config(&path)).patients().unwrap();
        assert_eq!(records[0].id.as_str(), "1234");
        assert_eq!(records[0].reference_number.as_ref().unwrap().as_str(), "5678");
    }

    #[test]
    fn test_rows_without_id_are_skipped() {
        let dir = TempDir::new().unwrap();
        let path = create_db(&dir, &[("", Some("R1")), ("8", Some("R2"))]);

        let records = SqlitePatientSource::new(&config(&path)).patients().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id.as_str(), "8");
    }

    #[test]
    fn test_missing_database() {
        let dir = TempDir::new().unwrap();
        let source = SqlitePatientSource::new(&config(&dir.path().join("absent.db")));
        assert!(matches!(
            source.patients(),
            Err(UploaderError::PatientStore(_))
        ));
    }

    #[test]
    fn test_column_out_of_range() {
        let dir = TempDir::new().unwrap();
        let path = create_db(&dir, &[("7", Some("R1"))]);
        let mut cfg = config(&path);
        cfg.reference_column = 28;

        let err = SqlitePatientSource::new(&cfg).patients().unwrap_err();
        assert!(err.to_string().contains("3 columns"));
    }

    #[test]
    fn test_missing_table() {
        let dir = TempDir::new().unwrap();
        let path = create_db(&dir, &[]);
        let mut cfg = config(&path);
        cfg.table = "clients".to_string();

        let err = SqlitePatientSource::new(&cfg).patients().unwrap_err();
        assert!(err.to_string().contains("clients"));
    }
}
