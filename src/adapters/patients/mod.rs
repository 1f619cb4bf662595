//! Patient lookup store
//!
//! [`PatientSource`] abstracts where patient records come from; the SQLite
//! implementation reads the table produced by importing a Cliniko patient
//! export.

pub mod sqlite;

pub use sqlite::SqlitePatientSource;

use crate::domain::{PatientRecord, Result};

/// Read-only enumerator over patient records
///
/// Implementations return every record in a deterministic order; filtering
/// on reference numbers is the caller's job.
pub trait PatientSource: Send + Sync {
    /// Load all patient records
    fn patients(&self) -> Result<Vec<PatientRecord>>;

    /// Human-readable description for log lines
    fn describe(&self) -> String;
}

/// Fixed list of records, used for dry runs over hand-picked patients and tests
#[derive(Debug, Clone, Default)]
pub struct StaticPatientSource {
    records: Vec<PatientRecord>,
}

impl StaticPatientSource {
    /// Wraps an existing list
    pub fn new(records: Vec<PatientRecord>) -> Self {
        Self { records }
    }
}

impl PatientSource for StaticPatientSource {
    fn patients(&self) -> Result<Vec<PatientRecord>> {
        Ok(self.records.clone())
    }

    fn describe(&self) -> String {
        format!("{} static records", self.records.len())
    }
}
