//! Patient and invoice domain models

use super::ids::{PatientId, ReferenceNumber};
use std::path::{Path, PathBuf};

/// A row of the patient lookup table, typed at the store boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientRecord {
    /// Cliniko patient ID
    pub id: PatientId,

    /// Local reference number, absent when the export left it blank
    pub reference_number: Option<ReferenceNumber>,
}

impl PatientRecord {
    /// Creates a record, mapping an empty or missing reference to `None`
    pub fn new(id: PatientId, reference: Option<&str>) -> Self {
        Self {
            id,
            reference_number: reference.and_then(|r| ReferenceNumber::new(r).ok()),
        }
    }

    /// Whether the patient can be matched to an invoice directory
    pub fn has_reference(&self) -> bool {
        self.reference_number.is_some()
    }
}

/// An invoice PDF found under a patient's reference directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceFile {
    path: PathBuf,
}

impl InvoiceFile {
    /// Wraps a located path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Full path on disk
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name sent as the multipart file name
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

impl std::fmt::Display for InvoiceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_with_reference() {
        let record = PatientRecord::new(PatientId::new("7").unwrap(), Some("R1"));
        assert!(record.has_reference());
        assert_eq!(record.reference_number.unwrap().as_str(), "R1");
    }

    #[test]
    fn test_record_blank_reference_is_absent() {
        let id = PatientId::new("7").unwrap();
        assert!(!PatientRecord::new(id.clone(), Some("")).has_reference());
        assert!(!PatientRecord::new(id.clone(), Some("   ")).has_reference());
        assert!(!PatientRecord::new(id, None).has_reference());
    }

    #[test]
    fn test_invoice_file_name() {
        let file = InvoiceFile::new("invoices/R1/a.pdf");
        assert_eq!(file.file_name(), "a.pdf");
        assert_eq!(file.to_string(), "invoices/R1/a.pdf");
    }
}
