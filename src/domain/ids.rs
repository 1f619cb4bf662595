//! Domain identifier types with validation
//!
//! Newtype wrappers for the two identifiers the pipeline correlates: the
//! Cliniko patient ID and the local reference number naming an invoice
//! directory.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cliniko patient identifier
///
/// Opaque to the pipeline. Cliniko issues integer IDs, so an all-digit ID is
/// sent as a JSON number when registering an attachment.
///
/// # Examples
///
/// ```
/// use invoice_uploader::domain::ids::PatientId;
/// use std::str::FromStr;
///
/// let id = PatientId::from_str("1234567").unwrap();
/// assert_eq!(id.as_str(), "1234567");
/// assert_eq!(id.to_json(), serde_json::json!(1234567));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatientId(String);

impl PatientId {
    /// Creates a new PatientId, trimming surrounding whitespace
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err("Patient ID cannot be empty".to_string());
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the patient ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// JSON representation used in API request bodies
    pub fn to_json(&self) -> serde_json::Value {
        match self.0.parse::<u64>() {
            Ok(n) if self.0.bytes().all(|b| b.is_ascii_digit()) => serde_json::Value::from(n),
            _ => serde_json::Value::String(self.0.clone()),
        }
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PatientId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for PatientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Reference number correlating a patient to `invoices/<reference>/`
///
/// An empty reference is not representable; callers map empty values to
/// `None` at the store boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceNumber(String);

impl ReferenceNumber {
    /// Creates a new ReferenceNumber
    ///
    /// Returns `Err` for empty or whitespace-only input.
    pub fn new(reference: impl Into<String>) -> Result<Self, String> {
        let reference = reference.into();
        if reference.trim().is_empty() {
            return Err("Reference number cannot be empty".to_string());
        }
        Ok(Self(reference))
    }

    /// Returns the reference number as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the reference can be used as a single directory name
    pub fn is_single_path_component(&self) -> bool {
        !(self.0 == "." || self.0 == ".." || self.0.contains('/') || self.0.contains('\\'))
    }
}

impl fmt::Display for ReferenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ReferenceNumber {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ReferenceNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
