//! Domain models and types for the uploader.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`PatientId`], [`ReferenceNumber`])
//! - **Domain models** ([`PatientRecord`], [`InvoiceFile`])
//! - **Error types** ([`UploaderError`], [`ClinikoError`])
//! - **Result type alias** ([`Result`])
//!
//! Positional row access stops at the patient store adapter; everything past
//! it works with [`PatientRecord`]:
//!
//! ```rust
//! use invoice_uploader::domain::{PatientId, PatientRecord};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let record = PatientRecord::new(PatientId::new("7")?, Some("R1"));
//! assert!(record.has_reference());
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod ids;
pub mod patient;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{ClinikoError, UploaderError};
pub use ids::{PatientId, ReferenceNumber};
pub use patient::{InvoiceFile, PatientRecord};
pub use result::Result;
