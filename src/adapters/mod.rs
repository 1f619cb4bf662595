//! External system integrations.
//!
//! - [`patients`] - Patient lookup store (SQLite)
//! - [`invoices`] - Local invoice tree
//! - [`cliniko`] - Cliniko attachment API and presigned storage uploads
//!
//! Each adapter sits behind a trait ([`patients::PatientSource`],
//! [`invoices::InvoiceLocator`], [`cliniko::AttachmentApi`]) so the upload
//! coordinator can be tested without a database, a filesystem tree or a
//! network.

pub mod cliniko;
pub mod invoices;
pub mod patients;
