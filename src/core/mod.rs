//! Core business logic.
//!
//! - [`upload`] - Upload orchestration, pacing and run summary
//!
//! # Upload Workflow
//!
//! 1. **Load patients** from the patient store
//! 2. **Skip** patients without a reference number
//! 3. **Locate** `invoices/<reference>/*.pdf`
//! 4. For each file: **presign**, **upload** to storage, **extract** the
//!    object key, **register** the attachment
//! 5. **Pause** before the next file
//! 6. **Report** the run summary

pub mod upload;
