//! Upload run summary
//!
//! Tracks what the run saw, uploaded and failed so the CLI can report it and
//! operators can re-run selectively.

use crate::domain::{ClinikoError, InvoiceFile, PatientId, UploaderError};
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

/// Summary of one upload run
#[derive(Debug, Clone, Default)]
pub struct UploadSummary {
    /// Patient records considered (after any ID filter)
    pub patients_seen: usize,

    /// Patients without a reference number
    pub patients_skipped: usize,

    /// Patients whose invoice directory was absent or empty
    pub patients_without_invoices: usize,

    /// Patients whose invoice directory could not be listed
    pub patients_unreadable: usize,

    /// Invoice files located
    pub files_found: usize,

    /// Files attached successfully
    pub files_uploaded: usize,

    /// Files that failed at any step
    pub files_failed: usize,

    /// One entry per failed file
    pub failures: Vec<UploadFailure>,

    /// Wall-clock start of the run
    pub started_at: DateTime<Utc>,

    pub duration: Duration,

    /// Run stopped early on a shutdown signal
    pub interrupted: bool,

    /// No network calls were made
    pub dry_run: bool,
}

impl UploadSummary {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            started_at: Utc::now(),
            ..Default::default()
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Record a failed file
    pub fn add_failure(&mut self, failure: UploadFailure) {
        self.files_failed += 1;
        self.failures.push(failure);
    }

    /// Files that reached the upload pipeline
    pub fn files_attempted(&self) -> usize {
        self.files_uploaded + self.files_failed
    }

    /// True when every attempted file was attached
    pub fn is_successful(&self) -> bool {
        self.files_failed == 0
    }

    /// Success rate over attempted files, as a percentage
    pub fn success_rate(&self) -> f64 {
        let attempted = self.files_attempted();
        if attempted == 0 {
            return 100.0;
        }
        (self.files_uploaded as f64 / attempted as f64) * 100.0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            patients_seen = self.patients_seen,
            patients_skipped = self.patients_skipped,
            patients_without_invoices = self.patients_without_invoices,
            patients_unreadable = self.patients_unreadable,
            files_found = self.files_found,
            uploaded = self.files_uploaded,
            failed = self.files_failed,
            started_at = %self.started_at.to_rfc3339(),
            duration_secs = self.duration.as_secs(),
            success_rate = format!("{:.2}%", self.success_rate()),
            interrupted = self.interrupted,
            dry_run = self.dry_run,
            "Upload completed"
        );

        if !self.failures.is_empty() {
            tracing::warn!(
                failure_count = self.failures.len(),
                "Upload completed with failures"
            );
            for failure in &self.failures {
                tracing::warn!(
                    kind = %failure.kind,
                    patient_id = %failure.patient_id,
                    file = %failure.file,
                    message = %failure.message,
                    "Upload failure"
                );
            }
        }
    }
}

/// A file that could not be attached
#[derive(Debug, Clone)]
pub struct UploadFailure {
    pub kind: FailureKind,
    pub patient_id: PatientId,

    /// Path of the local invoice
    pub file: String,

    pub message: String,
}

impl UploadFailure {
    pub fn new(
        kind: FailureKind,
        patient_id: PatientId,
        file: &InvoiceFile,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            patient_id,
            file: file.to_string(),
            message: message.into(),
        }
    }

    /// Classify a pipeline error for the given file
    pub fn from_error(patient_id: PatientId, file: &InvoiceFile, error: &UploaderError) -> Self {
        Self::new(FailureKind::of(error), patient_id, file, error.to_string())
    }
}

/// Failure categories reported per file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Transport failure or unexpected status on presign, upload or registration
    TransientRequest,

    /// Storage accepted the upload but returned no key
    MalformedUploadResponse,

    /// Registration answered with a status other than 201
    RegistrationRejected,

    /// The local file could not be read
    Io,
}

impl FailureKind {
    pub fn of(error: &UploaderError) -> Self {
        match error {
            UploaderError::Cliniko(ClinikoError::MalformedUploadResponse(_)) => {
                FailureKind::MalformedUploadResponse
            }
            UploaderError::Cliniko(ClinikoError::RegistrationRejected { .. }) => {
                FailureKind::RegistrationRejected
            }
            UploaderError::Io(_) => FailureKind::Io,
            _ => FailureKind::TransientRequest,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::TransientRequest => "transient_request",
            FailureKind::MalformedUploadResponse => "malformed_upload_response",
            FailureKind::RegistrationRejected => "registration_rejected",
            FailureKind::Io => "io",
        };
        f.write_str(name)
    }
}
