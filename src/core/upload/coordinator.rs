//! Upload coordinator - drives patients through the attachment pipeline
//!
//! For every patient with a reference number, every located invoice goes
//! through presign, storage upload, key extraction and registration. A
//! failure at any step is recorded against that file and the run moves on.
//! The rate limiter pauses after every file, successful or not.

use crate::adapters::cliniko::AttachmentApi;
use crate::adapters::invoices::InvoiceLocator;
use crate::adapters::patients::PatientSource;
use crate::core::upload::summary::{UploadFailure, UploadSummary};
use crate::core::upload::throttle::RateLimiter;
use crate::domain::{InvoiceFile, PatientId, PatientRecord, Result};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Upload coordinator
pub struct UploadCoordinator {
    patients: Box<dyn PatientSource>,
    invoices: Box<dyn InvoiceLocator>,

    /// `None` runs the pipeline as a dry run
    api: Option<Arc<dyn AttachmentApi>>,

    throttle: RateLimiter,
    patient_filter: Option<HashSet<PatientId>>,
    shutdown_signal: watch::Receiver<bool>,
}

impl UploadCoordinator {
    /// Create a coordinator that uploads through `api`
    pub fn new(
        patients: Box<dyn PatientSource>,
        invoices: Box<dyn InvoiceLocator>,
        api: Arc<dyn AttachmentApi>,
        throttle: RateLimiter,
        shutdown_signal: watch::Receiver<bool>,
    ) -> Self {
        Self {
            patients,
            invoices,
            api: Some(api),
            throttle,
            patient_filter: None,
            shutdown_signal,
        }
    }

    /// Create a coordinator that locates files but makes no network calls
    pub fn dry_run(
        patients: Box<dyn PatientSource>,
        invoices: Box<dyn InvoiceLocator>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> Self {
        Self {
            patients,
            invoices,
            api: None,
            throttle: RateLimiter::new(std::time::Duration::ZERO),
            patient_filter: None,
            shutdown_signal,
        }
    }

    /// Restrict the run to the given patient IDs
    pub fn with_patient_filter(mut self, ids: impl IntoIterator<Item = PatientId>) -> Self {
        self.patient_filter = Some(ids.into_iter().collect());
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.api.is_none()
    }

    fn is_shutdown_requested(&self) -> bool {
        *self.shutdown_signal.borrow()
    }

    fn is_selected(&self, record: &PatientRecord) -> bool {
        self.patient_filter
            .as_ref()
            .map_or(true, |ids| ids.contains(&record.id))
    }

    /// Execute the upload run
    ///
    /// Only whole-run failures are returned as errors: an unreadable patient
    /// store or an invoice root that cannot be listed. A reference directory
    /// that cannot be listed skips that patient; per-file failures are
    /// recorded in the summary.
    pub async fn execute_upload(&self) -> Result<UploadSummary> {
        let start_time = Instant::now();
        let mut summary = UploadSummary::new(self.is_dry_run());

        tracing::info!(
            source = %self.patients.describe(),
            dry_run = self.is_dry_run(),
            interval = ?self.throttle.interval(),
            "Starting upload run"
        );
        if let Some(api) = &self.api {
            tracing::debug!(api = %api.base_url(), "Using Cliniko API");
        }

        let records = self.patients.patients()?;
        tracing::info!(count = records.len(), "Loaded patient records");

        self.invoices.check_root()?;

        'patients: for record in &records {
            if self.is_shutdown_requested() {
                summary.interrupted = true;
                break;
            }

            if !self.is_selected(record) {
                continue;
            }
            summary.patients_seen += 1;

            let Some(reference) = &record.reference_number else {
                tracing::debug!(patient_id = %record.id, "No reference number, skipping");
                summary.patients_skipped += 1;
                continue;
            };

            let files = match self.invoices.invoices_for(reference) {
                Ok(files) => files,
                Err(e) => {
                    tracing::warn!(
                        patient_id = %record.id,
                        reference = %reference,
                        error = %e,
                        "Failed to list invoices, skipping patient"
                    );
                    summary.patients_unreadable += 1;
                    continue;
                }
            };
            if files.is_empty() {
                tracing::debug!(
                    patient_id = %record.id,
                    reference = %reference,
                    "No invoices found"
                );
                summary.patients_without_invoices += 1;
                continue;
            }

            tracing::info!(
                patient_id = %record.id,
                reference = %reference,
                files = files.len(),
                "Processing patient"
            );
            summary.files_found += files.len();

            for file in &files {
                if self.is_shutdown_requested() {
                    tracing::warn!("Shutdown requested, stopping before next file");
                    summary.interrupted = true;
                    break 'patients;
                }

                let Some(api) = &self.api else {
                    tracing::info!(
                        patient_id = %record.id,
                        file = %file,
                        "Dry run: would upload"
                    );
                    continue;
                };

                match self.process_file(api.as_ref(), &record.id, file).await {
                    Ok(upload_url) => {
                        tracing::info!(
                            patient_id = %record.id,
                            file = %file,
                            upload_url = %upload_url,
                            "Uploaded invoice"
                        );
                        summary.files_uploaded += 1;
                    }
                    Err(e) => {
                        tracing::error!(
                            patient_id = %record.id,
                            file = %file,
                            error = %e,
                            "Failed to upload invoice"
                        );
                        summary.add_failure(UploadFailure::from_error(
                            record.id.clone(),
                            file,
                            &e,
                        ));
                    }
                }

                self.throttle.pause().await;
            }
        }

        if summary.interrupted {
            tracing::warn!("Upload run interrupted");
        }

        let summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    /// Attach one file, returning the registered upload URL
    async fn process_file(
        &self,
        api: &dyn AttachmentApi,
        patient_id: &PatientId,
        file: &InvoiceFile,
    ) -> Result<String> {
        let target = api.presigned_post(patient_id).await?;
        tracing::debug!(patient_id = %patient_id, url = %target.url, "Received presigned target");

        let bytes = tokio::fs::read(file.path()).await?;
        let key = api.upload(&target, &file.file_name(), bytes).await?;

        let upload_url = target.upload_url(&key);
        api.register_attachment(patient_id, &upload_url).await?;
        Ok(upload_url)
    }
}
