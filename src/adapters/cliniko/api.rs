//! Attachment API trait
//!
//! Abstracts the three remote calls that attach one file to one patient, so
//! the upload coordinator can be driven against Cliniko or a test double.

use super::models::PresignedUploadTarget;
use crate::domain::{PatientId, Result};
use async_trait::async_trait;

/// Remote operations needed to attach a file to a patient
///
/// # Example
///
/// ```no_run
/// use invoice_uploader::adapters::cliniko::{AttachmentApi, ClinikoClient};
/// use invoice_uploader::config::{secret_string, ClinikoConfig, UploadConfig};
/// use invoice_uploader::domain::PatientId;
///
/// # async fn example() -> invoice_uploader::domain::Result<()> {
/// let config = ClinikoConfig {
///     user_agent: "Jane Smith (jane@example.com)".to_string(),
///     ..Default::default()
/// };
/// let key = secret_string("api-key".to_string());
/// let client = ClinikoClient::new(&config, &key, &UploadConfig::default())?;
///
/// let patient = PatientId::new("7").map_err(invoice_uploader::domain::UploaderError::Validation)?;
/// let target = client.presigned_post(&patient).await?;
/// let key = client.upload(&target, "a.pdf", b"%PDF-1.4".to_vec()).await?;
/// client.register_attachment(&patient, &target.upload_url(&key)).await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait AttachmentApi: Send + Sync {
    /// Request a fresh presigned upload target for a patient
    ///
    /// # Errors
    ///
    /// Transport failure, a non-2xx status, or a body that is not a
    /// `{url, fields}` JSON document.
    async fn presigned_post(&self, patient_id: &PatientId) -> Result<PresignedUploadTarget>;

    /// Upload file bytes to the presigned target and return the storage key
    ///
    /// # Errors
    ///
    /// Transport failure, a non-2xx status, or a response without a
    /// `PostResponse/Key` element.
    async fn upload(
        &self,
        target: &PresignedUploadTarget,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String>;

    /// Register an uploaded object as an attachment of the patient
    ///
    /// # Errors
    ///
    /// Transport failure, or `RegistrationRejected` for any status but 201.
    async fn register_attachment(&self, patient_id: &PatientId, upload_url: &str) -> Result<()>;

    /// API base URL, for log lines
    fn base_url(&self) -> &str;
}
