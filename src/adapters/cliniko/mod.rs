//! Cliniko attachment API
//!
//! Attaching a file to a patient takes three calls: a presigned POST target
//! from the API, a multipart upload to storage, and a registration of the
//! resulting object with the API.

pub mod api;
pub mod client;
pub mod models;

pub use api::AttachmentApi;
pub use client::ClinikoClient;
pub use models::{parse_upload_key, AttachmentRegistration, PresignedUploadTarget};
