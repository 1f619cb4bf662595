// Invoice Uploader - Cliniko patient invoice attachment tool
// Copyright (c) 2025 Invoice Uploader Contributors
// Licensed under the MIT License

//! # Invoice Uploader
//!
//! Attaches locally stored invoice PDFs to patients in Cliniko.
//!
//! Patients are read from a SQLite table built from a Cliniko patient export.
//! Each patient with a reference number has its invoices under
//! `invoices/<reference>/*.pdf`; every file is uploaded through a presigned
//! storage POST and then registered as a patient attachment.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Upload orchestration, pacing and run summary
//! - [`adapters`] - Patient store, invoice tree and Cliniko API
//! - [`domain`] - Identifiers, records and error types
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use invoice_uploader::adapters::cliniko::ClinikoClient;
//! use invoice_uploader::adapters::invoices::FsInvoiceLocator;
//! use invoice_uploader::adapters::patients::SqlitePatientSource;
//! use invoice_uploader::config::{load_config, secret_string};
//! use invoice_uploader::core::upload::{RateLimiter, UploadCoordinator};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("invoice-uploader.toml")?;
//!     let key = secret_string(std::env::var("CLINIKO_API_KEY")?);
//!     let client = ClinikoClient::new(&config.cliniko, &key, &config.upload)?;
//!
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!     let coordinator = UploadCoordinator::new(
//!         Box::new(SqlitePatientSource::new(&config.patients)),
//!         Box::new(FsInvoiceLocator::new(&config.invoices)),
//!         Arc::new(client),
//!         RateLimiter::from_config(&config.upload),
//!         shutdown_rx,
//!     );
//!
//!     let summary = coordinator.execute_upload().await?;
//!     println!("Uploaded {} of {} files", summary.files_uploaded, summary.files_found);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Fallible operations return [`domain::Result`], whose error is
//! [`domain::UploaderError`]. Failures while attaching a single file are
//! recorded in the run summary instead of being returned.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
