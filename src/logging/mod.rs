//! Logging
//!
//! Structured logging through `tracing`: human-readable console output and
//! optional JSON files with rotation.
//!
//! # Example
//!
//! ```no_run
//! use invoice_uploader::logging::init_logging;
//! use invoice_uploader::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(patient_id = "7", "Processing patient");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};
