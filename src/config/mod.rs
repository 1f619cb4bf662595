//! Configuration management for the uploader.
//!
//! TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! Configuration files support:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `INVOICE_UPLOADER_<SECTION>_<KEY>` environment overrides
//! - Default values for everything except `cliniko.user_agent`
//! - Validation on load
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level and dry-run flag
//! - [`ClinikoConfig`] - API host, key, User-Agent, timeouts
//! - [`PatientStoreConfig`] - SQLite path, table and column positions
//! - [`InvoiceConfig`] - Invoice root directory and extension
//! - [`UploadConfig`] - Rate limit interval and file content type
//! - [`LoggingConfig`] - Optional JSON file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [cliniko]
//! api_host = "https://api.uk1.cliniko.com"
//! api_key = "${CLINIKO_API_KEY}"
//! user_agent = "Jane Smith (jane@example.com)"
//!
//! [patients]
//! database_path = "db/patients.db"
//! reference_column = 28
//!
//! [invoices]
//! root = "invoices"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, ClinikoConfig, InvoiceConfig, LoggingConfig, PatientStoreConfig,
    UploadConfig, UploaderConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
