//! Configuration schema types
//!
//! This module defines the configuration structure that maps to the TOML file.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};

/// Cliniko allows 200 attachment uploads per minute, so files must be spaced
/// at least this far apart.
pub const MIN_RATE_LIMIT_INTERVAL_MS: u64 = 300;

/// Main uploader configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploaderConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Cliniko API settings
    pub cliniko: ClinikoConfig,

    /// Patient lookup store settings
    #[serde(default)]
    pub patients: PatientStoreConfig,

    /// Local invoice tree settings
    #[serde(default)]
    pub invoices: InvoiceConfig,

    /// Upload pacing settings
    #[serde(default)]
    pub upload: UploadConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl UploaderConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.cliniko.validate()?;
        self.patients.validate()?;
        self.invoices.validate()?;
        self.upload.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (locate invoices without calling Cliniko)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Cliniko API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinikoConfig {
    /// API host for the account's shard, e.g. `https://api.uk1.cliniko.com`
    #[serde(default = "default_api_host")]
    pub api_host: String,

    /// API key; when absent the CLI prompts for it
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// User-Agent identifying the integrator, as Cliniko requires
    /// (e.g. "Jane Smith (jane@example.com)")
    #[serde(default)]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// TLS certificate verification enabled
    #[serde(default = "default_true")]
    pub tls_verify: bool,
}

impl ClinikoConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.api_host.is_empty() {
            return Err("cliniko.api_host cannot be empty".to_string());
        }

        if !self.api_host.starts_with("http://") && !self.api_host.starts_with("https://") {
            return Err("cliniko.api_host must start with http:// or https://".to_string());
        }

        if url::Url::parse(&self.api_host).is_err() {
            return Err(format!(
                "cliniko.api_host is not a valid URL: {}",
                self.api_host
            ));
        }

        if self.user_agent.trim().is_empty() {
            return Err(
                "cliniko.user_agent cannot be empty. Cliniko requires a User-Agent \
                 naming the integrator, e.g. \"Jane Smith (jane@example.com)\""
                    .to_string(),
            );
        }

        if let Some(ref key) = self.api_key {
            if key.expose_secret().is_blank() {
                return Err("cliniko.api_key cannot be blank when set".to_string());
            }
        }

        if self.timeout_seconds == 0 {
            return Err("cliniko.timeout_seconds must be > 0".to_string());
        }

        Ok(())
    }

    /// API host without a trailing slash, ready for path concatenation
    pub fn base_url(&self) -> &str {
        self.api_host.trim_end_matches('/')
    }
}

impl Default for ClinikoConfig {
    fn default() -> Self {
        Self {
            api_host: default_api_host(),
            api_key: None,
            user_agent: String::new(),
            timeout_seconds: default_timeout_seconds(),
            tls_verify: true,
        }
    }
}

/// SQLite patient lookup configuration
///
/// The database is produced by importing a Cliniko patient CSV export into
/// an empty SQLite file, so columns are addressed by position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientStoreConfig {
    /// Path to the SQLite database
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Table holding the imported export
    #[serde(default = "default_table")]
    pub table: String,

    /// Zero-based position of the patient ID column
    #[serde(default)]
    pub id_column: usize,

    /// Zero-based position of the reference number column
    #[serde(default = "default_reference_column")]
    pub reference_column: usize,
}

impl PatientStoreConfig {
    fn validate(&self) -> Result<(), String> {
        if self.database_path.is_empty() {
            return Err("patients.database_path cannot be empty".to_string());
        }

        if self.table.is_empty()
            || !self
                .table
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(format!(
                "patients.table must be a plain identifier (letters, digits, underscore), got '{}'",
                self.table
            ));
        }

        if self.id_column == self.reference_column {
            return Err(format!(
                "patients.id_column and patients.reference_column must differ, both are {}",
                self.id_column
            ));
        }

        Ok(())
    }
}

impl Default for PatientStoreConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            table: default_table(),
            id_column: 0,
            reference_column: default_reference_column(),
        }
    }
}

/// Local invoice tree configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceConfig {
    /// Root directory containing one sub-directory per reference number
    #[serde(default = "default_invoice_root")]
    pub root: String,

    /// File extension to upload, without the dot (matched case-sensitively)
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl InvoiceConfig {
    fn validate(&self) -> Result<(), String> {
        if self.root.is_empty() {
            return Err("invoices.root cannot be empty".to_string());
        }

        if self.extension.is_empty() || self.extension.contains('.') {
            return Err(format!(
                "invoices.extension must be a bare extension such as \"pdf\", got '{}'",
                self.extension
            ));
        }

        Ok(())
    }
}

impl Default for InvoiceConfig {
    fn default() -> Self {
        Self {
            root: default_invoice_root(),
            extension: default_extension(),
        }
    }
}

/// Upload configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Pause after each file, in milliseconds
    #[serde(default = "default_rate_limit_interval_ms")]
    pub rate_limit_interval_ms: u64,

    /// Content type declared for the uploaded file part
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

impl UploadConfig {
    fn validate(&self) -> Result<(), String> {
        if self.rate_limit_interval_ms < MIN_RATE_LIMIT_INTERVAL_MS {
            return Err(format!(
                "upload.rate_limit_interval_ms must be >= {} to stay under 200 uploads/minute, got {}",
                MIN_RATE_LIMIT_INTERVAL_MS, self.rate_limit_interval_ms
            ));
        }

        if !self.content_type.contains('/') {
            return Err(format!(
                "upload.content_type must be a MIME type, got '{}'",
                self.content_type
            ));
        }

        Ok(())
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            rate_limit_interval_ms: default_rate_limit_interval_ms(),
            content_type: default_content_type(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_api_host() -> String {
    "https://api.uk1.cliniko.com".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_database_path() -> String {
    "db/patients.db".to_string()
}

fn default_table() -> String {
    "patients".to_string()
}

fn default_reference_column() -> usize {
    28
}

fn default_invoice_root() -> String {
    "invoices".to_string()
}

fn default_extension() -> String {
    "pdf".to_string()
}

fn default_rate_limit_interval_ms() -> u64 {
    MIN_RATE_LIMIT_INTERVAL_MS
}

fn default_content_type() -> String {
    "application/pdf".to_string()
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
