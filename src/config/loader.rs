//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::UploaderConfig;
use super::secret::secret_string;
use crate::domain::errors::UploaderError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "INVOICE_UPLOADER";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into UploaderConfig
/// 4. Applies environment variable overrides (INVOICE_UPLOADER_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns a `Configuration` error if the file is missing or unreadable,
/// a referenced variable is unset, parsing fails, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use invoice_uploader::config::loader::load_config;
///
/// let config = load_config("invoice-uploader.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<UploaderConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(UploaderError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        UploaderError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: UploaderConfig = toml::from_str(&contents)
        .map_err(|e| UploaderError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        UploaderError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied verbatim.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| UploaderError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(UploaderError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn env_override(key: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}_{key}")).ok()
}

/// Applies environment variable overrides using the INVOICE_UPLOADER_* prefix
///
/// Variables follow the pattern INVOICE_UPLOADER_<SECTION>_<KEY>, for example
/// INVOICE_UPLOADER_CLINIKO_API_KEY. Unparseable numeric values are ignored.
fn apply_env_overrides(config: &mut UploaderConfig) {
    // Application overrides
    if let Some(val) = env_override("APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = env_override("APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    // Cliniko overrides
    if let Some(val) = env_override("CLINIKO_API_HOST") {
        config.cliniko.api_host = val;
    }
    if let Some(val) = env_override("CLINIKO_API_KEY") {
        config.cliniko.api_key = Some(secret_string(val));
    }
    if let Some(val) = env_override("CLINIKO_USER_AGENT") {
        config.cliniko.user_agent = val;
    }
    if let Some(val) = env_override("CLINIKO_TIMEOUT_SECONDS") {
        if let Ok(secs) = val.parse() {
            config.cliniko.timeout_seconds = secs;
        }
    }
    if let Some(val) = env_override("CLINIKO_TLS_VERIFY") {
        config.cliniko.tls_verify = val.parse().unwrap_or(true);
    }

    // Patient store overrides
    if let Some(val) = env_override("PATIENTS_DATABASE_PATH") {
        config.patients.database_path = val;
    }
    if let Some(val) = env_override("PATIENTS_TABLE") {
        config.patients.table = val;
    }
    if let Some(val) = env_override("PATIENTS_ID_COLUMN") {
        if let Ok(col) = val.parse() {
            config.patients.id_column = col;
        }
    }
    if let Some(val) = env_override("PATIENTS_REFERENCE_COLUMN") {
        if let Ok(col) = val.parse() {
            config.patients.reference_column = col;
        }
    }

    // Invoice overrides
    if let Some(val) = env_override("INVOICES_ROOT") {
        config.invoices.root = val;
    }
    if let Some(val) = env_override("INVOICES_EXTENSION") {
        config.invoices.extension = val;
    }

    // Upload overrides
    if let Some(val) = env_override("UPLOAD_RATE_LIMIT_INTERVAL_MS") {
        if let Ok(ms) = val.parse() {
            config.upload.rate_limit_interval_ms = ms;
        }
    }

    // Logging overrides
    if let Some(val) = env_override("LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Some(val) = env_override("LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}
