//! Init command implementation
//!
//! Writes a sample configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "invoice-uploader.toml")]
    pub output: String,

    /// Include every option with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing invoice uploader configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Set cliniko.user_agent in {} to your name and email", self.output);
                println!("  2. Set cliniko.api_host to your Cliniko shard");
                println!("  3. Export INVOICE_UPLOADER_CLINIKO_API_KEY or put it in a .env file");
                println!("     (without it you will be prompted at upload time)");
                println!("  4. Validate configuration: invoice-uploader validate-config");
                println!("  5. Preview: invoice-uploader upload --dry-run");
                println!("  6. Run upload: invoice-uploader upload");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    fn generate_minimal_config() -> String {
        r#"# Invoice Uploader Configuration File

[cliniko]
api_host = "https://api.uk1.cliniko.com"
user_agent = "Your Name (you@example.com)"

[patients]
database_path = "db/patients.db"

[invoices]
root = "invoices"
"#
        .to_string()
    }

    fn generate_config_with_examples() -> String {
        r#"# Invoice Uploader Configuration File
#
# Environment variables can be referenced as ${VAR_NAME}. Any key can also be
# overridden with INVOICE_UPLOADER_<SECTION>_<KEY>, for example
# INVOICE_UPLOADER_CLINIKO_API_KEY.

[application]
# trace, debug, info, warn, error
log_level = "info"
# Locate invoices without uploading anything
dry_run = false

[cliniko]
# API shard of your Cliniko account (api.uk1, api.au1, ...)
api_host = "https://api.uk1.cliniko.com"
# Prefer the environment variable over storing the key here
# api_key = "${CLINIKO_API_KEY}"
# Cliniko requires a User-Agent naming the integrator
user_agent = "Your Name (you@example.com)"
timeout_seconds = 60
tls_verify = true

[patients]
# SQLite file built from a Cliniko patient export
database_path = "db/patients.db"
table = "patients"
# Zero-based column positions
id_column = 0
reference_column = 28

[invoices]
# Files are read from <root>/<reference number>/*.<extension>
root = "invoices"
extension = "pdf"

[upload]
# Pause after every file; 300 ms keeps under 200 uploads per minute
rate_limit_interval_ms = 300
content_type = "application/pdf"

[logging]
local_enabled = false
local_path = "logs"
# daily, hourly, never
local_rotation = "daily"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UploaderConfig;
    use tempfile::TempDir;

    #[test]
    fn test_generate_minimal_config_is_valid() {
        let config: UploaderConfig =
            toml::from_str(&InitArgs::generate_minimal_config()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.patients.reference_column, 28);
    }

    #[test]
    fn test_generate_config_with_examples_is_valid() {
        let content = InitArgs::generate_config_with_examples();
        assert!(content.contains("INVOICE_UPLOADER_CLINIKO_API_KEY"));

        let config: UploaderConfig = toml::from_str(&content).unwrap();
        assert!(config.validate().is_ok());
        assert!(config.cliniko.api_key.is_none());
        assert_eq!(config.upload.rate_limit_interval_ms, 300);
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("invoice-uploader.toml");
        fs::write(&output, "existing").unwrap();

        let args = InitArgs {
            output: output.display().to_string(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 2);
        assert_eq!(fs::read_to_string(&output).unwrap(), "existing");

        let args = InitArgs { force: true, ..args };
        assert_eq!(args.execute().await.unwrap(), 0);
        assert!(fs::read_to_string(&output).unwrap().contains("[cliniko]"));
    }
}
