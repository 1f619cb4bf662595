//! Validate config command implementation

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        match config.validate() {
            Ok(_) => {
                println!("✅ Configuration is valid");
                println!();
                println!("Configuration Summary:");
                println!("  Log Level: {}", config.application.log_level);
                println!("  Dry Run: {}", config.application.dry_run);
                println!("  Cliniko API: {}", config.cliniko.base_url());
                println!(
                    "  API Key: {}",
                    if config.cliniko.api_key.is_some() {
                        "configured"
                    } else {
                        "not set (will prompt)"
                    }
                );
                println!("  User-Agent: {}", config.cliniko.user_agent);
                println!("  Patient DB: {}", config.patients.database_path);
                println!(
                    "  Patient Table: {} (id column {}, reference column {})",
                    config.patients.table,
                    config.patients.id_column,
                    config.patients.reference_column
                );
                println!(
                    "  Invoices: {}/<reference>/*.{}",
                    config.invoices.root, config.invoices.extension
                );
                println!(
                    "  Upload Interval: {} ms",
                    config.upload.rate_limit_interval_ms
                );
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                Ok(2)
            }
        }
    }
}
