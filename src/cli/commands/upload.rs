//! Upload command implementation
//!
//! Runs the invoice upload pipeline over the configured patient store and
//! invoice tree.

use crate::adapters::cliniko::ClinikoClient;
use crate::adapters::invoices::FsInvoiceLocator;
use crate::adapters::patients::SqlitePatientSource;
use crate::config::{load_config, secret_string, SecretString, UploaderConfig};
use crate::core::upload::{RateLimiter, UploadCoordinator, UploadSummary};
use crate::domain::PatientId;
use clap::Args;
use secrecy::ExposeSecret;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tokio::sync::watch;

/// Arguments for the upload command
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Dry run mode - locate invoices without contacting Cliniko
    #[arg(long)]
    pub dry_run: bool,

    /// Restrict the run to these patient ID(s) (comma-separated)
    #[arg(long)]
    pub patient_id: Option<String>,
}

impl UploadArgs {
    /// Execute the upload command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting upload command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let patient_filter = match self.parse_patient_filter() {
            Ok(ids) => ids,
            Err(e) => {
                eprintln!("Invalid --patient-id: {e}");
                return Ok(2);
            }
        };

        let dry_run = config.application.dry_run;
        if dry_run {
            println!("🔍 DRY RUN MODE - Nothing will be uploaded");
            println!();
        }

        if !self.yes && !dry_run && !confirm(&config, patient_filter.as_deref())? {
            println!("Upload cancelled.");
            return Ok(0);
        }

        let patients = Box::new(SqlitePatientSource::new(&config.patients));
        let invoices = Box::new(FsInvoiceLocator::new(&config.invoices));

        let coordinator = if dry_run {
            UploadCoordinator::dry_run(patients, invoices, shutdown_signal)
        } else {
            let api_key = match resolve_api_key(&config)? {
                Some(key) => key,
                None => {
                    eprintln!("No Cliniko API key provided");
                    return Ok(2);
                }
            };

            let client = match ClinikoClient::new(&config.cliniko, &api_key, &config.upload) {
                Ok(c) => c,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create Cliniko client");
                    eprintln!("Failed to initialize upload: {e}");
                    return Ok(4);
                }
            };

            UploadCoordinator::new(
                patients,
                invoices,
                Arc::new(client),
                RateLimiter::from_config(&config.upload),
                shutdown_signal,
            )
        };

        let coordinator = match patient_filter {
            Some(ids) => coordinator.with_patient_filter(ids),
            None => coordinator,
        };

        println!("🚀 Starting upload...");
        println!();

        let summary = match coordinator.execute_upload().await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Upload failed");
                eprintln!("Upload failed: {e}");
                return Ok(5);
            }
        };

        print_summary(&summary);

        if summary.interrupted {
            println!("⚠️  Upload was interrupted. Re-run to attempt the remaining files.");
            return Ok(130);
        }

        Ok(0)
    }

    fn parse_patient_filter(&self) -> Result<Option<Vec<PatientId>>, String> {
        let Some(raw) = &self.patient_id else {
            return Ok(None);
        };

        let ids = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(PatientId::new)
            .collect::<Result<Vec<_>, _>>()?;

        if ids.is_empty() {
            return Err("no patient IDs given".to_string());
        }

        tracing::info!(patient_ids = ?ids, "Restricting run to patient IDs from CLI");
        Ok(Some(ids))
    }
}

fn confirm(config: &UploaderConfig, patient_filter: Option<&[PatientId]>) -> anyhow::Result<bool> {
    println!("Upload Configuration:");
    println!("  Cliniko API: {}", config.cliniko.base_url());
    println!("  Patient DB: {}", config.patients.database_path);
    println!("  Invoices: {}", config.invoices.root);
    println!(
        "  Patients: {}",
        match patient_filter {
            Some(ids) => ids
                .iter()
                .map(PatientId::as_str)
                .collect::<Vec<_>>()
                .join(", "),
            None => "All".to_string(),
        }
    );
    println!("  Interval: {} ms", config.upload.rate_limit_interval_ms);
    println!();
    print!("Proceed with upload? [y/N]: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// API key from configuration, or read from stdin when absent
fn resolve_api_key(config: &UploaderConfig) -> anyhow::Result<Option<SecretString>> {
    if let Some(key) = &config.cliniko.api_key {
        return Ok(Some(key.clone()));
    }

    print!("Cliniko API key: ");
    io::stdout().flush()?;
    read_api_key(io::stdin().lock())
}

fn read_api_key(mut input: impl BufRead) -> anyhow::Result<Option<SecretString>> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    let key = secret_string(line.trim().to_string());
    if key.expose_secret().is_blank() {
        return Ok(None);
    }
    Ok(Some(key))
}

fn print_summary(summary: &UploadSummary) {
    println!();
    println!("📊 Upload Summary:");
    println!("  Patients: {}", summary.patients_seen);
    println!("  Without Reference: {}", summary.patients_skipped);
    println!("  Without Invoices: {}", summary.patients_without_invoices);
    if summary.patients_unreadable > 0 {
        println!("  Unreadable Invoice Directories: {}", summary.patients_unreadable);
    }
    println!("  Files Found: {}", summary.files_found);
    if !summary.dry_run {
        println!("  Uploaded: {}", summary.files_uploaded);
        println!("  Failed: {}", summary.files_failed);
        println!("  Success Rate: {:.2}%", summary.success_rate());
    }
    println!(
        "  Started: {}",
        summary.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();

    if !summary.failures.is_empty() {
        println!("❌ Failed Files:");
        for failure in &summary.failures {
            println!(
                "    - {} (patient {}, {}): {}",
                failure.file, failure.patient_id, failure.kind, failure.message
            );
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(patient_id: Option<&str>) -> UploadArgs {
        UploadArgs {
            yes: true,
            dry_run: false,
            patient_id: patient_id.map(String::from),
        }
    }

    #[test]
    fn test_parse_patient_filter_none() {
        assert_eq!(args(None).parse_patient_filter().unwrap(), None);
    }

    #[test]
    fn test_parse_patient_filter_list() {
        let ids = args(Some("7, 8,,9")).parse_patient_filter().unwrap().unwrap();
        let ids: Vec<&str> = ids.iter().map(PatientId::as_str).collect();
        assert_eq!(ids, vec!["7", "8", "9"]);
    }

    #[test]
    fn test_parse_patient_filter_empty() {
        assert!(args(Some(" , ")).parse_patient_filter().is_err());
    }

    #[test]
    fn test_read_api_key() {
        let key = read_api_key(io::Cursor::new("secret-key\n")).unwrap().unwrap();
        assert_eq!(key.expose_secret().as_ref(), "secret-key");
        assert!(read_api_key(io::Cursor::new("   \n")).unwrap().is_none());
        assert!(read_api_key(io::Cursor::new("")).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_config_is_config_error() {
        let (_tx, rx) = watch::channel(false);
        let code = args(None)
            .execute("/nonexistent/invoice-uploader.toml", rx)
            .await
            .unwrap();
        assert_eq!(code, 2);
    }
}
