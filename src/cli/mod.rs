//! CLI interface and argument parsing

pub mod commands;

use clap::{Parser, Subcommand};

/// Invoice Uploader - attach local invoice PDFs to Cliniko patients
#[derive(Parser, Debug)]
#[command(name = "invoice-uploader")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = "invoice-uploader.toml",
        env = "INVOICE_UPLOADER_CONFIG"
    )]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "INVOICE_UPLOADER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload invoices for every patient with a reference number
    Upload(commands::upload::UploadArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_upload() {
        let cli = Cli::parse_from(["invoice-uploader", "upload"]);
        assert_eq!(cli.config, "invoice-uploader.toml");
        assert!(matches!(cli.command, Commands::Upload(_)));
    }

    #[test]
    fn test_cli_parse_upload_flags() {
        let cli = Cli::parse_from([
            "invoice-uploader",
            "upload",
            "--yes",
            "--dry-run",
            "--patient-id",
            "7,8",
        ]);
        match cli.command {
            Commands::Upload(args) => {
                assert!(args.yes);
                assert!(args.dry_run);
                assert_eq!(args.patient_id.as_deref(), Some("7,8"));
            }
            other => panic!("Expected upload, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["invoice-uploader", "--config", "custom.toml", "upload"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["invoice-uploader", "--log-level", "debug", "upload"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["invoice-uploader", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["invoice-uploader", "init", "--force"]);
        match cli.command {
            Commands::Init(args) => {
                assert!(args.force);
                assert_eq!(args.output, "invoice-uploader.toml");
            }
            other => panic!("Expected init, got {other:?}"),
        }
    }
}
