//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Quill using clap.

pub mod commands;
pub mod signal;

use clap::{Parser, Subcommand};

/// Quill - resumable batch enrichment of code descriptions
#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(version, about, long_about = None)]
#[command(author = "Quill Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "quill.toml", env = "QUILL_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "QUILL_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Clean the descriptions that need it and rewrite the lookup table
    Enrich(commands::enrich::EnrichArgs),

    /// Show checkpoint and lock status
    Status(commands::status::StatusArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_enrich() {
        let cli = Cli::parse_from(["quill", "enrich"]);
        assert_eq!(cli.config, "quill.toml");
        assert!(matches!(cli.command, Commands::Enrich(_)));
    }

    #[test]
    fn test_cli_parse_enrich_flags() {
        let cli = Cli::parse_from(["quill", "enrich", "--dry-run", "--batch-size", "50", "-y"]);
        match cli.command {
            Commands::Enrich(args) => {
                assert!(args.dry_run);
                assert!(args.yes);
                assert_eq!(args.batch_size, Some(50));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_with_config_and_log_level() {
        let cli = Cli::parse_from(["quill", "--config", "jobs/hcpcs.toml", "-l", "debug", "status"]);
        assert_eq!(cli.config, "jobs/hcpcs.toml");
        assert_eq!(cli.log_level, Some("debug".to_string()));
        assert!(matches!(cli.command, Commands::Status(_)));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["quill", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["quill", "init", "--force"]);
        assert!(matches!(cli.command, Commands::Init(ref args) if args.force));
    }
}
