//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Quill configuration file.

use crate::config::{load_config, resolve_api_key};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Also check that the API key can be resolved
    #[arg(long)]
    pub check_credentials: bool,
}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates before returning
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Lookup Table: {}", config.source.lookup_path.display());
        println!("  Reference Table: {}", config.source.reference_path.display());
        println!(
            "  Columns: {} / {} (reference: {})",
            config.source.id_column,
            config.source.text_column,
            config.source.reference_column()
        );
        println!("  Output: {}", config.source.output().display());
        println!("  Service: {} ({})", config.service.base_url, config.service.model);
        println!(
            "  API Key: {}",
            match (&config.service.api_key, &config.service.api_key_file) {
                (Some(_), _) => "*** (inline)".to_string(),
                (None, Some(file)) => format!("{} in {}", config.service.api_key_var, file.display()),
                (None, None) => format!("${} from environment", config.service.api_key_var),
            }
        );
        println!(
            "  Batch Size: {} (pacing {} ms)",
            config.batch.batch_size, config.batch.pacing_delay_ms
        );
        println!(
            "  Retry: {} attempt(s), {}s backoff, rate-limit budget {}",
            config.retry.max_attempts,
            config.retry.backoff_seconds,
            match config.retry.max_rate_limit_wait_seconds {
                0 => "unbounded".to_string(),
                secs => format!("{secs}s"),
            }
        );
        println!(
            "  Checkpoint: {} (lock: {})",
            config.checkpoint.path.display(),
            config.checkpoint.lock
        );
        println!();

        if self.check_credentials {
            match resolve_api_key(&config.service) {
                Ok(_) => println!("✅ API key resolved"),
                Err(e) => {
                    println!("❌ API key could not be resolved");
                    println!("   Error: {e}");
                    return Ok(2);
                }
            }
            println!();
        }

        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_valid_config_exit_code() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[source]\nlookup_path = \"lookup.parquet\"\nreference_path = \"summary.parquet\""
        )
        .unwrap();

        let args = ValidateArgs {
            check_credentials: false,
        };
        let code = args.execute(file.path().to_str().unwrap()).await.unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_invalid_config_exit_code() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[source]\nlookup_path = \"lookup.parquet\"\nreference_path = \"summary.parquet\"\n\n[batch]\nbatch_size = 0"
        )
        .unwrap();

        let args = ValidateArgs {
            check_credentials: false,
        };
        assert_eq!(args.execute(file.path().to_str().unwrap()).await.unwrap(), 2);
    }
}
