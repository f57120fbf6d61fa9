//! Enrich command implementation
//!
//! This module implements the `enrich` command, which runs the enrichment
//! job to completion or until interrupted.

use crate::config::load_config;
use crate::core::enrich::EnrichmentJob;
use crate::domain::QuillError;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the enrich command
#[derive(Args, Debug)]
pub struct EnrichArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Report what would be sent without calling the service or writing files
    #[arg(long)]
    pub dry_run: bool,

    /// Override the batch size
    #[arg(long)]
    pub batch_size: Option<usize>,
}

impl EnrichArgs {
    /// Execute the enrich command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting enrich command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        if let Some(batch_size) = self.batch_size {
            tracing::info!(batch_size = batch_size, "Overriding batch size from CLI");
            config.batch.batch_size = batch_size;
        }

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let dry_run = config.application.dry_run;
        if dry_run {
            println!("🔍 DRY RUN MODE - No service calls, nothing will be written");
            println!();
        }

        if !self.yes && !dry_run {
            println!("Enrichment Configuration:");
            println!("  Lookup table: {}", config.source.lookup_path.display());
            println!("  Reference table: {}", config.source.reference_path.display());
            println!("  Output: {}", config.source.output().display());
            println!("  Model: {}", config.service.model);
            println!("  Batch size: {}", config.batch.batch_size);
            println!("  Checkpoint: {}", config.checkpoint.path.display());
            println!();
            print!("Proceed with enrichment? [y/N]: ");
            use std::io::{self, Write};
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Enrichment cancelled.");
                return Ok(0);
            }
        }

        let job = match EnrichmentJob::new(config, shutdown_signal) {
            Ok(job) => job,
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize enrichment job");
                eprintln!("Failed to initialize enrichment: {e}");
                return Ok(match e {
                    QuillError::Configuration(_) => 2,
                    _ => 4,
                });
            }
        };

        println!("🚀 Starting enrichment...");
        println!();

        let summary = match job.execute().await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Enrichment failed");
                eprintln!("Enrichment failed: {e}");
                return Ok(match e {
                    QuillError::Lock(_) => 3,
                    QuillError::Configuration(_) => 2,
                    _ => {
                        if e.is_batch_failure() {
                            println!("   Completed batches are checkpointed. Run the same command to resume.");
                        }
                        5
                    }
                });
            }
        };

        println!();
        println!("📊 Enrichment Summary:");
        println!("  To clean: {}", summary.to_clean);
        println!("  Kept as-is: {}", summary.keep_as_is);
        if summary.pass_through > 0 {
            println!("  Passed through (no code or text): {}", summary.pass_through);
        }
        println!("  Already checkpointed: {}", summary.already_checkpointed);
        println!(
            "  Batches: {}/{}",
            summary.batches_completed, summary.batches_total
        );
        println!("  Items sent: {}", summary.dispatched_items);
        println!("  Cleaned this run: {}", summary.cleaned_this_run);
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        if let Some(sha) = &summary.output_sha256 {
            println!("  Output: {} ({} rows)", summary.output_path.display(), summary.output_rows);
            println!("  SHA-256: {sha}");
        }
        println!();

        let exit_code = if summary.interrupted {
            println!("⚠️  Enrichment interrupted gracefully. Progress saved.");
            println!("   Run the same command to resume from checkpoint.");
            println!();
            tracing::info!("Enrichment interrupted by user signal");
            130
        } else if summary.dry_run {
            println!(
                "✅ Dry run complete: {} item(s) in {} batch(es) would be sent",
                summary.remaining_at_start(),
                summary.batches_total
            );
            0
        } else {
            println!("✅ Enrichment completed successfully!");
            0
        };

        Ok(exit_code)
    }
}
