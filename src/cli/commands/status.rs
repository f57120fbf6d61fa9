//! Status command implementation
//!
//! This module implements the `status` command, which reports checkpoint
//! progress and whether a run currently holds the lock.

use crate::config::load_config;
use crate::core::checkpoint::{lock_path_for, CheckpointStore, RunLock};
use crate::core::source::ItemSource;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Only inspect the checkpoint, do not read the input tables
    #[arg(long)]
    pub checkpoint_only: bool,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking enrichment status");

        println!("📊 Enrichment Status");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let store = CheckpointStore::new(&config.checkpoint.path);
        let lock_path = lock_path_for(store.path());
        match RunLock::read_holder(&lock_path) {
            Some(holder) => println!(
                "🔒 Run lock held by run {} (pid {}) since {}",
                holder.run_id,
                holder.pid,
                holder.started_at.to_rfc3339()
            ),
            None if lock_path.exists() => {
                println!("🔒 Run lock present but unreadable: {}", lock_path.display())
            }
            None => println!("🔓 No run in progress"),
        }

        if !store.exists() {
            println!("✅ No checkpoint at {} - the last run completed or none has started", store.path().display());
            println!();
            return Ok(0);
        }

        let checkpoint = match store.load() {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to read checkpoint");
                println!("   Error: {e}");
                return Ok(5);
            }
        };

        println!("📌 Checkpoint: {}", store.path().display());
        println!("   Cleaned so far: {}", checkpoint.len());

        if self.checkpoint_only {
            println!();
            return Ok(0);
        }

        let items = match ItemSource::new(config.source.clone()).load() {
            Ok(items) => items,
            Err(e) => {
                println!("❌ Failed to read input tables");
                println!("   Error: {e}");
                return Ok(5);
            }
        };

        let covered = checkpoint.covered(&items.to_clean);
        let remaining = items.to_clean.len() - covered;
        let batches = remaining.div_ceil(config.batch.batch_size.max(1));

        println!("   To clean: {}", items.to_clean.len());
        println!("   Remaining: {remaining} ({batches} batch(es) of up to {})", config.batch.batch_size);
        if covered < checkpoint.len() {
            println!(
                "   ⚠️  {} checkpoint entr(y/ies) no longer match an item to clean and will be ignored",
                checkpoint.len() - covered
            );
        }
        println!();

        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_config_exit_code() {
        let args = StatusArgs {
            checkpoint_only: true,
        };
        assert_eq!(args.execute("/nonexistent/quill.toml").await.unwrap(), 2);
    }
}
