//! Core business logic for Quill.
//!
//! # Modules
//!
//! - [`source`] - Splits the lookup table into items to clean and items to keep
//! - [`checkpoint`] - Durable progress, run lock
//! - [`batch`] - Batching and per-batch processing
//! - [`retry`] - Retry/backoff around one service call
//! - [`merge`] - Final output assembly and atomic write
//! - [`enrich`] - The driver that runs everything in order
//!
//! # Run Workflow
//!
//! 1. **Lock**: Claim the checkpoint with a lock file
//! 2. **Load**: Read the lookup and reference tables, partition by reference membership
//! 3. **Resume**: Drop items already in the checkpoint
//! 4. **Batch**: Send the rest in fixed-size batches, persisting the checkpoint after each
//! 5. **Merge**: Combine cleaned and untouched items ordered by identifier
//! 6. **Write**: Replace the output table atomically, then delete the checkpoint
//!
//! # Example
//!
//! ```rust,no_run
//! use quill::config::load_config;
//! use quill::core::enrich::EnrichmentJob;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("quill.toml")?;
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let job = EnrichmentJob::new(config, shutdown_rx)?;
//! let summary = job.execute().await?;
//!
//! println!("Cleaned this run: {}", summary.cleaned_this_run);
//! println!("Output rows: {}", summary.output_rows);
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod checkpoint;
pub mod enrich;
pub mod merge;
pub mod retry;
pub mod source;
