// Quill - Resumable batch enrichment of code descriptions
// Copyright (c) 2025 Quill Contributors
// Licensed under the MIT License

//! # Quill - resumable batch enrichment
//!
//! Quill cleans up terse, abbreviated code descriptions (HCPCS procedure
//! codes, for example) by sending them in batches to an LLM text service,
//! and rewrites the lookup table with the cleaned text.
//!
//! ## Overview
//!
//! - **Partitions** the lookup table into codes to clean (those present in a
//!   reference table) and codes kept as-is
//! - **Batches** the codes still to clean and sends them one batch at a time
//! - **Retries** transient failures with a fixed backoff and waits out rate limits
//! - **Checkpoints** results after every batch so an interrupted run resumes
//! - **Writes** the merged, identifier-ordered table atomically
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Item source, checkpoint, batching, retry, merge, run driver
//! - [`adapters`] - Anthropic messages client, parquet tables, atomic writes
//! - [`domain`] - Identifiers, records and the error taxonomy
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quill::config::load_config;
//! use quill::core::enrich::EnrichmentJob;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("quill.toml")?;
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//!     let job = EnrichmentJob::new(config, shutdown_rx)?;
//!     let summary = job.execute().await?;
//!
//!     println!("Wrote {} rows", summary.output_rows);
//!     Ok(())
//! }
//! ```
//!
//! ## Plugging in another service
//!
//! The driver only sees the [`adapters::TransformService`] trait, so any
//! implementation can stand in for the HTTP client:
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use quill::adapters::{ResultMapping, TransformService};
//! use quill::domain::{Item, TransformError};
//!
//! struct Uppercase;
//!
//! #[async_trait]
//! impl TransformService for Uppercase {
//!     async fn transform(&self, items: &[Item]) -> Result<ResultMapping, TransformError> {
//!         Ok(items
//!             .iter()
//!             .map(|item| (item.id.clone(), item.original_text.to_uppercase()))
//!             .collect())
//!     }
//!
//!     fn describe(&self) -> String {
//!         "uppercase".to_string()
//!     }
//! }
//! ```
//!
//! ## Error Handling
//!
//! All library errors are [`domain::QuillError`]. A batch that runs out of
//! retries surfaces as [`domain::QuillError::BatchFailed`] with the batch
//! index and the last [`domain::TransformError`]; everything checkpointed
//! before it is kept.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
