//! Enrichment driver
//!
//! Sequences one run: lock → load items → load checkpoint → batch loop →
//! merge → atomic output write → clear checkpoint. It is the only place that
//! holds mutable run state.

use crate::adapters::anthropic::AnthropicClient;
use crate::adapters::TransformService;
use crate::config::{resolve_api_key, QuillConfig};
use crate::core::batch::{partition, BatchProcessor};
use crate::core::checkpoint::{lock_path_for, CheckpointStore, RunLock};
use crate::core::enrich::progress::ProgressTracker;
use crate::core::enrich::summary::RunSummary;
use crate::core::merge::{assemble_rows, merge_output, write_output};
use crate::core::retry::RetryPolicy;
use crate::core::source::{ItemSource, PartitionedItems};
use crate::domain::{CodeId, OutputRecord, QuillError, Result};
use crate::log_batch_progress;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// One enrichment run and everything it needs
pub struct EnrichmentJob {
    config: QuillConfig,
    service: Option<Arc<dyn TransformService>>,
    shutdown_signal: watch::Receiver<bool>,
}

impl EnrichmentJob {
    /// Create a job backed by the Anthropic client
    ///
    /// The API key is resolved here, once. Dry runs make no service calls
    /// and skip credential resolution.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no API key can be found or the HTTP
    /// client cannot be built.
    pub fn new(config: QuillConfig, shutdown_signal: watch::Receiver<bool>) -> Result<Self> {
        if config.application.dry_run {
            return Ok(Self {
                config,
                service: None,
                shutdown_signal,
            });
        }

        let api_key = resolve_api_key(&config.service)?;
        let client = AnthropicClient::new(config.service.clone(), api_key)?.with_default_rate_limit_wait(
            Duration::from_secs(config.retry.default_rate_limit_wait_seconds),
        );
        tracing::info!(service = %client.describe(), "Transform service ready");

        Ok(Self::with_service(config, Arc::new(client), shutdown_signal))
    }

    /// Create a job around any transform service
    pub fn with_service(
        config: QuillConfig,
        service: Arc<dyn TransformService>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> Self {
        Self {
            config,
            service: Some(service),
            shutdown_signal,
        }
    }

    /// Run the job
    ///
    /// Returns a summary on success, on dry runs and on graceful
    /// interruption. A batch that exhausts its retries aborts the run with
    /// [`QuillError::BatchFailed`]; the checkpoint keeps every batch that
    /// completed before it and no output is written.
    pub async fn execute(&self) -> Result<RunSummary> {
        let started = Instant::now();
        let dry_run = self.config.application.dry_run;
        let mut summary = RunSummary::new(self.config.source.output().clone(), dry_run);

        let store = CheckpointStore::new(&self.config.checkpoint.path);
        let _lock = if self.config.checkpoint.lock && !dry_run {
            Some(RunLock::acquire(lock_path_for(store.path()))?)
        } else {
            None
        };

        let items = ItemSource::new(self.config.source.clone()).load()?;
        let mut checkpoint = store.load()?;

        let remaining = checkpoint.remaining(&items.to_clean);
        let batches = partition(&remaining, self.config.batch.batch_size);

        summary.to_clean = items.to_clean.len();
        summary.keep_as_is = items.keep_as_is.len();
        summary.pass_through = items.pass_through.len();
        summary.already_checkpointed = items.to_clean.len() - remaining.len();
        summary.batches_total = batches.len();
        summary.checkpoint_size = checkpoint.len();

        tracing::info!(
            to_clean = summary.to_clean,
            already_checkpointed = summary.already_checkpointed,
            remaining = remaining.len(),
            batches = batches.len(),
            batch_size = self.config.batch.batch_size,
            "Planned run"
        );

        if dry_run {
            tracing::info!("Dry run: no service calls and no writes");
            summary = summary.with_duration(started.elapsed());
            summary.log_summary();
            return Ok(summary);
        }

        let service = self.service.clone().ok_or_else(|| {
            QuillError::Configuration("No transform service configured".to_string())
        })?;
        let processor = BatchProcessor::new(
            service,
            RetryPolicy::from_config(&self.config.retry),
            store.clone(),
        );
        let pacing = Duration::from_millis(self.config.batch.pacing_delay_ms);
        let mut progress = ProgressTracker::new(batches.len());

        for (position, batch) in batches.iter().enumerate() {
            if *self.shutdown_signal.borrow() {
                tracing::warn!(
                    completed = summary.batches_completed,
                    total = summary.batches_total,
                    "Shutdown requested, stopping before next batch"
                );
                summary.interrupted = true;
                summary.checkpoint_size = checkpoint.len();
                summary.checkpoint_saves = store.save_count();
                summary = summary.with_duration(started.elapsed());
                summary.log_summary();
                return Ok(summary);
            }

            let result = match processor.process(batch, &mut checkpoint).await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!(
                        batch = batch.index,
                        checkpoint_size = checkpoint.len(),
                        error = %e,
                        "Run aborted, completed batches remain checkpointed"
                    );
                    return Err(e);
                }
            };

            summary.batches_completed += 1;
            summary.dispatched_items += result.dispatched;
            summary.cleaned_this_run += result.newly_checkpointed;

            let snapshot = progress.record_batch();
            log_batch_progress!(
                batch.index,
                batches.len(),
                summary.cleaned_this_run,
                checkpoint.len(),
                snapshot.batches_per_minute,
                snapshot.eta.as_secs_f64()
            );

            if position + 1 < batches.len() && !pacing.is_zero() {
                tokio::time::sleep(pacing).await;
            }
        }

        let records = merge_output(&checkpoint, &items.to_clean, &items.keep_as_is);
        let rows = assemble_rows(&records, &items.pass_through);
        let artifact = write_output(&self.config.source, &rows)?;
        store.clear()?;

        summary.checkpoint_size = checkpoint.len();
        summary.checkpoint_saves = store.save_count();
        summary.output_rows = artifact.rows;
        summary.output_path = artifact.path;
        summary.output_sha256 = Some(artifact.sha256);

        self.log_samples(&items, &records);

        summary = summary.with_duration(started.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    /// Log before/after text for the configured sample identifiers
    fn log_samples(&self, items: &PartitionedItems, records: &[OutputRecord]) {
        for raw in &self.config.report.sample_ids {
            let Ok(id) = CodeId::new(raw.as_str()) else {
                continue;
            };
            let original = items
                .to_clean
                .iter()
                .chain(items.keep_as_is.iter())
                .find(|item| item.id == id);
            let output = records
                .binary_search_by(|record| record.id.cmp(&id))
                .ok()
                .map(|i| records[i].description.as_str());

            match (original, output) {
                (Some(item), Some(cleaned)) => tracing::info!(
                    id = %id,
                    original = %item.original_text,
                    cleaned = %cleaned,
                    "Sample"
                ),
                _ => tracing::info!(id = %id, "Sample identifier not found"),
            }
        }
    }
}
