//! Run summary and reporting

use std::path::PathBuf;
use std::time::Duration;

/// Outcome of one enrichment run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Items that need cleaning
    pub to_clean: usize,

    /// Items passed through unchanged
    pub keep_as_is: usize,

    /// Lookup rows without a usable identifier or text, written back as read
    pub pass_through: usize,

    /// To-clean items already covered by the checkpoint at start
    pub already_checkpointed: usize,

    /// Items sent to the service during this run
    pub dispatched_items: usize,

    pub batches_total: usize,
    pub batches_completed: usize,

    /// Identifiers added to the checkpoint during this run
    pub cleaned_this_run: usize,

    /// Checkpoint entries when the run ended
    pub checkpoint_size: usize,

    /// Times the checkpoint file was written during this run
    pub checkpoint_saves: usize,

    /// Rows in the written output, 0 when nothing was written
    pub output_rows: usize,

    pub output_path: PathBuf,

    /// SHA-256 of the written output
    pub output_sha256: Option<String>,

    pub duration: Duration,
    pub dry_run: bool,

    /// Stopped by a shutdown signal before all batches ran
    pub interrupted: bool,
}

impl RunSummary {
    pub fn new(output_path: PathBuf, dry_run: bool) -> Self {
        Self {
            output_path,
            dry_run,
            ..Self::default()
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Items still to dispatch when the run started
    pub fn remaining_at_start(&self) -> usize {
        self.to_clean.saturating_sub(self.already_checkpointed)
    }

    /// Whether the output was written
    pub fn is_complete(&self) -> bool {
        self.output_sha256.is_some()
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            to_clean = self.to_clean,
            keep_as_is = self.keep_as_is,
            pass_through = self.pass_through,
            already_checkpointed = self.already_checkpointed,
            dispatched = self.dispatched_items,
            batches = format!("{}/{}", self.batches_completed, self.batches_total),
            cleaned_this_run = self.cleaned_this_run,
            checkpoint_size = self.checkpoint_size,
            checkpoint_saves = self.checkpoint_saves,
            output_rows = self.output_rows,
            duration_secs = self.duration.as_secs(),
            dry_run = self.dry_run,
            interrupted = self.interrupted,
            "Enrichment finished"
        );

        if let Some(sha) = &self.output_sha256 {
            tracing::info!(path = %self.output_path.display(), sha256 = %sha, "Output written");
        }
    }
}
