//! Enrichment run orchestration
//!
//! - [`coordinator`] - [`EnrichmentJob`], the driver that sequences a run
//! - [`progress`] - Throughput and ETA figures for progress lines
//! - [`summary`] - [`RunSummary`] returned by every run

pub mod coordinator;
pub mod progress;
pub mod summary;

pub use coordinator::EnrichmentJob;
pub use progress::{ProgressSnapshot, ProgressTracker};
pub use summary::RunSummary;
