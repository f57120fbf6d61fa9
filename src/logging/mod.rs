//! Logging and observability
//!
//! Structured logging with `tracing`, plus a few macros that keep the field
//! names of recurring events consistent across the crate.

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the per-batch progress line
///
/// # Example
///
/// ```no_run
/// use quill::log_batch_progress;
///
/// log_batch_progress!(2, 3, 100, 200, 1.5, 40.0);
/// ```
#[macro_export]
macro_rules! log_batch_progress {
    ($batch:expr, $total:expr, $cleaned:expr, $checkpoint_size:expr, $rate:expr, $eta_secs:expr) => {
        tracing::info!(
            batch = $batch,
            total_batches = $total,
            cleaned = $cleaned,
            checkpoint_size = $checkpoint_size,
            batches_per_minute = format!("{:.1}", $rate),
            eta_secs = format!("{:.0}", $eta_secs),
            "Batch {}/{} done",
            $batch,
            $total
        );
    };
}

/// Log a failed attempt that will be retried
///
/// # Example
///
/// ```no_run
/// use quill::log_retry_attempt;
///
/// log_retry_attempt!(4, 1, 3, "Transient failure: HTTP 502");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($batch:expr, $attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            batch = $batch,
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = %$reason,
            "Attempt failed"
        );
    };
}

/// Log a rate-limit wait
///
/// # Example
///
/// ```no_run
/// use quill::log_rate_limited;
/// use std::time::Duration;
///
/// log_rate_limited!(2, Duration::from_secs(30));
/// ```
#[macro_export]
macro_rules! log_rate_limited {
    ($batch:expr, $wait:expr) => {
        tracing::warn!(
            batch = $batch,
            retry_after_secs = $wait.as_secs(),
            "Rate limited, waiting"
        );
    };
}
