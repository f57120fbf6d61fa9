//! Domain error types
//!
//! This module defines the error hierarchy for Quill. All errors are
//! domain-specific and don't expose third-party types.

use std::time::Duration;
use thiserror::Error;

/// Main Quill error type
///
/// This is the primary error type used throughout the application.
#[derive(Debug, Error)]
pub enum QuillError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Input table errors (missing columns, duplicate identifiers, unreadable files)
    #[error("Source error: {0}")]
    Source(String),

    /// Checkpoint persistence errors
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    /// Output artifact errors
    #[error("Output error: {0}")]
    Output(String),

    /// Another run holds the run lock
    #[error("Run lock error: {0}")]
    Lock(String),

    /// A single transform call failed
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// A batch exhausted its retry budget. Fatal for the whole run.
    #[error("Batch {batch} failed after {attempts} attempt(s): {cause}")]
    BatchFailed {
        batch: usize,
        attempts: u32,
        #[source]
        cause: TransformError,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl QuillError {
    /// Whether this error aborted the run after checkpointed progress was kept
    pub fn is_batch_failure(&self) -> bool {
        matches!(self, QuillError::BatchFailed { .. })
    }
}

/// Failure of one call to the text transformation service
///
/// The three classes are handled differently by the retry controller:
/// rate limits are waited out without consuming an attempt, the other two
/// consume one attempt each.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// The service throttled the request and asked for a cool-down
    #[error("Rate limit exceeded, retry after {}s", retry_after.as_secs())]
    RateLimited { retry_after: Duration },

    /// Network, timeout or server-side failure
    #[error("Transient failure: {0}")]
    Transient(String),

    /// Response could not be parsed into an identifier mapping
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl TransformError {
    /// Build a rate-limit error from a wait in whole seconds
    pub fn rate_limited(seconds: u64) -> Self {
        TransformError::RateLimited {
            retry_after: Duration::from_secs(seconds),
        }
    }

    /// Whether another attempt may succeed
    ///
    /// Malformed responses are retriable only when the policy allows it.
    pub fn is_retriable(&self, retry_malformed: bool) -> bool {
        match self {
            TransformError::RateLimited { .. } | TransformError::Transient(_) => true,
            TransformError::Malformed(_) => retry_malformed,
        }
    }

    /// Short label used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            TransformError::RateLimited { .. } => "rate_limited",
            TransformError::Transient(_) => "transient",
            TransformError::Malformed(_) => "malformed",
        }
    }
}

impl From<std::io::Error> for QuillError {
    fn from(err: std::io::Error) -> Self {
        QuillError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for QuillError {
    fn from(err: serde_json::Error) -> Self {
        QuillError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for QuillError {
    fn from(err: toml::de::Error) -> Self {
        QuillError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<parquet::errors::ParquetError> for QuillError {
    fn from(err: parquet::errors::ParquetError) -> Self {
        QuillError::Serialization(format!("Parquet error: {err}"))
    }
}

impl From<arrow::error::ArrowError> for QuillError {
    fn from(err: arrow::error::ArrowError) -> Self {
        QuillError::Serialization(format!("Arrow error: {err}"))
    }
}
