//! Error context extension trait
//!
//! Provides `.context()` and `.with_context()` for `Result<T, E>` where `E`
//! converts into [`QuillError`]. Unlike `anyhow::Context` the error category
//! is kept: a `Source` error stays a `Source` error with the context prefixed
//! to its message.
//!
//! ```rust
//! use quill::domain::Result;
//! use quill::domain::context::ResultExt;
//!
//! fn read_prompt(path: &str) -> Result<String> {
//!     std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))
//! }
//! ```

use crate::domain::errors::QuillError;
use crate::domain::result::Result;

/// Extension trait for adding context to `Result` types
pub trait ResultExt<T> {
    /// Add context to an error (evaluated eagerly)
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display;

    /// Add context to an error, computing it only on failure
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<QuillError>,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display,
    {
        self.map_err(|e| prefix(e.into(), context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| prefix(e.into(), f().to_string()))
    }
}

/// Prefix the message of a string-carrying variant.
///
/// `Transform` and `BatchFailed` carry structured causes that callers match
/// on, so they pass through untouched.
fn prefix(err: QuillError, ctx: String) -> QuillError {
    match err {
        QuillError::Configuration(m) => QuillError::Configuration(format!("{ctx}: {m}")),
        QuillError::Source(m) => QuillError::Source(format!("{ctx}: {m}")),
        QuillError::Checkpoint(m) => QuillError::Checkpoint(format!("{ctx}: {m}")),
        QuillError::Output(m) => QuillError::Output(format!("{ctx}: {m}")),
        QuillError::Lock(m) => QuillError::Lock(format!("{ctx}: {m}")),
        QuillError::Serialization(m) => QuillError::Serialization(format!("{ctx}: {m}")),
        QuillError::Io(m) => QuillError::Io(format!("{ctx}: {m}")),
        QuillError::Other(m) => QuillError::Other(format!("{ctx}: {m}")),
        structured @ (QuillError::Transform(_) | QuillError::BatchFailed { .. }) => structured,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::TransformError;
    use std::cell::Cell;

    #[test]
    fn test_context_keeps_category() {
        let result: Result<()> = Err(QuillError::Source("column 'code' not found".to_string()));
        let err = result.context("Failed to load lookup table").unwrap_err();

        assert!(matches!(err, QuillError::Source(_)));
        assert_eq!(
            err.to_string(),
            "Source error: Failed to load lookup table: column 'code' not found"
        );
    }

    #[test]
    fn test_with_context_is_lazy() {
        let called = Cell::new(false);
        let result: Result<i32> = Ok(42);
        let value = result
            .with_context(|| {
                called.set(true);
                "never"
            })
            .unwrap();

        assert_eq!(value, 42);
        assert!(!called.get());
    }

    #[test]
    fn test_io_error_with_context() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let result: std::result::Result<(), _> = Err(io_error);
        let err = result.context("Failed to read checkpoint").unwrap_err();

        assert!(matches!(err, QuillError::Io(_)));
        assert!(err.to_string().contains("Failed to read checkpoint: File not found"));
    }

    #[test]
    fn test_batch_failure_passes_through() {
        let result: Result<()> = Err(QuillError::BatchFailed {
            batch: 2,
            attempts: 3,
            cause: TransformError::Transient("timeout".to_string()),
        });
        let err = result.context("Run aborted").unwrap_err();
        assert!(err.is_batch_failure());
    }
}
