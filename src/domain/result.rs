//! Result type alias for Quill

use super::errors::QuillError;

/// Result type alias for Quill operations
///
/// # Examples
///
/// ```
/// use quill::domain::result::Result;
/// use quill::domain::errors::QuillError;
///
/// fn failing_function() -> Result<()> {
///     Err(QuillError::Source("missing column".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, QuillError>;
