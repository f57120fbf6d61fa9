//! Domain models and types for Quill.
//!
//! The domain layer provides:
//! - **Identifiers** ([`CodeId`]) with byte-wise ordering
//! - **Records** ([`Item`], [`OutputRecord`], [`TableRow`])
//! - **Error types** ([`QuillError`], [`TransformError`])
//! - **Result type alias** ([`Result`])

pub mod context;
pub mod errors;
pub mod ids;
pub mod item;
pub mod result;

pub use errors::{QuillError, TransformError};
pub use ids::CodeId;
pub use item::{Item, OutputRecord, TableRow};
pub use result::Result;
