//! External system integrations for Quill.
//!
//! - [`service`] - The [`TransformService`] seam the core talks to
//! - [`anthropic`] - HTTP implementation against the Anthropic messages API
//! - [`parquet`] - Columnar input tables and the output artifact
//! - [`atomic`] - Temp-file-and-rename writes shared by checkpoint and output
//!
//! The core never touches reqwest or arrow types directly, so tests drive it
//! with scripted [`TransformService`] implementations.

pub mod anthropic;
pub mod atomic;
pub mod parquet;
pub mod service;

pub use service::{ResultMapping, TransformService};
