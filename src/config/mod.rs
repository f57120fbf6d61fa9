//! Configuration management for Quill.
//!
//! Quill reads a TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `QUILL_<SECTION>_<KEY>` overrides
//! - Defaults for everything except the input tables
//! - Validation on load
//!
//! # Example Configuration
//!
//! ```toml
//! [source]
//! lookup_path = "web/public/data/hcpcs_lookup.parquet"
//! reference_path = "web/public/data/hcpcs_summary.parquet"
//!
//! [service]
//! api_key_file = "web/.env.local"
//!
//! [batch]
//! batch_size = 100
//!
//! [checkpoint]
//! path = "scripts/.hcpcs_clean_checkpoint.json"
//! ```
//!
//! # Sections
//!
//! - [`ApplicationConfig`] - Log level and dry-run
//! - [`SourceConfig`] - Input tables, column names, output path
//! - [`ServiceConfig`] - Text transformation service and credentials
//! - [`BatchSettings`] - Batch size and pacing
//! - [`RetryConfig`] - Attempt bound, backoff, rate-limit budget
//! - [`CheckpointConfig`] - Checkpoint file and run lock
//! - [`ReportConfig`] - Sample identifiers to report
//! - [`LoggingConfig`] - Local file logging

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, BatchSettings, CheckpointConfig, LoggingConfig, QuillConfig, ReportConfig,
    RetryConfig, ServiceConfig, SourceConfig,
};
pub use secret::{resolve_api_key, secret_string, SecretString, SecretValue};
