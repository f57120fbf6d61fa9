//! Configuration schema types
//!
//! This module defines the configuration structure for Quill. Defaults match
//! the constants of the one-off cleaning job this tool replaced.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main Quill configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuillConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Input and output tables
    pub source: SourceConfig,

    /// Text transformation service
    #[serde(default)]
    pub service: ServiceConfig,

    /// Batching and pacing
    #[serde(default)]
    pub batch: BatchSettings,

    /// Retry and backoff policy
    #[serde(default)]
    pub retry: RetryConfig,

    /// Checkpoint persistence
    #[serde(default)]
    pub checkpoint: CheckpointConfig,

    /// End-of-run reporting
    #[serde(default)]
    pub report: ReportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl QuillConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.source.validate()?;
        self.service.validate()?;
        self.batch.validate()?;
        self.retry.validate()?;
        self.checkpoint.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (no service calls, no writes)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Input and output table configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Lookup table with one (identifier, description) row per code
    pub lookup_path: PathBuf,

    /// Reference table whose identifiers select the codes to clean
    pub reference_path: PathBuf,

    /// Identifier column in the lookup table (also used for the output)
    #[serde(default = "default_id_column")]
    pub id_column: String,

    /// Description column in the lookup table (also used for the output)
    #[serde(default = "default_text_column")]
    pub text_column: String,

    /// Identifier column in the reference table (defaults to `id_column`)
    #[serde(default)]
    pub reference_id_column: Option<String>,

    /// Output artifact path (defaults to `lookup_path`)
    #[serde(default)]
    pub output_path: Option<PathBuf>,
}

impl SourceConfig {
    /// Identifier column to read from the reference table
    pub fn reference_column(&self) -> &str {
        self.reference_id_column
            .as_deref()
            .unwrap_or(self.id_column.as_str())
    }

    /// Where the output artifact is written
    pub fn output(&self) -> &PathBuf {
        self.output_path.as_ref().unwrap_or(&self.lookup_path)
    }

    fn validate(&self) -> Result<(), String> {
        if self.lookup_path.as_os_str().is_empty() {
            return Err("source.lookup_path cannot be empty".to_string());
        }
        if self.reference_path.as_os_str().is_empty() {
            return Err("source.reference_path cannot be empty".to_string());
        }
        if self.id_column.trim().is_empty() || self.text_column.trim().is_empty() {
            return Err("source.id_column and source.text_column cannot be empty".to_string());
        }
        if self.id_column == self.text_column {
            return Err(format!(
                "source.id_column and source.text_column must differ, both are '{}'",
                self.id_column
            ));
        }
        if matches!(self.reference_id_column.as_deref(), Some(c) if c.trim().is_empty()) {
            return Err("source.reference_id_column cannot be empty when set".to_string());
        }
        Ok(())
    }
}

/// Text transformation service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the messages API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API version header value
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum tokens in one response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default)]
    pub temperature: f32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// API key, stored securely in memory and zeroized on drop
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// Dotenv-style secret file holding the API key
    #[serde(default)]
    pub api_key_file: Option<PathBuf>,

    /// Variable name of the key inside `api_key_file` or the environment
    #[serde(default = "default_api_key_var")]
    pub api_key_var: String,

    /// Replacement for the built-in cleaning instruction
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl ServiceConfig {
    fn validate(&self) -> Result<(), String> {
        let url = url::Url::parse(&self.base_url)
            .map_err(|e| format!("service.base_url '{}' is not a valid URL: {e}", self.base_url))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err("service.base_url must start with http:// or https://".to_string());
        }
        if self.model.trim().is_empty() {
            return Err("service.model cannot be empty".to_string());
        }
        if self.max_tokens == 0 {
            return Err("service.max_tokens must be greater than 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(format!(
                "service.temperature must be between 0.0 and 1.0, got {}",
                self.temperature
            ));
        }
        if self.timeout_seconds == 0 {
            return Err("service.timeout_seconds must be greater than 0".to_string());
        }
        if self.api_key_var.trim().is_empty() {
            return Err("service.api_key_var cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_version: default_api_version(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: 0.0,
            timeout_seconds: default_timeout_seconds(),
            api_key: None,
            api_key_file: None,
            api_key_var: default_api_key_var(),
            system_prompt: None,
        }
    }
}

/// Batching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSettings {
    /// Maximum number of items per service call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause between consecutive batches in milliseconds
    #[serde(default = "default_pacing_delay_ms")]
    pub pacing_delay_ms: u64,
}

impl BatchSettings {
    fn validate(&self) -> Result<(), String> {
        if !(1..=1000).contains(&self.batch_size) {
            return Err(format!(
                "batch.batch_size must be between 1 and 1000, got {}",
                self.batch_size
            ));
        }
        Ok(())
    }
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            pacing_delay_ms: default_pacing_delay_ms(),
        }
    }
}

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Attempts per batch for transient and malformed failures
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed delay between failed attempts in seconds
    #[serde(default = "default_backoff_seconds")]
    pub backoff_seconds: u64,

    /// Wait applied when a rate-limit response carries no retry-after
    #[serde(default = "default_rate_limit_wait_seconds")]
    pub default_rate_limit_wait_seconds: u64,

    /// Cumulative rate-limit wait allowed per batch (0 = unbounded)
    #[serde(default = "default_max_rate_limit_wait_seconds")]
    pub max_rate_limit_wait_seconds: u64,

    /// Whether unparseable responses are retried
    #[serde(default = "default_true")]
    pub retry_malformed: bool,
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 || self.max_attempts > 10 {
            return Err(format!(
                "retry.max_attempts must be between 1 and 10, got {}",
                self.max_attempts
            ));
        }
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_seconds: default_backoff_seconds(),
            default_rate_limit_wait_seconds: default_rate_limit_wait_seconds(),
            max_rate_limit_wait_seconds: default_max_rate_limit_wait_seconds(),
            retry_malformed: true,
        }
    }
}

/// Checkpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointConfig {
    /// Checkpoint file path
    #[serde(default = "default_checkpoint_path")]
    pub path: PathBuf,

    /// Guard against concurrent runs with a lock file next to the checkpoint
    #[serde(default = "default_true")]
    pub lock: bool,
}

impl CheckpointConfig {
    fn validate(&self) -> Result<(), String> {
        if self.path.as_os_str().is_empty() {
            return Err("checkpoint.path cannot be empty".to_string());
        }
        if self.path.file_name().is_none() {
            return Err(format!(
                "checkpoint.path must name a file, got '{}'",
                self.path.display()
            ));
        }
        Ok(())
    }
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            path: default_checkpoint_path(),
            lock: true,
        }
    }
}

/// End-of-run report configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Identifiers whose before/after text is logged after a successful run
    #[serde(default)]
    pub sample_ids: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write JSON logs to a rotating local file
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for local log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Rotation policy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_id_column() -> String {
    "hcpcs_code".to_string()
}

fn default_text_column() -> String {
    "description".to_string()
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_api_key_var() -> String {
    "ANTHROPIC_API_KEY".to_string()
}

fn default_batch_size() -> usize {
    100
}

fn default_pacing_delay_ms() -> u64 {
    1000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_seconds() -> u64 {
    5
}

fn default_rate_limit_wait_seconds() -> u64 {
    30
}

fn default_max_rate_limit_wait_seconds() -> u64 {
    900
}

fn default_checkpoint_path() -> PathBuf {
    PathBuf::from(".quill_checkpoint.json")
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

fn default_true() -> bool {
    true
}
