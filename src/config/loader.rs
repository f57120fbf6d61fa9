//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::QuillConfig;
use crate::domain::errors::QuillError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into QuillConfig
/// 4. Applies environment variable overrides (QUILL_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns a configuration error if any of these steps fails.
///
/// # Examples
///
/// ```no_run
/// use quill::config::loader::load_config;
///
/// let config = load_config("quill.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<QuillConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(QuillError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        QuillError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let mut config = parse_config(&contents)?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        QuillError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Parse configuration text after `${VAR}` substitution, without overrides or validation
pub fn parse_config(contents: &str) -> Result<QuillConfig> {
    let contents = substitute_env_vars(contents)?;
    toml::from_str(&contents)
        .map_err(|e| QuillError::Configuration(format!("Failed to parse TOML: {}", e)))
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("placeholder pattern is a valid regex")
    })
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied verbatim so documented placeholders don't have
/// to be set.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = placeholder_regex();
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |cap: &regex::Captures<'_>| {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    String::new()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(QuillError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using QUILL_* prefix
///
/// Environment variables follow the pattern: QUILL_<SECTION>_<KEY>, for
/// example QUILL_BATCH_BATCH_SIZE or QUILL_SOURCE_LOOKUP_PATH. Values that
/// fail to parse are ignored.
fn apply_env_overrides(config: &mut QuillConfig) {
    let var = |name: &str| std::env::var(name).ok();

    if let Some(val) = var("QUILL_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = var("QUILL_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    if let Some(val) = var("QUILL_SOURCE_LOOKUP_PATH") {
        config.source.lookup_path = PathBuf::from(val);
    }
    if let Some(val) = var("QUILL_SOURCE_REFERENCE_PATH") {
        config.source.reference_path = PathBuf::from(val);
    }
    if let Some(val) = var("QUILL_SOURCE_OUTPUT_PATH") {
        config.source.output_path = Some(PathBuf::from(val));
    }

    if let Some(val) = var("QUILL_SERVICE_BASE_URL") {
        config.service.base_url = val;
    }
    if let Some(val) = var("QUILL_SERVICE_MODEL") {
        config.service.model = val;
    }
    if let Some(val) = var("QUILL_SERVICE_API_KEY_FILE") {
        config.service.api_key_file = Some(PathBuf::from(val));
    }

    if let Some(Ok(size)) = var("QUILL_BATCH_BATCH_SIZE").map(|v| v.parse()) {
        config.batch.batch_size = size;
    }
    if let Some(Ok(delay)) = var("QUILL_BATCH_PACING_DELAY_MS").map(|v| v.parse()) {
        config.batch.pacing_delay_ms = delay;
    }

    if let Some(Ok(attempts)) = var("QUILL_RETRY_MAX_ATTEMPTS").map(|v| v.parse()) {
        config.retry.max_attempts = attempts;
    }
    if let Some(Ok(secs)) = var("QUILL_RETRY_BACKOFF_SECONDS").map(|v| v.parse()) {
        config.retry.backoff_seconds = secs;
    }
    if let Some(Ok(secs)) = var("QUILL_RETRY_MAX_RATE_LIMIT_WAIT_SECONDS").map(|v| v.parse()) {
        config.retry.max_rate_limit_wait_seconds = secs;
    }

    if let Some(val) = var("QUILL_CHECKPOINT_PATH") {
        config.checkpoint.path = PathBuf::from(val);
    }
    if let Some(val) = var("QUILL_CHECKPOINT_LOCK") {
        config.checkpoint.lock = val.parse().unwrap_or(true);
    }

    if let Some(val) = var("QUILL_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Some(val) = var("QUILL_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("QUILL_LOADER_TEST_VAR", "test_value");
        let input = "api_key = \"${QUILL_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "api_key = \"test_value\"\n");
        std::env::remove_var("QUILL_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("QUILL_LOADER_MISSING_VAR");
        let input = "api_key = \"${QUILL_LOADER_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("QUILL_LOADER_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_skips_comments() {
        std::env::remove_var("QUILL_LOADER_COMMENTED_VAR");
        let input = "# api_key = \"${QUILL_LOADER_COMMENTED_VAR}\"";
        assert!(substitute_env_vars(input).is_ok());
    }

    #[test]
    fn test_load_config_missing_file() {
        assert!(load_config("nonexistent-quill.toml").is_err());
    }

    #[test]
    fn test_load_config_minimal() {
        let toml_content = r#"
[source]
lookup_path = "data/hcpcs_lookup.parquet"
reference_path = "data/hcpcs_summary.parquet"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.source.id_column, "hcpcs_code");
        assert_eq!(config.batch.batch_size, 100);
        assert_eq!(config.retry.max_attempts, 3);
        assert!(config.checkpoint.lock);
    }
}
