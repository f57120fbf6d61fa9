//! Secure credential handling using the secrecy crate
//!
//! The service API key is wrapped in [`SecretString`] as soon as it is read,
//! so it is zeroed on drop and redacted from `Debug` output.

use crate::config::schema::ServiceConfig;
use crate::domain::{QuillError, Result};
use secrecy::{CloneableSecret, DebugSecret, ExposeSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::Path;
use zeroize::Zeroize;

/// Newtype wrapper for String that implements the required traits for Secret
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    /// Check if the secret value is empty or whitespace
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// A string that is zeroed on drop and never printed
pub type SecretString = Secret<SecretValue>;

/// Wrap a plain string as a secret
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

/// Resolve the service API key once at startup
///
/// Lookup order:
/// 1. `service.api_key` from the configuration
/// 2. `service.api_key_var` inside the dotenv-style `service.api_key_file`
/// 3. `service.api_key_var` in the process environment
///
/// # Errors
///
/// Returns a configuration error if the key file cannot be read or no
/// non-blank key is found.
pub fn resolve_api_key(config: &ServiceConfig) -> Result<SecretString> {
    if let Some(key) = &config.api_key {
        if !key.expose_secret().is_blank() {
            return Ok(key.clone());
        }
    }

    if let Some(path) = &config.api_key_file {
        if let Some(key) = read_key_from_env_file(path, &config.api_key_var)? {
            return Ok(key);
        }
        return Err(QuillError::Configuration(format!(
            "{} not found in {}",
            config.api_key_var,
            path.display()
        )));
    }

    match std::env::var(&config.api_key_var) {
        Ok(value) if !value.trim().is_empty() => Ok(secret_string(value)),
        _ => Err(QuillError::Configuration(format!(
            "No API key configured: set service.api_key, service.api_key_file or the {} environment variable",
            config.api_key_var
        ))),
    }
}

/// Read one variable from a dotenv-style file without touching the process environment
fn read_key_from_env_file(path: &Path, var: &str) -> Result<Option<SecretString>> {
    let iter = dotenvy::from_path_iter(path).map_err(|e| {
        QuillError::Configuration(format!("Failed to read key file {}: {e}", path.display()))
    })?;

    for entry in iter {
        let (name, value) = entry.map_err(|e| {
            QuillError::Configuration(format!("Failed to parse key file {}: {e}", path.display()))
        })?;
        if name == var && !value.trim().is_empty() {
            return Ok(Some(secret_string(value)));
        }
    }

    Ok(None)
}
