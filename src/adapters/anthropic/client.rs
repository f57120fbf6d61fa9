//! HTTP client for the Anthropic messages API
//!
//! One [`AnthropicClient::transform`] call is one `POST /v1/messages`. The
//! HTTP outcome is classified into [`TransformError`]:
//!
//! | Outcome                         | Error                       |
//! |---------------------------------|-----------------------------|
//! | 429                             | `RateLimited(retry-after)`  |
//! | connect/timeout/body read error | `Transient`                 |
//! | any other non-2xx               | `Transient`                 |
//! | 2xx with unusable body          | `Malformed`                 |

use super::models::{MessagesRequest, MessagesResponse, DEFAULT_SYSTEM_PROMPT};
use super::response::parse_result_mapping;
use crate::adapters::service::{ResultMapping, TransformService};
use crate::config::{SecretString, ServiceConfig};
use crate::domain::{Item, QuillError, Result, TransformError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, ClientBuilder, StatusCode};
use secrecy::ExposeSecret;
use std::time::Duration;

/// Wait used when a 429 carries no usable `retry-after` header
pub const DEFAULT_RATE_LIMIT_WAIT: Duration = Duration::from_secs(30);

/// Longest slice of an error body kept in error messages
const MAX_ERROR_BODY: usize = 300;

/// Anthropic messages API client
pub struct AnthropicClient {
    client: Client,
    endpoint: String,
    api_key: SecretString,
    config: ServiceConfig,
    system_prompt: String,
    default_rate_limit_wait: Duration,
}

impl AnthropicClient {
    /// Create a new client
    ///
    /// The API key is resolved by the caller once at startup and held for
    /// the lifetime of the run.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use quill::adapters::anthropic::AnthropicClient;
    /// use quill::config::{secret_string, ServiceConfig};
    ///
    /// # fn example() -> quill::domain::Result<()> {
    /// let client = AnthropicClient::new(ServiceConfig::default(), secret_string("sk-...".into()))?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: ServiceConfig, api_key: SecretString) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| QuillError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        let endpoint = format!("{}/v1/messages", config.base_url.trim_end_matches('/'));
        let system_prompt = config
            .system_prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

        Ok(Self {
            client,
            endpoint,
            api_key,
            config,
            system_prompt,
            default_rate_limit_wait: DEFAULT_RATE_LIMIT_WAIT,
        })
    }

    /// Override the wait used for 429 responses without `retry-after`
    pub fn with_default_rate_limit_wait(mut self, wait: Duration) -> Self {
        self.default_rate_limit_wait = wait;
        self
    }

    /// Full URL requests are sent to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(&self, items: &[Item]) -> std::result::Result<ResultMapping, TransformError> {
        let request = MessagesRequest::for_batch(&self.config, &self.system_prompt, items);

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", self.api_key.expose_secret().as_ref())
            .header("anthropic-version", &self.config.api_version)
            .json(&request)
            .send()
            .await
            .map_err(|e| TransformError::Transient(describe_request_error(&e)))?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let wait = retry_after(response.headers()).unwrap_or(self.default_rate_limit_wait);
            return Err(TransformError::RateLimited { retry_after: wait });
        }

        let body = response
            .text()
            .await
            .map_err(|e| TransformError::Transient(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(TransformError::Transient(format!(
                "HTTP {}: {}",
                status.as_u16(),
                truncate(&body, MAX_ERROR_BODY)
            )));
        }

        let parsed: MessagesResponse = serde_json::from_str(&body)
            .map_err(|e| TransformError::Malformed(format!("invalid response envelope: {e}")))?;

        if parsed.stop_reason.as_deref() == Some("max_tokens") {
            tracing::warn!(
                items = items.len(),
                max_tokens = self.config.max_tokens,
                "Response hit max_tokens and is likely truncated"
            );
        }

        let text = parsed.first_text().ok_or_else(|| {
            TransformError::Malformed("response contained no text content".to_string())
        })?;

        parse_result_mapping(text)
    }
}

#[async_trait]
impl TransformService for AnthropicClient {
    async fn transform(&self, items: &[Item]) -> std::result::Result<ResultMapping, TransformError> {
        tracing::debug!(endpoint = %self.endpoint, items = items.len(), "Sending batch");
        self.send(items).await
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.endpoint, self.config.model)
    }
}

/// Parse `retry-after` as a number of seconds, rounding fractions up
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let raw = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    if let Ok(secs) = raw.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }
    raw.parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(|secs| Duration::from_secs(secs.ceil() as u64))
}

fn describe_request_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        format!("request failed: {err}")
    }
}

fn truncate(body: &str, max: usize) -> String {
    if body.chars().count() <= max {
        return body.to_string();
    }
    let mut cut: String = body.chars().take(max).collect();
    cut.push('…');
    cut
}
