//! Retry and backoff around one transform call
//!
//! Each batch gets a fresh attempt budget. Transient and malformed failures
//! consume an attempt and are followed by a fixed backoff; rate-limit
//! responses are waited out without consuming an attempt, bounded only by
//! the per-batch rate-limit budget.

use crate::adapters::{ResultMapping, TransformService};
use crate::config::RetryConfig;
use crate::domain::{Item, QuillError, Result, TransformError};
use crate::{log_rate_limited, log_retry_attempt};
use std::time::Duration;

/// Retry policy for one batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts allowed for transient/malformed failures
    pub max_attempts: u32,

    /// Pause after a failed attempt
    pub backoff: Duration,

    /// Cumulative rate-limit wait allowed per batch; `None` is unbounded
    pub rate_limit_budget: Option<Duration>,

    /// Whether malformed responses are retried
    pub retry_malformed: bool,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        let rate_limit_budget = match config.max_rate_limit_wait_seconds {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        Self {
            max_attempts: config.max_attempts.max(1),
            backoff: Duration::from_secs(config.backoff_seconds),
            rate_limit_budget,
            retry_malformed: config.retry_malformed,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

/// Result of a successful retried call
#[derive(Debug, Clone)]
pub struct RetryOutcome {
    pub mapping: ResultMapping,

    /// Attempt number that succeeded; rate-limit waits do not advance it
    pub attempts: u32,

    /// Number of rate-limit waits taken
    pub rate_limit_waits: u32,

    /// Total time spent in rate-limit waits
    pub rate_limited_for: Duration,
}

/// Drives one batch's transform call to success or terminal failure
#[derive(Debug, Clone, Default)]
pub struct RetryController {
    policy: RetryPolicy,
}

impl RetryController {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Call `service` for one batch until it succeeds or the budget runs out
    ///
    /// # Errors
    ///
    /// Returns [`QuillError::BatchFailed`] carrying the last failure when the
    /// attempt bound is reached, when a malformed response may not be
    /// retried, or when the next rate-limit wait would exceed the budget.
    pub async fn call(
        &self,
        batch: usize,
        items: &[Item],
        service: &dyn TransformService,
    ) -> Result<RetryOutcome> {
        let max_attempts = self.policy.max_attempts;
        let mut attempt: u32 = 1;
        let mut rate_limit_waits: u32 = 0;
        let mut rate_limited_for = Duration::ZERO;

        loop {
            match service.transform(items).await {
                Ok(mapping) => {
                    return Ok(RetryOutcome {
                        mapping,
                        attempts: attempt,
                        rate_limit_waits,
                        rate_limited_for,
                    });
                }
                Err(TransformError::RateLimited { retry_after }) => {
                    if let Some(budget) = self.policy.rate_limit_budget {
                        if rate_limited_for + retry_after > budget {
                            tracing::error!(
                                batch = batch,
                                waited_secs = rate_limited_for.as_secs(),
                                budget_secs = budget.as_secs(),
                                "Rate-limit wait budget exhausted"
                            );
                            return Err(QuillError::BatchFailed {
                                batch,
                                attempts: attempt,
                                cause: TransformError::RateLimited { retry_after },
                            });
                        }
                    }
                    log_rate_limited!(batch, retry_after);
                    tokio::time::sleep(retry_after).await;
                    rate_limit_waits += 1;
                    rate_limited_for += retry_after;
                }
                Err(err) => {
                    if !err.is_retriable(self.policy.retry_malformed) || attempt >= max_attempts {
                        tracing::error!(
                            batch = batch,
                            attempt = attempt,
                            kind = err.kind(),
                            error = %err,
                            "Batch failed"
                        );
                        return Err(QuillError::BatchFailed {
                            batch,
                            attempts: attempt,
                            cause: err,
                        });
                    }
                    log_retry_attempt!(batch, attempt, max_attempts, err);
                    tokio::time::sleep(self.policy.backoff).await;
                    attempt += 1;
                }
            }
        }
    }
}
