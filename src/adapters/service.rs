//! Transform service trait definition

use crate::domain::{CodeId, Item, TransformError};
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Cleaned text returned by one service call, keyed by identifier.
///
/// May cover only part of the batch it answers.
pub type ResultMapping = BTreeMap<CodeId, String>;

/// A service that rewrites the text of a batch of items
///
/// Implementations make exactly one outbound call per invocation and
/// classify failures into [`TransformError`]. Retrying is the caller's job.
#[async_trait]
pub trait TransformService: Send + Sync {
    /// Transform one batch of items
    ///
    /// # Errors
    ///
    /// - [`TransformError::RateLimited`] when the service throttles the call
    /// - [`TransformError::Transient`] on network, timeout or server failures
    /// - [`TransformError::Malformed`] when the answer is not an identifier mapping
    async fn transform(&self, items: &[Item]) -> Result<ResultMapping, TransformError>;

    /// Human-readable endpoint description for logs
    fn describe(&self) -> String;
}
