//! Anthropic messages API adapter
//!
//! - [`client`] - [`AnthropicClient`], the HTTP [`TransformService`](super::TransformService)
//! - [`models`] - Request/response wire types and the cleaning instruction
//! - [`response`] - Unwrapping and parsing of the model's text answer

pub mod client;
pub mod models;
pub mod response;

pub use client::AnthropicClient;
pub use response::{parse_result_mapping, strip_code_fence};
