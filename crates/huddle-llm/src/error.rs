//! Error types for model service calls.

use huddle_core::error::HuddleError;

/// Errors from a model service round-trip.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LlmError {
    #[error("model service is not configured: {0}")]
    Config(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("model service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("empty response: {0}")]
    EmptyResponse(String),
    #[error("model call timed out after {0} seconds")]
    Timeout(u64),
    #[error("model call cancelled")]
    Cancelled,
}

impl From<LlmError> for HuddleError {
    fn from(err: LlmError) -> Self {
        HuddleError::Llm(err.to_string())
    }
}
