//! The model service contract.

use std::time::Duration;

use async_trait::async_trait;
use huddle_core::ChatMessage;
use tokio_util::sync::CancellationToken;

use crate::error::LlmError;

/// A generative text model.
///
/// `system_directive` is placed ahead of `history` as the system instruction
/// for this call only; it is never stored in the conversation.
#[async_trait]
pub trait ModelService: Send + Sync {
    async fn complete(
        &self,
        history: &[ChatMessage],
        system_directive: &str,
    ) -> Result<String, LlmError>;
}

/// Run one completion bounded by `timeout` and `cancel`.
///
/// Whichever happens first wins: the reply, `LlmError::Timeout`, or
/// `LlmError::Cancelled`. A token that is already cancelled always wins.
pub async fn complete_with_deadline(
    model: &dyn ModelService,
    history: &[ChatMessage],
    system_directive: &str,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<String, LlmError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(LlmError::Cancelled),
        outcome = tokio::time::timeout(timeout, model.complete(history, system_directive)) => {
            match outcome {
                Ok(reply) => reply,
                Err(_) => Err(LlmError::Timeout(timeout.as_secs())),
            }
        }
    }
}
