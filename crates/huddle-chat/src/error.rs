//! Error types for the conversational front end.

use huddle_action::ActionError;
use huddle_core::error::HuddleError;
use huddle_llm::LlmError;

/// Errors from handling a conversation turn.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("session not found: {0}")]
    SessionNotFound(uuid::Uuid),
    #[error("LLM error: {0}")]
    Llm(String),
    #[error("action error: {0}")]
    Action(String),
    #[error("turn cancelled after {completed} action(s) completed")]
    Cancelled { completed: usize },
    #[error("storage error: {0}")]
    StorageError(String),
}

impl From<LlmError> for ChatError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Cancelled => ChatError::Cancelled { completed: 0 },
            other => ChatError::Llm(other.to_string()),
        }
    }
}

impl From<ActionError> for ChatError {
    fn from(err: ActionError) -> Self {
        match err {
            ActionError::Cancelled { completed } => ChatError::Cancelled { completed },
            other => ChatError::Action(other.to_string()),
        }
    }
}

impl From<ChatError> for HuddleError {
    fn from(err: ChatError) -> Self {
        HuddleError::Chat(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_chat_error_display() {
        assert_eq!(ChatError::EmptyMessage.to_string(), "message cannot be empty");
        assert_eq!(
            ChatError::MessageTooLong(2000).to_string(),
            "message exceeds maximum length of 2000 characters"
        );

        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(
            ChatError::SessionNotFound(id).to_string(),
            "session not found: 550e8400-e29b-41d4-a716-446655440000"
        );

        assert_eq!(
            ChatError::Cancelled { completed: 1 }.to_string(),
            "turn cancelled after 1 action(s) completed"
        );
        assert_eq!(
            ChatError::StorageError("lock poisoned".to_string()).to_string(),
            "storage error: lock poisoned"
        );
    }

    #[test]
    fn test_from_llm_error() {
        let err: ChatError = LlmError::Timeout(60).into();
        assert_eq!(err.to_string(), "LLM error: model call timed out after 60 seconds");

        let err: ChatError = LlmError::Cancelled.into();
        assert!(matches!(err, ChatError::Cancelled { completed: 0 }));
    }

    #[test]
    fn test_from_action_error() {
        let err: ChatError = ActionError::Cancelled { completed: 2 }.into();
        assert!(matches!(err, ChatError::Cancelled { completed: 2 }));

        let err: ChatError = ActionError::UnknownCapability("Teleport".to_string()).into();
        assert_eq!(
            err.to_string(),
            "action error: Capability not registered: Teleport"
        );
    }

    #[test]
    fn test_into_huddle_error() {
        let err: HuddleError = ChatError::EmptyMessage.into();
        assert!(matches!(err, HuddleError::Chat(_)));
    }
}
