//! Types for conversation turns and sessions.

use huddle_action::CapabilityName;
use huddle_core::{ChatMessage, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The assistant's answer to one utterance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnResponse {
    /// Text meant to be read aloud.
    pub spoken: String,
    /// Text shown in the chat window.
    pub display: String,
    /// The capability that handled the turn, if any.
    pub action: Option<CapabilityName>,
}

impl TurnResponse {
    /// A conversational answer spoken and displayed verbatim.
    pub fn answer(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            spoken: text.clone(),
            display: text,
            action: None,
        }
    }
}

/// One conversation, with its rolling history window.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    pub id: Uuid,
    pub started_at: Timestamp,
    pub last_message_at: Timestamp,
    /// Oldest first; alternating user and assistant messages.
    pub history: Vec<ChatMessage>,
    pub turn_count: u32,
}

/// Listing view of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: Uuid,
    /// RFC 3339.
    pub started_at: String,
    /// RFC 3339.
    pub last_message_at: String,
    pub turn_count: u32,
}

impl From<&ConversationSession> for SessionSummary {
    fn from(session: &ConversationSession) -> Self {
        Self {
            id: session.id,
            started_at: session.started_at.to_datetime().to_rfc3339(),
            last_message_at: session.last_message_at.to_datetime().to_rfc3339(),
            turn_count: session.turn_count,
        }
    }
}
