//! Conversation context management.
//!
//! Creates sessions, decides when an idle session has expired, and keeps a
//! rolling window of recent turns as the history passed to the model.

use huddle_core::config::AssistantConfig;
use huddle_core::{ChatMessage, Timestamp};
use uuid::Uuid;

use crate::types::ConversationSession;

/// Manages conversation sessions and their context windows.
pub struct ConversationManager {
    /// Maximum number of recent turns kept in history.
    pub context_turns: usize,
    /// Idle minutes before a session expires.
    pub session_timeout_minutes: u32,
}

impl ConversationManager {
    pub fn new(context_turns: usize, session_timeout_minutes: u32) -> Self {
        Self {
            context_turns,
            session_timeout_minutes,
        }
    }

    pub fn from_config(config: &AssistantConfig) -> Self {
        Self::new(config.context_turns, config.session_timeout_minutes)
    }

    /// Create a fresh, empty session.
    pub fn create_session(&self) -> ConversationSession {
        self.create_session_with_id(Uuid::new_v4())
    }

    /// Create an empty session under an ID handed out earlier.
    pub fn create_session_with_id(&self, id: Uuid) -> ConversationSession {
        let now = Timestamp::now();
        ConversationSession {
            id,
            started_at: now,
            last_message_at: now,
            history: Vec::new(),
            turn_count: 0,
        }
    }

    pub fn is_expired(&self, session: &ConversationSession) -> bool {
        let timeout_secs = i64::from(self.session_timeout_minutes) * 60;
        session.last_message_at.elapsed_secs() > timeout_secs
    }

    /// Append a completed turn and trim the history to the window.
    pub fn record_turn(
        &self,
        session: &mut ConversationSession,
        user: ChatMessage,
        assistant: ChatMessage,
    ) {
        session.history.push(user);
        session.history.push(assistant);
        session.last_message_at = Timestamp::now();
        session.turn_count += 1;

        let max_messages = self.context_turns * 2;
        if session.history.len() > max_messages {
            let excess = session.history.len() - max_messages;
            session.history.drain(..excess);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
