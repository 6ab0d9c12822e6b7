//! Conversational front end for huddle.
//!
//! Owns per-session conversation history and routes each utterance either
//! to the action dispatcher or to a generic model answer.

pub mod context;
pub mod error;
pub mod router;
pub mod types;

pub use context::ConversationManager;
pub use error::ChatError;
pub use router::TurnRouter;
pub use types::{ConversationSession, SessionSummary, TurnResponse};
