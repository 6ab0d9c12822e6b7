//! Turn router: the per-utterance entry point.
//!
//! Each turn is classified against the registered capabilities. A match is
//! dispatched with the session history; anything else gets a generic model
//! answer under the assistant persona. Only completed turns are written to
//! the session history.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use huddle_action::{ActionDispatcher, ActionError, CapabilityRegistry, Intent};
use huddle_core::{ChatMessage, HuddleConfig};
use huddle_llm::{complete_with_deadline, ModelService};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::context::ConversationManager;
use crate::error::ChatError;
use crate::types::{ConversationSession, SessionSummary, TurnResponse};

pub struct TurnRouter {
    dispatcher: ActionDispatcher,
    model: Arc<dyn ModelService>,
    context_manager: ConversationManager,
    sessions: Mutex<HashMap<Uuid, ConversationSession>>,
    system_prompt: String,
    answer_timeout: Duration,
    max_message_length: usize,
}

impl TurnRouter {
    pub fn new(
        model: Arc<dyn ModelService>,
        registry: Arc<CapabilityRegistry>,
        config: &HuddleConfig,
    ) -> Self {
        Self {
            dispatcher: ActionDispatcher::new(registry, model.clone(), &config.dispatch),
            model,
            context_manager: ConversationManager::from_config(&config.assistant),
            sessions: Mutex::new(HashMap::new()),
            system_prompt: config.assistant.system_prompt.clone(),
            answer_timeout: Duration::from_secs(config.llm.request_timeout_secs),
            max_message_length: config.assistant.max_message_length,
        }
    }

    /// Handle one utterance.
    ///
    /// Returns the response and the session it was recorded in, which is a
    /// new session when `session_id` is unknown or expired.
    pub async fn handle_turn(
        &self,
        utterance: &str,
        session_id: Option<Uuid>,
        cancel: &CancellationToken,
    ) -> Result<(TurnResponse, Uuid), ChatError> {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if utterance.chars().count() > self.max_message_length {
            return Err(ChatError::MessageTooLong(self.max_message_length));
        }

        let (sid, mut history, is_new) = self.resolve_session(session_id)?;
        let user_message = ChatMessage::user(utterance);
        history.push(user_message.clone());

        let intent = self.dispatcher.classify(utterance, cancel).await;
        // Classification swallows cancellation as NO_ACTION.
        if cancel.is_cancelled() {
            return Err(ChatError::Cancelled { completed: 0 });
        }

        let response = match intent {
            Intent::Action(name) => {
                match self.dispatcher.dispatch(name.as_str(), &history, cancel).await {
                    Ok(merged) => TurnResponse {
                        spoken: merged.spoken_summary,
                        display: merged.display_text,
                        action: Some(name),
                    },
                    Err(ActionError::UnknownCapability(unknown)) => {
                        tracing::warn!(
                            capability = %unknown,
                            "Classified capability is not registered, answering generically"
                        );
                        self.answer(&history, cancel).await?
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            Intent::NoAction => self.answer(&history, cancel).await?,
        };

        self.record(
            sid,
            is_new,
            user_message,
            ChatMessage::assistant(response.display.clone()),
        )?;
        tracing::info!(
            session_id = %sid,
            action = ?response.action,
            "Turn handled"
        );
        Ok((response, sid))
    }

    async fn answer(
        &self,
        history: &[ChatMessage],
        cancel: &CancellationToken,
    ) -> Result<TurnResponse, ChatError> {
        let reply = complete_with_deadline(
            self.model.as_ref(),
            history,
            &self.system_prompt,
            self.answer_timeout,
            cancel,
        )
        .await?;
        Ok(TurnResponse::answer(reply.trim()))
    }

    /// Get a session by ID.
    pub fn get_session(&self, session_id: Uuid) -> Option<ConversationSession> {
        self.lock_sessions()
            .ok()
            .and_then(|s| s.get(&session_id).cloned())
    }

    /// Live sessions. Expired ones are dropped, not reported.
    pub fn list_sessions(&self) -> Vec<SessionSummary> {
        match self.lock_sessions() {
            Ok(sessions) => sessions.values().map(SessionSummary::from).collect(),
            Err(_) => vec![],
        }
    }

    /// History window of a session, oldest first.
    pub fn get_history(&self, session_id: Uuid) -> Result<Vec<ChatMessage>, ChatError> {
        let sessions = self.lock_sessions()?;
        sessions
            .get(&session_id)
            .map(|s| s.history.clone())
            .ok_or(ChatError::SessionNotFound(session_id))
    }

    pub fn delete_session(&self, session_id: Uuid) -> Result<(), ChatError> {
        let mut sessions = self.lock_sessions()?;
        sessions
            .remove(&session_id)
            .map(|_| ())
            .ok_or(ChatError::SessionNotFound(session_id))
    }

    // -- Private helpers --

    /// Lock the session map with expired sessions already removed.
    fn lock_sessions(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, ConversationSession>>, ChatError> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|e| ChatError::StorageError(format!("session lock poisoned: {}", e)))?;

        let before = sessions.len();
        sessions.retain(|_, s| !self.context_manager.is_expired(s));
        let pruned = before - sessions.len();
        if pruned > 0 {
            tracing::debug!(pruned, "Expired sessions removed");
        }
        Ok(sessions)
    }

    /// Resolve a session, returning its ID, a history snapshot and whether
    /// the ID is new. New IDs are only stored once a turn completes.
    fn resolve_session(
        &self,
        requested: Option<Uuid>,
    ) -> Result<(Uuid, Vec<ChatMessage>, bool), ChatError> {
        let sessions = self.lock_sessions()?;

        if let Some(session) = requested.and_then(|sid| sessions.get(&sid)) {
            return Ok((session.id, session.history.clone(), false));
        }
        if let Some(sid) = requested {
            tracing::debug!(session_id = %sid, "Unknown or expired session, starting a new one");
        }
        Ok((Uuid::new_v4(), Vec::new(), true))
    }

    fn record(
        &self,
        sid: Uuid,
        is_new: bool,
        user: ChatMessage,
        assistant: ChatMessage,
    ) -> Result<(), ChatError> {
        let mut sessions = self.lock_sessions()?;
        if is_new {
            let session = sessions
                .entry(sid)
                .or_insert_with(|| self.context_manager.create_session_with_id(sid));
            self.context_manager.record_turn(session, user, assistant);
            return Ok(());
        }
        match sessions.get_mut(&sid) {
            Some(session) => self.context_manager.record_turn(session, user, assistant),
            None => tracing::warn!(session_id = %sid, "Session removed during turn, not recorded"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use huddle_action::capability::{LogNotifier, WorkTracker};
    use huddle_core::Timestamp;
    use huddle_llm::ScriptedModel;

    struct NullTracker;

    #[async_trait]
    impl WorkTracker for NullTracker {
        async fn create_work_item(&self, _t: &str, _d: &str) -> Result<String, ActionError> {
            Ok("https://tracker.example.com/1".to_string())
        }
    }

    fn router(model: ScriptedModel) -> TurnRouter {
        let config = HuddleConfig::default();
        let registry = Arc::new(CapabilityRegistry::with_defaults(
            &config,
            Arc::new(NullTracker),
            Arc::new(LogNotifier),
        ));
        TurnRouter::new(Arc::new(model), registry, &config)
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let r = router(ScriptedModel::new());
        let err = r
            .handle_turn("   ", None, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::EmptyMessage));
    }

    #[tokio::test]
    async fn test_message_too_long_rejected() {
        let r = router(ScriptedModel::new());
        let long = "a".repeat(2001);
        let err = r
            .handle_turn(&long, None, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::MessageTooLong(2000)));
    }

    #[tokio::test]
    async fn test_unknown_session_starts_new() {
        let r = router(
            ScriptedModel::new()
                .with_reply("NO_ACTION")
                .with_reply("Hello there."),
        );
        let stale = Uuid::new_v4();
        let (_, sid) = r
            .handle_turn("hi", Some(stale), &CancellationToken::new())
            .await
            .unwrap();
        assert_ne!(sid, stale);
        assert_eq!(r.list_sessions().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_first_turn_leaves_no_session() {
        let r = router(ScriptedModel::new().with_reply("NO_ACTION").with_error(
            huddle_llm::LlmError::Status {
                status: 500,
                body: "overloaded".to_string(),
            },
        ));
        let err = r
            .handle_turn("hi", None, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Llm(_)));
        assert!(r.list_sessions().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_first_turn_leaves_no_session() {
        let r = router(ScriptedModel::new().with_reply("NO_ACTION"));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = r.handle_turn("hi", None, &cancel).await.unwrap_err();
        assert!(matches!(err, ChatError::Cancelled { completed: 0 }));
        assert!(r.list_sessions().is_empty());
    }

    #[tokio::test]
    async fn test_expired_sessions_are_pruned() {
        let r = router(
            ScriptedModel::new()
                .with_reply("NO_ACTION")
                .with_reply("Welcome back."),
        );
        let mut idle = r.context_manager.create_session();
        idle.last_message_at = Timestamp(Timestamp::now().0 - 31 * 60);
        let idle_id = idle.id;
        r.sessions.lock().unwrap().insert(idle_id, idle);

        assert!(r.list_sessions().is_empty());
        assert!(r.get_session(idle_id).is_none());
        assert!(r.sessions.lock().unwrap().is_empty());

        let (_, sid) = r
            .handle_turn("hello again", Some(idle_id), &CancellationToken::new())
            .await
            .unwrap();
        assert_ne!(sid, idle_id);
        let sessions = r.list_sessions();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, sid);
        assert_eq!(sessions[0].turn_count, 1);
    }

    #[tokio::test]
    async fn test_history_and_delete() {
        let r = router(
            ScriptedModel::new()
                .with_reply("NO_ACTION")
                .with_reply("  Hello there.  "),
        );
        let (response, sid) = r
            .handle_turn("hi", None, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(response.spoken, "Hello there.");
        assert_eq!(
            r.get_history(sid).unwrap(),
            vec![ChatMessage::user("hi"), ChatMessage::assistant("Hello there.")]
        );
        assert_eq!(r.get_session(sid).unwrap().turn_count, 1);

        r.delete_session(sid).unwrap();
        assert!(matches!(
            r.get_history(sid),
            Err(ChatError::SessionNotFound(_))
        ));
        assert!(matches!(
            r.delete_session(sid),
            Err(ChatError::SessionNotFound(_))
        ));
    }
}
