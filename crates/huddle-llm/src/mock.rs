//! Scripted model service for tests.
//!
//! Replies are served in the order they were queued. Every request is
//! recorded so tests can assert on the directive and history that reached
//! the model.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use huddle_core::ChatMessage;

use crate::error::LlmError;
use crate::service::ModelService;

enum ScriptedReply {
    Text(String),
    Error(LlmError),
    Stall(Duration),
}

/// A request observed by [`ScriptedModel`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub history: Vec<ChatMessage>,
    pub system_directive: String,
}

/// Deterministic `ModelService` that plays back queued replies.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a text reply.
    pub fn with_reply(self, text: impl Into<String>) -> Self {
        self.push(ScriptedReply::Text(text.into()));
        self
    }

    /// Queue a failing reply.
    pub fn with_error(self, err: LlmError) -> Self {
        self.push(ScriptedReply::Error(err));
        self
    }

    /// Queue a reply that sleeps for `delay` before answering with an empty string.
    pub fn with_stall(self, delay: Duration) -> Self {
        self.push(ScriptedReply::Stall(delay));
        self
    }

    /// All requests received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Number of replies not yet consumed.
    pub fn remaining(&self) -> usize {
        self.replies.lock().map(|r| r.len()).unwrap_or(0)
    }

    fn push(&self, reply: ScriptedReply) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
    }
}

#[async_trait]
impl ModelService for ScriptedModel {
    async fn complete(
        &self,
        history: &[ChatMessage],
        system_directive: &str,
    ) -> Result<String, LlmError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(RecordedRequest {
                history: history.to_vec(),
                system_directive: system_directive.to_string(),
            });
        }

        let next = self.replies.lock().ok().and_then(|mut r| r.pop_front());
        match next {
            Some(ScriptedReply::Text(text)) => Ok(text),
            Some(ScriptedReply::Error(err)) => Err(err),
            Some(ScriptedReply::Stall(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(String::new())
            }
            None => Err(LlmError::EmptyResponse("no scripted reply left".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replies_in_order_and_records_requests() {
        let model = ScriptedModel::new().with_reply("one").with_reply("two");

        let first = model
            .complete(&[ChatMessage::user("a")], "directive-a")
            .await
            .unwrap();
        let second = model.complete(&[], "directive-b").await.unwrap();

        assert_eq!(first, "one");
        assert_eq!(second, "two");
        assert_eq!(model.remaining(), 0);

        let requests = model.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].system_directive, "directive-a");
        assert_eq!(requests[0].history, vec![ChatMessage::user("a")]);
        assert!(requests[1].history.is_empty());
    }

    #[tokio::test]
    async fn test_exhausted_script_is_an_error() {
        let model = ScriptedModel::new();
        let err = model.complete(&[], "").await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse(_)));
    }

    #[tokio::test]
    async fn test_scripted_error() {
        let model = ScriptedModel::new().with_error(LlmError::Status {
            status: 503,
            body: "busy".to_string(),
        });
        let err = model.complete(&[], "").await.unwrap_err();
        assert_eq!(
            err,
            LlmError::Status {
                status: 503,
                body: "busy".to_string()
            }
        );
    }
}
