use std::time::Duration;

use huddle_core::config::DispatchConfig;
use huddle_core::ChatMessage;
use huddle_llm::{complete_with_deadline, ModelService};
use tokio_util::sync::CancellationToken;

use crate::types::CapabilityName;

/// Reply meaning "no capability matches; answer generically".
pub const NO_ACTION: &str = "NO_ACTION";

/// Result of classifying one utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Action(CapabilityName),
    NoAction,
}

/// Fail-open classifier: anything other than an exact candidate match,
/// including model errors, timeouts, and cancellation, yields `NoAction`.
pub struct IntentClassifier {
    timeout: Duration,
}

impl IntentClassifier {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn from_config(config: &DispatchConfig) -> Self {
        Self::new(Duration::from_secs(config.classify_timeout_secs))
    }

    /// System directive presenting the candidates to the model.
    pub fn directive(candidates: &[CapabilityName]) -> String {
        let names: Vec<&str> = candidates.iter().map(CapabilityName::as_str).collect();
        format!(
            "You decide whether the user is asking the assistant to carry out an action. \
             Available actions are: [{}]. \
             If the message asks for one of these actions, reply with that action name only. \
             Otherwise reply with {} only.",
            names.join(", "),
            NO_ACTION
        )
    }

    pub async fn classify(
        &self,
        model: &dyn ModelService,
        utterance: &str,
        candidates: &[CapabilityName],
        cancel: &CancellationToken,
    ) -> Intent {
        if candidates.is_empty() {
            return Intent::NoAction;
        }

        let history = [ChatMessage::user(utterance)];
        let directive = Self::directive(candidates);
        match complete_with_deadline(model, &history, &directive, self.timeout, cancel).await {
            Ok(raw) => {
                let intent = Self::interpret(&raw, candidates);
                tracing::info!(raw = %raw.trim(), intent = ?intent, "Intent classified");
                intent
            }
            Err(e) => {
                tracing::warn!(error = %e, "Intent classification failed, treating as NO_ACTION");
                Intent::NoAction
            }
        }
    }

    /// Normalise a raw model reply and match it against the candidates.
    pub fn interpret(raw: &str, candidates: &[CapabilityName]) -> Intent {
        let normalized = normalize(raw);
        candidates
            .iter()
            .find(|c| c.as_str().to_lowercase() == normalized)
            .map(|c| Intent::Action(*c))
            .unwrap_or(Intent::NoAction)
    }
}

fn normalize(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | '.'))
        .trim()
        .to_lowercase()
}
