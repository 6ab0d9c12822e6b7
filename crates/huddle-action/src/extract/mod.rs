//! Parameter extraction.
//!
//! Asks the model to restate the conversation as records shaped like a
//! capability's schema template, then parses the reply. Extraction never
//! fails the turn: malformed output, model errors, and timeouts all yield a
//! single placeholder parameter set.

pub mod parse;

use std::time::Duration;

use huddle_core::config::DispatchConfig;
use huddle_core::ChatMessage;
use huddle_llm::{complete_with_deadline, LlmError, ModelService};
use tokio_util::sync::CancellationToken;

use crate::capability::Capability;
use crate::error::ActionError;
use crate::types::ParameterSet;

pub use parse::{normalize_quotes, parse_parameter_sets};

pub struct ParameterExtractor {
    timeout: Duration,
    fallback_title: String,
    fallback_description: String,
}

impl ParameterExtractor {
    pub fn new(
        timeout: Duration,
        fallback_title: impl Into<String>,
        fallback_description: impl Into<String>,
    ) -> Self {
        Self {
            timeout,
            fallback_title: fallback_title.into(),
            fallback_description: fallback_description.into(),
        }
    }

    pub fn from_config(config: &DispatchConfig) -> Self {
        Self::new(
            Duration::from_secs(config.extract_timeout_secs),
            config.fallback_title.clone(),
            config.fallback_description.clone(),
        )
    }

    /// The placeholder set substituted for unusable model output.
    // TODO: replace the placeholder with an explicit "could not understand"
    // result once product confirms how malformed extractions should surface.
    pub fn fallback_set(&self) -> ParameterSet {
        [
            ("title", self.fallback_title.as_str()),
            ("description", self.fallback_description.as_str()),
        ]
        .into_iter()
        .collect()
    }

    pub fn directive(capability: &dyn Capability) -> String {
        format!(
            "You turn a conversation into structured parameters for an action the user \
             requested. Produce one record per requested item.\n{}\n{}\n\
             Reply with the records only, without commentary.",
            capability.extraction_instruction(),
            capability.parameter_schema_template()
        )
    }

    /// Extract at least one parameter set for `capability` from `history`.
    ///
    /// Only cancellation is reported as an error.
    pub async fn extract(
        &self,
        model: &dyn ModelService,
        history: &[ChatMessage],
        capability: &dyn Capability,
        cancel: &CancellationToken,
    ) -> Result<Vec<ParameterSet>, ActionError> {
        let directive = Self::directive(capability);
        match complete_with_deadline(model, history, &directive, self.timeout, cancel).await {
            Ok(raw) => Ok(self.parse_or_fallback(&raw, capability)),
            Err(LlmError::Cancelled) => Err(ActionError::Cancelled { completed: 0 }),
            Err(e) => {
                tracing::warn!(
                    capability = %capability.name(),
                    error = %e,
                    "Parameter extraction failed, using fallback parameters"
                );
                Ok(vec![self.fallback_set()])
            }
        }
    }

    /// Parse a raw reply, substituting the fallback set on any failure.
    pub fn parse_or_fallback(&self, raw: &str, capability: &dyn Capability) -> Vec<ParameterSet> {
        match parse_parameter_sets(raw, capability.required_fields()) {
            Ok(sets) => {
                tracing::debug!(
                    capability = %capability.name(),
                    count = sets.len(),
                    "Parameters extracted"
                );
                sets
            }
            Err(e) => {
                tracing::warn!(
                    capability = %capability.name(),
                    error = %e,
                    raw = %raw,
                    "Unparsable extraction output, using fallback parameters"
                );
                vec![self.fallback_set()]
            }
        }
    }
}
