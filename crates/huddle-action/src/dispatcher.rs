//! Turn-level entry point of the action engine.
//!
//! Classification picks a capability, then `dispatch` runs the
//! lookup, extract, execute and aggregate steps for it.

use std::sync::Arc;

use huddle_core::config::DispatchConfig;
use huddle_core::ChatMessage;
use huddle_llm::ModelService;
use tokio_util::sync::CancellationToken;

use crate::aggregate::aggregate;
use crate::capability::registry::CapabilityRegistry;
use crate::error::ActionError;
use crate::executor::ActionExecutor;
use crate::extract::ParameterExtractor;
use crate::intent::{Intent, IntentClassifier};
use crate::types::AggregatedResult;

pub struct ActionDispatcher {
    registry: Arc<CapabilityRegistry>,
    model: Arc<dyn ModelService>,
    classifier: IntentClassifier,
    extractor: ParameterExtractor,
    executor: ActionExecutor,
}

impl ActionDispatcher {
    pub fn new(
        registry: Arc<CapabilityRegistry>,
        model: Arc<dyn ModelService>,
        config: &DispatchConfig,
    ) -> Self {
        Self {
            registry,
            model,
            classifier: IntentClassifier::from_config(config),
            extractor: ParameterExtractor::from_config(config),
            executor: ActionExecutor::from_config(config),
        }
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Classify `utterance` against every registered capability.
    pub async fn classify(&self, utterance: &str, cancel: &CancellationToken) -> Intent {
        self.classifier
            .classify(
                self.model.as_ref(),
                utterance,
                self.registry.list_names(),
                cancel,
            )
            .await
    }

    /// Run the named capability against the conversation so far.
    ///
    /// Fails only for an unregistered name or cancellation; capability
    /// failures are reported inside the aggregated text.
    pub async fn dispatch(
        &self,
        name: &str,
        history: &[ChatMessage],
        cancel: &CancellationToken,
    ) -> Result<AggregatedResult, ActionError> {
        let capability = self.registry.lookup(name)?;

        let sets = self
            .extractor
            .extract(self.model.as_ref(), history, capability.as_ref(), cancel)
            .await?;
        tracing::info!(capability = %name, sets = sets.len(), "Dispatching capability");

        let results = self
            .executor
            .execute(capability.as_ref(), &sets, cancel)
            .await?;
        Ok(aggregate(&results, capability.outcome()))
    }
}
