//! Runs a capability once per extracted parameter set.
//!
//! Capability errors are turned into failed results so one broken downstream
//! call never hides the outcome of the others. Nothing is retried and
//! committed side effects are never rolled back.

use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::join_all;
use huddle_core::config::DispatchConfig;
use tokio_util::sync::CancellationToken;

use crate::capability::Capability;
use crate::error::ActionError;
use crate::types::{ActionResult, ParameterSet};

pub struct ActionExecutor {
    parallel: bool,
}

impl ActionExecutor {
    pub fn new(parallel: bool) -> Self {
        Self { parallel }
    }

    pub fn from_config(config: &DispatchConfig) -> Self {
        Self::new(config.parallel_execution)
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Execute `capability` for every set. Results are in input order.
    pub async fn execute(
        &self,
        capability: &dyn Capability,
        sets: &[ParameterSet],
        cancel: &CancellationToken,
    ) -> Result<Vec<ActionResult>, ActionError> {
        let results = if self.parallel {
            execute_parallel(capability, sets, cancel).await?
        } else {
            execute_sequential(capability, sets, cancel).await?
        };

        let failed = results.iter().filter(|r| !r.succeeded).count();
        tracing::info!(
            capability = %capability.name(),
            executed = results.len(),
            failed,
            parallel = self.parallel,
            "Capability executed"
        );
        Ok(results)
    }
}

/// Cancellation is observed before each set and while it runs; a cancelled
/// in-flight execution is abandoned and not counted.
async fn execute_sequential(
    capability: &dyn Capability,
    sets: &[ParameterSet],
    cancel: &CancellationToken,
) -> Result<Vec<ActionResult>, ActionError> {
    let mut results = Vec::with_capacity(sets.len());
    for params in sets {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::warn!(completed = results.len(), "Execution cancelled");
                return Err(ActionError::Cancelled {
                    completed: results.len(),
                });
            }
            result = run_one(capability, params) => result,
        };
        results.push(result);
    }
    Ok(results)
}

async fn execute_parallel(
    capability: &dyn Capability,
    sets: &[ParameterSet],
    cancel: &CancellationToken,
) -> Result<Vec<ActionResult>, ActionError> {
    if cancel.is_cancelled() {
        return Err(ActionError::Cancelled { completed: 0 });
    }

    let completed = AtomicUsize::new(0);
    let counter = &completed;
    let runs = sets.iter().map(move |params| async move {
        let result = run_one(capability, params).await;
        counter.fetch_add(1, Ordering::SeqCst);
        result
    });

    tokio::select! {
        results = join_all(runs) => Ok(results),
        _ = cancel.cancelled() => {
            let completed = completed.load(Ordering::SeqCst);
            tracing::warn!(completed, "Parallel execution cancelled");
            Err(ActionError::Cancelled { completed })
        }
    }
}

async fn run_one(capability: &dyn Capability, params: &ParameterSet) -> ActionResult {
    match capability.execute(params).await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(
                capability = %capability.name(),
                error = %e,
                "Capability execution failed"
            );
            ActionResult::failure(format!(
                "Could not {} {}: {}",
                capability.outcome().infinitive,
                capability.describe(params),
                e
            ))
        }
    }
}
