//! Ctrl-C handling for the whole process lifetime.
//!
//! Once `tokio::signal::ctrl_c` has been awaited the default SIGINT action is
//! gone for good, so a single listener owns the signal: it cancels the
//! running turn, or requests shutdown when no turn is running.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
pub struct TurnSignal {
    current: Mutex<Option<CancellationToken>>,
    shutdown: CancellationToken,
}

impl TurnSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token for the turn about to run. Replaces any previous turn.
    pub fn begin_turn(&self) -> CancellationToken {
        let token = CancellationToken::new();
        *self.slot() = Some(token.clone());
        token
    }

    pub fn end_turn(&self) {
        self.slot().take();
    }

    /// Cancels the running turn. Returns `false` when idle, after
    /// requesting shutdown instead.
    pub fn interrupt(&self) -> bool {
        match self.slot().as_ref() {
            Some(token) => {
                tracing::info!("Interrupt received, cancelling turn");
                token.cancel();
                true
            }
            None => {
                tracing::info!("Interrupt received while idle, shutting down");
                self.shutdown.cancel();
                false
            }
        }
    }

    /// Fires once an idle interrupt asked the process to stop.
    pub fn shutdown(&self) -> &CancellationToken {
        &self.shutdown
    }

    /// Spawn the process-wide Ctrl-C listener.
    pub fn listen(self: &Arc<Self>) -> JoinHandle<()> {
        let signal = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::warn!(error = %e, "Cannot listen for Ctrl-C");
                    break;
                }
                if !signal.interrupt() {
                    break;
                }
            }
        })
    }

    fn slot(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
