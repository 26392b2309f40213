// src/exec/backend.rs

//! Pluggable chain backend abstraction.
//!
//! The orchestrator talks to a `ChainBackend` instead of a `Commander`
//! directly. This makes it easy to swap in a fake chain in tests while
//! keeping the production process runner in [`commander`](super::commander).
//!
//! Whatever the backend, the orchestrator only ever holds a [`ChainRun`]:
//! it can request cancellation and wait for `done`, nothing else. The
//! process handles stay inside the run's own task.

use std::future::Future;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::error;

/// How a chain run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every command line was attempted.
    Completed,
    /// Stopped early by `exit_on_error` or a parse failure under
    /// `ParseErrorPolicy::Abort`.
    Stopped,
    /// Cancelled; any running process group has been killed.
    Canceled,
}

/// Trait abstracting how a chain run is started.
///
/// Production code uses [`Commander`](super::Commander); tests can provide
/// their own implementation that doesn't spawn real processes.
pub trait ChainBackend: Send + Sync {
    /// Start a new run bound to `cancel` and return immediately.
    fn launch(&self, cancel: CancellationToken) -> ChainRun;
}

/// One in-flight execution of the chain.
///
/// Owns the task running it. `done` consumes the run, so its completion
/// can only be observed once.
#[derive(Debug)]
pub struct ChainRun {
    cancel: CancellationToken,
    task: JoinHandle<RunOutcome>,
}

impl ChainRun {
    /// Spawn `fut` as the body of a run. `fut` is expected to watch
    /// `cancel` itself.
    pub fn spawn<F>(cancel: CancellationToken, fut: F) -> Self
    where
        F: Future<Output = RunOutcome> + Send + 'static,
    {
        Self {
            cancel,
            task: tokio::spawn(fut),
        }
    }

    /// Request cancellation. Does not wait.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait until the run has fully finished.
    pub async fn done(self) -> RunOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "chain run task failed");
                RunOutcome::Stopped
            }
        }
    }
}
