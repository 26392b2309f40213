// src/engine/observer.rs

//! Lifecycle hooks for the reload loop.
//!
//! The core never logs decisions on its own behalf beyond debug traces;
//! everything a user should see goes through an [`Observer`].

use std::path::Path;

use tracing::{debug, error, info, warn};

use crate::errors::LeafError;
use crate::exec::CommandSpec;

/// Callbacks fired by the command chain and the orchestrator.
///
/// All methods default to no-ops. Implementations are shared across
/// tasks, so they must be cheap and must not block.
pub trait Observer: Send + Sync {
    /// A command of the chain is about to be spawned.
    fn on_chain_start(&self, _command: &CommandSpec) {}

    /// A command failed to parse, to spawn, or exited unsuccessfully.
    fn on_chain_error(&self, _error: &LeafError) {}

    /// A chain run is over (completed, stopped or cancelled). Fires exactly
    /// once per run.
    fn on_chain_exit(&self) {}

    /// The notifier reported a fault.
    fn on_watch_error(&self, _error: &LeafError) {}

    /// A filtered change is about to trigger a reload.
    fn on_file_changed(&self, _path: &Path) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {}

/// Production observer: every hook becomes a log line.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn on_chain_start(&self, command: &CommandSpec) {
        info!(cmd = %command, "running");
    }

    fn on_chain_error(&self, error: &LeafError) {
        warn!(error = %error, "command error");
    }

    fn on_chain_exit(&self) {
        debug!("command chain finished");
    }

    fn on_watch_error(&self, error: &LeafError) {
        error!(error = %error, "error while watching");
    }

    fn on_file_changed(&self, path: &Path) {
        info!(path = %path.display(), "file modified, reloading");
    }
}
