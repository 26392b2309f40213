// src/exec/commander.rs

//! Sequential command chain.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::engine::Observer;
use crate::errors::{LeafError, Result};
use crate::exec::backend::{ChainBackend, ChainRun, RunOutcome};
use crate::exec::command::CommandSpec;
use crate::exec::process::{self, ProcessExit};
use crate::types::ParseErrorPolicy;

/// Runs an ordered list of command lines, one process at a time.
///
/// Each command is parsed when its turn comes, spawned in its own process
/// group with inherited stdio, and waited on. Cancellation kills the
/// running group and ends the run.
#[derive(Clone)]
pub struct Commander {
    commands: Arc<[String]>,
    exit_on_error: bool,
    parse_policy: ParseErrorPolicy,
    observer: Arc<dyn Observer>,
}

impl std::fmt::Debug for Commander {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Commander")
            .field("commands", &self.commands)
            .field("exit_on_error", &self.exit_on_error)
            .field("parse_policy", &self.parse_policy)
            .finish_non_exhaustive()
    }
}

/// How one command of the chain ended.
enum Step {
    Succeeded,
    Canceled,
}

impl Commander {
    pub fn new(commands: Vec<String>, exit_on_error: bool, observer: Arc<dyn Observer>) -> Self {
        Self {
            commands: commands.into(),
            exit_on_error,
            parse_policy: ParseErrorPolicy::default(),
            observer,
        }
    }

    pub fn with_parse_error_policy(mut self, policy: ParseErrorPolicy) -> Self {
        self.parse_policy = policy;
        self
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Run the whole chain to completion, cancellation or the first error
    /// (when `exit_on_error` is set).
    ///
    /// `on_chain_exit` fires exactly once, after the chain is over,
    /// whichever way it ended.
    pub async fn run(&self, cancel: CancellationToken) -> RunOutcome {
        let outcome = self.run_chain(&cancel).await;
        debug!(?outcome, "chain run over");
        self.observer.on_chain_exit();
        outcome
    }

    /// Start [`run`](Self::run) on its own task.
    pub fn start(&self, cancel: CancellationToken) -> ChainRun {
        let this = self.clone();
        let token = cancel.clone();
        ChainRun::spawn(cancel, async move { this.run(token).await })
    }

    async fn run_chain(&self, cancel: &CancellationToken) -> RunOutcome {
        for line in self.commands.iter() {
            if cancel.is_cancelled() {
                return RunOutcome::Canceled;
            }

            let spec = match CommandSpec::parse(line) {
                Ok(spec) => spec,
                Err(err) => {
                    self.observer.on_chain_error(&err);
                    match self.parse_policy {
                        ParseErrorPolicy::Abort => return RunOutcome::Stopped,
                        ParseErrorPolicy::Skip => continue,
                    }
                }
            };

            self.observer.on_chain_start(&spec);

            match execute(&spec, cancel).await {
                Ok(Step::Succeeded) => {}
                Ok(Step::Canceled) => return RunOutcome::Canceled,
                // A failure caused by the kill itself is not an error.
                Err(_) if cancel.is_cancelled() => return RunOutcome::Canceled,
                Err(err) => {
                    self.observer.on_chain_error(&err);
                    if self.exit_on_error {
                        return RunOutcome::Stopped;
                    }
                }
            }
        }

        RunOutcome::Completed
    }
}

impl ChainBackend for Commander {
    fn launch(&self, cancel: CancellationToken) -> ChainRun {
        self.start(cancel)
    }
}

async fn execute(spec: &CommandSpec, cancel: &CancellationToken) -> Result<Step> {
    let child = process::spawn(spec)?;
    debug!(cmd = %spec, pid = ?child.id(), "spawned");

    match process::wait_or_kill(child, cancel).await? {
        ProcessExit::Killed => Ok(Step::Canceled),
        ProcessExit::Exited(status) if status.success() => Ok(Step::Succeeded),
        ProcessExit::Exited(status) => Err(LeafError::CommandFailed {
            command: spec.to_string(),
            code: status.code(),
        }),
    }
}
