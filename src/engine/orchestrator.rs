// src/engine/orchestrator.rs

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::engine::Observer;
use crate::exec::{ChainBackend, ChainRun, RunOutcome};
use crate::watch::ChangeEvent;

/// Default debounce delay between a change and the restart it causes.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// The reload loop: consumes filtered changes and restarts the chain.
///
/// At most one [`ChainRun`] is alive at any time. A new run is launched
/// only after the previous one's `done` has been observed, so the previous
/// process tree is always fully torn down first.
pub struct Orchestrator<B: ChainBackend> {
    backend: B,
    delay: Duration,
    observer: Arc<dyn Observer>,
}

impl<B: ChainBackend> fmt::Debug for Orchestrator<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

impl<B: ChainBackend> Orchestrator<B> {
    pub fn new(backend: B, delay: Duration, observer: Arc<dyn Observer>) -> Self {
        Self {
            backend,
            delay,
            observer,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run the chain once and return when it is done.
    ///
    /// Cancelling `shutdown` kills the run early.
    pub async fn run_once(&self, shutdown: CancellationToken) -> RunOutcome {
        let run = self.backend.launch(shutdown.child_token());
        let outcome = run.done().await;
        info!(?outcome, "single run finished");
        outcome
    }

    /// Main loop.
    ///
    /// - Starts a run immediately.
    /// - On each change: cancel the current run, sleep `delay`, wait for
    ///   the cancelled run to finish, start a fresh one.
    /// - Watch errors are reported and do not touch the running chain.
    ///
    /// Returns when `shutdown` fires or `events` closes, after the last run
    /// has been cancelled and awaited.
    pub async fn run(&self, mut events: mpsc::Receiver<ChangeEvent>, shutdown: CancellationToken) {
        info!(delay = ?self.delay, "reload loop started");

        let mut run_cancel = shutdown.child_token();
        let mut current = self.backend.launch(run_cancel.clone());

        loop {
            let event = tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    debug!("shutdown requested");
                    break;
                }
                ev = events.recv() => match ev {
                    Some(ev) => ev,
                    None => {
                        debug!("change stream closed");
                        break;
                    }
                },
            };

            let path = match event {
                ChangeEvent::Error(err) => {
                    self.observer.on_watch_error(&err);
                    continue;
                }
                ChangeEvent::Changed(path) => path,
            };

            self.observer.on_file_changed(&path);

            run_cancel.cancel();
            run_cancel = shutdown.child_token();

            // Shutdown during the delay skips straight to teardown.
            let interrupted = tokio::select! {
                biased;
                _ = shutdown.cancelled() => true,
                _ = tokio::time::sleep(self.delay) => false,
            };

            let outcome = current.done().await;
            debug!(?outcome, "previous run finished");

            if interrupted {
                info!("reload loop stopped");
                return;
            }

            current = self.backend.launch(run_cancel.clone());
        }

        self.stop(current, &run_cancel).await;
        info!("reload loop stopped");
    }

    async fn stop(&self, current: ChainRun, run_cancel: &CancellationToken) {
        run_cancel.cancel();
        let outcome = current.done().await;
        debug!(?outcome, "last run finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::NoopObserver;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Backend whose runs wait for cancellation and log start/end.
    #[derive(Clone, Default)]
    struct Blocking {
        log: Arc<Mutex<Vec<&'static str>>>,
        launched: Arc<AtomicUsize>,
    }

    impl ChainBackend for Blocking {
        fn launch(&self, cancel: CancellationToken) -> ChainRun {
            self.launched.fetch_add(1, Ordering::SeqCst);
            let log = self.log.clone();
            let token = cancel.clone();
            ChainRun::spawn(cancel, async move {
                log.lock().unwrap().push("start");
                token.cancelled().await;
                log.lock().unwrap().push("end");
                RunOutcome::Canceled
            })
        }
    }

    #[tokio::test]
    async fn starts_immediately_and_stops_on_shutdown() {
        let backend = Blocking::default();
        let orch = Orchestrator::new(backend.clone(), Duration::from_millis(10), Arc::new(NoopObserver));
        let (_tx, rx) = mpsc::channel(4);
        let shutdown = CancellationToken::new();

        let handle = {
            let shutdown = shutdown.clone();
            tokio::spawn(async move { orch.run(rx, shutdown).await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown.cancel();
        handle.await.unwrap();

        assert_eq!(backend.launched.load(Ordering::SeqCst), 1);
        assert_eq!(*backend.log.lock().unwrap(), vec!["start", "end"]);
    }

    #[tokio::test]
    async fn change_restarts_after_previous_run_ends() {
        let backend = Blocking::default();
        let orch = Orchestrator::new(backend.clone(), Duration::from_millis(10), Arc::new(NoopObserver));
        let (tx, rx) = mpsc::channel(4);
        let shutdown = CancellationToken::new();

        let handle = {
            let shutdown = shutdown.clone();
            tokio::spawn(async move { orch.run(rx, shutdown).await })
        };

        tx.send(ChangeEvent::Changed("/tmp/a".into())).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown.cancel();
        handle.await.unwrap();

        assert_eq!(backend.launched.load(Ordering::SeqCst), 2);
        assert_eq!(
            *backend.log.lock().unwrap(),
            vec!["start", "end", "start", "end"]
        );
    }

    #[tokio::test]
    async fn watch_errors_leave_the_run_alone() {
        let backend = Blocking::default();
        let orch = Orchestrator::new(backend.clone(), Duration::from_millis(10), Arc::new(NoopObserver));
        let (tx, rx) = mpsc::channel(4);
        let shutdown = CancellationToken::new();

        let handle = {
            let shutdown = shutdown.clone();
            tokio::spawn(async move { orch.run(rx, shutdown).await })
        };

        tx.send(ChangeEvent::Error(crate::errors::LeafError::Config("boom".into())))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(*backend.log.lock().unwrap(), vec!["start"]);

        // Closing the stream ends the loop too.
        drop(tx);
        handle.await.unwrap();
        assert_eq!(backend.launched.load(Ordering::SeqCst), 1);
        assert_eq!(*backend.log.lock().unwrap(), vec!["start", "end"]);
    }

    #[tokio::test]
    async fn run_once_waits_for_the_single_run() {
        let backend = Blocking::default();
        let orch = Orchestrator::new(backend.clone(), DEFAULT_DELAY, Arc::new(NoopObserver));
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        let outcome = orch.run_once(shutdown).await;
        assert_eq!(outcome, RunOutcome::Canceled);
        assert_eq!(backend.launched.load(Ordering::SeqCst), 1);
    }
}
