use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use leaf::exec::{ChainBackend, ChainRun, RunOutcome};
use tokio_util::sync::CancellationToken;

/// What a [`FakeChain`] run did, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainEvent {
    Started(usize),
    Finished(usize, RunOutcome),
}

/// A chain backend that spawns no processes.
///
/// Each run:
/// - records `Started(n)` and bumps the active counter;
/// - waits for cancellation, or for `hold` to elapse when one is set;
/// - records `Finished(n, outcome)` and drops the active counter.
///
/// `max_active` is the highest number of runs seen alive at once.
#[derive(Clone, Default)]
pub struct FakeChain {
    hold: Option<Duration>,
    events: Arc<Mutex<Vec<ChainEvent>>>,
    launched: Arc<AtomicUsize>,
    active: Arc<AtomicUsize>,
    max_active: Arc<AtomicUsize>,
}

impl FakeChain {
    /// Runs that last until cancelled.
    pub fn blocking() -> Self {
        Self::default()
    }

    /// Runs that complete on their own after `hold`.
    pub fn finishing_after(hold: Duration) -> Self {
        Self {
            hold: Some(hold),
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<ChainEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn launched(&self) -> usize {
        self.launched.load(Ordering::SeqCst)
    }

    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

impl ChainBackend for FakeChain {
    fn launch(&self, cancel: CancellationToken) -> ChainRun {
        let n = self.launched.fetch_add(1, Ordering::SeqCst);
        let this = self.clone();
        let token = cancel.clone();

        ChainRun::spawn(cancel, async move {
            let now = this.active.fetch_add(1, Ordering::SeqCst) + 1;
            this.max_active.fetch_max(now, Ordering::SeqCst);
            this.events.lock().unwrap().push(ChainEvent::Started(n));

            let outcome = match this.hold {
                Some(hold) => tokio::select! {
                    _ = token.cancelled() => RunOutcome::Canceled,
                    _ = tokio::time::sleep(hold) => RunOutcome::Completed,
                },
                None => {
                    token.cancelled().await;
                    RunOutcome::Canceled
                }
            };

            this.events.lock().unwrap().push(ChainEvent::Finished(n, outcome));
            this.active.fetch_sub(1, Ordering::SeqCst);
            outcome
        })
    }
}
