// src/watch/watcher.rs

use std::path::PathBuf;
use std::sync::Arc;

use notify::event::ModifyKind;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::errors::{LeafError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::watch::filter::FilterSet;
use crate::watch::tree::WatchedTree;

/// Capacity of the filtered change stream handed to the orchestrator.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// One item of the filtered change stream.
#[derive(Debug)]
pub enum ChangeEvent {
    /// A watched file was written and passed the filters.
    Changed(PathBuf),
    /// The OS notifier reported a fault. Watching continues.
    Error(LeafError),
}

/// Everything needed to build a [`TreeWatcher`].
#[derive(Debug, Clone)]
pub struct WatchOptions {
    pub root: PathBuf,
    /// Directories to leave unregistered, already `DEFAULTS`-expanded.
    pub exclude: Vec<String>,
    /// Raw `"+ ..."` / `"- ..."` filter strings.
    pub filters: Vec<String>,
    /// Base for relative root, exclude and filter paths.
    pub base_dir: PathBuf,
}

/// Watches a directory tree and turns write events into a filtered stream
/// of [`ChangeEvent`]s.
///
/// Every directory is registered when the watcher is built; see
/// [`WatchedTree`] for the snapshot semantics.
pub struct TreeWatcher {
    tree: WatchedTree,
    filters: Arc<FilterSet>,
    notifier: RecommendedWatcher,
    raw_rx: mpsc::UnboundedReceiver<notify::Result<Event>>,
}

impl std::fmt::Debug for TreeWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeWatcher")
            .field("tree", &self.tree)
            .field("filters", &self.filters)
            .finish_non_exhaustive()
    }
}

impl TreeWatcher {
    pub fn new(opts: &WatchOptions) -> Result<Self> {
        Self::with_fs(opts, Arc::new(RealFileSystem))
    }

    /// Build the watcher: validate the root, enumerate the tree, compile the
    /// filters and register every non-excluded directory with the notifier.
    ///
    /// Any registration failure fails construction; the partially
    /// registered notifier is dropped (and closed) on the way out.
    pub fn with_fs(opts: &WatchOptions, fs: Arc<dyn FileSystem>) -> Result<Self> {
        let tree = WatchedTree::scan(fs.as_ref(), &opts.root, &opts.exclude, &opts.base_dir)?;
        let filters = FilterSet::with_fs(opts.filters.as_slice(), &opts.base_dir, fs)?;

        // Channel from the blocking notify callback into the async world.
        let (raw_tx, raw_rx) = mpsc::unbounded_channel::<notify::Result<Event>>();

        let mut notifier = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                // The receiver only goes away once watching has stopped.
                let _ = raw_tx.send(res);
            },
            Config::default(),
        )?;

        for dir in tree.dirs() {
            trace!(dir = %dir.display(), "registering directory");
            notifier.watch(dir, RecursiveMode::NonRecursive)?;
        }

        info!(
            root = %tree.root().display(),
            dirs = tree.dirs().len(),
            "file watcher registered"
        );

        Ok(Self {
            tree,
            filters: Arc::new(filters),
            notifier,
            raw_rx,
        })
    }

    pub fn tree(&self) -> &WatchedTree {
        &self.tree
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    /// Start draining notifier events on a background task.
    ///
    /// Returns the filtered change stream and the handle owning the task.
    /// The stream closes when `cancel` fires (or [`WatchHandle::close`] is
    /// called); the notifier is released when the task ends.
    pub fn watch(self, cancel: CancellationToken) -> (mpsc::Receiver<ChangeEvent>, WatchHandle) {
        let (tx, rx) = mpsc::channel::<ChangeEvent>(CHANGE_CHANNEL_CAPACITY);

        let task_cancel = cancel.clone();
        let task = tokio::spawn(drain(self, tx, task_cancel));

        (rx, WatchHandle { cancel, task })
    }
}

/// Owner of the watcher's drain task.
#[derive(Debug)]
pub struct WatchHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl WatchHandle {
    /// Stop watching and wait for the drain task to finish.
    pub async fn close(self) -> Result<()> {
        self.cancel.cancel();
        self.join().await
    }

    /// Wait for the drain task to finish without requesting it.
    pub async fn join(self) -> Result<()> {
        self.task
            .await
            .map_err(|e| LeafError::Other(anyhow::anyhow!("watcher task failed: {e}")))
    }
}

async fn drain(watcher: TreeWatcher, tx: mpsc::Sender<ChangeEvent>, cancel: CancellationToken) {
    let TreeWatcher {
        tree,
        filters,
        notifier,
        mut raw_rx,
    } = watcher;

    debug!(root = %tree.root().display(), "watcher drain loop started");

    loop {
        let res = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            res = raw_rx.recv() => match res {
                Some(res) => res,
                None => break,
            },
        };

        match res {
            Ok(event) => {
                if !is_write(&event.kind) {
                    trace!(?event, "ignoring non-write event");
                    continue;
                }
                for path in event.paths {
                    if !filters.should_handle(&path) {
                        trace!(path = %path.display(), "change filtered out");
                        continue;
                    }
                    if !forward(&tx, ChangeEvent::Changed(path), &cancel).await {
                        break;
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, "notifier error");
                if !forward(&tx, ChangeEvent::Error(err.into()), &cancel).await {
                    break;
                }
            }
        }

        if cancel.is_cancelled() || tx.is_closed() {
            break;
        }
    }

    drop(notifier);
    debug!(root = %tree.root().display(), "watcher drain loop finished");
}

/// Send downstream unless cancellation wins first. `false` means stop.
async fn forward(tx: &mpsc::Sender<ChangeEvent>, event: ChangeEvent, cancel: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        sent = tx.send(event) => sent.is_ok(),
    }
}

/// Write-type notifications: data modifications, or modifications the
/// backend cannot classify further.
pub fn is_write(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any))
}
