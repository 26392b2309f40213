use std::path::{Path, PathBuf};
use std::sync::Mutex;

use leaf::engine::Observer;
use leaf::errors::LeafError;
use leaf::exec::CommandSpec;

/// One observer callback, with its argument rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hook {
    ChainStart(String),
    ChainError(String),
    ChainExit,
    WatchError(String),
    FileChanged(PathBuf),
}

/// Observer that records every hook call in order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    hooks: Mutex<Vec<Hook>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hooks(&self) -> Vec<Hook> {
        self.hooks.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Hook) -> bool) -> usize {
        self.hooks.lock().unwrap().iter().filter(|h| pred(h)).count()
    }

    /// Commands started so far, in order.
    pub fn started(&self) -> Vec<String> {
        self.hooks
            .lock()
            .unwrap()
            .iter()
            .filter_map(|h| match h {
                Hook::ChainStart(cmd) => Some(cmd.clone()),
                _ => None,
            })
            .collect()
    }

    fn push(&self, hook: Hook) {
        self.hooks.lock().unwrap().push(hook);
    }
}

impl Observer for RecordingObserver {
    fn on_chain_start(&self, command: &CommandSpec) {
        self.push(Hook::ChainStart(command.to_string()));
    }

    fn on_chain_error(&self, error: &LeafError) {
        self.push(Hook::ChainError(error.to_string()));
    }

    fn on_chain_exit(&self) {
        self.push(Hook::ChainExit);
    }

    fn on_watch_error(&self, error: &LeafError) {
        self.push(Hook::WatchError(error.to_string()));
    }

    fn on_file_changed(&self, path: &Path) {
        self.push(Hook::FileChanged(path.to_path_buf()));
    }
}
