// src/watch/mod.rs

//! File watching and change filtering.
//!
//! This module is responsible for:
//! - Matching paths against glob or directory-prefix patterns.
//! - Compiling `+`/`-` filter strings into an include/exclude set.
//! - Enumerating the watched tree and registering it with `notify`.
//! - Turning raw write events into a filtered stream of changes.
//!
//! It knows nothing about commands; it only produces [`ChangeEvent`]s.

pub mod filter;
pub mod matcher;
pub mod path_utils;
pub mod tree;
pub mod watcher;

pub use filter::{FilterSet, Pattern};
pub use matcher::PathMatcher;
pub use tree::{DEFAULT_EXCLUDE_KEYWORD, DEFAULT_EXCLUDE_PATHS, WatchedTree, expand_exclude_defaults};
pub use watcher::{ChangeEvent, TreeWatcher, WatchHandle, WatchOptions};
