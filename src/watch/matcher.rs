// src/watch/matcher.rs

//! Single pattern vs. single path matching.
//!
//! A pattern matches a path when either
//! - the pattern, read as a shell wildcard (`*`, `?`, `[...]`), matches the
//!   whole path, where `*` never crosses a `/`; or
//! - the pattern names an existing directory and the path is that
//!   directory or lies somewhere below it.
//!
//! Matching is total: it never returns an error. A pattern that is not a
//! valid glob simply relies on the directory rule, and a pattern that
//! cannot be stat'ed is treated as "not a directory".

use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use tracing::debug;

use crate::fs::{FileSystem, RealFileSystem};
use crate::watch::path_utils::{clean_path, has_path_prefix};

/// A compiled, absolute pattern.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    pattern: PathBuf,
    glob: Option<GlobMatcher>,
}

impl PathMatcher {
    /// Compile a matcher for an absolute pattern. The pattern is cleaned
    /// first so it compares equal to cleaned event paths.
    pub fn new(pattern: &Path) -> Self {
        let pattern = if pattern.as_os_str().is_empty() {
            PathBuf::new()
        } else {
            clean_path(pattern)
        };

        let glob = if pattern.as_os_str().is_empty() {
            None
        } else {
            let raw = pattern.to_string_lossy();
            match GlobBuilder::new(&raw).literal_separator(true).build() {
                Ok(g) => Some(g.compile_matcher()),
                Err(e) => {
                    debug!(pattern = %raw, error = %e, "pattern is not a valid glob; directory rule only");
                    None
                }
            }
        };

        Self { pattern, glob }
    }

    pub fn pattern(&self) -> &Path {
        &self.pattern
    }

    /// Does `path` match this pattern? `fs` is consulted only to decide
    /// whether the pattern names a directory.
    pub fn matches(&self, fs: &dyn FileSystem, path: &Path) -> bool {
        if self.pattern.as_os_str().is_empty() || path.as_os_str().is_empty() {
            return false;
        }

        let path = clean_path(path);

        if let Some(glob) = &self.glob {
            if glob.is_match(&path) {
                return true;
            }
        }

        if !fs.is_dir(&self.pattern) {
            return false;
        }

        has_path_prefix(&path, &self.pattern)
    }
}

/// One-shot convenience over [`PathMatcher`] against the real filesystem.
pub fn matches(pattern: &str, path: &str) -> bool {
    PathMatcher::new(Path::new(pattern)).matches(&RealFileSystem, Path::new(path))
}
