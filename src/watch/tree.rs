// src/watch/tree.rs

//! Snapshot of the directories registered with the OS notifier.
//!
//! The tree is enumerated once, when the watcher is built. Directories
//! created afterwards are not picked up until leaf is restarted.

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::errors::{LeafError, Result};
use crate::fs::FileSystem;
use crate::watch::path_utils::{absolutize, has_path_prefix};

/// Excluded when the user gives no `exclude` list, or writes `DEFAULTS`
/// inside one.
pub const DEFAULT_EXCLUDE_PATHS: &[&str] = &[".git/", "node_modules/", "vendor/", "venv/"];

/// Keyword that expands to [`DEFAULT_EXCLUDE_PATHS`].
pub const DEFAULT_EXCLUDE_KEYWORD: &str = "DEFAULTS";

/// Expand the `DEFAULTS` keyword; an empty list means the defaults.
pub fn expand_exclude_defaults(exclude: &[String]) -> Vec<String> {
    if exclude.is_empty() {
        return DEFAULT_EXCLUDE_PATHS.iter().map(|s| s.to_string()).collect();
    }

    let mut out = Vec::with_capacity(exclude.len());
    for e in exclude {
        if e.trim() == DEFAULT_EXCLUDE_KEYWORD {
            out.extend(DEFAULT_EXCLUDE_PATHS.iter().map(|s| s.to_string()));
        } else {
            out.push(e.clone());
        }
    }
    out
}

/// Root plus the directories actually registered for notifications.
#[derive(Debug, Clone)]
pub struct WatchedTree {
    root: PathBuf,
    excluded: Vec<PathBuf>,
    dirs: Vec<PathBuf>,
}

impl WatchedTree {
    /// Validate `root`, resolve `exclude` against `base` and enumerate
    /// every directory under `root` (root included) that is not below one
    /// of the resolved exclude paths.
    ///
    /// Exclude entries that do not name an existing directory are dropped:
    /// they could never match anything.
    pub fn scan(fs: &dyn FileSystem, root: &Path, exclude: &[String], base: &Path) -> Result<Self> {
        let root_abs = absolutize(base, root);
        if !fs.is_dir(&root_abs) {
            return Err(LeafError::NotADirectory(root.to_path_buf()));
        }
        let root = fs.canonicalize(&root_abs)?;

        let mut excluded = Vec::new();
        for entry in exclude {
            let abs = absolutize(base, Path::new(entry.trim()));
            if !fs.is_dir(&abs) {
                trace!(exclude = %entry, "exclude path is not a directory; ignoring");
                continue;
            }
            // Keep excludes comparable with the canonical root.
            let abs = fs.canonicalize(&abs).unwrap_or(abs);
            excluded.push(abs);
        }

        let dirs = enumerate_dirs(fs, &root, &excluded)?;
        debug!(
            root = %root.display(),
            dirs = dirs.len(),
            excluded = excluded.len(),
            "enumerated watch tree"
        );

        Ok(Self {
            root,
            excluded,
            dirs,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn excluded(&self) -> &[PathBuf] {
        &self.excluded
    }

    /// Directories to register, sorted.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    pub fn is_excluded(&self, path: &Path) -> bool {
        is_excluded(path, &self.excluded)
    }
}

fn is_excluded(path: &Path, excluded: &[PathBuf]) -> bool {
    excluded.iter().any(|e| has_path_prefix(path, e))
}

/// Depth-first walk collecting `root` and every directory below it.
///
/// Excluded directories are not descended into; symlinked directories are
/// not followed.
pub fn enumerate_dirs(fs: &dyn FileSystem, root: &Path, excluded: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    if is_excluded(root, excluded) {
        return Ok(dirs);
    }

    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for path in fs.read_dir(&dir)? {
            if fs.is_symlink(&path) || !fs.is_dir(&path) {
                continue;
            }
            if is_excluded(&path, excluded) {
                trace!(dir = %path.display(), "skipping excluded directory");
                continue;
            }
            stack.push(path);
        }
        dirs.push(dir);
    }

    dirs.sort();
    Ok(dirs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn project() -> MockFileSystem {
        let fs = MockFileSystem::new();
        fs.add_file("/proj/main.go");
        fs.add_file("/proj/cmd/leaf/main.go");
        fs.add_file("/proj/.git/HEAD");
        fs.add_file("/proj/.git/refs/heads/main");
        fs.add_file("/proj/node_modules/x/index.js");
        fs.add_file("/proj/node_modules_extra/y.js");
        fs.add_symlink("/proj/link");
        fs
    }

    fn strings(paths: &[PathBuf]) -> Vec<String> {
        paths.iter().map(|p| p.display().to_string()).collect()
    }

    #[test]
    fn defaults_expand() {
        assert_eq!(expand_exclude_defaults(&[]).len(), DEFAULT_EXCLUDE_PATHS.len());

        let out = expand_exclude_defaults(&["DEFAULTS".to_string(), "build/".to_string()]);
        assert_eq!(out.len(), DEFAULT_EXCLUDE_PATHS.len() + 1);
        assert_eq!(out.last().map(String::as_str), Some("build/"));

        let out = expand_exclude_defaults(&["build/".to_string()]);
        assert_eq!(out, vec!["build/".to_string()]);
    }

    #[test]
    fn scan_enumerates_all_dirs_minus_excluded() {
        let fs = project();
        let tree = WatchedTree::scan(
            &fs,
            Path::new("/proj"),
            &expand_exclude_defaults(&[]),
            Path::new("/proj"),
        )
        .unwrap();

        assert_eq!(
            strings(tree.dirs()),
            vec![
                "/proj",
                "/proj/cmd",
                "/proj/cmd/leaf",
                "/proj/node_modules_extra",
            ]
        );
        assert!(tree.is_excluded(Path::new("/proj/.git/refs")));
        assert!(!tree.is_excluded(Path::new("/proj/node_modules_extra")));
    }

    #[test]
    fn missing_excludes_are_ignored() {
        let fs = project();
        let tree = WatchedTree::scan(
            &fs,
            Path::new("/proj"),
            &["does-not-exist/".to_string(), "main.go".to_string()],
            Path::new("/proj"),
        )
        .unwrap();
        assert!(tree.excluded().is_empty());
        assert!(tree.dirs().contains(&PathBuf::from("/proj/.git")));
    }

    #[test]
    fn relative_root_resolves_against_base() {
        let fs = project();
        let tree = WatchedTree::scan(&fs, Path::new("cmd"), &[], Path::new("/proj")).unwrap();
        assert_eq!(tree.root(), Path::new("/proj/cmd"));
        assert_eq!(strings(tree.dirs()), vec!["/proj/cmd", "/proj/cmd/leaf"]);
    }

    #[test]
    fn root_must_be_a_directory() {
        let fs = project();
        let err = WatchedTree::scan(&fs, Path::new("/proj/main.go"), &[], Path::new("/")).unwrap_err();
        assert!(matches!(err, LeafError::NotADirectory(_)));

        let err = WatchedTree::scan(&fs, Path::new("/nowhere"), &[], Path::new("/")).unwrap_err();
        assert!(matches!(err, LeafError::NotADirectory(_)));
    }

    #[test]
    fn excluding_the_root_registers_nothing() {
        let fs = project();
        let tree = WatchedTree::scan(&fs, Path::new("/proj"), &["/proj".to_string()], Path::new("/")).unwrap();
        assert!(tree.dirs().is_empty());
    }
}
