// src/watch/path_utils.rs

//! Lexical path helpers shared by the matcher, the filters and the watcher.

use std::path::{Component, Path, PathBuf};

use crate::fs::FileSystem;

/// Lexically clean a path: drop `.` components, resolve `..` against the
/// preceding component and collapse redundant separators.
///
/// This never touches the filesystem, so symlinks are not resolved.
/// `..` at the root stays at the root; leading `..` in a relative path is
/// kept.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();

    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(comp),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Make `path` absolute against `base` (when relative) and clean it.
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        clean_path(path)
    } else {
        clean_path(&base.join(path))
    }
}

/// True if `path` equals `prefix` or lies underneath it.
///
/// Comparison is per component, so `/foo` is a prefix of `/foo/bar` but
/// not of `/foobar`.
pub fn has_path_prefix(path: &Path, prefix: &Path) -> bool {
    path.starts_with(prefix)
}

/// Resolve symlinks in the longest existing prefix of an absolute `path`
/// and re-attach the remaining components.
///
/// Glob components never exist on disk, so they are kept verbatim. If
/// nothing resolves, `path` is returned unchanged.
pub fn canonical_prefix(fs: &dyn FileSystem, path: &Path) -> PathBuf {
    let mut existing = path;
    let mut rest = Vec::new();

    loop {
        if fs.exists(existing) {
            return match fs.canonicalize(existing) {
                Ok(canon) => rest.iter().rev().fold(canon, |acc, name| acc.join(name)),
                Err(_) => path.to_path_buf(),
            };
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                rest.push(name);
                existing = parent;
            }
            _ => return path.to_path_buf(),
        }
    }
}
