// src/fs/mock.rs

use super::FileSystem;
use crate::errors::{LeafError, Result};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File,
    Dir(Vec<String>), // List of child names
    Symlink,
}

/// In-memory filesystem for tests. Paths are stored exactly as given, so
/// tests should use absolute paths throughout.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    entries: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        entries.insert(PathBuf::from("/"), MockEntry::Dir(Vec::new()));

        Self {
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    pub fn add_file(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::File);
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut entries = self.lock();
        ensure_dir_entry(&mut entries, path);
    }

    /// A symlink entry is listed by its parent but never descended into.
    pub fn add_symlink(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::Symlink);
    }

    fn insert(&self, path: &Path, entry: MockEntry) {
        let mut entries = self.lock();
        entries.insert(path.to_path_buf(), entry);
        if let Some(parent) = path.parent() {
            ensure_dir_entry(&mut entries, parent);
            link_child(&mut entries, parent, path);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, MockEntry>> {
        // A poisoned lock only means another test thread panicked.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn ensure_dir_entry(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    if entries.contains_key(path) {
        return;
    }
    entries.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
    if let Some(parent) = path.parent() {
        ensure_dir_entry(entries, parent);
        link_child(entries, parent, path);
    }
}

fn link_child(entries: &mut HashMap<PathBuf, MockEntry>, parent: &Path, child: &Path) {
    if let Some(MockEntry::Dir(children)) = entries.get_mut(parent) {
        if let Some(name) = child.file_name().and_then(|n| n.to_str()) {
            if !children.iter().any(|c| c == name) {
                children.push(name.to_string());
            }
        }
    }
}

fn not_found(path: &Path) -> LeafError {
    LeafError::Io(io::Error::new(
        io::ErrorKind::NotFound,
        format!("not found: {}", path.display()),
    ))
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.lock().contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.lock().get(path), Some(MockEntry::Dir(_)))
    }

    fn is_symlink(&self, path: &Path) -> bool {
        matches!(self.lock().get(path), Some(MockEntry::Symlink))
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        // No symlink resolution in the mock: an existing path is its own
        // canonical form.
        if self.lock().contains_key(path) {
            Ok(path.to_path_buf())
        } else {
            Err(not_found(path))
        }
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        match self.lock().get(path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(not_found(path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parents_are_created_implicitly() {
        let fs = MockFileSystem::new();
        fs.add_file("/proj/src/main.rs");

        assert!(fs.is_dir(Path::new("/proj")));
        assert!(fs.is_dir(Path::new("/proj/src")));
        assert!(!fs.is_dir(Path::new("/proj/src/main.rs")));

        let listed = fs.read_dir(Path::new("/proj")).unwrap();
        assert_eq!(listed, vec![PathBuf::from("/proj/src")]);
    }

    #[test]
    fn read_dir_on_missing_path_fails() {
        let fs = MockFileSystem::new();
        assert!(fs.read_dir(Path::new("/nope")).is_err());
        assert!(fs.canonicalize(Path::new("/nope")).is_err());
    }
}
