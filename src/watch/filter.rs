// src/watch/filter.rs

//! Include / exclude filters over changed paths.
//!
//! Filters are written as `"+ <path-or-glob>"` or `"- <path-or-glob>"`.
//! The decision for a path is:
//!
//! - no include filters, or at least one include matches -> handle it;
//! - any exclude matches -> do not handle it, whatever the includes say.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::errors::{LeafError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::types::Direction;
use crate::watch::matcher::PathMatcher;
use crate::watch::path_utils::{absolutize, canonical_prefix};

/// A directional rule with an absolute, cleaned path or glob.
#[derive(Debug, Clone)]
pub struct Pattern {
    direction: Direction,
    matcher: PathMatcher,
}

impl Pattern {
    /// Parse `"+ src/"`, `"-*.tmp"`, ... Relative paths are resolved
    /// against `base`.
    pub fn parse(raw: &str, base: &Path) -> Result<Self> {
        let trimmed = raw.trim();

        let mut chars = trimmed.chars();
        let marker = chars.next().ok_or_else(|| invalid(raw, "empty pattern"))?;
        let direction = Direction::from_marker(marker)
            .ok_or_else(|| invalid(raw, "should have the first character as '+' or '-'"))?;

        let path = chars.as_str().trim();
        if path.is_empty() {
            return Err(invalid(raw, "missing path after the marker"));
        }
        if !base.is_absolute() {
            return Err(invalid(
                raw,
                &format!("base directory {} is not absolute", base.display()),
            ));
        }

        let abs = absolutize(base, Path::new(path));
        Ok(Self {
            direction,
            matcher: PathMatcher::new(&abs),
        })
    }

    /// Like [`parse`](Self::parse), then resolve symlinks in the existing
    /// part of the path so it compares equal to the paths the notifier
    /// reports under the canonical root.
    pub fn resolve(raw: &str, base: &Path, fs: &dyn FileSystem) -> Result<Self> {
        let parsed = Self::parse(raw, base)?;
        let canon = canonical_prefix(fs, parsed.path());
        Ok(Self {
            direction: parsed.direction,
            matcher: PathMatcher::new(&canon),
        })
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn path(&self) -> &Path {
        self.matcher.pattern()
    }

    pub fn matches(&self, fs: &dyn FileSystem, path: &Path) -> bool {
        self.matcher.matches(fs, path)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.direction.marker(), self.path().display())
    }
}

fn invalid(pattern: &str, reason: &str) -> LeafError {
    LeafError::InvalidFilter {
        pattern: pattern.to_string(),
        reason: reason.to_string(),
    }
}

/// Ordered include and exclude patterns, built once and never mutated.
#[derive(Clone)]
pub struct FilterSet {
    includes: Vec<Pattern>,
    excludes: Vec<Pattern>,
    fs: Arc<dyn FileSystem>,
}

impl fmt::Debug for FilterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterSet")
            .field("includes", &self.includes)
            .field("excludes", &self.excludes)
            .finish_non_exhaustive()
    }
}

impl FilterSet {
    /// Parse every raw filter; the first bad one fails the whole set.
    pub fn from_patterns<S: AsRef<str>>(raw: &[S], base: &Path) -> Result<Self> {
        Self::with_fs(raw, base, Arc::new(RealFileSystem))
    }

    pub fn with_fs<S: AsRef<str>>(
        raw: &[S],
        base: &Path,
        fs: Arc<dyn FileSystem>,
    ) -> Result<Self> {
        let mut includes = Vec::new();
        let mut excludes = Vec::new();

        for r in raw {
            let pattern = Pattern::resolve(r.as_ref(), base, fs.as_ref())?;
            match pattern.direction() {
                Direction::Include => includes.push(pattern),
                Direction::Exclude => excludes.push(pattern),
            }
        }

        Ok(Self {
            includes,
            excludes,
            fs,
        })
    }

    /// A set that handles every path.
    pub fn allow_all() -> Self {
        Self {
            includes: Vec::new(),
            excludes: Vec::new(),
            fs: Arc::new(RealFileSystem),
        }
    }

    pub fn includes(&self) -> &[Pattern] {
        &self.includes
    }

    pub fn excludes(&self) -> &[Pattern] {
        &self.excludes
    }

    pub fn has_include(&self, path: &Path) -> bool {
        self.includes.iter().any(|p| p.matches(self.fs.as_ref(), path))
    }

    pub fn has_exclude(&self, path: &Path) -> bool {
        self.excludes.iter().any(|p| p.matches(self.fs.as_ref(), path))
    }

    /// Should a change to `path` trigger a reload? Excludes always win.
    pub fn should_handle(&self, path: &Path) -> bool {
        if self.has_exclude(path) {
            return false;
        }
        self.includes.is_empty() || self.has_include(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn mock_fs() -> Arc<MockFileSystem> {
        let fs = MockFileSystem::new();
        fs.add_file("/a/b/file.rs");
        fs.add_file("/a/c/file.rs");
        fs.add_file("/x/file");
        fs.add_file("/y");
        Arc::new(fs)
    }

    fn set(raw: &[&str]) -> FilterSet {
        FilterSet::with_fs(raw, Path::new("/"), mock_fs()).unwrap()
    }

    #[test]
    fn pattern_requires_marker() {
        let err = Pattern::parse("src/", Path::new("/proj")).unwrap_err();
        assert!(matches!(err, LeafError::InvalidFilter { .. }));
    }

    #[test]
    fn pattern_requires_path() {
        assert!(Pattern::parse("+", Path::new("/proj")).is_err());
        assert!(Pattern::parse("  -   ", Path::new("/proj")).is_err());
        assert!(Pattern::parse("", Path::new("/proj")).is_err());
    }

    #[test]
    fn pattern_is_made_absolute_against_base() {
        let p = Pattern::parse("+ ./src/../cmd/", Path::new("/proj")).unwrap();
        assert_eq!(p.direction(), Direction::Include);
        assert_eq!(p.path(), Path::new("/proj/cmd"));

        let p = Pattern::parse("-*.tmp", Path::new("/proj")).unwrap();
        assert_eq!(p.direction(), Direction::Exclude);
        assert_eq!(p.path(), Path::new("/proj/*.tmp"));
        assert_eq!(p.to_string(), "- /proj/*.tmp");
    }

    #[test]
    fn exclude_overrides_include() {
        let f = set(&["+ /a", "- /a/b"]);
        assert!(!f.should_handle(Path::new("/a/b")));
        assert!(!f.should_handle(Path::new("/a/b/file.rs")));
        assert!(f.should_handle(Path::new("/a/c")));
        assert!(f.should_handle(Path::new("/a/c/file.rs")));
    }

    #[test]
    fn no_includes_means_everything_but_excludes() {
        let f = set(&["- /x"]);
        assert!(f.should_handle(Path::new("/y")));
        assert!(!f.should_handle(Path::new("/x/file")));
    }

    #[test]
    fn includes_restrict_to_included_paths() {
        let f = set(&["+ /a/*/file.rs"]);
        assert!(f.should_handle(Path::new("/a/c/file.rs")));
        assert!(!f.should_handle(Path::new("/x/file")));
    }

    #[test]
    fn one_bad_pattern_fails_the_whole_set() {
        let err = FilterSet::with_fs(&["+ /a", "oops"], Path::new("/"), mock_fs()).unwrap_err();
        assert!(err.to_string().contains("oops"));
    }

    #[test]
    fn empty_set_handles_everything() {
        let f = FilterSet::allow_all();
        assert!(f.should_handle(Path::new("/anything/at/all")));
    }
}
