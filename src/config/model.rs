// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::types::ParseErrorPolicy;

/// Configuration as read from a `.leaf.yml` / `.toml` / `.json` file.
///
/// ```yaml
/// root: .
/// exclude:
///   - DEFAULTS
///   - target/
/// filters:
///   - "+ src/"
///   - "- src/**/*_test.go"
/// exec:
///   - make build
///   - make run
/// exit_on_err: true
/// delay: 1s
/// ```
///
/// Every field is optional so that CLI flags can fill the gaps; the same
/// struct carries the flag values and [`merge`](Self::merge) layers them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    /// Directory to watch. Defaults to the working directory.
    #[serde(default)]
    pub root: Option<String>,

    /// Directories to leave unwatched. `DEFAULTS` expands to the built-in
    /// list; empty means the built-in list.
    #[serde(default)]
    pub exclude: Option<Vec<String>>,

    /// `"+ path-or-glob"` / `"- path-or-glob"` rules.
    #[serde(default)]
    pub filters: Option<Vec<String>>,

    /// Command lines run in order on every reload.
    #[serde(default)]
    pub exec: Option<Vec<String>>,

    #[serde(default)]
    pub exit_on_err: Option<bool>,

    /// Debounce delay, e.g. `"500ms"` or `"2s"`.
    #[serde(default)]
    pub delay: Option<String>,

    #[serde(default)]
    pub once: Option<bool>,

    #[serde(default)]
    pub on_parse_error: Option<ParseErrorPolicy>,
}

impl RawConfigFile {
    /// Layer `overrides` on top of `self`: every field set in `overrides`
    /// wins.
    pub fn merge(self, overrides: RawConfigFile) -> RawConfigFile {
        RawConfigFile {
            root: overrides.root.or(self.root),
            exclude: overrides.exclude.or(self.exclude),
            filters: overrides.filters.or(self.filters),
            exec: overrides.exec.or(self.exec),
            exit_on_err: overrides.exit_on_err.or(self.exit_on_err),
            delay: overrides.delay.or(self.delay),
            once: overrides.once.or(self.once),
            on_parse_error: overrides.on_parse_error.or(self.on_parse_error),
        }
    }
}

/// Validated configuration with defaults applied.
///
/// Paths are still as written; [`Settings`] resolves them.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub(crate) root: Option<String>,
    pub(crate) exclude: Vec<String>,
    pub(crate) filters: Vec<String>,
    pub(crate) exec: Vec<String>,
    pub(crate) exit_on_err: bool,
    pub(crate) delay: Duration,
    pub(crate) once: bool,
    pub(crate) on_parse_error: ParseErrorPolicy,
}

impl ConfigFile {
    pub fn root(&self) -> Option<&str> {
        self.root.as_deref()
    }

    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    pub fn filters(&self) -> &[String] {
        &self.filters
    }

    pub fn exec(&self) -> &[String] {
        &self.exec
    }

    pub fn exit_on_err(&self) -> bool {
        self.exit_on_err
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn once(&self) -> bool {
        self.once
    }

    pub fn on_parse_error(&self) -> ParseErrorPolicy {
        self.on_parse_error
    }
}

/// Everything a run needs, resolved against the startup working directory.
///
/// Built once in [`crate::run`] and passed down by reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Absolute watch root.
    pub root: PathBuf,
    /// Exclude entries with `DEFAULTS` expanded, still relative to `base_dir`.
    pub exclude: Vec<String>,
    /// Filter strings; each has been checked to parse.
    pub filters: Vec<String>,
    pub exec: Vec<String>,
    pub exit_on_err: bool,
    pub delay: Duration,
    pub once: bool,
    pub on_parse_error: ParseErrorPolicy,
    /// Working directory captured at startup.
    pub base_dir: PathBuf,
}
