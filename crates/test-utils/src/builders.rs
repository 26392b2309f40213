#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use leaf::config::{ConfigFile, RawConfigFile, Settings};
use leaf::fs::RealFileSystem;
use leaf::types::ParseErrorPolicy;

/// Builder for `Settings` to simplify test setup.
///
/// Goes through the same `RawConfigFile -> ConfigFile -> Settings` path as
/// the binary, so invalid input fails here just like it would at startup.
pub struct SettingsBuilder {
    raw: RawConfigFile,
    base_dir: PathBuf,
}

impl SettingsBuilder {
    /// `base_dir` doubles as the default root.
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            raw: RawConfigFile::default(),
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn root(mut self, root: &str) -> Self {
        self.raw.root = Some(root.to_string());
        self
    }

    pub fn exec(mut self, cmd: &str) -> Self {
        self.raw.exec.get_or_insert_with(Vec::new).push(cmd.to_string());
        self
    }

    pub fn exclude(mut self, path: &str) -> Self {
        self.raw.exclude.get_or_insert_with(Vec::new).push(path.to_string());
        self
    }

    pub fn filter(mut self, pattern: &str) -> Self {
        self.raw.filters.get_or_insert_with(Vec::new).push(pattern.to_string());
        self
    }

    pub fn exit_on_err(mut self, val: bool) -> Self {
        self.raw.exit_on_err = Some(val);
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.raw.delay = Some(format!("{}ms", delay.as_millis()));
        self
    }

    pub fn once(mut self, val: bool) -> Self {
        self.raw.once = Some(val);
        self
    }

    pub fn on_parse_error(mut self, policy: ParseErrorPolicy) -> Self {
        self.raw.on_parse_error = Some(policy);
        self
    }

    pub fn raw(&self) -> &RawConfigFile {
        &self.raw
    }

    pub fn try_build(self) -> leaf::errors::Result<Settings> {
        let cfg = ConfigFile::try_from(self.raw)?;
        Settings::resolve(cfg, &self.base_dir, &RealFileSystem)
    }

    pub fn build(self) -> Settings {
        self.try_build().expect("Failed to build valid settings from builder")
    }
}
