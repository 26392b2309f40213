// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info};

use crate::config::model::{ConfigFile, RawConfigFile, Settings};
use crate::errors::{LeafError, Result};
use crate::fs::FileSystem;

/// Config file looked up in the working directory when `--config` is not
/// given.
pub const DEFAULT_CONFIG_FILE: &str = ".leaf.yml";

/// On-disk formats, picked by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
    Json,
}

impl ConfigFormat {
    /// `.toml` and `.json` are recognised; anything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("toml") => ConfigFormat::Toml,
            Some("json") => ConfigFormat::Json,
            _ => ConfigFormat::Yaml,
        }
    }
}

/// Deserialize a config document without validating it.
pub fn parse_str(contents: &str, format: ConfigFormat) -> Result<RawConfigFile> {
    let raw = match format {
        ConfigFormat::Toml => toml::from_str(contents)?,
        ConfigFormat::Json => serde_json::from_str(contents)?,
        // An empty YAML document is a valid, empty config.
        ConfigFormat::Yaml if contents.trim().is_empty() => RawConfigFile::default(),
        ConfigFormat::Yaml => serde_yaml::from_str(contents)?,
    };
    Ok(raw)
}

/// Load a config file and return the raw `RawConfigFile`.
///
/// This only deserializes; it does **not** apply defaults or validate.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;

    parse_str(&contents, ConfigFormat::from_path(path))
}

/// Where the config file comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// The default `.leaf.yml`; a missing file is fine.
    Default(PathBuf),
    /// Passed with `--config`; a missing file is an error.
    Explicit(PathBuf),
}

impl ConfigSource {
    pub fn path(&self) -> &Path {
        match self {
            ConfigSource::Default(p) | ConfigSource::Explicit(p) => p,
        }
    }
}

/// Read the config file (if any), layer the CLI `overrides` on top,
/// validate, and resolve paths against `base_dir`.
pub fn load_settings(
    source: &ConfigSource,
    overrides: RawConfigFile,
    base_dir: &Path,
    fs: &dyn FileSystem,
) -> Result<Settings> {
    let path = crate::watch::path_utils::absolutize(base_dir, source.path());

    let from_file = match source {
        ConfigSource::Default(_) if !fs.exists(&path) => {
            info!(path = %path.display(), "no config file found; using command-line values");
            RawConfigFile::default()
        }
        ConfigSource::Explicit(_) if !fs.exists(&path) => {
            return Err(LeafError::Config(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
        _ => {
            debug!(path = %path.display(), "loading config file");
            load_from_path(&path)?
        }
    };

    let cfg = ConfigFile::try_from(from_file.merge(overrides))?;
    Settings::resolve(cfg, base_dir, fs)
}
