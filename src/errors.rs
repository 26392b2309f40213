// src/errors.rs

//! Crate-wide error type and result alias.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeafError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("invalid filter pattern '{pattern}': {reason}")]
    InvalidFilter { pattern: String, reason: String },

    #[error("path '{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("watch error: {0}")]
    Notify(#[from] notify::Error),

    #[error("cannot parse command line: {0}")]
    CommandParse(String),

    #[error("empty command")]
    EmptyCommand,

    #[error("command `{command}` exited with status {}", status_label(.code))]
    CommandFailed { command: String, code: Option<i32> },

    #[error("cannot start command `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn status_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => c.to_string(),
        None => "<terminated by signal>".to_string(),
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, LeafError>;
