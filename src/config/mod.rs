// src/config/mod.rs

//! Configuration loading and validation for leaf.
//!
//! Responsibilities:
//! - Define the serde data model (`model.rs`).
//! - Load a YAML / TOML / JSON file from disk (`loader.rs`).
//! - Apply defaults, layer CLI values and validate (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{ConfigFormat, ConfigSource, DEFAULT_CONFIG_FILE, load_from_path, load_settings};
pub use model::{ConfigFile, RawConfigFile, Settings};
pub use validate::parse_duration;
