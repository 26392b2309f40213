// src/logging.rs

//! Logging setup for `leaf` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `--debug`
//! 3. `LEAF_LOG` environment variable (e.g. "info", "debug")
//! 4. default to `info`
//!
//! Logs are sent to STDERR so that stdout carries only the commands' own
//! output.

use anyhow::{Result, anyhow};
use tracing::Level;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

/// Environment variable read when no level flag is given.
pub const LOG_ENV_VAR: &str = "LEAF_LOG";

/// Initialise the global logging subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>, debug: bool) -> Result<()> {
    let env = std::env::var(LOG_ENV_VAR).ok();
    let level = resolve_level(cli_level, debug, env.as_deref());

    fmt()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {e}"))
}

/// Pick the effective level from the flag, `--debug` and the env value.
pub fn resolve_level(cli_level: Option<LogLevel>, debug: bool, env: Option<&str>) -> Level {
    if let Some(lvl) = cli_level {
        return level_from_log_level(lvl);
    }
    if debug {
        return Level::DEBUG;
    }
    env.and_then(parse_level_str).unwrap_or(Level::INFO)
}

fn level_from_log_level(lvl: LogLevel) -> Level {
    match lvl {
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_beats_debug_beats_env() {
        assert_eq!(resolve_level(Some(LogLevel::Warn), true, Some("trace")), Level::WARN);
        assert_eq!(resolve_level(None, true, Some("error")), Level::DEBUG);
        assert_eq!(resolve_level(None, false, Some("Trace")), Level::TRACE);
        assert_eq!(resolve_level(None, false, Some("loud")), Level::INFO);
        assert_eq!(resolve_level(None, false, None), Level::INFO);
    }
}
