// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::{ConfigSource, DEFAULT_CONFIG_FILE, RawConfigFile};
use crate::types::ParseErrorPolicy;

/// Command-line arguments for `leaf`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "leaf",
    version,
    about = "General purpose hot-reloader for all projects.",
    long_about = None
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Config file to read (`.yml`, `.toml` or `.json`).
    ///
    /// Default: `.leaf.yml` in the current working directory.
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Root directory to watch.
    #[arg(short = 'r', long, value_name = "DIR")]
    pub root: Option<String>,

    /// Directory to exclude from watching. `DEFAULTS` adds the built-in list.
    #[arg(short = 'e', long, value_name = "PATH")]
    pub exclude: Vec<String>,

    /// Filter pattern: `+ path-or-glob` to include, `- path-or-glob` to exclude.
    #[arg(short = 'f', long = "filters", value_name = "PATTERN", allow_hyphen_values = true)]
    pub filters: Vec<String>,

    /// Command to run on every change; repeat for a chain.
    #[arg(short = 'x', long, value_name = "CMD", allow_hyphen_values = true)]
    pub exec: Vec<String>,

    /// Stop the chain at the first failing command.
    #[arg(short = 'z', long)]
    pub exit_on_err: bool,

    /// Delay before reloading after a change, e.g. `500ms`, `2s`.
    #[arg(short = 'd', long, value_name = "DURATION")]
    pub delay: Option<String>,

    /// Run the commands once and exit, without watching.
    #[arg(short = 'o', long)]
    pub once: bool,

    /// What an unparseable command line does: `abort` the chain or `skip` it.
    #[arg(long, value_name = "POLICY")]
    pub on_parse_error: Option<ParseErrorPolicy>,

    /// Shorthand for `--log-level debug`.
    #[arg(long)]
    pub debug: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `--debug`, then `LEAF_LOG`, then `info` decide.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve settings and print them, but don't watch or run anything.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Print version information.
    Version,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl CliArgs {
    pub fn config_source(&self) -> ConfigSource {
        match &self.config {
            Some(path) => ConfigSource::Explicit(path.clone()),
            None => ConfigSource::Default(PathBuf::from(DEFAULT_CONFIG_FILE)),
        }
    }

    /// Values given on the command line, as a config layer. Flags that were
    /// not passed stay `None` so the file value survives the merge.
    pub fn overrides(&self) -> RawConfigFile {
        RawConfigFile {
            root: self.root.clone(),
            exclude: non_empty(&self.exclude),
            filters: non_empty(&self.filters),
            exec: non_empty(&self.exec),
            exit_on_err: self.exit_on_err.then_some(true),
            delay: self.delay.clone(),
            once: self.once.then_some(true),
            on_parse_error: self.on_parse_error,
        }
    }
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    (!values.is_empty()).then(|| values.to_vec())
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_flags_keep_order() {
        let args = CliArgs::parse_from([
            "leaf", "-x", "make build", "-x", "make run", "-f", "+ src/", "-f", "- src/gen",
        ]);
        assert_eq!(args.exec, vec!["make build", "make run"]);
        assert_eq!(args.filters, vec!["+ src/", "- src/gen"]);
    }

    #[test]
    fn unset_flags_do_not_override() {
        let args = CliArgs::parse_from(["leaf", "-d", "1s"]);
        let o = args.overrides();
        assert_eq!(o.delay.as_deref(), Some("1s"));
        assert!(o.exec.is_none());
        assert!(o.exit_on_err.is_none());
        assert!(o.once.is_none());
        assert_eq!(args.config_source(), ConfigSource::Default(PathBuf::from(".leaf.yml")));
    }

    #[test]
    fn explicit_config_and_switches() {
        let args = CliArgs::parse_from([
            "leaf", "-c", "conf/leaf.toml", "-z", "-o", "--debug", "--on-parse-error", "skip",
        ]);
        assert_eq!(
            args.config_source(),
            ConfigSource::Explicit(PathBuf::from("conf/leaf.toml"))
        );
        let o = args.overrides();
        assert_eq!(o.exit_on_err, Some(true));
        assert_eq!(o.once, Some(true));
        assert_eq!(o.on_parse_error, Some(ParseErrorPolicy::Skip));
        assert!(args.debug);
    }

    #[test]
    fn version_subcommand() {
        let args = CliArgs::parse_from(["leaf", "version"]);
        assert_eq!(args.command, Some(Command::Version));
    }
}
