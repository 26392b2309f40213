// src/config/validate.rs

use std::path::Path;
use std::time::Duration;

use crate::config::model::{ConfigFile, RawConfigFile, Settings};
use crate::engine::DEFAULT_DELAY;
use crate::errors::{LeafError, Result};
use crate::fs::FileSystem;
use crate::watch::filter::Pattern;
use crate::watch::path_utils::absolutize;
use crate::watch::tree::expand_exclude_defaults;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = LeafError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let exec = raw.exec.unwrap_or_default();
        ensure_has_commands(&exec)?;

        let delay = match raw.delay.as_deref() {
            Some(s) => parse_duration(s).map_err(|e| LeafError::Config(format!("invalid delay: {e}")))?,
            None => DEFAULT_DELAY,
        };

        Ok(ConfigFile {
            root: raw.root.filter(|r| !r.trim().is_empty()),
            exclude: raw.exclude.unwrap_or_default(),
            filters: raw.filters.unwrap_or_default(),
            exec,
            exit_on_err: raw.exit_on_err.unwrap_or(false),
            delay,
            once: raw.once.unwrap_or(false),
            on_parse_error: raw.on_parse_error.unwrap_or_default(),
        })
    }
}

fn ensure_has_commands(exec: &[String]) -> Result<()> {
    if exec.is_empty() {
        return Err(LeafError::Config(
            "no commands to run: set `exec` in the config file or pass --exec".to_string(),
        ));
    }
    Ok(())
}

impl Settings {
    /// Resolve paths against `base_dir`, expand `DEFAULTS` and check every
    /// filter and the root up front.
    pub fn resolve(cfg: ConfigFile, base_dir: &Path, fs: &dyn FileSystem) -> Result<Self> {
        if !base_dir.is_absolute() {
            return Err(LeafError::Config(format!(
                "base directory must be absolute, got {}",
                base_dir.display()
            )));
        }

        let root = match cfg.root.as_deref() {
            Some(r) => absolutize(base_dir, Path::new(r)),
            None => base_dir.to_path_buf(),
        };
        if !fs.is_dir(&root) {
            return Err(LeafError::NotADirectory(root));
        }

        for raw in &cfg.filters {
            Pattern::parse(raw, base_dir)?;
        }

        Ok(Settings {
            root,
            exclude: expand_exclude_defaults(&cfg.exclude),
            filters: cfg.filters,
            exec: cfg.exec,
            exit_on_err: cfg.exit_on_err,
            delay: cfg.delay,
            once: cfg.once,
            on_parse_error: cfg.on_parse_error,
            base_dir: base_dir.to_path_buf(),
        })
    }
}

/// Parse `"500ms"`, `"2s"`, `"1m"` or `"1h"`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| format!("duration '{s}' is missing a unit suffix"))?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{num_part}': {e}"))?;

    let unit = unit_part.trim().to_lowercase();
    let secs_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => return Err(format!("unsupported duration unit '{unit}'; expected ms, s, m, or h")),
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{s}' is too large"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use std::path::PathBuf;

    fn raw_with_exec() -> RawConfigFile {
        RawConfigFile {
            exec: Some(vec!["make run".to_string()]),
            ..Default::default()
        }
    }

    #[test]
    fn durations() {
        assert_eq!(parse_duration("500ms"), Ok(Duration::from_millis(500)));
        assert_eq!(parse_duration(" 2s "), Ok(Duration::from_secs(2)));
        assert_eq!(parse_duration("3m"), Ok(Duration::from_secs(180)));
        assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));
        assert!(parse_duration("").is_err());
        assert!(parse_duration("10").is_err());
        assert!(parse_duration("ms").is_err());
        assert!(parse_duration("5d").is_err());
    }

    #[test]
    fn oversized_durations_are_rejected() {
        assert!(parse_duration("6000000000000000h").is_err());
        assert!(parse_duration("400000000000000000m").is_err());
        assert_eq!(
            parse_duration("18446744073709551615s"),
            Ok(Duration::from_secs(u64::MAX))
        );
    }

    #[test]
    fn defaults_are_applied() {
        let cfg = ConfigFile::try_from(raw_with_exec()).unwrap();
        assert_eq!(cfg.delay(), DEFAULT_DELAY);
        assert!(!cfg.exit_on_err());
        assert!(!cfg.once());
        assert_eq!(cfg.on_parse_error(), crate::types::ParseErrorPolicy::Abort);
        assert!(cfg.root().is_none());
    }

    #[test]
    fn missing_exec_is_rejected() {
        let err = ConfigFile::try_from(RawConfigFile::default()).unwrap_err();
        assert!(matches!(err, LeafError::Config(_)));
    }

    #[test]
    fn bad_delay_is_rejected() {
        let raw = RawConfigFile {
            delay: Some("soon".to_string()),
            ..raw_with_exec()
        };
        assert!(matches!(ConfigFile::try_from(raw), Err(LeafError::Config(_))));
    }

    #[test]
    fn resolve_uses_base_dir_and_expands_defaults() {
        let fs = MockFileSystem::new();
        fs.add_dir("/work/app");

        let raw = RawConfigFile {
            root: Some("app".to_string()),
            exclude: Some(vec!["DEFAULTS".to_string(), "target/".to_string()]),
            filters: Some(vec!["+ app/src".to_string()]),
            ..raw_with_exec()
        };
        let cfg = ConfigFile::try_from(raw).unwrap();
        let settings = Settings::resolve(cfg, Path::new("/work"), &fs).unwrap();

        assert_eq!(settings.root, PathBuf::from("/work/app"));
        assert_eq!(settings.base_dir, PathBuf::from("/work"));
        assert!(settings.exclude.contains(&".git/".to_string()));
        assert!(settings.exclude.contains(&"target/".to_string()));
        assert!(!settings.exclude.contains(&"DEFAULTS".to_string()));
    }

    #[test]
    fn resolve_rejects_missing_root() {
        let fs = MockFileSystem::new();
        let cfg = ConfigFile::try_from(RawConfigFile {
            root: Some("/nowhere".to_string()),
            ..raw_with_exec()
        })
        .unwrap();
        let err = Settings::resolve(cfg, Path::new("/"), &fs).unwrap_err();
        assert!(matches!(err, LeafError::NotADirectory(_)));
    }

    #[test]
    fn resolve_rejects_bad_filter() {
        let fs = MockFileSystem::new();
        let cfg = ConfigFile::try_from(RawConfigFile {
            filters: Some(vec!["src/".to_string()]),
            ..raw_with_exec()
        })
        .unwrap();
        let err = Settings::resolve(cfg, Path::new("/"), &fs).unwrap_err();
        assert!(matches!(err, LeafError::InvalidFilter { .. }));
    }
}
