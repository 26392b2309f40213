// src/exec/command.rs

use std::fmt;

use crate::errors::{LeafError, Result};

/// A parsed command line: executable plus ordered arguments.
///
/// Parsing follows POSIX shell quoting, so `make run "arg with space"`
/// yields three words. No shell is involved when the command runs: pipes,
/// redirects and globs are passed through literally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    executable: String,
    args: Vec<String>,
}

impl CommandSpec {
    /// Parse a raw command line. Blank input is an error, not a no-op.
    pub fn parse(line: &str) -> Result<Self> {
        let words = shlex::split(line)
            .ok_or_else(|| LeafError::CommandParse(format!("unbalanced quoting in `{line}`")))?;

        let mut words = words.into_iter();
        let executable = words.next().ok_or(LeafError::EmptyCommand)?;
        if executable.is_empty() {
            return Err(LeafError::EmptyCommand);
        }

        Ok(Self {
            executable,
            args: words.collect(),
        })
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words = std::iter::once(self.executable.as_str()).chain(self.args.iter().map(String::as_str));
        match shlex::try_join(words) {
            Ok(joined) => f.write_str(&joined),
            // Only words with NUL bytes cannot be quoted; show them raw.
            Err(_) => write!(f, "{} {}", self.executable, self.args.join(" ")),
        }
    }
}
