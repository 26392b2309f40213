use std::str::FromStr;
use serde::Deserialize;

/// What a command-line parse failure does to the rest of the chain.
///
/// - `Abort`: report the error and end the run (default).
/// - `Skip`: report the error and carry on with the next command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseErrorPolicy {
    #[default]
    Abort,
    Skip,
}

impl FromStr for ParseErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "abort" => Ok(ParseErrorPolicy::Abort),
            "skip" => Ok(ParseErrorPolicy::Skip),
            other => Err(format!(
                "invalid on_parse_error: {other} (expected \"abort\" or \"skip\")"
            )),
        }
    }
}

/// Direction of a filter pattern: `+` includes, `-` excludes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Include,
    Exclude,
}

impl Direction {
    pub fn from_marker(c: char) -> Option<Self> {
        match c {
            '+' => Some(Direction::Include),
            '-' => Some(Direction::Exclude),
            _ => None,
        }
    }

    pub fn marker(self) -> char {
        match self {
            Direction::Include => '+',
            Direction::Exclude => '-',
        }
    }
}
