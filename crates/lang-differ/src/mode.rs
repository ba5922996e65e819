//! Output rendering modes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DiffError;

/// How a string diff is rendered. Only affects formatting, never which
/// changes are reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffMode {
    /// Fenced ```` ```diff ```` block, ready to embed in a Markdown comment.
    #[default]
    Codeblock,

    /// Bare diff lines.
    Plain,
}

impl DiffMode {
    pub fn name(&self) -> &'static str {
        match self {
            DiffMode::Codeblock => "codeblock",
            DiffMode::Plain => "plain",
        }
    }
}

impl fmt::Display for DiffMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DiffMode {
    type Err = DiffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "codeblock" => Ok(DiffMode::Codeblock),
            "plain" => Ok(DiffMode::Plain),
            other => Err(DiffError::UnknownMode(other.to_string())),
        }
    }
}
