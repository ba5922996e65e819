//! Run configuration, built once at startup and injected into the pipeline.

use std::fmt;

use lang_differ::DiffMode;

use crate::domain::ConfigError;
use crate::resolver::DEFAULT_SNAPSHOT_FILE;

/// Configuration for one bot invocation.
#[derive(Clone)]
pub struct BotConfig {
    token: String,
    /// Verbose logging and full error chains in failure reports
    pub debug: bool,
    /// Snapshot file name at the pre-push tree root
    pub snapshot_file: String,
    pub diff_mode: DiffMode,
    /// Print failures as GitHub Actions `::error::` annotations
    pub annotate: bool,
}

impl BotConfig {
    /// Create a config from the platform credential.
    ///
    /// A missing or blank token is fatal.
    pub fn new(token: Option<String>) -> Result<Self, ConfigError> {
        let token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingToken)?;

        Ok(Self {
            token,
            debug: false,
            snapshot_file: DEFAULT_SNAPSHOT_FILE.to_string(),
            diff_mode: DiffMode::Codeblock,
            annotate: false,
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Override the snapshot file name. Must be a bare root-level name.
    pub fn with_snapshot_file(mut self, name: &str) -> Result<Self, ConfigError> {
        let name = name.trim();
        if name.is_empty() || name.contains('/') {
            return Err(ConfigError::InvalidValue {
                name: "snapshot file".to_string(),
                reason: format!("`{name}` is not a root-level file name"),
            });
        }
        self.snapshot_file = name.to_string();
        Ok(self)
    }

    pub fn with_diff_mode(mut self, mode: DiffMode) -> Self {
        self.diff_mode = mode;
        self
    }

    pub fn with_annotations(mut self, annotate: bool) -> Self {
        self.annotate = annotate;
        self
    }
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"<redacted>")
            .field("debug", &self.debug)
            .field("snapshot_file", &self.snapshot_file)
            .field("diff_mode", &self.diff_mode)
            .field("annotate", &self.annotate)
            .finish()
    }
}
