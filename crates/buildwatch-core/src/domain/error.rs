//! Error taxonomy for the buildwatch pipeline.

use crate::platform::PlatformError;

/// Boxed error returned by a pluggable differ.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Fatal configuration problems, detected before the pipeline starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid GITHUB_TOKEN")]
    MissingToken,

    #[error("invalid repository `{0}`, expected `owner/name`")]
    InvalidRepository(String),

    #[error("invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

/// Pipeline errors. Each one ends a run as `DiffOutcome::Failed`.
#[derive(Debug, thiserror::Error)]
pub enum BuildwatchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error("malformed push event: {0}")]
    MalformedEvent(String),

    #[error("malformed file location `{location}`")]
    MalformedLocation { location: String },

    #[error("unable to decode blob {content_ref}: {reason}")]
    BlobDecode { content_ref: String, reason: String },

    #[error("unable to diff strings: {0}")]
    Diff(#[source] BoxError),

    #[error("unable to diff strings: differ panicked: {0}")]
    DifferPanicked(String),

    #[error("no head commit to comment on")]
    MissingHead,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, BuildwatchError>;
