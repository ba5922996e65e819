//! Error types for lang-differ

use thiserror::Error;

/// Errors raised while reading a bundle's string table
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiffError {
    /// A string literal was opened but never closed
    #[error("unterminated string literal starting at byte {offset}")]
    UnterminatedString { offset: usize },

    /// A `\x`, `\u` or `\u{...}` escape with bad hex digits
    #[error("invalid escape sequence at byte {offset}")]
    InvalidEscape { offset: usize },

    /// Unrecognized diff mode name
    #[error("unknown diff mode: {0}")]
    UnknownMode(String),
}
