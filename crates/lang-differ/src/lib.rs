//! Lang-Differ: string-table diffs for JavaScript build artifacts
//!
//! A published client bundle carries its localized strings as an object
//! literal of `KEY:"value"` entries. This crate pulls that table out of two
//! versions of a bundle and renders what was added, removed and changed.
//!
//! ## Example
//!
//! ```
//! use lang_differ::{diff, DiffMode};
//!
//! let old = r#"e.exports={HELLO:"Hello",BYE:"Bye"}"#;
//! let new = r#"e.exports={HELLO:"Hello there",BYE:"Bye"}"#;
//!
//! let rendered = diff(old, new, DiffMode::Plain).unwrap().unwrap();
//! assert!(rendered.contains(r#"+ HELLO: "Hello there""#));
//! ```

pub mod error;
pub mod extract;
pub mod mode;
pub mod render;

pub use error::DiffError;
pub use extract::{extract_strings, is_string_key, StringTable};
pub use mode::DiffMode;
pub use render::{compute_changes, diff, StringChange, StringDiff};

/// Result type for diff operations
pub type Result<T> = std::result::Result<T, DiffError>;

/// Stateless handle over [`diff`], for callers that want a value to pass
/// around rather than a free function.
#[derive(Debug, Clone, Copy, Default)]
pub struct LangDiffer;

impl LangDiffer {
    pub fn new() -> Self {
        Self
    }

    /// Diff two bundle sources. `Ok(None)` means no string changed.
    pub fn diff(&self, old: &str, new: &str, mode: DiffMode) -> Result<Option<String>> {
        diff(old, new, mode)
    }
}
