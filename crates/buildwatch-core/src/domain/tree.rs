//! Tree listings.

use serde::{Deserialize, Serialize};

use super::commit::ContentRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Blob,
    Tree,
    Commit,
}

/// A top-level entry of a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    pub content_ref: ContentRef,
    pub kind: EntryKind,
}

impl TreeEntry {
    pub fn blob(path: impl Into<String>, content_ref: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content_ref: ContentRef::new(content_ref),
            kind: EntryKind::Blob,
        }
    }
}
