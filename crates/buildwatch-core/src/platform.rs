//! Hosting-platform seam.
//!
//! The pipeline reads commits, trees and blobs and writes one comment
//! through `RepoPlatform`. The trait is backend-agnostic: the GitHub client
//! lives in `buildwatch-github`, and an in-memory fake for tests lives in
//! [`crate::fakes`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{CommitRecord, ContentBlob, ContentRef, TreeEntry};

/// Result type for platform operations
pub type PlatformResult<T> = std::result::Result<T, PlatformError>;

/// Failures reported by the hosting platform. None are retried here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("not found: {resource}")]
    NotFound { resource: String },

    #[error("unauthorized: the token was rejected")]
    Unauthorized,

    #[error("forbidden: {message}")]
    Forbidden { message: String },

    #[error("rate limited{}", .reset.map(|r| format!(" until {r}")).unwrap_or_default())]
    RateLimited { reset: Option<u64> },

    #[error("unexpected response {status}: {message}")]
    Unexpected { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid response body: {0}")]
    Decode(String),
}

/// A created commit comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRef {
    pub id: u64,
    pub url: String,
}

/// Read access to repository content plus the comment sink.
#[async_trait]
pub trait RepoPlatform: Send + Sync {
    /// Fetch a commit's metadata and changed files.
    async fn get_commit(&self, reference: &str) -> PlatformResult<CommitRecord>;

    /// List the top-level entries of the tree at `reference` (non-recursive).
    async fn get_tree(&self, reference: &str) -> PlatformResult<Vec<TreeEntry>>;

    /// Fetch a blob by content address.
    async fn get_blob(&self, content_ref: &ContentRef) -> PlatformResult<ContentBlob>;

    /// Append a comment to a commit.
    async fn create_commit_comment(&self, commit: &str, body: &str)
        -> PlatformResult<CommentRef>;
}
