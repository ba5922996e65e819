//! In-memory platform fake (testing only)
//!
//! `MemoryPlatform` serves commits, trees and blobs from maps, records every
//! call it receives, and can be told to fail a given operation.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{CommitRecord, ContentBlob, ContentRef, TreeEntry};
use crate::platform::{CommentRef, PlatformError, PlatformResult, RepoPlatform};

/// Platform operations, for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetCommit,
    GetTree,
    GetBlob,
    CreateComment,
}

/// A call received by the fake, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    GetCommit(String),
    GetTree(String),
    GetBlob(String),
    CreateComment { commit: String, body: String },
}

impl PlatformCall {
    pub fn operation(&self) -> Operation {
        match self {
            PlatformCall::GetCommit(_) => Operation::GetCommit,
            PlatformCall::GetTree(_) => Operation::GetTree,
            PlatformCall::GetBlob(_) => Operation::GetBlob,
            PlatformCall::CreateComment { .. } => Operation::CreateComment,
        }
    }
}

/// In-memory `RepoPlatform`.
#[derive(Debug, Default)]
pub struct MemoryPlatform {
    commits: Mutex<HashMap<String, CommitRecord>>,
    trees: Mutex<HashMap<String, Vec<TreeEntry>>>,
    blobs: Mutex<HashMap<String, ContentBlob>>,
    comments: Mutex<Vec<(String, String)>>,
    calls: Mutex<Vec<PlatformCall>>,
    failures: Mutex<HashMap<Operation, PlatformError>>,
}

impl MemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_commit(&self, commit: CommitRecord) {
        let mut commits = self.commits.lock().unwrap();
        commits.insert(commit.sha.clone(), commit);
    }

    pub fn insert_tree(&self, reference: &str, entries: Vec<TreeEntry>) {
        let mut trees = self.trees.lock().unwrap();
        trees.insert(reference.to_string(), entries);
    }

    /// Store `text` as a base64 blob under `content_ref`.
    pub fn insert_text_blob(&self, content_ref: &str, text: &str) {
        let blob = ContentBlob::from_text(ContentRef::new(content_ref), text);
        self.insert_blob(blob);
    }

    pub fn insert_blob(&self, blob: ContentBlob) {
        let mut blobs = self.blobs.lock().unwrap();
        blobs.insert(blob.content_ref.as_str().to_string(), blob);
    }

    /// Make every later call of `operation` fail with `error`.
    pub fn fail_on(&self, operation: Operation, error: PlatformError) {
        let mut failures = self.failures.lock().unwrap();
        failures.insert(operation, error);
    }

    /// All calls received so far.
    pub fn calls(&self) -> Vec<PlatformCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls received for `operation`.
    pub fn call_count(&self, operation: Operation) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.operation() == operation)
            .count()
    }

    /// Comments created so far as `(commit, body)` pairs.
    pub fn comments(&self) -> Vec<(String, String)> {
        self.comments.lock().unwrap().clone()
    }

    fn record(&self, call: PlatformCall) -> PlatformResult<()> {
        let operation = call.operation();
        self.calls.lock().unwrap().push(call);
        match self.failures.lock().unwrap().get(&operation) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RepoPlatform for MemoryPlatform {
    async fn get_commit(&self, reference: &str) -> PlatformResult<CommitRecord> {
        self.record(PlatformCall::GetCommit(reference.to_string()))?;
        let commits = self.commits.lock().unwrap();
        commits
            .get(reference)
            .cloned()
            .ok_or_else(|| PlatformError::NotFound {
                resource: format!("commit {reference}"),
            })
    }

    async fn get_tree(&self, reference: &str) -> PlatformResult<Vec<TreeEntry>> {
        self.record(PlatformCall::GetTree(reference.to_string()))?;
        let trees = self.trees.lock().unwrap();
        trees
            .get(reference)
            .cloned()
            .ok_or_else(|| PlatformError::NotFound {
                resource: format!("tree {reference}"),
            })
    }

    async fn get_blob(&self, content_ref: &ContentRef) -> PlatformResult<ContentBlob> {
        self.record(PlatformCall::GetBlob(content_ref.to_string()))?;
        let blobs = self.blobs.lock().unwrap();
        blobs
            .get(content_ref.as_str())
            .cloned()
            .ok_or_else(|| PlatformError::NotFound {
                resource: format!("blob {content_ref}"),
            })
    }

    async fn create_commit_comment(
        &self,
        commit: &str,
        body: &str,
    ) -> PlatformResult<CommentRef> {
        self.record(PlatformCall::CreateComment {
            commit: commit.to_string(),
            body: body.to_string(),
        })?;
        let mut comments = self.comments.lock().unwrap();
        comments.push((commit.to_string(), body.to_string()));
        let id = comments.len() as u64;
        Ok(CommentRef {
            id,
            url: format!("memory://comments/{id}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_objects_are_not_found() {
        let platform = MemoryPlatform::new();
        let err = platform.get_commit("nope").await.unwrap_err();
        assert!(matches!(err, PlatformError::NotFound { .. }));
        assert_eq!(platform.calls(), vec![PlatformCall::GetCommit("nope".to_string())]);
    }

    #[tokio::test]
    async fn test_injected_failure_still_records_call() {
        let platform = MemoryPlatform::new();
        platform.fail_on(
            Operation::CreateComment,
            PlatformError::Forbidden {
                message: "read-only token".to_string(),
            },
        );

        let err = platform.create_commit_comment("abc", "body").await.unwrap_err();
        assert!(matches!(err, PlatformError::Forbidden { .. }));
        assert_eq!(platform.call_count(Operation::CreateComment), 1);
        assert!(platform.comments().is_empty());
    }

    #[tokio::test]
    async fn test_text_blob_roundtrip() {
        let platform = MemoryPlatform::new();
        platform.insert_text_blob("b1", "hello");
        let blob = platform.get_blob(&ContentRef::new("b1")).await.unwrap();
        assert_eq!(blob.decode_text().unwrap(), "hello");
    }
}
