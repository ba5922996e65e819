//! GitHub REST response shapes and their mapping to domain types.

use buildwatch_core::{
    BlobEncoding, ChangedFile, CommentRef, CommitRecord, ContentBlob, ContentRef, EntryKind,
    FileStatus, TreeEntry,
};
use serde::{Deserialize, Serialize};

/// `GET /repos/{o}/{r}/commits/{ref}`
#[derive(Debug, Deserialize)]
pub(crate) struct CommitResponse {
    pub sha: String,
    #[serde(default)]
    pub files: Vec<CommitFile>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitFile {
    pub filename: String,
    pub status: String,
    pub sha: Option<String>,
    pub blob_url: Option<String>,
}

impl From<CommitResponse> for CommitRecord {
    fn from(response: CommitResponse) -> Self {
        CommitRecord {
            sha: response.sha,
            files: response
                .files
                .into_iter()
                .map(|f| ChangedFile {
                    path: f.filename,
                    status: FileStatus::from(f.status),
                    content_ref: f.sha.map(ContentRef::new),
                    location: f.blob_url,
                })
                .collect(),
        }
    }
}

/// `GET /repos/{o}/{r}/git/trees/{sha}`
#[derive(Debug, Deserialize)]
pub(crate) struct TreeResponse {
    pub sha: String,
    pub tree: Vec<TreeItem>,
    #[serde(default)]
    pub truncated: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TreeItem {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub sha: String,
}

impl TreeItem {
    pub fn into_entry(self) -> TreeEntry {
        let kind = match self.kind.as_str() {
            "tree" => EntryKind::Tree,
            "commit" => EntryKind::Commit,
            _ => EntryKind::Blob,
        };
        TreeEntry {
            path: self.path,
            content_ref: ContentRef::new(self.sha),
            kind,
        }
    }
}

/// `GET /repos/{o}/{r}/git/blobs/{sha}`
#[derive(Debug, Deserialize)]
pub(crate) struct BlobResponse {
    pub sha: String,
    pub content: String,
    pub encoding: String,
}

impl From<BlobResponse> for ContentBlob {
    fn from(response: BlobResponse) -> Self {
        ContentBlob {
            content_ref: ContentRef::new(response.sha),
            content: response.content,
            encoding: BlobEncoding::from(response.encoding),
        }
    }
}

/// `POST /repos/{o}/{r}/commits/{sha}/comments` request body
#[derive(Debug, Serialize)]
pub(crate) struct NewComment<'a> {
    pub body: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentResponse {
    pub id: u64,
    pub html_url: String,
}

impl From<CommentResponse> for CommentRef {
    fn from(response: CommentResponse) -> Self {
        CommentRef {
            id: response.id,
            url: response.html_url,
        }
    }
}

/// Error body GitHub attaches to non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub message: String,
}
