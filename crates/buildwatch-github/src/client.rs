//! GitHub REST implementation of [`RepoPlatform`].
//!
//! One request per operation, no retries. Non-2xx responses map to
//! [`PlatformError`] by status:
//!
//! | Status | Error |
//! |---|---|
//! | 404, 422 | `NotFound` |
//! | 401 | `Unauthorized` |
//! | 429, or 403 with `x-ratelimit-remaining: 0` | `RateLimited` |
//! | other 403 | `Forbidden` |
//! | anything else | `Unexpected` |

use async_trait::async_trait;
use buildwatch_core::{CommentRef, CommitRecord, ContentBlob, ContentRef, RepoPlatform, TreeEntry};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::GitHubConfig;
use crate::wire::{
    ApiErrorBody, BlobResponse, CommentResponse, CommitResponse, NewComment, TreeResponse,
};
use crate::{PlatformError, Result};

/// REST API version pinned on every request.
pub const API_VERSION: &str = "2022-11-28";

const MEDIA_TYPE: &str = "application/vnd.github+json";

/// GitHub REST client scoped to one repository.
pub struct GitHubClient {
    config: GitHubConfig,
    http_client: reqwest::Client,
}

impl GitHubClient {
    pub fn new(config: GitHubConfig) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token()))
            .map_err(|_| PlatformError::Transport("token is not a valid header value".to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static(MEDIA_TYPE));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));

        let http_client = reqwest::Client::builder()
            .user_agent(concat!("buildwatch/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| PlatformError::Transport(e.to_string()))?;

        Ok(GitHubClient {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &GitHubConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.repo_url(), path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, resource: &str) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| PlatformError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let err = error_for_response(response, resource).await;
            debug!(%status, resource, error = %err, "GitHub request failed");
            return Err(err);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| PlatformError::Decode(format!("{resource}: {e}")))
    }
}

#[async_trait]
impl RepoPlatform for GitHubClient {
    async fn get_commit(&self, reference: &str) -> Result<CommitRecord> {
        let request = self.http_client.get(self.url(&format!("commits/{reference}")));
        let commit: CommitResponse = self.send(request, &format!("commit {reference}")).await?;
        Ok(commit.into())
    }

    async fn get_tree(&self, sha: &str) -> Result<Vec<TreeEntry>> {
        let request = self.http_client.get(self.url(&format!("git/trees/{sha}")));
        let tree: TreeResponse = self.send(request, &format!("tree {sha}")).await?;
        if tree.truncated {
            warn!(tree = %tree.sha, "tree listing truncated");
        }
        Ok(tree.tree.into_iter().map(|item| item.into_entry()).collect())
    }

    async fn get_blob(&self, content_ref: &ContentRef) -> Result<ContentBlob> {
        let request = self
            .http_client
            .get(self.url(&format!("git/blobs/{}", content_ref.as_str())));
        let blob: BlobResponse = self.send(request, &format!("blob {content_ref}")).await?;
        Ok(blob.into())
    }

    async fn create_commit_comment(&self, commit: &str, body: &str) -> Result<CommentRef> {
        let request = self
            .http_client
            .post(self.url(&format!("commits/{commit}/comments")))
            .json(&NewComment { body });
        let comment: CommentResponse = self.send(request, &format!("commit {commit}")).await?;
        Ok(comment.into())
    }
}

async fn error_for_response(response: Response, resource: &str) -> PlatformError {
    let status = response.status();
    let headers = response.headers().clone();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&text)
        .map(|body| body.message)
        .unwrap_or(text);

    classify_status(status, &headers, resource, message)
}

/// Map a non-2xx status to a platform error.
pub(crate) fn classify_status(
    status: StatusCode,
    headers: &HeaderMap,
    resource: &str,
    message: String,
) -> PlatformError {
    let header_u64 = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
    };

    match status {
        StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => PlatformError::NotFound {
            resource: resource.to_string(),
        },
        StatusCode::UNAUTHORIZED => PlatformError::Unauthorized,
        StatusCode::TOO_MANY_REQUESTS => PlatformError::RateLimited {
            reset: header_u64("x-ratelimit-reset"),
        },
        StatusCode::FORBIDDEN if header_u64("x-ratelimit-remaining") == Some(0) => {
            PlatformError::RateLimited {
                reset: header_u64("x-ratelimit-reset"),
            }
        }
        StatusCode::FORBIDDEN => PlatformError::Forbidden { message },
        other => PlatformError::Unexpected {
            status: other.as_u16(),
            message,
        },
    }
}
