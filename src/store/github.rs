//! store::github
//!
//! GitHub object store implementation using the Git Data REST API.
//!
//! # Design
//!
//! This module implements the [`ObjectStore`] trait for GitHub. Each
//! operation maps to one endpoint under `/repos/{owner}/{repo}/git/`:
//!
//! - `resolve_ref`   → `GET  git/ref/heads/{branch}`
//! - `read_commit`   → `GET  git/commits/{sha}`
//! - `create_tree`   → `POST git/trees`
//! - `create_commit` → `POST git/commits`
//! - `update_ref`    → `PATCH git/refs/heads/{branch}` with `force: false`
//!
//! All requests carry a bearer token, the GitHub JSON media type, and a
//! fixed API version marker. Non-2xx responses are mapped to the
//! [`StoreError`] taxonomy with the provider's message text preserved
//! verbatim.
//!
//! # Authentication
//!
//! Tokens come from a [`TokenProvider`], fetched per request. If the
//! provider supports refresh, a 401/403 triggers one retry with a
//! fresh token.
//!
//! # Conditional updates
//!
//! GitHub has no explicit compare-and-swap on ref updates; a
//! non-forcing update is rejected unless it is a fast-forward from the
//! branch's current tip. Every commit this store submits has the
//! previously read tip as its sole parent, so a moved branch always
//! makes the update non-fast-forward and GitHub rejects it. That
//! rejection is surfaced as [`StoreError::RefConflict`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::traits::{
    CommitInfo, CommitSignature, CreatedCommit, ObjectStore, StoreError, TreeEntry,
    REGULAR_FILE_MODE,
};
use crate::auth::{AuthError, TokenProvider};
use crate::core::types::{BranchName, Oid};

/// Default GitHub API base URL.
const DEFAULT_API_BASE: &str = "https://api.github.com";

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "quill";

/// Fixed API version marker sent on every request.
const API_VERSION: &str = "2022-11-28";

/// Which operation a response belongs to.
///
/// The same HTTP status means different things on different endpoints
/// (a 404 on a ref read is a missing branch; on a commit read it is a
/// missing object), so error mapping is operation-aware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    GetRef,
    GetCommit,
    CreateTree,
    CreateCommit,
    UpdateRef,
}

/// GitHub object store.
pub struct GitHubStore {
    /// HTTP client for making requests.
    client: Client,
    /// Token provider; `None` means no credential was configured.
    token_provider: Option<Arc<dyn TokenProvider>>,
    /// Repository owner (user or organization).
    owner: String,
    /// Repository name.
    repo: String,
    /// API base URL (configurable for GitHub Enterprise and tests).
    api_base: String,
}

// Custom Debug to avoid exposing anything token-adjacent.
impl std::fmt::Debug for GitHubStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubStore")
            .field("has_token_provider", &self.token_provider.is_some())
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GitHubStore {
    /// Create a store for `owner/repo` with a token provider.
    pub fn new(
        provider: Arc<dyn TokenProvider>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            token_provider: Some(provider),
            owner: owner.into(),
            repo: repo.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Create a store with a custom API base URL.
    ///
    /// Use this for GitHub Enterprise installations
    /// (e.g. `https://github.example.com/api/v3`) and for tests.
    pub fn with_api_base(
        provider: Arc<dyn TokenProvider>,
        owner: impl Into<String>,
        repo: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            token_provider: Some(provider),
            owner: owner.into(),
            repo: repo.into(),
            api_base: api_base.into(),
        }
    }

    /// Create a store with no credential.
    ///
    /// Every operation fails with [`StoreError::MissingCredential`]
    /// before any network call is attempted.
    pub fn unauthenticated(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            token_provider: None,
            owner: owner.into(),
            repo: repo.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Get the repository owner.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Get the repository name.
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Get the current bearer token.
    async fn bearer_token(&self) -> Result<String, StoreError> {
        let provider = self
            .token_provider
            .as_ref()
            .ok_or(StoreError::MissingCredential)?;
        provider.bearer_token().await.map_err(|e| match e {
            AuthError::MissingToken => StoreError::MissingCredential,
            AuthError::Provider(message) => StoreError::AuthFailed(message),
        })
    }

    /// Whether a fresh token might succeed where the last one failed.
    fn supports_refresh(&self) -> bool {
        self.token_provider
            .as_ref()
            .is_some_and(|p| p.supports_refresh())
    }

    /// Build common headers for API requests (async to allow token refresh).
    async fn headers(&self) -> Result<HeaderMap, StoreError> {
        let token = self.bearer_token().await?;
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| StoreError::AuthFailed("token is not a valid header value".into()))?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));
        Ok(headers)
    }

    /// Check if an error might be resolved by a token refresh.
    fn is_retryable_auth_error(err: &StoreError) -> bool {
        matches!(err, StoreError::AuthFailed(_))
    }

    /// Build URL for a Git Data endpoint.
    fn git_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/git/{}",
            self.api_base, self.owner, self.repo, path
        )
    }

    /// Send one request with fresh headers and map the response.
    async fn dispatch<T: for<'de> Deserialize<'de>>(
        &self,
        op: Op,
        request: RequestBuilder,
    ) -> Result<T, StoreError> {
        let response = request
            .headers(self.headers().await?)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;
        self.handle_response(op, response).await
    }

    /// Send a request, retrying once with a fresh token on auth failure
    /// when the provider supports refresh.
    async fn send<T: for<'de> Deserialize<'de>>(
        &self,
        op: Op,
        request: RequestBuilder,
    ) -> Result<T, StoreError> {
        // Clone before the first attempt consumes the builder. JSON
        // bodies are always clonable.
        let second = request.try_clone();

        let result = self.dispatch(op, request).await;
        let retry = matches!(&result, Err(e) if Self::is_retryable_auth_error(e))
            && self.supports_refresh();
        if retry {
            if let Some(request) = second {
                return self.dispatch(op, request).await;
            }
        }
        result
    }

    /// Handle API response, mapping errors appropriately.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        op: Op,
        response: Response,
    ) -> Result<T, StoreError> {
        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| StoreError::Api {
                status: status.as_u16(),
                message: format!("failed to parse response: {}", e),
            })
        } else {
            Err(self.map_error_response(op, response, status).await)
        }
    }

    /// Map an error response to the store error taxonomy.
    ///
    /// The provider's message text is preserved verbatim.
    async fn map_error_response(&self, op: Op, response: Response, status: StatusCode) -> StoreError {
        let message = match response.json::<GitHubErrorResponse>().await {
            Ok(err) => err.message,
            Err(_) => "unknown error".to_string(),
        };

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::AuthFailed(message),
            StatusCode::NOT_FOUND => match op {
                Op::GetRef => StoreError::RefNotFound(message),
                Op::GetCommit => StoreError::ObjectNotFound(message),
                _ => StoreError::Api {
                    status: status.as_u16(),
                    message,
                },
            },
            StatusCode::CONFLICT if op == Op::UpdateRef => StoreError::RefConflict(message),
            StatusCode::UNPROCESSABLE_ENTITY => match op {
                Op::CreateTree => StoreError::TreeRejected(message),
                Op::CreateCommit => StoreError::CommitRejected(message),
                // A non-forcing update that is not a fast forward comes
                // back as a 422.
                Op::UpdateRef => StoreError::RefConflict(message),
                Op::GetCommit => StoreError::ObjectNotFound(message),
                Op::GetRef => StoreError::Api {
                    status: status.as_u16(),
                    message,
                },
            },
            _ if status.is_server_error() => StoreError::Network(message),
            _ => StoreError::Api {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Parse a sha string from a response into an [`Oid`].
    fn parse_oid(sha: String) -> Result<Oid, StoreError> {
        Oid::new(sha).map_err(|e| StoreError::Api {
            status: 200,
            message: format!("invalid sha in response: {}", e),
        })
    }
}

#[async_trait]
impl ObjectStore for GitHubStore {
    async fn resolve_ref(&self, branch: &BranchName) -> Result<Oid, StoreError> {
        let url = self.git_url(&format!("ref/heads/{}", branch));
        let response: RefResponse = self.send(Op::GetRef, self.client.get(&url)).await?;
        Self::parse_oid(response.object.sha)
    }

    async fn read_commit(&self, sha: &Oid) -> Result<CommitInfo, StoreError> {
        let url = self.git_url(&format!("commits/{}", sha));
        let response: CommitResponse = self.send(Op::GetCommit, self.client.get(&url)).await?;
        Ok(CommitInfo {
            sha: Self::parse_oid(response.sha)?,
            tree: Self::parse_oid(response.tree.sha)?,
        })
    }

    async fn create_tree(&self, base: &Oid, entries: &[TreeEntry]) -> Result<Oid, StoreError> {
        let url = self.git_url("trees");
        let body = CreateTreeBody {
            base_tree: base.as_str(),
            tree: entries.iter().map(TreeEntryBody::from).collect(),
        };
        let response: CreateTreeResponse = self
            .send(Op::CreateTree, self.client.post(&url).json(&body))
            .await?;
        Self::parse_oid(response.sha)
    }

    async fn create_commit(
        &self,
        message: &str,
        tree: &Oid,
        parent: &Oid,
    ) -> Result<CreatedCommit, StoreError> {
        let url = self.git_url("commits");
        let body = CreateCommitBody {
            message,
            tree: tree.as_str(),
            parents: vec![parent.as_str()],
        };
        let response: CreateCommitResponse = self
            .send(Op::CreateCommit, self.client.post(&url).json(&body))
            .await?;
        Ok(CreatedCommit {
            sha: Self::parse_oid(response.sha)?,
            tree: Self::parse_oid(response.tree.sha)?,
            author: response.author.map(|a| CommitSignature {
                name: a.name,
                email: a.email,
                date: a.date,
            }),
        })
    }

    async fn update_ref(
        &self,
        branch: &BranchName,
        to: &Oid,
        _expected: &Oid,
    ) -> Result<(), StoreError> {
        // The expected hash is not transmitted: GitHub's non-forcing
        // update already rejects any advance that is not a fast forward
        // of the current tip, and the submitted commit's sole parent is
        // the expected hash (see module docs).
        let url = self.git_url(&format!("refs/heads/{}", branch));
        let body = UpdateRefBody {
            sha: to.as_str(),
            force: false,
        };
        let _: RefResponse = self
            .send(Op::UpdateRef, self.client.patch(&url).json(&body))
            .await?;
        Ok(())
    }
}

// --------------------------------------------------------------------------
// API Request/Response Types
// --------------------------------------------------------------------------

/// One entry in a create-tree request.
#[derive(Serialize)]
struct TreeEntryBody<'a> {
    path: &'a str,
    mode: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    /// Inline content for writes; absent for deletions.
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
    /// `Some(None)` serializes as an explicit `"sha": null`, which is
    /// how the API expresses "remove this path from the base tree".
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<Option<&'a str>>,
}

impl<'a> From<&'a TreeEntry> for TreeEntryBody<'a> {
    fn from(entry: &'a TreeEntry) -> Self {
        match entry.content.as_deref() {
            Some(content) => TreeEntryBody {
                path: entry.path.as_str(),
                mode: REGULAR_FILE_MODE,
                kind: "blob",
                content: Some(content),
                sha: None,
            },
            None => TreeEntryBody {
                path: entry.path.as_str(),
                mode: REGULAR_FILE_MODE,
                kind: "blob",
                content: None,
                sha: Some(None),
            },
        }
    }
}

/// Request body for creating a tree.
#[derive(Serialize)]
struct CreateTreeBody<'a> {
    base_tree: &'a str,
    tree: Vec<TreeEntryBody<'a>>,
}

/// Request body for creating a commit.
#[derive(Serialize)]
struct CreateCommitBody<'a> {
    message: &'a str,
    tree: &'a str,
    parents: Vec<&'a str>,
}

/// Request body for the conditional ref update.
#[derive(Serialize)]
struct UpdateRefBody<'a> {
    sha: &'a str,
    force: bool,
}

/// GitHub error response format.
#[derive(Deserialize)]
struct GitHubErrorResponse {
    message: String,
}

/// Ref response format (`GET git/ref/...` and `PATCH git/refs/...`).
#[derive(Deserialize)]
struct RefResponse {
    object: RefObject,
}

/// The object a ref points at.
#[derive(Deserialize)]
struct RefObject {
    sha: String,
}

/// Commit response format.
#[derive(Deserialize)]
struct CommitResponse {
    sha: String,
    tree: TreeRef,
}

/// Nested tree reference inside a commit response.
#[derive(Deserialize)]
struct TreeRef {
    sha: String,
}

/// Create-tree response format.
#[derive(Deserialize)]
struct CreateTreeResponse {
    sha: String,
}

/// Create-commit response format.
#[derive(Deserialize)]
struct CreateCommitResponse {
    sha: String,
    tree: TreeRef,
    author: Option<GitHubSignature>,
}

/// Author/committer identity as echoed by the API.
#[derive(Deserialize)]
struct GitHubSignature {
    name: String,
    email: String,
    date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenProvider;
    use crate::core::types::TreePath;

    fn store() -> GitHubStore {
        GitHubStore::new(
            Arc::new(StaticTokenProvider::new("token")),
            "octocat",
            "hello-world",
        )
    }

    #[test]
    fn git_url_format() {
        let store = store();
        assert_eq!(
            store.git_url("trees"),
            "https://api.github.com/repos/octocat/hello-world/git/trees"
        );
        assert_eq!(
            store.git_url("ref/heads/main"),
            "https://api.github.com/repos/octocat/hello-world/git/ref/heads/main"
        );
    }

    #[test]
    fn with_api_base_overrides_default() {
        let store = GitHubStore::with_api_base(
            Arc::new(StaticTokenProvider::new("token")),
            "octocat",
            "hello-world",
            "https://github.example.com/api/v3",
        );
        assert_eq!(
            store.git_url("commits"),
            "https://github.example.com/api/v3/repos/octocat/hello-world/git/commits"
        );
    }

    #[test]
    fn write_entry_serializes_inline_content() {
        let entry = TreeEntry::write(TreePath::new("a.txt").unwrap(), "hello");
        let body = TreeEntryBody::from(&entry);
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "path": "a.txt",
                "mode": "100644",
                "type": "blob",
                "content": "hello",
            })
        );
    }

    #[test]
    fn delete_entry_serializes_null_sha() {
        let entry = TreeEntry::delete(TreePath::new("old.txt").unwrap());
        let body = TreeEntryBody::from(&entry);
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "path": "old.txt",
                "mode": "100644",
                "type": "blob",
                "sha": null,
            })
        );
    }

    #[test]
    fn update_ref_body_is_non_forcing() {
        let body = UpdateRefBody {
            sha: "abc123def4567890abc123def4567890abc12345",
            force: false,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["force"], serde_json::json!(false));
    }

    #[test]
    fn debug_does_not_expose_token() {
        let store = GitHubStore::new(
            Arc::new(StaticTokenProvider::new("ghp_secret_abc123")),
            "owner",
            "repo",
        );
        let debug_output = format!("{:?}", store);
        assert!(!debug_output.contains("ghp_secret_abc123"));
        assert!(debug_output.contains("has_token_provider"));
    }

    #[tokio::test]
    async fn unauthenticated_store_fails_before_network() {
        let store = GitHubStore::unauthenticated("owner", "repo");
        let branch = BranchName::new("main").unwrap();

        let err = store.resolve_ref(&branch).await.unwrap_err();
        assert_eq!(err, StoreError::MissingCredential);
    }

    #[tokio::test]
    async fn empty_static_token_is_missing_credential() {
        let store = GitHubStore::new(Arc::new(StaticTokenProvider::new("")), "owner", "repo");
        let branch = BranchName::new("main").unwrap();

        let err = store.resolve_ref(&branch).await.unwrap_err();
        assert_eq!(err, StoreError::MissingCredential);
    }
}
