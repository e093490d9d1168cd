//! store::traits
//!
//! Object store trait definition for Git object-graph operations.
//!
//! # Design
//!
//! The [`ObjectStore`] trait covers exactly the five operations the
//! mutation engine consumes: resolve a branch ref, read a commit,
//! create a tree, create a commit, and conditionally advance a ref.
//! The trait is async because every implementation of interest talks
//! to a hosted provider over the network.
//!
//! Nothing here knows about local files or mutation sequencing; the
//! engine owns that. A store implementation's whole job is faithful
//! request/response shaping plus a precise error taxonomy.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::core::types::{BranchName, Oid, TreePath};

/// Mode submitted for every file entry. Quill only writes regular
/// files; executables and symlinks are out of scope.
pub const REGULAR_FILE_MODE: &str = "100644";

/// Errors from object store operations.
///
/// Variants map to the failure modes of a hosted Git provider's
/// object-graph API. Provider diagnostic text is preserved verbatim in
/// the payload wherever one exists.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No credential was configured; surfaced before any network call.
    #[error("missing credential")]
    MissingCredential,

    /// Authentication failed (invalid token, insufficient permissions).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The branch does not exist.
    #[error("ref not found: {0}")]
    RefNotFound(String),

    /// The requested object (commit) does not exist or is unreachable.
    #[error("object not found: {0}")]
    ObjectNotFound(String),

    /// The store rejected the submitted tree.
    #[error("tree rejected: {0}")]
    TreeRejected(String),

    /// The store rejected the submitted commit.
    #[error("commit rejected: {0}")]
    CommitRejected(String),

    /// The conditional ref update was rejected because the branch no
    /// longer points at the expected commit.
    #[error("concurrent modification: {0}")]
    RefConflict(String),

    /// Connectivity failure, timeout, or a 5xx from the provider.
    #[error("network error: {0}")]
    Network(String),

    /// Any other non-2xx response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },
}

impl StoreError {
    /// Whether a caller's backoff policy may retry after this error.
    ///
    /// Only network-level failures are transient. A `RefConflict` is
    /// retryable too, but only by re-running an entire mutation from a
    /// fresh ref read; see [`crate::engine::MutationError::is_retryable`].
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Network(_))
    }
}

/// One entry in a tree submission: either new content for a path or a
/// removal marker.
///
/// `content: None` means "remove this path from the resulting tree"
/// relative to the base. All entries carry [`REGULAR_FILE_MODE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Repo-root-relative path.
    pub path: TreePath,
    /// Inline file content, or `None` to delete the path.
    pub content: Option<String>,
}

impl TreeEntry {
    /// An entry that writes `content` at `path`.
    pub fn write(path: TreePath, content: impl Into<String>) -> Self {
        Self {
            path,
            content: Some(content.into()),
        }
    }

    /// An entry that removes `path`.
    pub fn delete(path: TreePath) -> Self {
        Self {
            path,
            content: None,
        }
    }
}

/// A commit as read from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// The commit's own hash.
    pub sha: Oid,
    /// The commit's root tree hash.
    pub tree: Oid,
}

/// Author/committer identity echoed back by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSignature {
    pub name: String,
    pub email: String,
    pub date: DateTime<Utc>,
}

/// A commit as created by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedCommit {
    /// The new commit's hash.
    pub sha: Oid,
    /// The tree the commit points at.
    pub tree: Oid,
    /// Author identity assigned by the store, when echoed.
    pub author: Option<CommitSignature>,
}

/// The object store operations the mutation engine consumes.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// All methods return `Result<T, StoreError>`. The read operations
/// (`resolve_ref`, `read_commit`) have no side effects; `create_tree`
/// and `create_commit` may leave unreachable objects in the store on a
/// later failure, which is harmless; `update_ref` is the only
/// operation with an externally visible effect on the branch.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Read the current tip commit of `branch`.
    ///
    /// # Errors
    ///
    /// - `RefNotFound` if the branch does not exist
    /// - `AuthFailed`, `Network` as usual
    async fn resolve_ref(&self, branch: &BranchName) -> Result<Oid, StoreError>;

    /// Read a commit to obtain its root tree hash. Pure read.
    ///
    /// # Errors
    ///
    /// - `ObjectNotFound` if the hash is stale or garbage-collected
    async fn read_commit(&self, sha: &Oid) -> Result<CommitInfo, StoreError>;

    /// Materialize a new tree layered on `base`.
    ///
    /// # Errors
    ///
    /// - `TreeRejected` with the store's diagnostic text on path/mode
    ///   conflicts or an invalid base
    async fn create_tree(&self, base: &Oid, entries: &[TreeEntry]) -> Result<Oid, StoreError>;

    /// Create a commit pointing at `tree` with a single `parent`.
    ///
    /// # Errors
    ///
    /// - `CommitRejected` with the store's diagnostic text
    async fn create_commit(
        &self,
        message: &str,
        tree: &Oid,
        parent: &Oid,
    ) -> Result<CreatedCommit, StoreError>;

    /// Conditionally advance `branch` to `to`.
    ///
    /// The update is non-forcing: the store must reject it if the
    /// branch no longer points at `expected`.
    ///
    /// # Errors
    ///
    /// - `RefConflict` if the branch moved since `expected` was read
    async fn update_ref(
        &self,
        branch: &BranchName,
        to: &Oid,
        expected: &Oid,
    ) -> Result<(), StoreError>;
}
