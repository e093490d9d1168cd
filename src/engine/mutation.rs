//! engine::mutation
//!
//! The mutation façade: commit or delete a set of files as one commit.
//!
//! # Design
//!
//! Both public entry points lower to one generic apply-entries
//! operation parameterized by the entry action, so write and delete
//! requests flow through identical path handling and the identical
//! step sequence:
//!
//! ```text
//! Validate → ReadContent → ResolveRef → ReadCommit → BuildTree
//!          → WriteTree → WriteCommit → UpdateRef
//! ```
//!
//! The sequence is strictly sequential because each step needs the
//! previous step's output. The branch tip read at `ResolveRef` is the
//! base for everything after it: the tree is layered on that commit's
//! tree, the new commit's sole parent is that commit, and the final
//! ref update is conditioned on the branch still pointing at it. The
//! first failing step aborts the whole mutation. Intermediate trees
//! and commits created before a failure are unreachable garbage; the
//! branch's visible history is unaffected until `UpdateRef` succeeds.
//!
//! The façade holds no state between calls and performs no retries;
//! callers who want retry wrap the entire call (see [`crate::retry`]).

use std::collections::HashSet;
use std::sync::Arc;

use crate::content::ContentSource;
use crate::core::config::RepoTarget;
use crate::core::paths;
use crate::core::types::{Oid, TreePath};
use crate::store::{ObjectStore, TreeEntry};

use super::step::{MutationError, MutationErrorKind, Step};

/// Desired state for one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryAction {
    /// Write the given content at the path.
    Write {
        /// Full file content, embedded inline.
        content: String,
    },
    /// Remove the path.
    Delete,
}

/// One file's desired state within a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
    /// Normalized repo-root-relative path.
    pub path: TreePath,
    /// What to do at the path.
    pub action: EntryAction,
}

/// One atomic multi-file change, assembled per call from validated
/// entries and discarded after producing a result or error.
///
/// The base commit hash is not part of the request: it is captured
/// once, inside the sequence, at the `ResolveRef` step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRequest {
    /// Entries to apply, in request order.
    pub entries: Vec<PathEntry>,
    /// Commit message.
    pub message: String,
}

/// Outcome of a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationResult {
    /// The new branch tip.
    pub commit: Oid,
    /// The new root tree.
    pub tree: Oid,
    /// Normalized paths the mutation touched, in request order.
    pub paths: Vec<String>,
}

/// Applies multi-file mutations to one branch of one repository.
///
/// A `Mutator` is cheap to construct and holds no mutable state;
/// every call captures its own base commit and discards all
/// intermediate hashes afterwards.
pub struct Mutator {
    store: Arc<dyn ObjectStore>,
    content: Arc<dyn ContentSource>,
    target: RepoTarget,
}

impl Mutator {
    /// Create a mutator for the given target.
    pub fn new(
        store: Arc<dyn ObjectStore>,
        content: Arc<dyn ContentSource>,
        target: RepoTarget,
    ) -> Self {
        Self {
            store,
            content,
            target,
        }
    }

    /// The target this mutator applies mutations to.
    pub fn target(&self) -> &RepoTarget {
        &self.target
    }

    /// Commit the given files in a single commit.
    ///
    /// Each path's content is read from the local content source
    /// immediately before tree construction, so the commit reflects
    /// the local filesystem at call time.
    ///
    /// # Errors
    ///
    /// Any step's failure aborts the whole mutation; see
    /// [`MutationError`] for the step taxonomy. No partial application
    /// is possible.
    pub async fn commit_files(
        &self,
        paths: &[String],
        message: &str,
    ) -> Result<MutationResult, MutationError> {
        let tree_paths = self.validate(paths)?;

        let mut entries = Vec::with_capacity(tree_paths.len());
        for path in tree_paths {
            let content = self
                .content
                .read(&path)
                .map_err(|e| self.fail(Step::ReadContent, e))?;
            entries.push(PathEntry {
                path,
                action: EntryAction::Write { content },
            });
        }

        self.apply(MutationRequest {
            entries,
            message: message.to_string(),
        })
        .await
    }

    /// Delete the given files in a single commit.
    ///
    /// No local file reads occur; missing local files do not matter
    /// for deletion.
    ///
    /// # Errors
    ///
    /// Same contract as [`commit_files`](Self::commit_files).
    pub async fn delete_files(
        &self,
        paths: &[String],
        message: &str,
    ) -> Result<MutationResult, MutationError> {
        let tree_paths = self.validate(paths)?;

        let entries = tree_paths
            .into_iter()
            .map(|path| PathEntry {
                path,
                action: EntryAction::Delete,
            })
            .collect();

        self.apply(MutationRequest {
            entries,
            message: message.to_string(),
        })
        .await
    }

    /// Validate and normalize the requested paths.
    ///
    /// Rejects empty requests and duplicates before any local read or
    /// network call.
    fn validate(&self, paths: &[String]) -> Result<Vec<TreePath>, MutationError> {
        if paths.is_empty() {
            return Err(self.fail(Step::Validate, MutationErrorKind::EmptyRequest));
        }

        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(paths.len());
        for raw in paths {
            let path = paths::normalize(raw, &self.target.root_dir)
                .map_err(|e| self.fail(Step::Validate, e))?;
            if !seen.insert(path.clone()) {
                return Err(self.fail(
                    Step::Validate,
                    MutationErrorKind::DuplicatePath(path.to_string()),
                ));
            }
            normalized.push(path);
        }
        Ok(normalized)
    }

    /// Run the object-graph sequence for an already-validated request.
    async fn apply(&self, request: MutationRequest) -> Result<MutationResult, MutationError> {
        let branch = &self.target.branch;

        // The base hash is captured exactly once, here, and reused for
        // the tree base, the commit parent, and the conditional update.
        let base = self
            .store
            .resolve_ref(branch)
            .await
            .map_err(|e| self.fail(Step::ResolveRef, e))?;

        let base_commit = self
            .store
            .read_commit(&base)
            .await
            .map_err(|e| self.fail(Step::ReadCommit, e))?;

        let tree_entries: Vec<TreeEntry> = request
            .entries
            .iter()
            .map(|entry| match &entry.action {
                EntryAction::Write { content } => {
                    TreeEntry::write(entry.path.clone(), content.clone())
                }
                EntryAction::Delete => TreeEntry::delete(entry.path.clone()),
            })
            .collect();

        let new_tree = self
            .store
            .create_tree(&base_commit.tree, &tree_entries)
            .await
            .map_err(|e| self.fail(Step::WriteTree, e))?;

        let created = self
            .store
            .create_commit(&request.message, &new_tree, &base)
            .await
            .map_err(|e| self.fail(Step::WriteCommit, e))?;

        self.store
            .update_ref(branch, &created.sha, &base)
            .await
            .map_err(|e| self.fail(Step::UpdateRef, e))?;

        Ok(MutationResult {
            commit: created.sha,
            tree: new_tree,
            paths: request.entries.iter().map(|e| e.path.to_string()).collect(),
        })
    }

    /// Wrap a step failure with branch context.
    fn fail(&self, step: Step, kind: impl Into<MutationErrorKind>) -> MutationError {
        MutationError {
            step,
            branch: self.target.branch.to_string(),
            kind: kind.into(),
        }
    }
}

// Custom Debug that skips the trait objects.
impl std::fmt::Debug for Mutator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mutator")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}
