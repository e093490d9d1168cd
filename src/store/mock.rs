//! store::mock
//!
//! Mock object store for deterministic testing.
//!
//! # Design
//!
//! The mock store keeps refs, commits, and trees in memory, assigns
//! deterministic hashes, and records every operation so tests can
//! assert on the exact call sequence. Failure injection covers each
//! operation, and `update_ref` enforces the same conditional-update
//! semantics as the real store: if the branch no longer points at the
//! expected hash, the update fails with [`StoreError::RefConflict`].
//!
//! A scheduled ref move simulates a concurrent writer: the move is
//! applied at the start of the next `update_ref` call, after the
//! caller has already captured its base hash.
//!
//! # Example
//!
//! ```
//! use quill::store::mock::MockStore;
//! use quill::store::ObjectStore;
//! use quill::core::types::BranchName;
//!
//! # tokio_test::block_on(async {
//! let store = MockStore::new();
//! let (head, tree) = store.seed_branch("main");
//!
//! let branch = BranchName::new("main").unwrap();
//! assert_eq!(store.resolve_ref(&branch).await.unwrap(), head);
//! assert_eq!(store.read_commit(&head).await.unwrap().tree, tree);
//! # });
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use super::traits::{
    CommitInfo, CommitSignature, CreatedCommit, ObjectStore, StoreError, TreeEntry,
};
use crate::core::types::{BranchName, Oid};

/// Mock object store for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone)]
pub struct MockStore {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockStoreInner>>,
}

/// Internal mutable state.
#[derive(Debug)]
struct MockStoreInner {
    /// Branch name → tip commit.
    refs: HashMap<String, Oid>,
    /// Stored commits by hash.
    commits: HashMap<Oid, StoredCommit>,
    /// Stored trees by hash (submitted entry lists).
    trees: HashMap<Oid, Vec<TreeEntry>>,
    /// Counter for deterministic hash generation.
    next_object: u64,
    /// Operation to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
    /// Ref moves applied at the start of the next `update_ref` call,
    /// simulating a concurrent writer.
    pending_moves: Vec<(String, Oid)>,
}

/// A commit held by the mock store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCommit {
    /// Root tree hash.
    pub tree: Oid,
    /// Parent hashes (always length 1 for commits the engine creates).
    pub parents: Vec<Oid>,
    /// Commit message.
    pub message: String,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail resolve_ref with the given error.
    ResolveRef(StoreError),
    /// Fail read_commit with the given error.
    ReadCommit(StoreError),
    /// Fail create_tree with the given error.
    CreateTree(StoreError),
    /// Fail create_commit with the given error.
    CreateCommit(StoreError),
    /// Fail update_ref with the given error.
    UpdateRef(StoreError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone)]
pub enum MockOperation {
    ResolveRef {
        branch: String,
    },
    ReadCommit {
        sha: Oid,
    },
    CreateTree {
        base: Oid,
        entries: Vec<TreeEntry>,
    },
    CreateCommit {
        message: String,
        tree: Oid,
        parent: Oid,
    },
    UpdateRef {
        branch: String,
        to: Oid,
        expected: Oid,
    },
}

impl MockStore {
    /// Create an empty mock store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockStoreInner {
                refs: HashMap::new(),
                commits: HashMap::new(),
                trees: HashMap::new(),
                next_object: 1,
                fail_on: None,
                operations: Vec::new(),
                pending_moves: Vec::new(),
            })),
        }
    }

    /// Configure one operation to fail. Consumes and returns self for
    /// builder-style setup.
    pub fn fail_on(self, fail: FailOn) -> Self {
        self.inner.lock().unwrap().fail_on = Some(fail);
        self
    }

    /// Seed a branch with an initial commit and empty tree.
    ///
    /// Returns `(commit, tree)` hashes.
    pub fn seed_branch(&self, branch: &str) -> (Oid, Oid) {
        let mut inner = self.inner.lock().unwrap();
        let tree = inner.generate_oid();
        let commit = inner.generate_oid();
        inner.trees.insert(tree.clone(), Vec::new());
        inner.commits.insert(
            commit.clone(),
            StoredCommit {
                tree: tree.clone(),
                parents: Vec::new(),
                message: "seed".to_string(),
            },
        );
        inner.refs.insert(branch.to_string(), commit.clone());
        (commit, tree)
    }

    /// Schedule a ref move that lands just before the next `update_ref`
    /// call, simulating another caller winning the race.
    ///
    /// Returns the hash the branch will move to.
    pub fn schedule_ref_move(&self, branch: &str) -> Oid {
        let mut inner = self.inner.lock().unwrap();
        let other_tree = inner.generate_oid();
        let other_commit = inner.generate_oid();
        inner.trees.insert(other_tree.clone(), Vec::new());
        inner.commits.insert(
            other_commit.clone(),
            StoredCommit {
                tree: other_tree,
                parents: Vec::new(),
                message: "concurrent".to_string(),
            },
        );
        inner
            .pending_moves
            .push((branch.to_string(), other_commit.clone()));
        other_commit
    }

    /// Current tip of a branch.
    pub fn head(&self, branch: &str) -> Option<Oid> {
        self.inner.lock().unwrap().refs.get(branch).cloned()
    }

    /// Look up a stored commit.
    pub fn commit(&self, sha: &Oid) -> Option<StoredCommit> {
        self.inner.lock().unwrap().commits.get(sha).cloned()
    }

    /// Entries submitted for a stored tree.
    pub fn tree_entries(&self, sha: &Oid) -> Option<Vec<TreeEntry>> {
        self.inner.lock().unwrap().trees.get(sha).cloned()
    }

    /// Get recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.inner.lock().unwrap().operations.clone()
    }

    /// Clear recorded operations.
    pub fn clear_operations(&self) {
        self.inner.lock().unwrap().operations.clear();
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStoreInner {
    /// Generate the next deterministic hash.
    fn generate_oid(&mut self) -> Oid {
        let n = self.next_object;
        self.next_object += 1;
        Oid::new(format!("{:040x}", n)).expect("generated oid is valid hex")
    }
}

#[async_trait]
impl ObjectStore for MockStore {
    async fn resolve_ref(&self, branch: &BranchName) -> Result<Oid, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(MockOperation::ResolveRef {
            branch: branch.to_string(),
        });
        if let Some(FailOn::ResolveRef(err)) = &inner.fail_on {
            return Err(err.clone());
        }
        inner
            .refs
            .get(branch.as_str())
            .cloned()
            .ok_or_else(|| StoreError::RefNotFound(format!("no such branch: {}", branch)))
    }

    async fn read_commit(&self, sha: &Oid) -> Result<CommitInfo, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .operations
            .push(MockOperation::ReadCommit { sha: sha.clone() });
        if let Some(FailOn::ReadCommit(err)) = &inner.fail_on {
            return Err(err.clone());
        }
        let commit = inner
            .commits
            .get(sha)
            .ok_or_else(|| StoreError::ObjectNotFound(format!("no such commit: {}", sha)))?;
        Ok(CommitInfo {
            sha: sha.clone(),
            tree: commit.tree.clone(),
        })
    }

    async fn create_tree(&self, base: &Oid, entries: &[TreeEntry]) -> Result<Oid, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(MockOperation::CreateTree {
            base: base.clone(),
            entries: entries.to_vec(),
        });
        if let Some(FailOn::CreateTree(err)) = &inner.fail_on {
            return Err(err.clone());
        }
        if !inner.trees.contains_key(base) {
            return Err(StoreError::TreeRejected(format!(
                "base tree not found: {}",
                base
            )));
        }
        if entries.is_empty() {
            return Err(StoreError::TreeRejected("tree has no entries".to_string()));
        }
        let sha = inner.generate_oid();
        inner.trees.insert(sha.clone(), entries.to_vec());
        Ok(sha)
    }

    async fn create_commit(
        &self,
        message: &str,
        tree: &Oid,
        parent: &Oid,
    ) -> Result<CreatedCommit, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(MockOperation::CreateCommit {
            message: message.to_string(),
            tree: tree.clone(),
            parent: parent.clone(),
        });
        if let Some(FailOn::CreateCommit(err)) = &inner.fail_on {
            return Err(err.clone());
        }
        if !inner.trees.contains_key(tree) {
            return Err(StoreError::CommitRejected(format!(
                "tree not found: {}",
                tree
            )));
        }
        if !inner.commits.contains_key(parent) {
            return Err(StoreError::CommitRejected(format!(
                "parent not found: {}",
                parent
            )));
        }
        let sha = inner.generate_oid();
        inner.commits.insert(
            sha.clone(),
            StoredCommit {
                tree: tree.clone(),
                parents: vec![parent.clone()],
                message: message.to_string(),
            },
        );
        Ok(CreatedCommit {
            sha,
            tree: tree.clone(),
            author: Some(CommitSignature {
                name: "mock".to_string(),
                email: "mock@example.invalid".to_string(),
                date: Utc.timestamp_opt(0, 0).unwrap(),
            }),
        })
    }

    async fn update_ref(
        &self,
        branch: &BranchName,
        to: &Oid,
        expected: &Oid,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(MockOperation::UpdateRef {
            branch: branch.to_string(),
            to: to.clone(),
            expected: expected.clone(),
        });
        if let Some(FailOn::UpdateRef(err)) = &inner.fail_on {
            return Err(err.clone());
        }

        // Apply any scheduled concurrent moves before the comparison.
        let pending = std::mem::take(&mut inner.pending_moves);
        for (name, oid) in pending {
            if name == branch.as_str() {
                inner.refs.insert(name, oid);
            } else {
                inner.pending_moves.push((name, oid));
            }
        }

        let current = inner
            .refs
            .get(branch.as_str())
            .cloned()
            .ok_or_else(|| StoreError::RefNotFound(format!("no such branch: {}", branch)))?;
        if &current != expected {
            return Err(StoreError::RefConflict(format!(
                "expected {} but {} is at {}",
                expected, branch, current
            )));
        }
        inner.refs.insert(branch.to_string(), to.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::TreePath;

    fn branch(name: &str) -> BranchName {
        BranchName::new(name).unwrap()
    }

    #[tokio::test]
    async fn seeded_branch_resolves() {
        let store = MockStore::new();
        let (head, tree) = store.seed_branch("main");

        assert_eq!(store.resolve_ref(&branch("main")).await.unwrap(), head);
        assert_eq!(store.read_commit(&head).await.unwrap().tree, tree);
    }

    #[tokio::test]
    async fn unknown_branch_is_ref_not_found() {
        let store = MockStore::new();
        let err = store.resolve_ref(&branch("missing")).await.unwrap_err();
        assert!(matches!(err, StoreError::RefNotFound(_)));
    }

    #[tokio::test]
    async fn full_object_graph_round_trip() {
        let store = MockStore::new();
        let (head, tree) = store.seed_branch("main");

        let entries = vec![TreeEntry::write(TreePath::new("a.txt").unwrap(), "hello")];
        let new_tree = store.create_tree(&tree, &entries).await.unwrap();
        let commit = store
            .create_commit("add a.txt", &new_tree, &head)
            .await
            .unwrap();
        store
            .update_ref(&branch("main"), &commit.sha, &head)
            .await
            .unwrap();

        assert_eq!(store.head("main"), Some(commit.sha.clone()));
        let stored = store.commit(&commit.sha).unwrap();
        assert_eq!(stored.parents, vec![head]);
        assert_eq!(stored.message, "add a.txt");
    }

    #[tokio::test]
    async fn conditional_update_rejects_stale_expected() {
        let store = MockStore::new();
        let (head, tree) = store.seed_branch("main");

        let entries = vec![TreeEntry::write(TreePath::new("a.txt").unwrap(), "x")];
        let new_tree = store.create_tree(&tree, &entries).await.unwrap();
        let commit = store.create_commit("msg", &new_tree, &head).await.unwrap();

        // Another writer moves the branch first.
        let other = store.schedule_ref_move("main");

        let err = store
            .update_ref(&branch("main"), &commit.sha, &head)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::RefConflict(_)));
        assert_eq!(store.head("main"), Some(other));
    }

    #[tokio::test]
    async fn failure_injection() {
        let store = MockStore::new().fail_on(FailOn::CreateTree(StoreError::Network(
            "connection reset".into(),
        )));
        let (_, tree) = store.seed_branch("main");

        let entries = vec![TreeEntry::write(TreePath::new("a.txt").unwrap(), "x")];
        let err = store.create_tree(&tree, &entries).await.unwrap_err();
        assert_eq!(err, StoreError::Network("connection reset".into()));
    }

    #[tokio::test]
    async fn records_operations_in_order() {
        let store = MockStore::new();
        let (head, _) = store.seed_branch("main");

        store.resolve_ref(&branch("main")).await.unwrap();
        store.read_commit(&head).await.unwrap();

        let ops = store.operations();
        assert_eq!(ops.len(), 2);
        assert!(matches!(&ops[0], MockOperation::ResolveRef { branch } if branch == "main"));
        assert!(matches!(&ops[1], MockOperation::ReadCommit { sha } if *sha == head));

        store.clear_operations();
        assert!(store.operations().is_empty());
    }
}
