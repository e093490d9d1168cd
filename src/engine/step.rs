//! engine::step
//!
//! The explicit per-mutation state machine.
//!
//! Every mutation walks the same typed sequence of steps. A failure at
//! any step carries the step itself, so callers and tests can assert
//! on *where* a mutation died without parsing error strings.

use thiserror::Error;

use crate::content::ContentError;
use crate::core::types::TypeError;
use crate::store::StoreError;

/// One step of the mutation sequence, in execution order.
///
/// `Validate` and `ReadContent` are local; everything from
/// `ResolveRef` on talks to the object store. `UpdateRef` is the only
/// step with an externally visible effect on the branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Check the request shape and normalize paths.
    Validate,
    /// Read local file content for write entries.
    ReadContent,
    /// Read the branch tip.
    ResolveRef,
    /// Read the tip commit's root tree.
    ReadCommit,
    /// Assemble the partial tree description.
    BuildTree,
    /// Submit the tree to the object store.
    WriteTree,
    /// Create the commit object.
    WriteCommit,
    /// Conditionally advance the branch.
    UpdateRef,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Step::Validate => "validate request",
            Step::ReadContent => "read local content",
            Step::ResolveRef => "resolve ref",
            Step::ReadCommit => "read commit",
            Step::BuildTree => "build tree",
            Step::WriteTree => "write tree",
            Step::WriteCommit => "write commit",
            Step::UpdateRef => "update ref",
        };
        write!(f, "{}", name)
    }
}

/// A failed mutation: which step died, on which branch, and why.
///
/// The underlying cause is propagated unchanged; nothing is swallowed
/// or downgraded on the way up.
#[derive(Debug, Error)]
#[error("{step} failed on branch {branch}: {kind}")]
pub struct MutationError {
    /// The step that failed.
    pub step: Step,
    /// The branch the mutation targeted.
    pub branch: String,
    /// The underlying cause.
    pub kind: MutationErrorKind,
}

/// The cause of a failed mutation.
#[derive(Debug, Error)]
pub enum MutationErrorKind {
    /// The request named no paths.
    #[error("request contains no paths")]
    EmptyRequest,

    /// The same path appeared more than once in one request.
    #[error("duplicate path: {0}")]
    DuplicatePath(String),

    /// A path failed validation or normalization.
    #[error(transparent)]
    Path(#[from] TypeError),

    /// A write entry's local file could not be read.
    #[error(transparent)]
    Content(#[from] ContentError),

    /// The object store rejected or failed an operation.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl MutationError {
    /// Whether re-running the entire mutation sequence may succeed.
    ///
    /// True for transient network failures and for concurrent
    /// modification of the branch. In both cases the retry must start
    /// from the top with a fresh ref read; resuming from a stale base
    /// would break atomicity.
    pub fn is_retryable(&self) -> bool {
        match &self.kind {
            MutationErrorKind::Store(e) => {
                e.is_transient() || matches!(e, StoreError::RefConflict(_))
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn err(kind: MutationErrorKind) -> MutationError {
        MutationError {
            step: Step::UpdateRef,
            branch: "main".to_string(),
            kind,
        }
    }

    #[test]
    fn step_display() {
        assert_eq!(format!("{}", Step::ResolveRef), "resolve ref");
        assert_eq!(format!("{}", Step::UpdateRef), "update ref");
    }

    #[test]
    fn error_display_names_step_and_branch() {
        let e = err(MutationErrorKind::Store(StoreError::RefConflict(
            "branch moved".into(),
        )));
        assert_eq!(
            format!("{}", e),
            "update ref failed on branch main: concurrent modification: branch moved"
        );
    }

    #[test]
    fn conflict_and_network_are_retryable() {
        assert!(err(MutationErrorKind::Store(StoreError::RefConflict("x".into()))).is_retryable());
        assert!(err(MutationErrorKind::Store(StoreError::Network("x".into()))).is_retryable());
    }

    #[test]
    fn fatal_errors_are_not_retryable() {
        assert!(!err(MutationErrorKind::EmptyRequest).is_retryable());
        assert!(!err(MutationErrorKind::Store(StoreError::AuthFailed("x".into()))).is_retryable());
        assert!(
            !err(MutationErrorKind::Store(StoreError::TreeRejected("x".into()))).is_retryable()
        );
        assert!(!err(MutationErrorKind::Content(
            crate::content::ContentError::NotFound("a.txt".into())
        ))
        .is_retryable());
    }
}
