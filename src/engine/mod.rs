//! engine
//!
//! The atomic multi-file mutation engine.
//!
//! # Architecture
//!
//! A mutation commits or deletes a set of files in the target
//! repository as one indivisible commit, built directly from the Git
//! object graph: read the branch tip, read its tree, submit a partial
//! tree layered on it, create a commit, then conditionally advance the
//! branch. Nothing is visible on the branch until the final
//! conditional update, which is also what detects concurrent drift.
//!
//! # Modules
//!
//! - [`mutation`] - the [`Mutator`] façade and request/result types
//! - [`step`] - the typed step sequence and error type

pub mod mutation;
pub mod step;

pub use mutation::{EntryAction, MutationRequest, MutationResult, Mutator, PathEntry};
pub use step::{MutationError, MutationErrorKind, Step};
