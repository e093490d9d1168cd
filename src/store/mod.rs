//! store
//!
//! Object store abstraction for the Git object graph.
//!
//! # Architecture
//!
//! The [`ObjectStore`] trait defines the five object-graph operations
//! the mutation engine consumes. The engine never constructs a store
//! implementation itself; callers pick one and hand it over.
//!
//! # Modules
//!
//! - `traits`: Core `ObjectStore` trait, entry/commit types, error taxonomy
//! - [`github`]: GitHub implementation over the Git Data REST API
//! - [`mock`]: In-memory implementation for deterministic testing

pub mod github;
pub mod mock;
mod traits;

pub use traits::{
    CommitInfo, CommitSignature, CreatedCommit, ObjectStore, StoreError, TreeEntry,
    REGULAR_FILE_MODE,
};
