//! ui
//!
//! User-facing output utilities.

pub mod output;

pub use output::{debug, error, print, warn, Verbosity};
