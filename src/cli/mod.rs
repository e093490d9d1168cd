//! cli
//!
//! Command-line interface layer for Quill.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Assemble the explicit engine configuration
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches
//! to the [`crate::engine`] for execution. All branch mutations flow
//! through the engine's step sequence; any unrecovered error surfaces
//! here as a non-zero exit.

pub mod args;
pub mod commands;

pub use args::{Cli, Command};

use anyhow::Result;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub async fn run() -> Result<()> {
    let cli = Cli::parse_args();
    commands::dispatch(cli).await
}
