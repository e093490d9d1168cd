//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--repo <OWNER/REPO>`: target repository slug
//! - `--branch <BRANCH>`: branch to mutate
//! - `--dir <PATH>`: local repository directory
//! - `--config <FILE>`: config file (defaults to `./quill.toml` when present)
//! - `--retries <N>`: retry the whole mutation on retryable failures
//! - `--debug`: enable debug logging
//! - `--quiet` / `-q`: minimal output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Quill - atomic multi-file commits through the GitHub Git Data API
#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Target repository as an owner/repo slug
    #[arg(long, global = true, value_name = "OWNER/REPO")]
    pub repo: Option<String>,

    /// Branch the mutation applies to
    #[arg(long, global = true, value_name = "BRANCH")]
    pub branch: Option<String>,

    /// Local repository directory file content is read from
    #[arg(long, global = true, value_name = "PATH")]
    pub dir: Option<PathBuf>,

    /// Config file (defaults to ./quill.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Retry the whole mutation up to N extra times on retryable failures
    #[arg(long, global = true, value_name = "N")]
    pub retries: Option<u32>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Commit local files to the target branch as a single commit
    #[command(
        after_help = "\
EXAMPLES:
    # Commit two files in one commit
    quill commit -m \"update docs\" README.md docs/guide.md

    # Retry the whole mutation if the branch moves underneath it
    quill --retries 3 commit -m \"apply changes\" src/lib.rs"
    )]
    Commit {
        /// Commit message
        #[arg(short, long)]
        message: String,

        /// Files to commit (repo-root-relative)
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<String>,
    },

    /// Delete files from the target branch as a single commit
    #[command(
        after_help = "\
EXAMPLES:
    # Remove two files in one commit
    quill delete -m \"drop generated files\" out.txt gen/out2.txt"
    )]
    Delete {
        /// Commit message
        #[arg(short, long)]
        message: String,

        /// Files to delete (repo-root-relative)
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commit_command() {
        let cli = Cli::try_parse_from([
            "quill", "--repo", "o/r", "commit", "-m", "msg", "a.txt", "b.txt",
        ])
        .unwrap();
        assert_eq!(cli.repo.as_deref(), Some("o/r"));
        match cli.command {
            Command::Commit { message, paths } => {
                assert_eq!(message, "msg");
                assert_eq!(paths, vec!["a.txt", "b.txt"]);
            }
            _ => panic!("expected commit"),
        }
    }

    #[test]
    fn commit_requires_paths() {
        assert!(Cli::try_parse_from(["quill", "commit", "-m", "msg"]).is_err());
    }

    #[test]
    fn delete_requires_message() {
        assert!(Cli::try_parse_from(["quill", "delete", "a.txt"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["quill", "delete", "-m", "msg", "a.txt", "--branch", "dev"])
                .unwrap();
        assert_eq!(cli.branch.as_deref(), Some("dev"));
    }
}
