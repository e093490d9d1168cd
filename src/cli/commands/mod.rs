//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments
//! 2. Calls the engine to execute the mutation
//! 3. Formats and displays output
//!
//! Handlers do NOT talk to the object store directly; all mutations
//! flow through the [`Mutator`].
//!
//! This module is also the only place ambient environment is read
//! (`GITHUB_TOKEN`, `GITHUB_REPOSITORY`, `GITHUB_WORKSPACE`), strictly
//! as fallbacks for missing flags. The engine itself only ever sees
//! the explicit [`RepoTarget`].

mod commit;
mod delete;

pub use commit::commit;
pub use delete::delete;

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};

use crate::auth::StaticTokenProvider;
use crate::cli::args::{Cli, Command};
use crate::content::FsContentSource;
use crate::core::config::{parse_repo_slug, FileConfig, RepoTarget};
use crate::engine::{MutationError, MutationResult, Mutator};
use crate::retry::RetryPolicy;
use crate::store::github::GitHubStore;
use crate::ui::Verbosity;

/// Default branch when none is configured anywhere.
const DEFAULT_BRANCH: &str = "main";

/// Default config file name looked up in the working directory.
const DEFAULT_CONFIG_FILE: &str = "quill.toml";

/// Execution context assembled from global flags.
#[derive(Debug, Clone, Copy)]
pub struct Context {
    /// Output verbosity.
    pub verbosity: Verbosity,
    /// Extra attempts for retryable failures (0 = single attempt).
    pub retries: u32,
}

/// Dispatch a parsed command line to its handler.
pub async fn dispatch(cli: Cli) -> Result<()> {
    let ctx = Context {
        verbosity: Verbosity::from_flags(cli.quiet, cli.debug),
        retries: cli.retries.unwrap_or(0),
    };

    let target = resolve_target(&cli)?;
    let token = github_token_from_env()?;

    let store = GitHubStore::new(
        Arc::new(StaticTokenProvider::new(token)),
        target.owner.clone(),
        target.repo.clone(),
    );
    let content = FsContentSource::new(target.root_dir.clone());
    let mutator = Mutator::new(Arc::new(store), Arc::new(content), target);

    match cli.command {
        Command::Commit { message, paths } => commit(&mutator, &ctx, &paths, &message).await,
        Command::Delete { message, paths } => delete(&mutator, &ctx, &paths, &message).await,
    }
}

/// Assemble the repository target from flags, file config, and
/// environment fallbacks (flags win).
fn resolve_target(cli: &Cli) -> Result<RepoTarget> {
    let file = load_file_config(cli)?;

    let (owner, repo) = match &cli.repo {
        Some(slug) => parse_repo_slug(slug)
            .with_context(|| format!("invalid --repo value '{slug}', expected owner/repo"))?,
        None => match (file.owner.clone(), file.repo.clone()) {
            (Some(owner), Some(repo)) => (owner, repo),
            _ => match std::env::var("GITHUB_REPOSITORY") {
                Ok(slug) => parse_repo_slug(&slug).with_context(|| {
                    format!("invalid GITHUB_REPOSITORY value '{slug}', expected owner/repo")
                })?,
                Err(_) => bail!(
                    "no target repository; pass --repo, set it in quill.toml, \
                     or export GITHUB_REPOSITORY"
                ),
            },
        },
    };

    let branch = cli
        .branch
        .clone()
        .or(file.branch.clone())
        .unwrap_or_else(|| DEFAULT_BRANCH.to_string());

    let root_dir = match cli.dir.clone().or(file.root_dir.clone()) {
        Some(dir) => dir,
        None => match std::env::var_os("GITHUB_WORKSPACE") {
            Some(dir) => dir.into(),
            None => std::env::current_dir().context("cannot determine working directory")?,
        },
    };

    RepoTarget::new(owner, repo, branch, root_dir).context("invalid repository target")
}

/// Load the config file named by `--config`, or `./quill.toml` when present.
fn load_file_config(cli: &Cli) -> Result<FileConfig> {
    match &cli.config {
        Some(path) => FileConfig::load(path).context("failed to load config file"),
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.exists() {
                FileConfig::load(default).context("failed to load quill.toml")
            } else {
                Ok(FileConfig::default())
            }
        }
    }
}

/// Read the bearer token from the environment.
///
/// A missing credential is a fatal precondition failure; no network
/// call is attempted without one.
pub fn github_token_from_env() -> Result<String> {
    match std::env::var("GITHUB_TOKEN") {
        Ok(token) if !token.is_empty() => Ok(token),
        _ => bail!("no credential configured; export GITHUB_TOKEN"),
    }
}

/// Check if a GitHub credential is available.
pub fn has_github_token() -> bool {
    std::env::var("GITHUB_TOKEN").is_ok_and(|t| !t.is_empty())
}

/// Run a mutation, wrapping the entire sequence in the retry policy
/// when extra attempts were requested.
///
/// Retrying re-invokes the whole operation, which re-reads the branch
/// tip; a mutation is never resumed from a stale base.
pub(crate) async fn run_mutation<F, Fut>(
    ctx: &Context,
    operation: F,
) -> Result<MutationResult, MutationError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<MutationResult, MutationError>>,
{
    if ctx.retries == 0 {
        let mut operation = operation;
        return operation().await;
    }
    RetryPolicy::with_attempts(ctx.retries.saturating_add(1))
        .run(operation, MutationError::is_retryable)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_defaults_to_single_attempt() {
        let ctx = Context {
            verbosity: Verbosity::Normal,
            retries: 0,
        };
        assert_eq!(ctx.retries, 0);
    }

    #[tokio::test]
    async fn run_mutation_without_retries_runs_once() {
        let ctx = Context {
            verbosity: Verbosity::Quiet,
            retries: 0,
        };
        let mut calls = 0;
        let result = run_mutation(&ctx, || {
            calls += 1;
            async {
                Err(MutationError {
                    step: crate::engine::Step::ResolveRef,
                    branch: "main".to_string(),
                    kind: crate::store::StoreError::Network("down".into()).into(),
                })
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
