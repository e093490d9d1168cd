//! cli::commands::commit
//!
//! Commit local files to the target branch as a single commit.

use anyhow::Result;

use crate::engine::Mutator;
use crate::ui;

use super::{run_mutation, Context};

/// Run the commit command.
pub async fn commit(
    mutator: &Mutator,
    ctx: &Context,
    paths: &[String],
    message: &str,
) -> Result<()> {
    let target = mutator.target();
    ui::debug(
        format!(
            "committing {} path(s) to {}@{}",
            paths.len(),
            target.slug(),
            target.branch
        ),
        ctx.verbosity,
    );

    let result = run_mutation(ctx, || mutator.commit_files(paths, message)).await?;

    ui::debug(
        format!("new tree {} paths {:?}", result.tree.short(12), result.paths),
        ctx.verbosity,
    );
    ui::print(
        format!(
            "committed {} file(s) to {} at {}",
            result.paths.len(),
            target.branch,
            result.commit.short(12)
        ),
        ctx.verbosity,
    );
    Ok(())
}
