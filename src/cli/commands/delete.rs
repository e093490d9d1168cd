//! cli::commands::delete
//!
//! Delete files from the target branch as a single commit.

use anyhow::Result;

use crate::engine::Mutator;
use crate::ui;

use super::{run_mutation, Context};

/// Run the delete command.
pub async fn delete(
    mutator: &Mutator,
    ctx: &Context,
    paths: &[String],
    message: &str,
) -> Result<()> {
    let target = mutator.target();
    ui::debug(
        format!(
            "deleting {} path(s) from {}@{}",
            paths.len(),
            target.slug(),
            target.branch
        ),
        ctx.verbosity,
    );

    let result = run_mutation(ctx, || mutator.delete_files(paths, message)).await?;

    ui::print(
        format!(
            "deleted {} file(s) from {} at {}",
            result.paths.len(),
            target.branch,
            result.commit.short(12)
        ),
        ctx.verbosity,
    );
    Ok(())
}
