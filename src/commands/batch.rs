//! Batch and derive commands - tag many images at once

use super::{Context, resolve_path};
use crate::cli::BatchCommands;
use crate::orchestrator::TagOrchestrator;
use crate::scanner::FileScanner;
use crate::{PictagError, output};

type Result<T> = std::result::Result<T, PictagError>;

/// Execute a directory batch
///
/// # Errors
/// Returns an error for bad tags or an unreadable directory, or
/// `PictagError::PartialBatch` if some images failed
pub fn execute<S: FileScanner>(
    orchestrator: &TagOrchestrator<'_, S>,
    command: &BatchCommands,
    ctx: Context,
) -> Result<()> {
    let (action, outcome) = match command {
        BatchCommands::Add { dir, tags } => (
            "Tagged",
            orchestrator.batch_add_tags_to_directory(resolve_path(dir)?, tags)?,
        ),
        BatchCommands::Remove { dir, tags } => (
            "Untagged",
            orchestrator.batch_remove_tags_from_directory(resolve_path(dir)?, tags)?,
        ),
    };

    output::print_outcome(action, &outcome, ctx.quiet);
    outcome.into_result().map(|_| ())
}

/// Execute the derive command - add tags to every image carrying `existing`
///
/// # Errors
/// Returns an error for bad tags, or `PictagError::PartialBatch` if some
/// images failed
pub fn derive<S: FileScanner>(
    orchestrator: &TagOrchestrator<'_, S>,
    existing: &str,
    tags: &[String],
    ctx: Context,
) -> Result<()> {
    let outcome = orchestrator.add_tags_to_tagged_images(existing, tags)?;
    output::print_outcome(&format!("Derived from '{existing}'"), &outcome, ctx.quiet);
    outcome.into_result().map(|_| ())
}
