//! Cleanup commands - sweep stale entries, delete images and audit the index

use super::{Context, confirm, resolve_path};
use crate::orchestrator::TagOrchestrator;
use crate::scanner::FileScanner;
use crate::{PictagError, db::TagIndex, output};
use colored::Colorize;
use std::path::Path;

type Result<T> = std::result::Result<T, PictagError>;

/// Execute the clean command
///
/// # Errors
/// Returns `PictagError::PartialBatch` if any cleanup step failed
pub fn execute<S: FileScanner>(orchestrator: &TagOrchestrator<'_, S>, ctx: Context) -> Result<()> {
    if !ctx.quiet {
        println!("Scanning index for missing images and orphaned tags...");
    }

    let report = orchestrator.clean_database();
    output::print_cleanup(&report, ctx.quiet);
    report.into_result().map(|_| ())
}

/// Delete an image from disk and drop its tags, after confirmation
///
/// # Errors
/// Returns an error if the prompt fails, the file cannot be deleted, or the
/// index update fails
pub fn delete<S: FileScanner>(
    orchestrator: &TagOrchestrator<'_, S>,
    file: &Path,
    ctx: Context,
) -> Result<()> {
    let fullpath = resolve_path(file)?;
    let shown = output::format_path(&fullpath, ctx.path_format);

    if !confirm(&format!("Delete {shown} from disk?"), ctx)? {
        if !ctx.quiet {
            println!("Cancelled.");
        }
        return Ok(());
    }

    let removed = orchestrator.delete_image_file(&fullpath)?;
    if !ctx.quiet {
        println!("Deleted {shown} ({removed} tag(s) removed)");
    }
    Ok(())
}

/// Execute the check command - report inconsistencies between the two trees
///
/// # Errors
/// Returns an error if the index cannot be read, or
/// `PictagError::InvalidInput` if inconsistencies were found
pub fn check(index: &TagIndex, ctx: Context) -> Result<()> {
    let issues = index.verify()?;

    if issues.is_empty() {
        if !ctx.quiet {
            println!("{}", "Index is consistent.".green());
        }
        return Ok(());
    }

    for issue in &issues {
        println!("  {issue}");
    }
    Err(PictagError::InvalidInput(format!(
        "Index has {} inconsistenc{}; run 'pictag clean' or re-tag the affected images",
        issues.len(),
        if issues.len() == 1 { "y" } else { "ies" }
    )))
}
