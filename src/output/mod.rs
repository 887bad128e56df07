//! Output formatting for CLI display
//!
//! This module provides utilities for formatting output in the CLI,
//! including path display formatting and batch summaries.

use crate::config::PathFormat;
use crate::orchestrator::{BatchOutcome, CleanupReport};
use colored::Colorize;
use std::path::Path;

/// Format a path according to the display mode
#[must_use]
pub fn format_path(path: &Path, format: PathFormat) -> String {
    match format {
        PathFormat::Absolute => path.display().to_string(),
        PathFormat::Relative => {
            if let Ok(cwd) = std::env::current_dir()
                && let Ok(rel_path) = path.strip_prefix(&cwd)
            {
                return rel_path.display().to_string();
            }
            // Fallback to absolute if relative path cannot be computed
            path.display().to_string()
        }
    }
}

/// Format an image with its tags for display
#[must_use]
pub fn image_with_tags(path: &Path, tags: &[String], format: PathFormat, quiet: bool) -> String {
    let path_str = format_path(path, format);

    if quiet {
        tags.join("\n")
    } else if tags.is_empty() {
        format!("{path_str} (no tags)")
    } else {
        format!("{} [{}]", path_str.bold(), tags.join(", "))
    }
}

/// Format a tag with usage count
#[must_use]
pub fn tag_with_count(tag: &str, count: usize, quiet: bool) -> String {
    if quiet {
        tag.to_string()
    } else if count == 0 {
        format!("  {tag} {}", "(orphaned)".yellow())
    } else {
        format!("  {tag} (used by {count} image(s))")
    }
}

/// Color a path based on file existence (green if exists, red if missing)
#[must_use]
pub fn colorize_path(path: &Path, format: PathFormat) -> String {
    let formatted = format_path(path, format);
    if path.exists() {
        formatted.green().to_string()
    } else {
        formatted.red().to_string()
    }
}

/// One-line summary of a best-effort operation
#[must_use]
pub fn outcome_summary(action: &str, outcome: &BatchOutcome) -> String {
    let base = format!(
        "{action}: {} image(s), {} succeeded",
        outcome.processed, outcome.succeeded
    );
    if outcome.is_clean() {
        base.green().to_string()
    } else {
        format!("{base}, {}", format!("{} failed", outcome.failed).red())
    }
}

/// Print an outcome summary plus its first error, unless quiet and clean
pub fn print_outcome(action: &str, outcome: &BatchOutcome, quiet: bool) {
    if !quiet || !outcome.is_clean() {
        println!("{}", outcome_summary(action, outcome));
    }
    if let Some(first) = &outcome.first_error {
        eprintln!("{} {first}", "First error:".red().bold());
    }
}

/// Print a cleanup report
pub fn print_cleanup(report: &CleanupReport, quiet: bool) {
    if !quiet {
        println!(
            "Removed {} missing image(s) and {} orphaned tag(s)",
            report.files_cleaned, report.tags_cleaned
        );
    }
    if let Some(first) = &report.first_error {
        eprintln!(
            "{} {} step(s) failed, first: {first}",
            "Cleanup incomplete:".red().bold(),
            report.failed
        );
    }
}
