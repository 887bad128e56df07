//! Pictag CLI application entry point
//!
//! This is the main executable for the pictag image tagging index. It opens
//! the index, builds an orchestrator with the configured batch policy and
//! dispatches the parsed subcommand.
//!
//! # Usage
//!
//! ```bash
//! # Tag an image
//! pictag tag photo.jpg beach summer
//!
//! # Tag every image in a directory
//! pictag batch add ~/photos/2024 vacation
//!
//! # Rename a tag, merging into an existing one
//! pictag rename Beach beach
//!
//! # Drop missing files and orphaned tags
//! pictag clean
//!
//! # Quiet mode (only output results)
//! pictag -q search beach
//! ```
//!
//! # Configuration
//!
//! Configuration is stored in the user's config directory
//! (`~/.config/pictag/config.toml` on Linux) and created with defaults on
//! first run. Set `RUST_LOG` to override the log filter.

use colored::Colorize;
use pictag::{
    PictagError,
    cli::{Cli, Commands},
    commands::{self, Context},
    config::PictagConfig,
    db::TagIndex,
    orchestrator::TagOrchestrator,
};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, PictagError>;

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = PictagConfig::load()?;

    let quiet = cli.quiet || config.quiet;
    init_tracing(cli.log_level(quiet));

    let ctx = Context {
        path_format: cli.get_path_format().unwrap_or(config.path_format),
        quiet,
        yes: cli.yes,
    };
    let db_path = match &cli.db {
        Some(path) => path.clone(),
        None => config.database_path()?,
    };
    debug!(path = %db_path.display(), "opening index");

    let index = TagIndex::open(&db_path)?;
    let orchestrator = TagOrchestrator::new(&index).with_options(cli.batch_options(config.batch));

    let result = match &cli.command {
        Commands::Tag { file, tags } => commands::tag::execute(&orchestrator, file, tags, ctx),
        Commands::Untag { file, tags } => commands::tag::untag(&orchestrator, file, tags, ctx),
        Commands::Show { file } => commands::tag::show(&index, file, ctx),
        Commands::Search { tag } => commands::search::execute(&index, tag, ctx),
        Commands::List { variant } => commands::list::execute(&index, *variant, ctx),
        Commands::Batch { command } => commands::batch::execute(&orchestrator, command, ctx),
        Commands::Rename { old, new } => commands::tags::rename(&orchestrator, old, new, ctx),
        Commands::Normalize => commands::tags::normalize(&orchestrator, ctx),
        Commands::RemoveTag { tag } => commands::tags::remove_globally(&orchestrator, tag, ctx),
        Commands::Derive { existing, tags } => {
            commands::batch::derive(&orchestrator, existing, tags, ctx)
        }
        Commands::Delete { file } => commands::cleanup::delete(&orchestrator, file, ctx),
        Commands::Clean => commands::cleanup::execute(&orchestrator, ctx),
        Commands::Check => commands::cleanup::check(&index, ctx),
    };

    index.close()?;
    result
}

/// Main entry point for the pictag application
fn main() -> ExitCode {
    match run(Cli::parse_args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", "Error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
