//! Command-line interface definitions and parsing
//!
//! This module defines the CLI structure for pictag using the `clap` crate.
//! Each subcommand maps onto one index or orchestrator operation; the global
//! flags override the matching config file settings.
//!
//! # Examples
//!
//! ```
//! use pictag::cli::{Cli, Commands};
//! use clap::Parser;
//!
//! let cli = Cli::parse_from(["pictag", "tag", "a.jpg", "cat", "pet"]);
//! assert!(matches!(cli.command, Commands::Tag { .. }));
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::PathFormat;
use crate::orchestrator::BatchOptions;

/// List variant for the list command
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListVariant {
    /// List all tagged images
    Images,
    /// List all tags with their image counts
    Tags,
}

/// Direction of a directory batch
#[derive(Subcommand, Debug, Clone)]
pub enum BatchCommands {
    /// Add tags to every supported image in a directory
    Add {
        /// Directory to scan (not recursive)
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Tags to apply
        #[arg(value_name = "TAGS", required = true, num_args = 1..)]
        tags: Vec<String>,
    },

    /// Remove tags from every supported image in a directory
    #[command(visible_alias = "rm")]
    Remove {
        /// Directory to scan (not recursive)
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Tags to remove
        #[arg(value_name = "TAGS", required = true, num_args = 1..)]
        tags: Vec<String>,
    },
}

#[derive(Parser, Debug)]
#[command(name = "pictag")]
#[command(about = "A bidirectional image tagging index", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Index directory (overrides config)
    #[arg(long = "db", value_name = "PATH", global = true)]
    pub db: Option<PathBuf>,

    /// Suppress informational output (only print results)
    #[arg(short = 'q', long = "quiet", global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log every index mutation
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Skip confirmation of destructive commands
    #[arg(short = 'y', long = "yes", global = true)]
    pub yes: bool,

    /// Stop at the first failed image instead of carrying on
    #[arg(long = "stop-on-error", global = true, conflicts_with = "parallel")]
    pub stop_on_error: bool,

    /// Process images in parallel
    #[arg(long = "parallel", global = true)]
    pub parallel: bool,

    /// Rename with a separate remove and add instead of one transaction
    #[arg(long = "split-retag", global = true)]
    pub split_retag: bool,

    /// Display absolute paths (overrides config)
    #[arg(long = "absolute", global = true, conflicts_with = "relative")]
    pub absolute: bool,

    /// Display relative paths (overrides config)
    #[arg(long = "relative", global = true, conflicts_with = "absolute")]
    pub relative: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Tag an image with one or more tags
    #[command(visible_alias = "t")]
    Tag {
        /// Image to tag
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Tags to apply
        #[arg(value_name = "TAGS", required = true, num_args = 1..)]
        tags: Vec<String>,
    },

    /// Remove one or more tags from an image
    #[command(visible_alias = "u")]
    Untag {
        /// Image to untag
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Tags to remove
        #[arg(value_name = "TAGS", required = true, num_args = 1..)]
        tags: Vec<String>,
    },

    /// Show the tags of an image
    Show {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Find images carrying a tag
    #[command(visible_alias = "s")]
    Search {
        #[arg(value_name = "TAG")]
        tag: String,
    },

    /// List all tags or all tagged images
    #[command(visible_alias = "ls")]
    List {
        #[arg(value_enum, default_value_t = ListVariant::Tags)]
        variant: ListVariant,
    },

    /// Tag or untag a whole directory
    Batch {
        #[command(subcommand)]
        command: BatchCommands,
    },

    /// Rename a tag, merging into the new name if it exists
    #[command(visible_alias = "mv")]
    Rename {
        #[arg(value_name = "OLD")]
        old: String,

        #[arg(value_name = "NEW")]
        new: String,
    },

    /// Lower-case every tag, merging tags that collide
    Normalize,

    /// Remove a tag from every image
    #[command(name = "remove-tag")]
    RemoveTag {
        #[arg(value_name = "TAG")]
        tag: String,
    },

    /// Add tags to every image that already carries a tag
    Derive {
        /// Tag selecting the images
        #[arg(value_name = "EXISTING")]
        existing: String,

        /// Tags to add
        #[arg(value_name = "TAGS", required = true, num_args = 1..)]
        tags: Vec<String>,
    },

    /// Delete an image file and drop all its tags
    #[command(visible_alias = "rm")]
    Delete {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Drop missing files and orphaned tags from the index
    #[command(visible_alias = "c")]
    Clean,

    /// Audit the index for one-sided or empty entries
    Check,
}

impl Cli {
    /// Parse command line arguments
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Helper method to get the path format override from global flags
    #[must_use]
    pub const fn get_path_format(&self) -> Option<PathFormat> {
        if self.absolute {
            Some(PathFormat::Absolute)
        } else if self.relative {
            Some(PathFormat::Relative)
        } else {
            None
        }
    }

    /// Apply the batch flags on top of the configured options
    #[must_use]
    pub const fn batch_options(&self, mut base: BatchOptions) -> BatchOptions {
        if self.stop_on_error {
            base.continue_on_error = false;
        }
        if self.parallel {
            base.parallel = true;
        }
        if self.split_retag {
            base.atomic_retag = false;
        }
        base
    }

    /// Default log filter for the verbosity flags
    #[must_use]
    pub const fn log_level(&self, quiet: bool) -> &'static str {
        if self.verbose {
            "debug"
        } else if quiet {
            "warn"
        } else {
            "info"
        }
    }
}
