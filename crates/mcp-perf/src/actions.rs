//! Action type definitions for CLI commands.

use clap::Subcommand;
use std::path::PathBuf;

/// Configuration file actions.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    /// Write a configuration file with default values
    Init {
        /// Destination (default: platform config directory)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the effective configuration
    Show {
        /// Configuration file to read (default: platform config file)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}
