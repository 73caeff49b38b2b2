//! Common utilities shared across harness commands.
//!
//! `run`, `steps` and `rollback` take the same flags. [`HarnessArgs`] holds
//! them, layers them over the file configuration and resolves the database
//! URL.

use crate::config::HarnessConfig;
use crate::formatters;
use crate::harness::{MigrationHarness, Outcome, RunOptions, check_database_url};
use anyhow::{Context, Result};
use clap::Args;
use codebase_mcp_core::cli::OutputFormat;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

/// Flags shared by the harness commands.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct HarnessArgs {
    /// Test database URL; must name the test database
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Budget in seconds (overrides `target_seconds`, or
    /// `rollback_target_seconds` for `rollback`)
    #[arg(long, value_name = "SECS")]
    pub budget: Option<f64>,

    /// Project root containing alembic.ini (overrides `repo_root`)
    #[arg(long, value_name = "DIR")]
    pub repo_root: Option<PathBuf>,

    /// Migration log file (overrides `migration_log_file`)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Per-command timeout in seconds (overrides `command_timeout_secs`)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Reuse the existing test database instead of recreating it
    #[arg(long)]
    pub skip_prepare: bool,

    /// Reuse existing rows instead of running the data generator
    #[arg(long)]
    pub skip_generate: bool,

    /// Configuration file (default: platform config file)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Which migration direction a command times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `alembic upgrade head`
    Upgrade,
    /// `alembic downgrade -1`
    Rollback,
}

impl HarnessArgs {
    /// Loads the configuration file and applies flag overrides.
    ///
    /// `--budget` replaces the budget of `direction`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded or the merged
    /// configuration is invalid.
    pub fn load_config(&self, direction: Direction) -> codebase_mcp_core::Result<HarnessConfig> {
        let mut config = HarnessConfig::load(self.config.as_deref())?;

        if let Some(budget) = self.budget {
            match direction {
                Direction::Upgrade => config.target_seconds = budget,
                Direction::Rollback => config.rollback_target_seconds = budget,
            }
        }
        if let Some(root) = &self.repo_root {
            config.repo_root.clone_from(root);
        }
        if let Some(log_file) = &self.log_file {
            config.migration_log_file.clone_from(log_file);
        }
        if self.timeout.is_some() {
            config.command_timeout_secs = self.timeout;
        }

        config.validate()?;
        debug!(?config, "effective configuration");
        Ok(config)
    }

    /// Phases the user asked to skip.
    #[must_use]
    pub const fn run_options(&self) -> RunOptions {
        RunOptions {
            skip_prepare: self.skip_prepare,
            skip_generate: self.skip_generate,
        }
    }
}

/// What a harness command should do after reading its flags.
#[derive(Debug)]
pub enum Prepared {
    /// Ready to run against the test database.
    Ready(Box<MigrationHarness>),

    /// Flags or configuration were invalid.
    Invalid(String),

    /// The database URL is missing or unsafe.
    Skip(String),
}

/// Builds a harness from flags, or explains why it cannot run.
#[must_use]
pub fn prepare(args: &HarnessArgs, direction: Direction) -> Prepared {
    let config = match args.load_config(direction) {
        Ok(config) => config,
        Err(e) => return Prepared::Invalid(e.to_string()),
    };

    let database = match config.database_name() {
        Ok(database) => database,
        Err(e) => return Prepared::Invalid(e.to_string()),
    };

    let url = match check_database_url(args.database_url.as_deref(), &database) {
        Ok(url) => url,
        Err(reason) => return Prepared::Skip(reason),
    };

    match MigrationHarness::new(config, url) {
        Ok(harness) => Prepared::Ready(Box::new(harness)),
        Err(e) => Prepared::Invalid(e.to_string()),
    }
}

/// Prints an outcome: the report on stdout, the verdict on stderr.
///
/// In JSON mode the whole outcome, status tag included, goes to stdout.
///
/// # Errors
///
/// Returns an error if the report cannot be rendered.
pub fn print_outcome<T, F>(outcome: &Outcome<T>, format: OutputFormat, render: F) -> Result<()>
where
    T: Serialize,
    F: Fn(&T, OutputFormat) -> Result<String>,
{
    if format == OutputFormat::Json {
        let json = formatters::json::format(outcome).context("failed to format outcome")?;
        println!("{json}");
        return Ok(());
    }

    if let Some(report) = outcome.report() {
        print!("{}", render(report, format)?);
    }

    let color = format == OutputFormat::Pretty;
    match outcome {
        Outcome::Passed(_) => {}
        Outcome::Failed { reason, .. } => eprintln!("{} {reason}", label("FAILED:", color)),
        Outcome::Skipped { reason } => eprintln!("{} {reason}", label("SKIPPED:", color)),
    }
    Ok(())
}

/// Prints an error message for invalid input.
pub fn print_invalid(message: &str, format: OutputFormat) {
    eprintln!(
        "{} {message}",
        label("ERROR:", format == OutputFormat::Pretty)
    );
}

fn label(text: &str, color: bool) -> String {
    if !color {
        return text.to_string();
    }
    match text {
        "SKIPPED:" => text.yellow().bold().to_string(),
        _ => text.red().bold().to_string(),
    }
}
