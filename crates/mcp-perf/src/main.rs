//! Migration performance harness CLI.
//!
//! Drives `alembic upgrade head` against a prepared test database and checks
//! it against the FR-031 budget.
//!
//! # Architecture
//!
//! - `run` - full scenario: prepare, generate data, migrate, report
//! - `steps` - check that the migration logs per-step timings
//! - `rollback` - time `alembic downgrade -1` and check rows survive it
//! - `parse-log` - print step timings from an existing log file
//! - `config` - write or show the configuration file
//! - `completions` - generate shell completions
//!
//! # Examples
//!
//! ```bash
//! export DATABASE_URL=postgresql://localhost/codebase_mcp_test
//! migration-perf run --repo-root /srv/codebase-mcp
//!
//! migration-perf --format json parse-log /tmp/codebase-mcp-migration.log
//! ```

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use codebase_mcp_core::cli::{ExitCode, OutputFormat};
use codebase_mcp_perf::actions::ConfigAction;
use codebase_mcp_perf::commands::{self, common::HarnessArgs};
use std::path::PathBuf;
use tracing::{debug, error};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Migration performance harness for codebase-mcp.
///
/// Times the schema migration on a 100 repository / 10,000 chunk dataset
/// and fails when it takes 300 seconds or more.
#[derive(Parser, Debug)]
#[command(name = "migration-perf")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (json, text, pretty)
    #[arg(long = "format", global = true, default_value = "pretty")]
    format: String,

    /// Log line format on stderr
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the full migration performance scenario.
    ///
    /// Recreates the test database, applies the baseline revision, generates
    /// the dataset, times `alembic upgrade head` and checks the budget and
    /// row counts.
    Run(HarnessArgs),

    /// Check that the migration logs per-step timings.
    Steps(HarnessArgs),

    /// Time the rollback of the latest migration.
    ///
    /// Prepares the database like `run`, upgrades to head, then times
    /// `alembic downgrade -1` and checks that repositories and code chunks
    /// survive it.
    Rollback(HarnessArgs),

    /// Print step timings from an existing migration log.
    ParseLog {
        /// Migration log file
        file: PathBuf,
    },

    /// Manage the harness configuration file.
    Config {
        /// Configuration action
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions.
    Completions {
        /// Target shell for completion generation
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.log_format)?;

    let exit_code = match cli.format.parse::<OutputFormat>() {
        Ok(output_format) => {
            debug!(format = %output_format, "output format");
            execute_command(cli.command, output_format).await?
        }
        Err(e) => {
            error!("{e}");
            ExitCode::INVALID_INPUT
        }
    };

    std::process::exit(exit_code.as_i32());
}

/// Initializes logging on stderr.
///
/// `RUST_LOG` is honored unless `--verbose` forces debug level.
fn init_logging(verbose: bool, log_format: LogFormat) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    match log_format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()?,
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
    }

    Ok(())
}

/// Routes a command to its handler and returns its exit code.
async fn execute_command(command: Commands, output_format: OutputFormat) -> Result<ExitCode> {
    match command {
        Commands::Run(args) => commands::run::run(args, output_format).await,
        Commands::Steps(args) => commands::steps::run(args, output_format).await,
        Commands::Rollback(args) => commands::rollback::run(args, output_format).await,
        Commands::ParseLog { file } => commands::parse_log::run(file, output_format).await,
        Commands::Config { action } => commands::config::run(action, output_format).await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            commands::completions::run(shell, &mut cmd).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parsing_run_flags() {
        let cli = Cli::parse_from([
            "migration-perf",
            "run",
            "--database-url",
            "postgresql://localhost/codebase_mcp_test",
            "--budget",
            "120",
            "--repo-root",
            "/srv/app",
            "--skip-prepare",
        ]);

        let Commands::Run(args) = cli.command else {
            panic!("Expected Run command");
        };
        assert_eq!(
            args.database_url.as_deref(),
            Some("postgresql://localhost/codebase_mcp_test")
        );
        assert_eq!(args.budget, Some(120.0));
        assert_eq!(args.repo_root, Some(PathBuf::from("/srv/app")));
        assert!(args.skip_prepare);
        assert!(!args.skip_generate);
    }

    #[test]
    fn test_cli_parsing_steps() {
        let cli = Cli::parse_from(["migration-perf", "steps", "--log-file", "/tmp/m.log"]);
        let Commands::Steps(args) = cli.command else {
            panic!("Expected Steps command");
        };
        assert_eq!(args.log_file, Some(PathBuf::from("/tmp/m.log")));
    }

    #[test]
    fn test_cli_parsing_rollback() {
        let cli = Cli::parse_from(["migration-perf", "rollback", "--budget", "15", "--skip-generate"]);
        let Commands::Rollback(args) = cli.command else {
            panic!("Expected Rollback command");
        };
        assert_eq!(args.budget, Some(15.0));
        assert!(args.skip_generate);
    }

    #[test]
    fn test_cli_parsing_parse_log() {
        let cli = Cli::parse_from(["migration-perf", "parse-log", "/tmp/m.log"]);
        assert!(matches!(cli.command, Commands::ParseLog { .. }));
    }

    #[test]
    fn test_cli_parsing_config_init() {
        let cli = Cli::parse_from(["migration-perf", "config", "init", "--force"]);
        let Commands::Config { action } = cli.command else {
            panic!("Expected Config command");
        };
        assert_eq!(
            action,
            ConfigAction::Init {
                path: None,
                force: true
            }
        );
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::parse_from([
            "migration-perf",
            "parse-log",
            "x.log",
            "--verbose",
            "--format",
            "json",
            "--log-format",
            "json",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.format, "json");
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn test_cli_output_format_default() {
        let cli = Cli::parse_from(["migration-perf", "parse-log", "x.log"]);
        assert_eq!(cli.format, "pretty");
        assert_eq!(cli.log_format, LogFormat::Text);
    }

    #[test]
    fn test_cli_parsing_completions_zsh() {
        let cli = Cli::parse_from(["migration-perf", "completions", "zsh"]);
        let Commands::Completions { shell } = cli.command else {
            panic!("Expected Completions command");
        };
        assert_eq!(shell, Shell::Zsh);
    }

    #[test]
    fn test_cli_rejects_non_numeric_budget() {
        let result = Cli::try_parse_from(["migration-perf", "run", "--budget", "fast"]);
        assert!(result.is_err());
    }
}
