//! Migration performance scenario.
//!
//! [`MigrationHarness`] drives the external tools in the same order every
//! time:
//!
//! 1. recreate the test database and bring it to the baseline revision
//! 2. generate the test dataset
//! 3. clear the migration log
//! 4. time `alembic upgrade head`
//! 5. parse step timings, confirm the revision, compare row counts
//! 6. judge the duration against the budget
//!
//! The rollback scenario shares steps 1 to 4, then times `alembic downgrade -1`
//! and checks that the rows counted before the upgrade survive it.
//!
//! Environment problems (no `DATABASE_URL`, database setup failing) end the
//! scenario as [`Outcome::Skipped`]. Problems with the migration itself end it
//! as [`Outcome::Failed`].

use crate::config::HarnessConfig;
use crate::dataset::{TestDataStats, check_dataset, parse_generator_output};
use crate::log_parser::{StepDuration, missing_step_keywords, parse_migration_log};
use crate::report::{PerformanceReport, RollbackReport, StepTimingReport};
use crate::runner::ProcessRunner;
use codebase_mcp_core::cli::ExitCode;
use codebase_mcp_core::{DatabaseName, Error, Result};
use serde::Serialize;
use std::io::ErrorKind;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const ASYNCPG_PREFIX: &str = "postgresql+asyncpg://";
const POSTGRES_PREFIX: &str = "postgresql://";

/// Result of a harness scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome<T> {
    /// Scenario ran and every check held.
    Passed(T),

    /// Scenario ran and a check failed.
    Failed {
        /// What went wrong
        reason: String,
        /// Partial results gathered before the failure
        details: Option<T>,
    },

    /// Environment was not prepared; nothing was judged.
    Skipped {
        /// Why the scenario did not run
        reason: String,
    },
}

impl<T> Outcome<T> {
    /// Process exit code for this outcome.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self {
            Self::Passed(_) => ExitCode::SUCCESS,
            Self::Failed { .. } => ExitCode::FAILURE,
            Self::Skipped { .. } => ExitCode::SKIPPED,
        }
    }

    /// Whether the scenario passed.
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed(_))
    }

    /// Failure or skip reason, `None` on success.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Passed(_) => None,
            Self::Failed { reason, .. } | Self::Skipped { reason } => Some(reason),
        }
    }

    /// Report carried by the outcome, if any.
    #[must_use]
    pub const fn report(&self) -> Option<&T> {
        match self {
            Self::Passed(report)
            | Self::Failed {
                details: Some(report),
                ..
            } => Some(report),
            _ => None,
        }
    }

    fn fail(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
            details: None,
        }
    }

    fn skip(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }
}

/// Which preparation phases to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Reuse the existing database instead of recreating it
    pub skip_prepare: bool,

    /// Reuse the existing rows instead of running the generator
    pub skip_generate: bool,
}

/// Checks that `DATABASE_URL` is set and names the test database.
///
/// The harness drops and recreates the database, so it refuses any URL that
/// does not mention the configured test database name.
///
/// # Errors
///
/// Returns the skip reason when the URL is missing or points elsewhere.
///
/// # Examples
///
/// ```
/// use codebase_mcp_core::DatabaseName;
/// use codebase_mcp_perf::harness::check_database_url;
///
/// let db = DatabaseName::new("codebase_mcp_test").unwrap();
///
/// assert!(check_database_url(Some("postgresql://localhost/codebase_mcp_test"), &db).is_ok());
/// assert!(check_database_url(Some("postgresql://localhost/prod"), &db).is_err());
/// assert!(check_database_url(None, &db).is_err());
/// ```
pub fn check_database_url(
    url: Option<&str>,
    database: &DatabaseName,
) -> std::result::Result<String, String> {
    match url.map(str::trim) {
        None | Some("") => Err(format!(
            "DATABASE_URL not set. Set with: export DATABASE_URL=postgresql://localhost/{database}"
        )),
        Some(url) if !url.contains(database.as_str()) => Err(format!(
            "DATABASE_URL does not point to test database ({database}). Current: {url}"
        )),
        Some(url) => Ok(url.to_string()),
    }
}

/// Rewrites the SQLAlchemy `postgresql+asyncpg://` scheme to plain
/// `postgresql://` so libpq clients accept it.
#[must_use]
pub fn normalize_database_url(url: &str) -> String {
    url.strip_prefix(ASYNCPG_PREFIX)
        .map_or_else(|| url.to_string(), |rest| format!("{POSTGRES_PREFIX}{rest}"))
}

enum Halt {
    Skip(String),
    Fail(String),
}

impl Halt {
    fn into_outcome<T>(self) -> Outcome<T> {
        match self {
            Self::Skip(reason) => Outcome::skip(reason),
            Self::Fail(reason) => Outcome::fail(reason),
        }
    }
}

/// Drives the migration performance scenario against a test database.
#[derive(Debug, Clone)]
pub struct MigrationHarness {
    config: HarnessConfig,
    database: DatabaseName,
    database_url: String,
    runner: ProcessRunner,
}

impl MigrationHarness {
    /// Creates a harness for `database_url`.
    ///
    /// Commands run in the configured repository root with `DATABASE_URL`
    /// exported.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: HarnessConfig, database_url: impl Into<String>) -> Result<Self> {
        config.validate()?;
        let database = config.database_name()?;
        let database_url = database_url.into();

        let runner = ProcessRunner::new(&config.repo_root)
            .env("DATABASE_URL", &database_url)
            .timeout(config.command_timeout());

        Ok(Self {
            config,
            database,
            database_url,
            runner,
        })
    }

    /// Harness configuration.
    #[must_use]
    pub const fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Drops and recreates the test database, enables pgvector and applies
    /// the baseline migrations.
    ///
    /// # Errors
    ///
    /// Returns the first failing command. A failing `dropdb` is ignored since
    /// the database may not exist yet.
    pub async fn prepare_database(&self) -> Result<()> {
        let tools = &self.config.tools;
        let database = self.database.as_str();

        let dropped = self.runner.run(&tools.dropdb, &[database]).await;
        match dropped {
            Ok(output) if !output.success() => {
                debug!(stderr = %output.stderr.trim(), "dropdb failed, continuing");
            }
            Err(e) => debug!(error = %e, "dropdb unavailable, continuing"),
            Ok(_) => {}
        }

        self.runner.run_checked(&tools.createdb, &[database]).await?;

        let url = normalize_database_url(&self.database_url);
        self.runner
            .run_checked(
                &tools.psql,
                &[url.as_str(), "-c", "CREATE EXTENSION IF NOT EXISTS vector;"],
            )
            .await?;

        self.runner
            .run_checked(
                &tools.alembic,
                &["upgrade", self.config.baseline_revision.as_str()],
            )
            .await?;

        info!(
            database,
            revision = %self.config.baseline_revision,
            "Database prepared"
        );
        Ok(())
    }

    /// Runs the generator script and reads back what it created.
    ///
    /// # Errors
    ///
    /// Returns an error if the script cannot be run or exits non-zero.
    pub async fn generate_test_data(&self) -> Result<TestDataStats> {
        let script = self.config.generator_path();
        let args = [
            script.display().to_string(),
            "--repositories".to_string(),
            self.config.repositories.to_string(),
            "--files-per-repo".to_string(),
            self.config.files_per_repo.to_string(),
            "--chunks-per-file".to_string(),
            self.config.chunks_per_repo.to_string(),
        ];

        let start = Instant::now();
        let output = self
            .runner
            .run_checked(&self.config.tools.python, &args)
            .await?;
        let duration = start.elapsed().as_secs_f64();

        debug!(output = %output.stdout, "generator output");
        Ok(parse_generator_output(&output.stdout, duration))
    }

    /// Removes the migration log so only this run's steps are parsed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub async fn clear_migration_log(&self) -> Result<()> {
        let path = &self.config.migration_log_file;
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                debug!(path = %path.display(), "cleared migration log");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(Error::IoError {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    /// Runs `alembic upgrade head` and measures it.
    ///
    /// Returns the wall-clock duration and stdout and stderr joined by a
    /// newline.
    ///
    /// # Errors
    ///
    /// Returns `Error::ProcessFailed` with the exit code and output when the
    /// migration fails.
    pub async fn run_migration_upgrade(&self) -> Result<(Duration, String)> {
        let output = self
            .runner
            .run_checked(&self.config.tools.alembic, &["upgrade", "head"])
            .await?;
        Ok((output.duration, output.combined()))
    }

    /// Runs `alembic downgrade -1` and measures it.
    ///
    /// # Errors
    ///
    /// Returns `Error::ProcessFailed` with the exit code and output when the
    /// downgrade fails.
    pub async fn run_migration_downgrade(&self) -> Result<(Duration, String)> {
        let output = self
            .runner
            .run_checked(&self.config.tools.alembic, &["downgrade", "-1"])
            .await?;
        Ok((output.duration, output.combined()))
    }

    /// Returns the trimmed output of `alembic current`.
    ///
    /// # Errors
    ///
    /// Returns an error if `alembic current` fails.
    pub async fn verify_migration_applied(&self) -> Result<String> {
        let output = self
            .runner
            .run_checked(&self.config.tools.alembic, &["current"])
            .await?;
        Ok(output.stdout.trim().to_string())
    }

    /// Counts rows in `repositories` and `code_chunks`.
    ///
    /// # Errors
    ///
    /// Returns an error if `psql` fails or prints something other than a
    /// number.
    pub async fn get_row_counts(&self) -> Result<(u64, u64)> {
        let repositories = self.count_rows("repositories").await?;
        let code_chunks = self.count_rows("code_chunks").await?;
        Ok((repositories, code_chunks))
    }

    async fn count_rows(&self, table: &str) -> Result<u64> {
        let url = normalize_database_url(&self.database_url);
        let query = format!("SELECT COUNT(*) FROM {table}");
        let output = self
            .runner
            .run_checked(
                &self.config.tools.psql,
                &[url.as_str(), "-tA", "-c", query.as_str()],
            )
            .await?;

        let value = output.stdout.trim();
        if value.is_empty() {
            return Ok(0);
        }
        value.parse().map_err(|_| Error::ParseError {
            what: format!("row count for {table}"),
            message: format!("unexpected psql output: {value:?}"),
        })
    }

    /// Reads the migration log, `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub async fn read_migration_log(&self) -> Result<Option<String>> {
        let path = &self.config.migration_log_file;
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(Error::IoError {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    async fn step_durations(&self) -> Vec<StepDuration> {
        match self.read_migration_log().await {
            Ok(Some(content)) => parse_migration_log(&content),
            Ok(None) => {
                debug!("no migration log, step breakdown unavailable");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "could not read migration log");
                Vec::new()
            }
        }
    }

    async fn prepare_dataset(&self, options: RunOptions) -> std::result::Result<TestDataStats, Halt> {
        if options.skip_prepare {
            info!("Skipping database preparation");
        } else {
            self.prepare_database()
                .await
                .map_err(|e| Halt::Skip(format!("Database setup failed: {}", describe(&e))))?;
        }

        let stats = if options.skip_generate {
            info!("Skipping test data generation, counting existing rows");
            let (repositories, code_chunks) = self
                .get_row_counts()
                .await
                .map_err(|e| Halt::Skip(format!("Could not count existing rows: {}", describe(&e))))?;
            TestDataStats {
                repositories_created: repositories,
                code_files_created: 0,
                code_chunks_created: code_chunks,
                generation_duration_seconds: 0.0,
            }
        } else {
            self.generate_test_data()
                .await
                .map_err(|e| Halt::Skip(format!("Test data generation failed: {}", describe(&e))))?
        };

        info!(
            repositories = stats.repositories_created,
            code_files = stats.code_files_created,
            code_chunks = stats.code_chunks_created,
            generation_secs = stats.generation_duration_seconds,
            "Test data ready"
        );

        self.clear_migration_log()
            .await
            .map_err(|e| Halt::Fail(format!("Could not clear migration log: {e}")))?;

        Ok(stats)
    }

    /// Runs the full performance scenario.
    ///
    /// The outcome carries the report whenever the migration itself
    /// completed, including runs that lost data or missed the budget.
    pub async fn run_performance(&self, options: RunOptions) -> Outcome<PerformanceReport> {
        let stats = match self.prepare_dataset(options).await {
            Ok(stats) => stats,
            Err(halt) => return halt.into_outcome(),
        };

        if let Err(reason) = check_dataset(
            &stats,
            u64::from(self.config.repositories),
            self.config.expected_chunks(),
        ) {
            return Outcome::fail(reason);
        }

        info!(
            command = "alembic upgrade head",
            database = %self.database,
            target_secs = self.config.target_seconds,
            "Running migration"
        );

        let (duration, output) = match self.run_migration_upgrade().await {
            Ok(result) => result,
            Err(e) => return Outcome::fail(describe(&e)),
        };
        debug!(%output, "migration output");

        let steps = self.step_durations().await;

        let revision = match self.verify_migration_applied().await {
            Ok(revision) => revision,
            Err(e) => return Outcome::fail(format!("Could not read current revision: {}", describe(&e))),
        };
        info!(revision = %revision, "Migration applied");

        let (repositories, code_chunks) = match self.get_row_counts().await {
            Ok(counts) => counts,
            Err(e) => return Outcome::fail(format!("Could not count rows: {}", describe(&e))),
        };

        let report = PerformanceReport::build(
            duration.as_secs_f64(),
            self.config.target_seconds,
            steps,
            repositories,
            code_chunks,
            Some(revision),
        );

        if let Some(reason) = data_loss(
            (stats.repositories_created, stats.code_chunks_created),
            (repositories, code_chunks),
        ) {
            return Outcome::Failed {
                reason,
                details: Some(report),
            };
        }

        if report.meets_requirement {
            info!(
                duration_secs = report.total_duration_seconds,
                "Migration within budget"
            );
            Outcome::Passed(report)
        } else {
            Outcome::Failed {
                reason: report.violation_message(),
                details: Some(report),
            }
        }
    }

    /// Upgrades to head, then times `alembic downgrade -1`.
    ///
    /// Passes when the database is back at the baseline revision, the
    /// repository and chunk counts match those taken before the upgrade and
    /// the downgrade beat `rollback_target_seconds`.
    pub async fn run_rollback(&self, options: RunOptions) -> Outcome<RollbackReport> {
        if let Err(halt) = self.prepare_dataset(options).await {
            return halt.into_outcome();
        }

        let before = match self.get_row_counts().await {
            Ok(counts) => counts,
            Err(e) => return Outcome::fail(format!("Could not count rows: {}", describe(&e))),
        };

        if let Err(e) = self.run_migration_upgrade().await {
            return Outcome::fail(format!("Migration upgrade failed: {}", describe(&e)));
        }

        info!(
            command = "alembic downgrade -1",
            database = %self.database,
            target_secs = self.config.rollback_target_seconds,
            "Running rollback"
        );

        let (duration, output) = match self.run_migration_downgrade().await {
            Ok(result) => result,
            Err(e) => return Outcome::fail(format!("Migration downgrade failed: {}", describe(&e))),
        };
        debug!(%output, "downgrade output");

        let revision = match self.verify_migration_applied().await {
            Ok(revision) => revision,
            Err(e) => return Outcome::fail(format!("Could not read current revision: {}", describe(&e))),
        };

        let after = match self.get_row_counts().await {
            Ok(counts) => counts,
            Err(e) => return Outcome::fail(format!("Could not count rows: {}", describe(&e))),
        };

        let report = RollbackReport::build(
            duration.as_secs_f64(),
            self.config.rollback_target_seconds,
            before,
            after,
            revision,
        );

        let baseline = self.config.baseline_revision.as_str();
        if !report.current_revision.contains(baseline) {
            return Outcome::Failed {
                reason: format!(
                    "Expected revision {baseline} after rollback, got: {}",
                    report.current_revision
                ),
                details: Some(report),
            };
        }

        if let Some(reason) = data_loss(before, after) {
            return Outcome::Failed {
                reason,
                details: Some(report),
            };
        }

        if report.meets_requirement {
            info!(
                duration_secs = report.total_duration_seconds,
                revision = %report.current_revision,
                "Rollback within budget"
            );
            Outcome::Passed(report)
        } else {
            Outcome::Failed {
                reason: report.violation_message(),
                details: Some(report),
            }
        }
    }

    /// Checks that the migration logs per-step timings.
    ///
    /// The migration is run again first. It is idempotent under Alembic, so
    /// a failure here is ignored and the log of the earlier run is used.
    pub async fn check_step_timing(&self, options: RunOptions) -> Outcome<StepTimingReport> {
        if let Err(halt) = self.prepare_dataset(options).await {
            return halt.into_outcome();
        }

        if let Err(e) = self.run_migration_upgrade().await {
            debug!(error = %e, "migration did not run, checking existing log");
        }

        let path = &self.config.migration_log_file;
        let content = match self.read_migration_log().await {
            Ok(Some(content)) => content,
            Ok(None) => {
                return Outcome::skip(format!(
                    "Migration log not found at {}. Ensure migration logging is configured correctly.",
                    path.display()
                ));
            }
            Err(e) => return Outcome::fail(e.to_string()),
        };

        let report = StepTimingReport {
            log_file: path.clone(),
            steps: parse_migration_log(&content),
            missing_keywords: missing_step_keywords(&content)
                .into_iter()
                .map(str::to_string)
                .collect(),
        };

        for keyword in &report.missing_keywords {
            warn!(keyword = %keyword, "Expected step keyword not found in log");
        }

        if report.steps.is_empty() {
            return Outcome::Failed {
                reason: "No step timing information found in migration log. \
                         Migration should log major steps with durations."
                    .to_string(),
                details: Some(report),
            };
        }

        info!(steps = report.steps.len(), "Step timing logged");
        Outcome::Passed(report)
    }
}

/// Compares `(repositories, code_chunks)` counts.
fn data_loss(expected: (u64, u64), found: (u64, u64)) -> Option<String> {
    if found.0 != expected.0 {
        return Some(format!(
            "Data loss detected! Expected {} repositories, found {}",
            expected.0, found.0
        ));
    }
    if found.1 != expected.1 {
        return Some(format!(
            "Data loss detected! Expected {} code chunks, found {}",
            expected.1, found.1
        ));
    }
    None
}

fn describe(error: &Error) -> String {
    match error {
        Error::ProcessFailed {
            command,
            stdout,
            stderr,
            ..
        } => format!(
            "{command} failed with exit code {}\nStdout: {}\nStderr: {}",
            error
                .exit_code()
                .map_or_else(|| "<signal>".to_string(), |code| code.to_string()),
            stdout.trim_end(),
            stderr.trim_end()
        ),
        other => other.to_string(),
    }
}
