//! Harness configuration.
//!
//! Configuration is stored in TOML format at:
//! - Linux: `~/.config/codebase-mcp/migration-perf.toml`
//! - macOS: `~/Library/Application Support/codebase-mcp/migration-perf.toml`
//! - Windows: `%APPDATA%\codebase-mcp\migration-perf.toml`
//!
//! Every key is optional. Missing keys take the defaults below, which match
//! the FR-031 scenario (100 repositories x 100 chunks, 300 second budget)
//! and the 30 second rollback budget.
//!
//! ```toml
//! target_seconds = 300.0
//! rollback_target_seconds = 30.0
//! repositories = 100
//! files_per_repo = 1
//! chunks_per_repo = 100
//! test_database_name = "codebase_mcp_test"
//! migration_log_file = "/tmp/codebase-mcp-migration.log"
//! repo_root = "/srv/codebase-mcp"
//! generator_script = "tests/fixtures/generate_test_data.py"
//! baseline_revision = "005"
//!
//! [tools]
//! alembic = "alembic"
//! python = "python3"
//! psql = "psql"
//! createdb = "createdb"
//! dropdb = "dropdb"
//! ```

use codebase_mcp_core::{DatabaseName, Error, Result, validate_argument, validate_program};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Migration budget from FR-031 (5 minutes).
pub const DEFAULT_TARGET_SECONDS: f64 = 300.0;

/// Budget for `alembic downgrade -1`.
pub const DEFAULT_ROLLBACK_TARGET_SECONDS: f64 = 30.0;

/// Repositories in the generated dataset.
pub const DEFAULT_REPOSITORIES: u32 = 100;

/// Chunks generated per repository (100 x 100 = 10,000 chunks).
pub const DEFAULT_CHUNKS_PER_REPO: u32 = 100;

/// Name the test database must carry before anything destructive runs.
pub const DEFAULT_TEST_DATABASE: &str = "codebase_mcp_test";

/// Log file the migration writes its step timings to.
pub const DEFAULT_MIGRATION_LOG: &str = "/tmp/codebase-mcp-migration.log";

/// Full harness configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HarnessConfig {
    /// Migration must finish strictly below this many seconds.
    pub target_seconds: f64,

    /// Rollback must finish strictly below this many seconds.
    pub rollback_target_seconds: f64,

    /// Number of repositories to generate.
    pub repositories: u32,

    /// Files generated per repository.
    pub files_per_repo: u32,

    /// Chunks generated per repository (passed as `--chunks-per-file`).
    pub chunks_per_repo: u32,

    /// Database name `DATABASE_URL` must point at.
    pub test_database_name: String,

    /// Migration log file parsed for per-step timings.
    pub migration_log_file: PathBuf,

    /// Project root containing `alembic.ini`; all commands run here.
    pub repo_root: PathBuf,

    /// Test data generator, relative to `repo_root` unless absolute.
    pub generator_script: PathBuf,

    /// Revision the database is brought to before data generation.
    pub baseline_revision: String,

    /// Per-command timeout in seconds. `None` lets commands run to completion.
    pub command_timeout_secs: Option<u64>,

    /// External programs.
    pub tools: ToolPaths,
}

/// External programs the harness drives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ToolPaths {
    /// Alembic executable
    pub alembic: String,
    /// Python interpreter used to run the generator script
    pub python: String,
    /// `psql` client
    pub psql: String,
    /// `createdb` utility
    pub createdb: String,
    /// `dropdb` utility
    pub dropdb: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            alembic: "alembic".to_string(),
            python: "python3".to_string(),
            psql: "psql".to_string(),
            createdb: "createdb".to_string(),
            dropdb: "dropdb".to_string(),
        }
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            target_seconds: DEFAULT_TARGET_SECONDS,
            rollback_target_seconds: DEFAULT_ROLLBACK_TARGET_SECONDS,
            repositories: DEFAULT_REPOSITORIES,
            files_per_repo: 1,
            chunks_per_repo: DEFAULT_CHUNKS_PER_REPO,
            test_database_name: DEFAULT_TEST_DATABASE.to_string(),
            migration_log_file: PathBuf::from(DEFAULT_MIGRATION_LOG),
            repo_root: PathBuf::from("."),
            generator_script: PathBuf::from("tests/fixtures/generate_test_data.py"),
            baseline_revision: "005".to_string(),
            command_timeout_secs: None,
            tools: ToolPaths::default(),
        }
    }
}

impl HarnessConfig {
    /// Parses a configuration from TOML text and validates it.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the TOML is malformed or a value is
    /// out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use codebase_mcp_perf::config::HarnessConfig;
    ///
    /// let config = HarnessConfig::from_toml_str("target_seconds = 120.0").unwrap();
    /// assert_eq!(config.target_seconds, 120.0);
    /// assert_eq!(config.repositories, 100);
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::ConfigError {
            message: format!("failed to parse config: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the configuration.
    ///
    /// An explicit path must exist. Without one, the platform config file is
    /// used when present, otherwise defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => {
                    debug!("Config file not found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let content = std::fs::read_to_string(&path).map_err(|source| Error::IoError {
            path: path.display().to_string(),
            source,
        })?;

        debug!("Loaded config from {}", path.display());
        Self::from_toml_str(&content)
    }

    /// Checks value ranges and names.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` for a non-positive budget or timeout or a
    /// zero-sized dataset, and a validation error for a bad database name,
    /// revision or program path.
    pub fn validate(&self) -> Result<()> {
        for (field, budget) in [
            ("target_seconds", self.target_seconds),
            ("rollback_target_seconds", self.rollback_target_seconds),
        ] {
            if !(budget.is_finite() && budget > 0.0) {
                return Err(Error::ConfigError {
                    message: format!("{field} must be a positive number, got {budget}"),
                });
            }
        }

        if self.command_timeout_secs == Some(0) {
            return Err(Error::ConfigError {
                message: "command_timeout_secs must be at least 1".to_string(),
            });
        }

        if self.repositories == 0 || self.chunks_per_repo == 0 || self.files_per_repo == 0 {
            return Err(Error::ConfigError {
                message: "repositories, files_per_repo and chunks_per_repo must be at least 1"
                    .to_string(),
            });
        }

        self.database_name()?;
        validate_argument("baseline_revision", &self.baseline_revision)?;

        for (field, program) in [
            ("tools.alembic", &self.tools.alembic),
            ("tools.python", &self.tools.python),
            ("tools.psql", &self.tools.psql),
            ("tools.createdb", &self.tools.createdb),
            ("tools.dropdb", &self.tools.dropdb),
        ] {
            validate_program(field, program)?;
        }

        Ok(())
    }

    /// The validated test database name.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the configured name is not a safe
    /// identifier.
    pub fn database_name(&self) -> Result<DatabaseName> {
        DatabaseName::new(self.test_database_name.clone())
    }

    /// Minimum number of chunks the generated dataset must contain.
    #[must_use]
    pub fn expected_chunks(&self) -> u64 {
        u64::from(self.repositories) * u64::from(self.chunks_per_repo)
    }

    /// Generator script resolved against the repository root.
    #[must_use]
    pub fn generator_path(&self) -> PathBuf {
        if self.generator_script.is_absolute() {
            self.generator_script.clone()
        } else {
            self.repo_root.join(&self.generator_script)
        }
    }

    /// Per-command timeout, if configured.
    #[must_use]
    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_secs.map(Duration::from_secs)
    }
}

/// Platform config file location.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("codebase-mcp").join("migration-perf.toml"))
}
