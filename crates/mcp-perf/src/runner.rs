//! Subprocess execution with timing.
//!
//! Every external tool (alembic, psql, the generator) is run through
//! [`ProcessRunner`], which fixes the working directory and environment,
//! captures output, measures wall-clock duration and optionally enforces a
//! timeout. No shell is involved.

use codebase_mcp_core::{Error, Result, render_command};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, warn};

/// Captured result of a finished command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Rendered command line
    pub command: String,

    /// Exit code, `None` when terminated by a signal
    pub exit_code: Option<i32>,

    /// Standard output (lossy UTF-8)
    pub stdout: String,

    /// Standard error (lossy UTF-8)
    pub stderr: String,

    /// Wall-clock time from spawn to exit
    pub duration: Duration,
}

impl CommandOutput {
    /// Whether the command exited with status 0.
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.exit_code, Some(0))
    }

    /// Stdout and stderr joined by a newline.
    #[must_use]
    pub fn combined(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }

    /// Converts a non-zero exit into `Error::ProcessFailed`.
    ///
    /// # Errors
    ///
    /// Returns `Error::ProcessFailed` carrying the captured output when the
    /// command did not succeed.
    pub fn into_checked(self) -> Result<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(Error::ProcessFailed {
                command: self.command,
                exit_code: self.exit_code,
                stdout: self.stdout,
                stderr: self.stderr,
            })
        }
    }
}

/// Runs commands in a fixed directory with a fixed extra environment.
///
/// # Examples
///
/// ```no_run
/// use codebase_mcp_perf::runner::ProcessRunner;
///
/// # async fn example() -> codebase_mcp_core::Result<()> {
/// let runner = ProcessRunner::new("/srv/codebase-mcp")
///     .env("DATABASE_URL", "postgresql://localhost/codebase_mcp_test");
///
/// let output = runner.run_checked("alembic", &["current"]).await?;
/// println!("{} took {:?}", output.command, output.duration);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    cwd: PathBuf,
    env: Vec<(String, String)>,
    timeout: Option<Duration>,
}

impl ProcessRunner {
    /// Creates a runner executing in `cwd`.
    #[must_use]
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            env: Vec::new(),
            timeout: None,
        }
    }

    /// Adds an environment variable to every command.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Sets a timeout applied to each command individually.
    #[must_use]
    pub const fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs a command to completion, whatever its exit status.
    ///
    /// # Errors
    ///
    /// Returns `Error::SpawnFailed` if the program cannot be started and
    /// `Error::Timeout` if it outlives the configured timeout. The child is
    /// killed in the latter case.
    pub async fn run<S: AsRef<str>>(&self, program: &str, args: &[S]) -> Result<CommandOutput> {
        let rendered = render_command(program, args);
        debug!(command = %rendered, cwd = %self.cwd.display(), "running");

        let mut command = Command::new(program);
        command
            .args(args.iter().map(AsRef::as_ref))
            .current_dir(&self.cwd)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let start = Instant::now();
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, command.output())
                .await
                .map_err(|_| {
                    warn!(command = %rendered, "timed out after {}s", limit.as_secs());
                    Error::Timeout {
                        operation: rendered.clone(),
                        duration_secs: limit.as_secs(),
                    }
                })?,
            None => command.output().await,
        }
        .map_err(|source| Error::SpawnFailed {
            command: rendered.clone(),
            source,
        })?;
        let duration = start.elapsed();

        debug!(
            command = %rendered,
            code = ?output.status.code(),
            elapsed_ms = duration.as_millis(),
            "finished"
        );

        Ok(CommandOutput {
            command: rendered,
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            duration,
        })
    }

    /// Runs a command and requires exit status 0.
    ///
    /// # Errors
    ///
    /// As [`ProcessRunner::run`], plus `Error::ProcessFailed` on a non-zero
    /// exit.
    pub async fn run_checked<S: AsRef<str>>(
        &self,
        program: &str,
        args: &[S],
    ) -> Result<CommandOutput> {
        self.run(program, args).await?.into_checked()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_run_captures_output_and_status() {
        let runner = ProcessRunner::new(".");
        let output = runner
            .run("sh", &["-c", "echo out; echo err >&2; exit 3"])
            .await
            .unwrap();

        assert_eq!(output.exit_code, Some(3));
        assert!(!output.success());
        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
        assert_eq!(output.combined(), "out\n\nerr\n");
    }

    #[tokio::test]
    async fn test_run_checked_maps_failure() {
        let runner = ProcessRunner::new(".");
        let err = runner
            .run_checked("sh", &["-c", "echo broken >&2; exit 1"])
            .await
            .unwrap_err();

        match err {
            Error::ProcessFailed {
                exit_code, stderr, ..
            } => {
                assert_eq!(exit_code, Some(1));
                assert_eq!(stderr, "broken\n");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_run_passes_env_and_cwd() {
        let dir = TempDir::new().unwrap();
        let runner = ProcessRunner::new(dir.path()).env("DATABASE_URL", "postgresql://x/db");

        let output = runner
            .run_checked("sh", &["-c", "echo \"$DATABASE_URL\"; pwd"])
            .await
            .unwrap();

        let mut lines = output.stdout.lines();
        assert_eq!(lines.next(), Some("postgresql://x/db"));
        let cwd = PathBuf::from(lines.next().unwrap());
        assert_eq!(
            cwd.canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }

    #[tokio::test]
    async fn test_run_missing_program_is_spawn_failure() {
        let runner = ProcessRunner::new(".");
        let empty: [&str; 0] = [];
        let err = runner
            .run("definitely-not-a-real-program-4242", &empty)
            .await
            .unwrap_err();
        assert!(err.is_spawn_failure());
    }

    #[tokio::test]
    async fn test_run_timeout() {
        let runner = ProcessRunner::new(".").timeout(Some(Duration::from_millis(200)));
        let err = runner.run("sleep", &["5"]).await.unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_run_measures_duration() {
        let runner = ProcessRunner::new(".");
        let output = runner.run_checked("sleep", &["0.2"]).await.unwrap();
        assert!(output.duration >= Duration::from_millis(150));
    }
}
