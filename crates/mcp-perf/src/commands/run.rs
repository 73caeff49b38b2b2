//! `run` command: the full migration performance scenario.

use super::common::{Direction, HarnessArgs, Prepared, prepare, print_invalid, print_outcome};
use crate::harness::Outcome;
use crate::report::PerformanceReport;
use anyhow::Result;
use codebase_mcp_core::cli::{ExitCode, OutputFormat};
use tracing::{info, warn};

/// Runs the performance scenario and reports the verdict.
///
/// Exit codes: 0 within budget, 1 failure (budget exceeded, migration
/// error, data loss), 2 invalid flags or configuration, 3 skipped.
///
/// # Errors
///
/// Returns an error if the report cannot be rendered.
pub async fn run(args: HarnessArgs, output_format: OutputFormat) -> Result<ExitCode> {
    let harness = match prepare(&args, Direction::Upgrade) {
        Prepared::Ready(harness) => harness,
        Prepared::Invalid(message) => {
            print_invalid(&message, output_format);
            return Ok(ExitCode::INVALID_INPUT);
        }
        Prepared::Skip(reason) => {
            warn!("{reason}");
            let outcome: Outcome<PerformanceReport> = Outcome::Skipped { reason };
            print_outcome(&outcome, output_format, PerformanceReport::render)?;
            return Ok(outcome.exit_code());
        }
    };

    info!(
        repositories = harness.config().repositories,
        chunks = harness.config().expected_chunks(),
        target_secs = harness.config().target_seconds,
        "Starting migration performance run"
    );

    let outcome = harness.run_performance(args.run_options()).await;
    print_outcome(&outcome, output_format, PerformanceReport::render)?;
    Ok(outcome.exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_run_without_database_url_is_skipped() {
        let file = NamedTempFile::new().unwrap();
        let args = HarnessArgs {
            config: Some(file.path().to_path_buf()),
            ..Default::default()
        };

        let code = run(args, OutputFormat::Text).await.unwrap();
        assert_eq!(code, ExitCode::SKIPPED);
    }

    #[tokio::test]
    async fn test_run_with_invalid_budget_is_invalid_input() {
        let file = NamedTempFile::new().unwrap();
        let args = HarnessArgs {
            budget: Some(0.0),
            database_url: Some("postgresql://localhost/codebase_mcp_test".to_string()),
            config: Some(file.path().to_path_buf()),
            ..Default::default()
        };

        let code = run(args, OutputFormat::Json).await.unwrap();
        assert_eq!(code, ExitCode::INVALID_INPUT);
    }
}
