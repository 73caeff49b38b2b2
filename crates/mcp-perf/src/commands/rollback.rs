//! `rollback` command: times `alembic downgrade -1` after an upgrade.

use super::common::{Direction, HarnessArgs, Prepared, prepare, print_invalid, print_outcome};
use crate::harness::Outcome;
use crate::report::RollbackReport;
use anyhow::Result;
use codebase_mcp_core::cli::{ExitCode, OutputFormat};
use tracing::{info, warn};

/// Runs the rollback scenario and reports the verdict.
///
/// Exit codes: 0 within budget with rows preserved, 1 failure (downgrade
/// error, wrong revision, data loss, budget exceeded), 2 invalid flags or
/// configuration, 3 skipped.
///
/// # Errors
///
/// Returns an error if the report cannot be rendered.
pub async fn run(args: HarnessArgs, output_format: OutputFormat) -> Result<ExitCode> {
    let harness = match prepare(&args, Direction::Rollback) {
        Prepared::Ready(harness) => harness,
        Prepared::Invalid(message) => {
            print_invalid(&message, output_format);
            return Ok(ExitCode::INVALID_INPUT);
        }
        Prepared::Skip(reason) => {
            warn!("{reason}");
            let outcome: Outcome<RollbackReport> = Outcome::Skipped { reason };
            print_outcome(&outcome, output_format, RollbackReport::render)?;
            return Ok(outcome.exit_code());
        }
    };

    info!(
        baseline = %harness.config().baseline_revision,
        target_secs = harness.config().rollback_target_seconds,
        "Starting migration rollback run"
    );

    let outcome = harness.run_rollback(args.run_options()).await;
    print_outcome(&outcome, output_format, RollbackReport::render)?;
    Ok(outcome.exit_code())
}
