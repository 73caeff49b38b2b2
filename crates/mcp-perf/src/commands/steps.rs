//! `steps` command: checks that the migration logs per-step timings.

use super::common::{Direction, HarnessArgs, Prepared, prepare, print_invalid, print_outcome};
use crate::harness::Outcome;
use crate::report::StepTimingReport;
use anyhow::Result;
use codebase_mcp_core::cli::{ExitCode, OutputFormat};
use tracing::warn;

/// Re-runs the migration and inspects its log.
///
/// Exit codes: 0 step timings found, 1 log without timings, 2 invalid
/// flags or configuration, 3 skipped (no database, no log file).
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
            let outcome: Outcome<StepTimingReport> = Outcome::Skipped { reason };
            print_outcome(&outcome, output_format, StepTimingReport::render)?;
            return Ok(outcome.exit_code());
        }
    };

    let outcome = harness.check_step_timing(args.run_options()).await;
    print_outcome(&outcome, output_format, StepTimingReport::render)?;
    Ok(outcome.exit_code())
}
