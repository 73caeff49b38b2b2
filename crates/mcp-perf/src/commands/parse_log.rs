//! `parse-log` command: step timings from an existing log file.

use super::common::print_invalid;
use crate::log_parser::{missing_step_keywords, parse_migration_log};
use crate::report::StepTimingReport;
use anyhow::Result;
use codebase_mcp_core::cli::{ExitCode, OutputFormat};
use std::path::PathBuf;
use tracing::{info, warn};

/// Parses `file` and prints the steps it contains.
///
/// Exit codes: 0 at least one step found, 1 no steps, 2 unreadable file.
///
/// # Errors
///
/// Returns an error if the report cannot be rendered.
pub async fn run(file: PathBuf, output_format: OutputFormat) -> Result<ExitCode> {
    let content = match tokio::fs::read_to_string(&file).await {
        Ok(content) => content,
        Err(e) => {
            print_invalid(
                &format!("cannot read {}: {e}", file.display()),
                output_format,
            );
            return Ok(ExitCode::INVALID_INPUT);
        }
    };

    let report = StepTimingReport {
        steps: parse_migration_log(&content),
        missing_keywords: missing_step_keywords(&content)
            .into_iter()
            .map(str::to_string)
            .collect(),
        log_file: file,
    };
    info!(
        steps = report.steps.len(),
        log_file = %report.log_file.display(),
        "Parsed migration log"
    );

    print!("{}", report.render(output_format)?);
    if output_format == OutputFormat::Json {
        println!();
    }

    if report.steps.is_empty() {
        warn!("No step timing information found in migration log");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_parse_log_with_steps() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "INFO - Step 1/2: Checking prerequisites... (0.05s)").unwrap();
        writeln!(file, "INFO - Step 2/2: Drop old table (1.10s)").unwrap();

        let code = run(file.path().to_path_buf(), OutputFormat::Text)
            .await
            .unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[tokio::test]
    async fn test_parse_log_without_steps_fails() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "INFO - Running upgrade 005 -> 006").unwrap();

        let code = run(file.path().to_path_buf(), OutputFormat::Json)
            .await
            .unwrap();
        assert_eq!(code, ExitCode::FAILURE);
    }

    #[tokio::test]
    async fn test_parse_log_missing_file_is_invalid_input() {
        let code = run(
            PathBuf::from("/nonexistent/migration.log"),
            OutputFormat::Text,
        )
        .await
        .unwrap();
        assert_eq!(code, ExitCode::INVALID_INPUT);
    }
}
