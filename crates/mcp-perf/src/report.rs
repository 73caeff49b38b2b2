//! Performance report for a migration run.

use crate::dataset::group_thousands;
use crate::formatters;
use crate::log_parser::StepDuration;
use chrono::{DateTime, Utc};
use codebase_mcp_core::cli::OutputFormat;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const RULE_WIDTH: usize = 60;

/// Performance metrics for migration execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    /// Total migration time in seconds
    pub total_duration_seconds: f64,

    /// Budget the migration had to beat
    pub target_seconds: f64,

    /// Per-step durations parsed from the migration log, slowest first
    pub step_durations: Vec<StepDuration>,

    /// Repositories present after the migration
    pub repositories_count: u64,

    /// Code chunks present after the migration
    pub code_chunks_count: u64,

    /// Whether `total_duration_seconds < target_seconds`
    pub meets_requirement: bool,

    /// Output of `alembic current` after the upgrade
    pub current_revision: Option<String>,

    /// When the report was produced
    pub generated_at: DateTime<Utc>,
}

impl PerformanceReport {
    /// Builds a report, sorting steps by duration descending and deciding
    /// pass/fail against the target.
    ///
    /// # Examples
    ///
    /// ```
    /// use codebase_mcp_perf::report::PerformanceReport;
    ///
    /// let report = PerformanceReport::build(299.9, 300.0, Vec::new(), 100, 10_000, None);
    /// assert!(report.meets_requirement);
    ///
    /// let report = PerformanceReport::build(300.0, 300.0, Vec::new(), 100, 10_000, None);
    /// assert!(!report.meets_requirement);
    /// ```
    #[must_use]
    pub fn build(
        total_duration_seconds: f64,
        target_seconds: f64,
        mut step_durations: Vec<StepDuration>,
        repositories_count: u64,
        code_chunks_count: u64,
        current_revision: Option<String>,
    ) -> Self {
        step_durations.sort_by(|a, b| b.seconds.total_cmp(&a.seconds));

        Self {
            total_duration_seconds,
            target_seconds,
            step_durations,
            repositories_count,
            code_chunks_count,
            meets_requirement: total_duration_seconds < target_seconds,
            current_revision,
            generated_at: Utc::now(),
        }
    }

    /// Seconds left under the budget (negative when over).
    #[must_use]
    pub fn margin_seconds(&self) -> f64 {
        self.target_seconds - self.total_duration_seconds
    }

    /// Share of the total duration spent in `step`, in percent.
    ///
    /// Returns 0 when the total duration is 0.
    #[must_use]
    pub fn step_percentage(&self, step: &StepDuration) -> f64 {
        if self.total_duration_seconds > 0.0 {
            step.seconds / self.total_duration_seconds * 100.0
        } else {
            0.0
        }
    }

    /// Failure message for a run over budget.
    #[must_use]
    pub fn violation_message(&self) -> String {
        format!(
            "Migration duration {:.2}s exceeds target of {}s (FR-031 violation)",
            self.total_duration_seconds, self.target_seconds
        )
    }

    /// Renders the report in the requested format.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render(&self, format: OutputFormat) -> anyhow::Result<String> {
        match format {
            OutputFormat::Json => formatters::json::format(self),
            OutputFormat::Text => Ok(self.render_table(false)),
            OutputFormat::Pretty => Ok(self.render_table(true)),
        }
    }

    fn render_table(&self, color: bool) -> String {
        let rule = "=".repeat(RULE_WIDTH);

        let mut out = format!(
            "{rule}\nPERFORMANCE REPORT\n{rule}\n\
             Total Duration:       {:.2}s\n\
             Target:               < {}s\n\
             Performance Target:   {}\n\
             Margin:               {:.2}s\n",
            self.total_duration_seconds,
            self.target_seconds,
            verdict(self.meets_requirement, color),
            self.margin_seconds()
        );
        if let Some(revision) = &self.current_revision {
            out.push_str(&format!("Current Revision:     {revision}\n"));
        }
        out.push_str(&format!(
            "\nDataset Size:\n  Repositories:       {}\n  Code chunks:        {}\n",
            group_thousands(self.repositories_count),
            group_thousands(self.code_chunks_count)
        ));

        if !self.step_durations.is_empty() {
            out.push_str("\nPer-Step Breakdown:\n");
            for step in &self.step_durations {
                out.push_str(&format!(
                    "  {}: {:.2}s ({:.1}%)\n",
                    step.description,
                    step.seconds,
                    self.step_percentage(step)
                ));
            }
        }

        out.push_str(&rule);
        out.push('\n');
        out
    }
}

/// Timing and data preservation for `alembic downgrade -1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollbackReport {
    /// Downgrade time in seconds
    pub total_duration_seconds: f64,

    /// Budget the downgrade had to beat
    pub target_seconds: f64,

    /// Repositories present before the upgrade
    pub repositories_before: u64,

    /// Code chunks present before the upgrade
    pub code_chunks_before: u64,

    /// Repositories present after the downgrade
    pub repositories_count: u64,

    /// Code chunks present after the downgrade
    pub code_chunks_count: u64,

    /// Whether `total_duration_seconds < target_seconds`
    pub meets_requirement: bool,

    /// Output of `alembic current` after the downgrade
    pub current_revision: String,

    /// When the report was produced
    pub generated_at: DateTime<Utc>,
}

impl RollbackReport {
    /// Builds a report and decides pass/fail against the target.
    #[must_use]
    pub fn build(
        total_duration_seconds: f64,
        target_seconds: f64,
        before: (u64, u64),
        after: (u64, u64),
        current_revision: String,
    ) -> Self {
        Self {
            total_duration_seconds,
            target_seconds,
            repositories_before: before.0,
            code_chunks_before: before.1,
            repositories_count: after.0,
            code_chunks_count: after.1,
            meets_requirement: total_duration_seconds < target_seconds,
            current_revision,
            generated_at: Utc::now(),
        }
    }

    /// Failure message for a rollback over budget.
    #[must_use]
    pub fn violation_message(&self) -> String {
        format!(
            "Rollback took {:.2}s (target: <{}s)",
            self.total_duration_seconds, self.target_seconds
        )
    }

    /// Renders the report in the requested format.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render(&self, format: OutputFormat) -> anyhow::Result<String> {
        let color = match format {
            OutputFormat::Json => return formatters::json::format(self),
            OutputFormat::Text => false,
            OutputFormat::Pretty => true,
        };

        let rule = "=".repeat(RULE_WIDTH);
        Ok(format!(
            "{rule}\nROLLBACK REPORT\n{rule}\n\
             Rollback Duration:    {:.2}s\n\
             Target:               < {}s\n\
             Performance Target:   {}\n\
             Current Revision:     {}\n\
             \n\
             Rows (before -> after):\n\
             \x20 Repositories:       {} -> {}\n\
             \x20 Code chunks:        {} -> {}\n\
             {rule}\n",
            self.total_duration_seconds,
            self.target_seconds,
            verdict(self.meets_requirement, color),
            self.current_revision,
            group_thousands(self.repositories_before),
            group_thousands(self.repositories_count),
            group_thousands(self.code_chunks_before),
            group_thousands(self.code_chunks_count),
        ))
    }
}

fn verdict(passed: bool, color: bool) -> String {
    match (passed, color) {
        (true, true) => "✅ PASS".green().bold().to_string(),
        (false, true) => "❌ FAIL".red().bold().to_string(),
        (true, false) => "PASS".to_string(),
        (false, false) => "FAIL".to_string(),
    }
}

/// Step timings found in a migration log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepTimingReport {
    /// Log file that was parsed
    pub log_file: PathBuf,

    /// Steps in order of first appearance
    pub steps: Vec<StepDuration>,

    /// Expected keywords absent from the log
    pub missing_keywords: Vec<String>,
}

impl StepTimingReport {
    /// Renders the report in the requested format.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render(&self, format: OutputFormat) -> anyhow::Result<String> {
        let color = match format {
            OutputFormat::Json => return formatters::json::format(self),
            OutputFormat::Text => false,
            OutputFormat::Pretty => true,
        };

        let mut out = format!(
            "Steps logged: {}\nLog file: {}\n",
            self.steps.len(),
            self.log_file.display()
        );
        let mark = if color {
            "✅".green().to_string()
        } else {
            "-".to_string()
        };
        for step in &self.steps {
            out.push_str(&format!("  {mark} {}: {:.2}s\n", step.description, step.seconds));
        }

        if !self.missing_keywords.is_empty() {
            let heading = "WARNING: Some expected step keywords not found in log:";
            if color {
                out.push_str(&format!("{}\n", heading.yellow()));
            } else {
                out.push_str(&format!("{heading}\n"));
            }
            for keyword in &self.missing_keywords {
                out.push_str(&format!("  - {keyword}\n"));
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(description: &str, seconds: f64) -> StepDuration {
        StepDuration {
            description: description.to_string(),
            seconds,
        }
    }

    fn sample(total: f64) -> PerformanceReport {
        PerformanceReport::build(
            total,
            300.0,
            vec![
                step("Step 1/3: Checking prerequisites", 0.5),
                step("Step 2/3: Adding column", 30.0),
                step("Step 3/3: Creating index", 10.0),
            ],
            100,
            10_000,
            Some("002 (head)".to_string()),
        )
    }

    #[test]
    fn test_steps_sorted_slowest_first() {
        let report = sample(50.0);
        let order: Vec<_> = report
            .step_durations
            .iter()
            .map(|s| s.description.as_str())
            .collect();
        assert_eq!(
            order,
            vec![
                "Step 2/3: Adding column",
                "Step 3/3: Creating index",
                "Step 1/3: Checking prerequisites",
            ]
        );
    }

    #[test]
    fn test_requirement_is_strict() {
        assert!(sample(299.99).meets_requirement);
        assert!(!sample(300.0).meets_requirement);
        assert!(!sample(450.0).meets_requirement);
    }

    #[test]
    fn test_margin_and_percentage() {
        let report = sample(50.0);
        assert!((report.margin_seconds() - 250.0).abs() < 1e-9);
        assert!((report.step_percentage(&step("x", 25.0)) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_percentage_zero_total() {
        let report = sample(0.0);
        assert!(report.step_percentage(&step("x", 1.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_text_render_contents() {
        let text = sample(42.0).render(OutputFormat::Text).unwrap();

        assert!(text.contains("PERFORMANCE REPORT"));
        assert!(text.contains("Total Duration:       42.00s"));
        assert!(text.contains("Performance Target:   PASS"));
        assert!(text.contains("Margin:               258.00s"));
        assert!(text.contains("Repositories:       100"));
        assert!(text.contains("Code chunks:        10,000"));
        assert!(text.contains("Step 2/3: Adding column: 30.00s (71.4%)"));
        assert!(text.contains("Current Revision:     002 (head)"));
    }

    #[test]
    fn test_text_render_failure() {
        let text = sample(301.0).render(OutputFormat::Text).unwrap();
        assert!(text.contains("Performance Target:   FAIL"));
        assert!(text.contains("Margin:               -1.00s"));
    }

    #[test]
    fn test_json_render_roundtrip() {
        let report = sample(42.0);
        let json = report.render(OutputFormat::Json).unwrap();
        let parsed: PerformanceReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn test_violation_message() {
        let message = sample(312.346).violation_message();
        assert_eq!(
            message,
            "Migration duration 312.35s exceeds target of 300s (FR-031 violation)"
        );
    }

    #[test]
    fn test_step_timing_text_render() {
        let report = StepTimingReport {
            log_file: PathBuf::from("/tmp/migration.log"),
            steps: vec![step("Step 1/2: Drop tables", 1.5)],
            missing_keywords: vec!["index".to_string()],
        };

        let text = report.render(OutputFormat::Text).unwrap();
        assert!(text.contains("Steps logged: 1"));
        assert!(text.contains("Log file: /tmp/migration.log"));
        assert!(text.contains("  - Step 1/2: Drop tables: 1.50s"));
        assert!(text.contains("keywords not found"));
        assert!(text.contains("  - index"));
    }

    #[test]
    fn test_text_render_ends_with_rule() {
        let text = sample(42.0).render(OutputFormat::Text).unwrap();
        let last = text.lines().last().unwrap();
        assert_eq!(last, "=".repeat(RULE_WIDTH));
        assert!(text.ends_with('\n'));
    }

    fn rollback(duration: f64, after_chunks: u64) -> RollbackReport {
        RollbackReport::build(duration, 30.0, (100, 10_000), (100, after_chunks), "005".to_string())
    }

    #[test]
    fn test_rollback_requirement_is_strict() {
        assert!(rollback(29.99, 10_000).meets_requirement);
        assert!(!rollback(30.0, 10_000).meets_requirement);
    }

    #[test]
    fn test_rollback_violation_message() {
        assert_eq!(
            rollback(31.456, 10_000).violation_message(),
            "Rollback took 31.46s (target: <30s)"
        );
    }

    #[test]
    fn test_rollback_text_render() {
        let text = rollback(1.5, 9_000).render(OutputFormat::Text).unwrap();

        assert!(text.contains("ROLLBACK REPORT"));
        assert!(text.contains("Rollback Duration:    1.50s"));
        assert!(text.contains("Target:               < 30s"));
        assert!(text.contains("Performance Target:   PASS"));
        assert!(text.contains("Current Revision:     005"));
        assert!(text.contains("  Repositories:       100 -> 100"));
        assert!(text.contains("  Code chunks:        10,000 -> 9,000"));
    }

    #[test]
    fn test_rollback_json_render() {
        let json = rollback(1.5, 10_000).render(OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["repositories_before"], 100);
        assert_eq!(value["current_revision"], "005");
        assert_eq!(value["meets_requirement"], true);
    }

    #[test]
    fn test_step_timing_no_warning_when_complete() {
        let report = StepTimingReport {
            log_file: PathBuf::from("/tmp/migration.log"),
            steps: Vec::new(),
            missing_keywords: Vec::new(),
        };

        let text = report.render(OutputFormat::Text).unwrap();
        assert!(text.contains("Steps logged: 0"));
        assert!(!text.contains("WARNING"));

        let json = report.render(OutputFormat::Json).unwrap();
        assert!(json.contains("\"missing_keywords\": []"));
    }
}
