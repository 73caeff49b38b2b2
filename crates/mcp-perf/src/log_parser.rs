//! Migration log parsing.
//!
//! The migration logs each major step with its duration:
//!
//! ```text
//! 2025-10-11 14:30:01,234 - INFO - Step 1/10: Checking prerequisites... (0.05s)
//! 2025-10-11 14:30:02,456 - INFO - Step 2/10: Verifying foreign keys... (1.23s)
//! ```
//!
//! [`parse_migration_log`] turns those lines into [`StepDuration`]s.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static STEP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(Step \d+/\d+: [^(]+?)\s*\((\d+\.\d+)s\)").expect("valid regex")
});

/// Keywords a complete migration log is expected to mention.
pub const EXPECTED_STEP_KEYWORDS: &[&str] = &[
    "prerequisite",
    "foreign key",
    "column",
    "constraint",
    "index",
    "drop",
];

/// Duration of one logged migration step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDuration {
    /// Step label, e.g. `Step 1/10: Checking prerequisites`
    pub description: String,

    /// Wall-clock seconds reported by the migration
    pub seconds: f64,
}

/// Extracts step timings from migration log content.
///
/// Steps are returned in order of first appearance. A step logged more than
/// once (the migration was run twice against the same log) keeps its latest
/// duration. Trailing whitespace and the `...` ellipsis are stripped from
/// descriptions. The Python test suite documents the same stripped form but
/// its regex keeps the dots at runtime, so its output reads
/// `Step 1/10: Checking prerequisites...`.
///
/// # Examples
///
/// ```
/// use codebase_mcp_perf::log_parser::parse_migration_log;
///
/// let steps = parse_migration_log("Step 1/10: Checking prerequisites... (0.05s)");
/// assert_eq!(steps.len(), 1);
/// assert_eq!(steps[0].description, "Step 1/10: Checking prerequisites");
/// assert!((steps[0].seconds - 0.05).abs() < 1e-9);
/// ```
#[must_use]
pub fn parse_migration_log(content: &str) -> Vec<StepDuration> {
    let mut steps: Vec<StepDuration> = Vec::new();

    for captures in STEP_REGEX.captures_iter(content) {
        let description = captures[1].trim().trim_end_matches('.').trim_end();
        let Ok(seconds) = captures[2].parse::<f64>() else {
            continue;
        };

        if let Some(existing) = steps.iter_mut().find(|s| s.description == description) {
            existing.seconds = seconds;
        } else {
            steps.push(StepDuration {
                description: description.to_string(),
                seconds,
            });
        }
    }

    steps
}

/// Returns the expected keywords that do not occur in the log.
///
/// Matching is case-insensitive over the whole log, not only step lines.
#[must_use]
pub fn missing_step_keywords(content: &str) -> Vec<&'static str> {
    let lower = content.to_lowercase();
    EXPECTED_STEP_KEYWORDS
        .iter()
        .copied()
        .filter(|keyword| !lower.contains(keyword))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_LOG: &str = "\
2025-10-11 14:30:01,234 - INFO - Starting migration 002
2025-10-11 14:30:01,234 - INFO - Step 1/10: Checking prerequisites... (0.05s)
2025-10-11 14:30:02,456 - INFO - Step 2/10: Verifying foreign keys... (1.23s)
2025-10-11 14:30:03,000 - INFO - Step 3/10: Adding column project_id (12.50s)
2025-10-11 14:30:04,000 - DEBUG - unrelated line (3.00s)
";

    #[test]
    fn test_parses_all_steps_in_order() {
        let steps = parse_migration_log(SAMPLE_LOG);

        let descriptions: Vec<_> = steps.iter().map(|s| s.description.as_str()).collect();
        assert_eq!(
            descriptions,
            vec![
                "Step 1/10: Checking prerequisites",
                "Step 2/10: Verifying foreign keys",
                "Step 3/10: Adding column project_id",
            ]
        );
        assert!((steps[1].seconds - 1.23).abs() < 1e-9);
        assert!((steps[2].seconds - 12.5).abs() < 1e-9);
    }

    #[test]
    fn test_ignores_non_step_lines() {
        assert!(parse_migration_log("INFO - Done (3.00s)\nStep x/y: bad (1.0s)").is_empty());
        assert!(parse_migration_log("").is_empty());
    }

    #[test]
    fn test_requires_decimal_seconds() {
        assert!(parse_migration_log("Step 1/2: Drop tables (3s)").is_empty());
    }

    #[test]
    fn test_repeated_step_keeps_last_duration() {
        let log = "Step 1/2: Drop tables... (1.00s)\nStep 1/2: Drop tables... (2.50s)\n";
        let steps = parse_migration_log(log);

        assert_eq!(steps.len(), 1);
        assert!((steps[0].seconds - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_missing_keywords_all_present() {
        let log = "Step 1/6: prerequisite check (0.10s)\n\
                   Step 2/6: Foreign Key verification (0.10s)\n\
                   Step 3/6: add column (0.10s)\n\
                   Step 4/6: add CONSTRAINT (0.10s)\n\
                   Step 5/6: create index (0.10s)\n\
                   Step 6/6: drop tables (0.10s)\n";
        assert!(missing_step_keywords(log).is_empty());
    }

    #[test]
    fn test_missing_keywords_reported() {
        let missing = missing_step_keywords(SAMPLE_LOG);
        assert_eq!(missing, vec!["constraint", "index", "drop"]);
    }
}
