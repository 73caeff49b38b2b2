//! Test dataset statistics.
//!
//! The generator script prints a summary such as:
//!
//! ```text
//! Repositories: 100
//! Code files: 100
//! Code chunks: 10,000
//! ```
//!
//! which [`parse_generator_output`] reads back.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static REPOSITORIES_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Repositories:\s+(\d+)").expect("valid regex"));
static CODE_FILES_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Code files:\s+([\d,]+)").expect("valid regex"));
static CODE_CHUNKS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Code chunks:\s+([\d,]+)").expect("valid regex"));

/// Statistics from test data generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestDataStats {
    /// Number of repositories created
    pub repositories_created: u64,

    /// Number of code files created
    pub code_files_created: u64,

    /// Number of code chunks created
    pub code_chunks_created: u64,

    /// Time to generate data
    pub generation_duration_seconds: f64,
}

/// Reads repository, file and chunk counts from generator output.
///
/// Thousands separators are accepted. A count that is missing from the
/// output is reported as 0, which the dataset checks then reject.
///
/// # Examples
///
/// ```
/// use codebase_mcp_perf::dataset::parse_generator_output;
///
/// let stats = parse_generator_output("Repositories: 100\nCode chunks: 10,000\n", 4.2);
/// assert_eq!(stats.repositories_created, 100);
/// assert_eq!(stats.code_chunks_created, 10_000);
/// assert_eq!(stats.code_files_created, 0);
/// ```
#[must_use]
pub fn parse_generator_output(output: &str, generation_duration_seconds: f64) -> TestDataStats {
    TestDataStats {
        repositories_created: capture_count(&REPOSITORIES_REGEX, output),
        code_files_created: capture_count(&CODE_FILES_REGEX, output),
        code_chunks_created: capture_count(&CODE_CHUNKS_REGEX, output),
        generation_duration_seconds,
    }
}

fn capture_count(regex: &Regex, output: &str) -> u64 {
    regex
        .captures(output)
        .and_then(|c| c[1].replace(',', "").parse().ok())
        .unwrap_or(0)
}

/// Checks the dataset against the expected scenario size.
///
/// The repository count must match exactly. The chunk count must reach at
/// least `expected_chunks`.
///
/// # Errors
///
/// Returns a human-readable reason when the dataset is off.
pub fn check_dataset(
    stats: &TestDataStats,
    expected_repositories: u64,
    expected_chunks: u64,
) -> Result<(), String> {
    if stats.repositories_created != expected_repositories {
        return Err(format!(
            "Expected {expected_repositories} repositories, got {}",
            stats.repositories_created
        ));
    }

    if stats.code_chunks_created < expected_chunks {
        return Err(format!(
            "Expected at least {} code chunks, got {}",
            group_thousands(expected_chunks),
            group_thousands(stats.code_chunks_created)
        ));
    }

    Ok(())
}

/// Formats an integer with `,` thousands separators.
///
/// # Examples
///
/// ```
/// use codebase_mcp_perf::dataset::group_thousands;
///
/// assert_eq!(group_thousands(10_000), "10,000");
/// assert_eq!(group_thousands(999), "999");
/// ```
#[must_use]
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
