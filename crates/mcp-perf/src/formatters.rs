//! Output formatters for CLI commands.
//!
//! Every command prints through one of three modes: JSON for scripts, plain
//! `key: value` text for logs and greps, colorized pretty output for
//! terminals. Reports with their own layout (see [`crate::report`]) only
//! borrow the JSON mode.

use anyhow::Result;
use codebase_mcp_core::cli::OutputFormat;
use colored::Colorize;
use serde::Serialize;

/// Format data according to the specified output format.
///
/// # Errors
///
/// Returns an error if the data cannot be serialized.
///
/// # Examples
///
/// ```
/// use codebase_mcp_core::cli::OutputFormat;
/// use codebase_mcp_perf::formatters::format_output;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Budget {
///     target_seconds: f64,
/// }
///
/// let output = format_output(&Budget { target_seconds: 300.0 }, OutputFormat::Text)?;
/// assert_eq!(output, "target_seconds: 300.0");
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn format_output<T: Serialize>(data: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json::format(data),
        OutputFormat::Text => text::format(data),
        OutputFormat::Pretty => pretty::format(data),
    }
}

/// JSON output formatting.
pub mod json {
    use super::{Result, Serialize};

    /// Format data as JSON with 2-space indentation.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }

    /// Format data as single-line JSON.
    pub fn format_compact<T: Serialize>(data: &T) -> Result<String> {
        Ok(serde_json::to_string(data)?)
    }
}

/// Plain text output formatting.
pub mod text {
    use super::{Result, Serialize, json};
    use serde_json::Value;

    /// Format data as one `path: value` line per scalar.
    ///
    /// Nested objects are flattened with dotted keys and array items get
    /// their index, e.g. `tools.alembic: alembic` or `steps.0.seconds: 1.2`.
    /// A top-level scalar is printed as compact JSON.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        let value = serde_json::to_value(data)?;
        if !matches!(value, Value::Object(_) | Value::Array(_)) {
            return json::format_compact(&value);
        }

        let mut lines = Vec::new();
        flatten(&value, "", &mut lines);
        Ok(lines.join("\n"))
    }

    fn flatten(value: &Value, prefix: &str, lines: &mut Vec<String>) {
        let child = |key: &str| {
            if prefix.is_empty() {
                key.to_string()
            } else {
                format!("{prefix}.{key}")
            }
        };

        match value {
            Value::Object(map) if !map.is_empty() => {
                for (key, item) in map {
                    flatten(item, &child(key), lines);
                }
            }
            Value::Array(items) if !items.is_empty() => {
                for (index, item) in items.iter().enumerate() {
                    flatten(item, &child(&index.to_string()), lines);
                }
            }
            Value::String(s) => lines.push(format!("{prefix}: {s}")),
            other => lines.push(format!("{prefix}: {other}")),
        }
    }
}

/// Pretty (human-readable) output formatting.
pub mod pretty {
    use super::{Colorize, Result, Serialize};
    use serde_json::Value;
    use std::fmt::Write as _;

    /// Format data as colorized, indented output.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        let value = serde_json::to_value(data)?;
        let mut out = String::new();
        format_value(&value, 0, &mut out);
        Ok(out)
    }

    fn format_value(value: &Value, indent: usize, out: &mut String) {
        let indent_str = "  ".repeat(indent);
        let next_indent_str = "  ".repeat(indent + 1);

        match value {
            Value::Null => out.push_str(&"null".dimmed().to_string()),
            Value::Bool(b) => out.push_str(&b.to_string().yellow().to_string()),
            Value::Number(n) => out.push_str(&n.to_string().cyan().to_string()),
            Value::String(s) => {
                let _ = write!(out, "\"{}\"", s.green());
            }
            Value::Array(items) if items.is_empty() => out.push_str("[]"),
            Value::Object(map) if map.is_empty() => out.push_str("{}"),
            Value::Array(items) => {
                out.push_str("[\n");
                for (i, item) in items.iter().enumerate() {
                    out.push_str(&next_indent_str);
                    format_value(item, indent + 1, out);
                    if i + 1 < items.len() {
                        out.push(',');
                    }
                    out.push('\n');
                }
                out.push_str(&indent_str);
                out.push(']');
            }
            Value::Object(map) => {
                out.push_str("{\n");
                for (i, (key, item)) in map.iter().enumerate() {
                    let _ = write!(out, "{next_indent_str}\"{}\": ", key.blue().bold());
                    format_value(item, indent + 1, out);
                    if i + 1 < map.len() {
                        out.push(',');
                    }
                    out.push('\n');
                }
                out.push_str(&indent_str);
                out.push('}');
            }
        }
    }
}
