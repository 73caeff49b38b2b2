//! Argument validation and rendering for subprocess execution.
//!
//! The harness never goes through a shell: every external tool is started
//! with `tokio::process::Command` and explicit arguments. User-supplied
//! values that become arguments (an Alembic revision) are still checked so
//! that a config typo cannot smuggle shell syntax into logs that people copy
//! and paste. Program paths only need to be non-empty and printable, since
//! `C:\Program Files (x86)\...` is a legitimate install location.
//!
//! # Examples
//!
//! ```
//! use codebase_mcp_core::{render_command, validate_argument, validate_program};
//!
//! assert!(validate_argument("revision", "005").is_ok());
//! assert!(validate_argument("revision", "head; rm -rf /").is_err());
//! assert!(validate_program("tools.python", "/opt/Python (3.12)/bin/python3").is_ok());
//!
//! assert_eq!(render_command("alembic", &["upgrade", "head"]), "alembic upgrade head");
//! ```

use crate::{Error, Result};

/// Shell metacharacters that indicate potential command injection.
const FORBIDDEN_CHARS: &[char] = &[';', '|', '&', '>', '<', '`', '$', '(', ')', '\n', '\r'];

/// Validates a single value that will be passed as a subprocess argument.
///
/// # Errors
///
/// Returns `Error::ValidationError` if the value is empty or whitespace, or
/// contains a shell metacharacter or a control character.
pub fn validate_argument(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::ValidationError {
            field: field.to_string(),
            reason: "value cannot be empty".to_string(),
        });
    }

    if let Some(forbidden) = value.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(Error::ValidationError {
            field: field.to_string(),
            reason: format!(
                "contains forbidden shell metacharacter '{}'",
                forbidden.escape_default()
            ),
        });
    }

    if value.chars().any(char::is_control) {
        return Err(Error::ValidationError {
            field: field.to_string(),
            reason: "contains control characters".to_string(),
        });
    }

    Ok(())
}

/// Validates a program path taken from configuration.
///
/// # Errors
///
/// Returns `Error::ValidationError` if the path is empty or whitespace, or
/// contains a control character.
pub fn validate_program(field: &str, program: &str) -> Result<()> {
    if program.trim().is_empty() {
        return Err(Error::ValidationError {
            field: field.to_string(),
            reason: "program cannot be empty".to_string(),
        });
    }

    if program.chars().any(char::is_control) {
        return Err(Error::ValidationError {
            field: field.to_string(),
            reason: "contains control characters".to_string(),
        });
    }

    Ok(())
}

/// Renders a program and its arguments as a single display string.
///
/// Arguments containing whitespace are single-quoted. The result is for
/// logs and error messages only, never for execution.
#[must_use]
pub fn render_command<S: AsRef<str>>(program: &str, args: &[S]) -> String {
    let mut rendered = program.to_string();
    for arg in args {
        let arg = arg.as_ref();
        rendered.push(' ');
        if arg.contains(char::is_whitespace) {
            rendered.push('\'');
            rendered.push_str(arg);
            rendered.push('\'');
        } else {
            rendered.push_str(arg);
        }
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_argument_accepts_revisions() {
        for rev in ["head", "005", "002_remove_non_search_tables", "+1", "base"] {
            assert!(validate_argument("revision", rev).is_ok(), "{rev}");
        }
    }

    #[test]
    fn test_validate_argument_rejects_empty() {
        let err = validate_argument("revision", "   ").unwrap_err();
        assert!(err.is_validation_error());
        assert!(err.to_string().contains("revision"));
    }

    #[test]
    fn test_validate_argument_rejects_metacharacters() {
        for value in ["a;b", "a|b", "a&b", "$(x)", "`x`", "a>b", "a\nb"] {
            assert!(validate_argument("arg", value).is_err(), "{value:?}");
        }
    }

    #[test]
    fn test_validate_argument_rejects_control_chars() {
        assert!(validate_argument("arg", "a\u{7}b").is_err());
    }

    #[test]
    fn test_validate_program_accepts_paths_with_punctuation() {
        for program in [
            "alembic",
            "/opt/Python (3.12)/bin/python3",
            r"C:\Program Files (x86)\PostgreSQL\16\bin\psql.exe",
            "/srv/R&D/venv/bin/alembic",
            "/home/$user/bin/dropdb",
        ] {
            assert!(validate_program("tools.psql", program).is_ok(), "{program}");
        }
    }

    #[test]
    fn test_validate_program_rejects_empty_and_control_chars() {
        assert!(validate_program("tools.alembic", "  ").unwrap_err().is_validation_error());
        assert!(validate_program("tools.alembic", "alembic\n").is_err());
        assert!(validate_program("tools.alembic", "ale\u{0}mbic").is_err());
    }

    #[test]
    fn test_render_command_quotes_whitespace() {
        let rendered = render_command(
            "psql",
            &["postgresql://localhost/db", "-c", "SELECT COUNT(*) FROM repositories"],
        );
        assert_eq!(
            rendered,
            "psql postgresql://localhost/db -c 'SELECT COUNT(*) FROM repositories'"
        );
    }

    #[test]
    fn test_render_command_no_args() {
        let empty: [&str; 0] = [];
        assert_eq!(render_command("alembic", &empty), "alembic");
    }
}
