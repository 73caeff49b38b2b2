//! Strong domain types.
//!
//! Newtypes keep database names and tool names from being mixed up with
//! arbitrary strings, and validate the former at construction since it ends
//! up as an argument to `dropdb`/`createdb`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// Maximum identifier length accepted by `PostgreSQL`.
const MAX_DATABASE_NAME_LEN: usize = 63;

/// Validated `PostgreSQL` database name.
///
/// Only ASCII letters, digits and underscores are accepted, and the name must
/// not start with a digit.
///
/// # Examples
///
/// ```
/// use codebase_mcp_core::DatabaseName;
///
/// let name = DatabaseName::new("codebase_mcp_test").unwrap();
/// assert_eq!(name.as_str(), "codebase_mcp_test");
///
/// assert!(DatabaseName::new("test; DROP DATABASE prod").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DatabaseName(String);

impl DatabaseName {
    /// Creates a validated database name.
    ///
    /// # Errors
    ///
    /// Returns `Error::ValidationError` if the name is empty, too long,
    /// starts with a digit or contains characters other than
    /// `[A-Za-z0-9_]`.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();

        if name.is_empty() {
            return Err(invalid("database name cannot be empty"));
        }

        if name.len() > MAX_DATABASE_NAME_LEN {
            return Err(invalid(&format!(
                "database name exceeds {MAX_DATABASE_NAME_LEN} characters"
            )));
        }

        if name.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(invalid("database name cannot start with a digit"));
        }

        if let Some(bad) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
        {
            return Err(invalid(&format!(
                "database name contains invalid character '{}'",
                bad.escape_default()
            )));
        }

        Ok(Self(name))
    }

    /// Returns the name as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn invalid(reason: &str) -> Error {
    Error::ValidationError {
        field: "database_name".to_string(),
        reason: reason.to_string(),
    }
}

impl fmt::Display for DatabaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DatabaseName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<DatabaseName> for String {
    fn from(name: DatabaseName) -> Self {
        name.0
    }
}

/// Tool name identifier (newtype over String).
///
/// # Examples
///
/// ```
/// use codebase_mcp_core::ToolName;
///
/// let tool = ToolName::new("echo");
/// assert_eq!(tool.as_str(), "echo");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolName(String);

impl ToolName {
    /// Creates a new tool name.
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the tool name as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ToolName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
