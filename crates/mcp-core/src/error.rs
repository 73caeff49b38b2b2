//! Error types for the codebase-mcp workspace.
//!
//! A single error hierarchy is shared by the example MCP servers and the
//! migration performance harness. Library code returns [`Result`]; binaries
//! wrap it in `anyhow` at the edge.
//!
//! # Examples
//!
//! ```
//! use codebase_mcp_core::{Error, Result};
//!
//! fn require_url(url: &str) -> Result<()> {
//!     if url.is_empty() {
//!         return Err(Error::ConfigError {
//!             message: "DATABASE_URL cannot be empty".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//!
//! let err = require_url("").unwrap_err();
//! assert!(err.is_config_error());
//! ```

use thiserror::Error;

/// Main error type for codebase-mcp.
#[derive(Error, Debug)]
pub enum Error {
    /// An external command ran but exited unsuccessfully.
    ///
    /// Carries the captured output so callers can surface it verbatim,
    /// the way a failed `alembic upgrade head` should be reported.
    #[error("Command `{command}` failed with exit code {}", display_exit_code(.exit_code))]
    ProcessFailed {
        /// Rendered command line
        command: String,
        /// Exit code, `None` when the process was killed by a signal
        exit_code: Option<i32>,
        /// Captured standard output
        stdout: String,
        /// Captured standard error
        stderr: String,
    },

    /// An external command could not be started at all.
    #[error("Failed to spawn `{command}`")]
    SpawnFailed {
        /// Rendered command line
        command: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Timeout error.
    ///
    /// Occurs when an operation exceeds its configured timeout limit.
    #[error("Operation timed out after {duration_secs}s: {operation}")]
    Timeout {
        /// Name of the operation that timed out
        operation: String,
        /// Duration in seconds before timeout occurred
        duration_secs: u64,
    },

    /// Configuration error.
    ///
    /// Raised when configuration is invalid, missing required fields,
    /// or contains contradictory settings.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    /// Invalid argument error.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Validation error for domain types such as [`crate::DatabaseName`].
    #[error("Validation error in {field}: {reason}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Detailed reason for the validation failure
        reason: String,
    },

    /// Output of an external tool could not be interpreted.
    #[error("Failed to parse {what}: {message}")]
    ParseError {
        /// What was being parsed (e.g. "row count")
        what: String,
        /// Description of the problem
        message: String,
    },

    /// Filesystem error.
    #[error("I/O error on {path}")]
    IoError {
        /// Path involved in the failed operation
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Returns `true` if an external command exited unsuccessfully.
    ///
    /// # Examples
    ///
    /// ```
    /// use codebase_mcp_core::Error;
    ///
    /// let err = Error::ProcessFailed {
    ///     command: "alembic upgrade head".to_string(),
    ///     exit_code: Some(1),
    ///     stdout: String::new(),
    ///     stderr: "boom".to_string(),
    /// };
    /// assert!(err.is_process_failure());
    /// ```
    #[must_use]
    pub const fn is_process_failure(&self) -> bool {
        matches!(self, Self::ProcessFailed { .. })
    }

    /// Returns `true` if a command could not be spawned.
    #[must_use]
    pub const fn is_spawn_failure(&self) -> bool {
        matches!(self, Self::SpawnFailed { .. })
    }

    /// Returns `true` if this is a configuration error.
    ///
    /// # Examples
    ///
    /// ```
    /// use codebase_mcp_core::Error;
    ///
    /// let err = Error::ConfigError {
    ///     message: "Invalid budget".to_string(),
    /// };
    /// assert!(err.is_config_error());
    /// ```
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigError { .. })
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns `true` if this is a validation error.
    #[must_use]
    pub const fn is_validation_error(&self) -> bool {
        matches!(self, Self::ValidationError { .. })
    }

    /// Returns `true` if this is a parse error.
    #[must_use]
    pub const fn is_parse_error(&self) -> bool {
        matches!(self, Self::ParseError { .. })
    }

    /// Exit code of the failed process, if this error carries one.
    ///
    /// # Examples
    ///
    /// ```
    /// use codebase_mcp_core::Error;
    ///
    /// let err = Error::ProcessFailed {
    ///     command: "alembic current".to_string(),
    ///     exit_code: Some(2),
    ///     stdout: String::new(),
    ///     stderr: String::new(),
    /// };
    /// assert_eq!(err.exit_code(), Some(2));
    /// assert_eq!(Error::InvalidArgument("x".into()).exit_code(), None);
    /// ```
    #[must_use]
    pub const fn exit_code(&self) -> Option<i32> {
        match self {
            Self::ProcessFailed { exit_code, .. } => *exit_code,
            _ => None,
        }
    }
}

fn display_exit_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "<signal>".to_string(), |c| c.to_string())
}

/// Result type alias for codebase-mcp operations.
pub type Result<T> = std::result::Result<T, Error>;
