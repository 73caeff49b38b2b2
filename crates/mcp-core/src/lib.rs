//! Core types and errors for codebase-mcp.
//!
//! This crate provides the foundational types shared by the example MCP
//! servers and the migration performance harness.
//!
//! # Architecture
//!
//! The core consists of:
//! - Error hierarchy with contextual information
//! - Strong domain types (`DatabaseName`, `ToolName`)
//! - CLI output and exit-code types
//! - Argument validation for subprocess execution

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod command;
mod error;
mod types;

pub mod cli;

pub use command::{render_command, validate_argument, validate_program};
pub use error::{Error, Result};
pub use types::{DatabaseName, ToolName};
