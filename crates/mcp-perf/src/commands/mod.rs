//! Command implementations for the `migration-perf` CLI.
//!
//! Each module parses nothing itself: `main.rs` hands it the clap-parsed
//! arguments and the output format, and it returns the process exit code.

pub mod common;
pub mod completions;
pub mod config;
pub mod parse_log;
pub mod rollback;
pub mod run;
pub mod steps;
