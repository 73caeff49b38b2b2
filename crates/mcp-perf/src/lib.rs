//! Migration performance harness.
//!
//! Times `alembic upgrade head` on a generated dataset of 100 repositories
//! and 10,000 code chunks and checks it against the 300 second budget of
//! FR-031. The library holds the pieces the `migration-perf` binary wires
//! together so they can be tested on their own.
//!
//! # Examples
//!
//! ```no_run
//! use codebase_mcp_perf::config::HarnessConfig;
//! use codebase_mcp_perf::harness::{MigrationHarness, RunOptions};
//!
//! # async fn example() -> codebase_mcp_core::Result<()> {
//! let harness = MigrationHarness::new(
//!     HarnessConfig::default(),
//!     "postgresql://localhost/codebase_mcp_test",
//! )?;
//!
//! let outcome = harness.run_performance(RunOptions::default()).await;
//! println!("exit code {}", outcome.exit_code().as_i32());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![allow(clippy::missing_errors_doc)]

pub mod actions;
pub mod commands;
pub mod config;
pub mod dataset;
pub mod formatters;
pub mod harness;
pub mod log_parser;
pub mod report;
pub mod runner;

pub use config::HarnessConfig;
pub use harness::{MigrationHarness, Outcome, RunOptions};
