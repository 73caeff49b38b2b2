//! Config command implementation.
//!
//! Writes a default harness configuration file or shows the effective one.

use crate::actions::ConfigAction;
use crate::config::{HarnessConfig, default_config_path};
use crate::formatters::format_output;
use anyhow::{Context, Result};
use codebase_mcp_core::cli::{ExitCode, OutputFormat};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Result of `config init`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct InitResult {
    /// Whether a file was written
    pub success: bool,
    /// Status message
    pub message: String,
    /// Target path
    pub path: String,
}

/// Runs the config command.
///
/// # Errors
///
/// Returns an error if the file cannot be written or the output cannot be
/// formatted.
pub async fn run(action: ConfigAction, output_format: OutputFormat) -> Result<ExitCode> {
    info!("Config action: {:?}", action);

    match action {
        ConfigAction::Init { path, force } => {
            let Some(path) = path.or_else(default_config_path) else {
                anyhow::bail!("could not determine the platform config directory");
            };
            let result = init_config(&path, force)?;
            println!("{}", format_output(&result, output_format)?);
            Ok(ExitCode::SUCCESS)
        }
        ConfigAction::Show { config } => show_config(config.as_deref(), output_format),
    }
}

/// Writes the default configuration to `path`.
///
/// An existing file is left alone unless `force` is set.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn init_config(path: &Path, force: bool) -> Result<InitResult> {
    if path.exists() && !force {
        return Ok(InitResult {
            success: false,
            message: "configuration file already exists (use --force to overwrite)".to_string(),
            path: path.display().to_string(),
        });
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }

    let toml_str = toml::to_string_pretty(&HarnessConfig::default())
        .context("failed to serialize config")?;
    fs::write(path, toml_str)
        .with_context(|| format!("failed to write config file {}", path.display()))?;

    info!("Wrote default configuration to {}", path.display());
    Ok(InitResult {
        success: true,
        message: "configuration file created with default values".to_string(),
        path: path.display().to_string(),
    })
}

fn show_config(path: Option<&Path>, output_format: OutputFormat) -> Result<ExitCode> {
    let config = match HarnessConfig::load(path) {
        Ok(config) => config,
        Err(e) => {
            super::common::print_invalid(&e.to_string(), output_format);
            return Ok(ExitCode::INVALID_INPUT);
        }
    };

    let formatted = format_output(&config, output_format).context("failed to format configuration")?;
    println!("{formatted}");
    Ok(ExitCode::SUCCESS)
}
