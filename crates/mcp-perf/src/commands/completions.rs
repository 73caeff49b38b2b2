//! Shell completion generation command.

use anyhow::Result;
use clap::Command;
use clap_complete::{Shell, generate};
use codebase_mcp_core::cli::ExitCode;
use std::io::{self, Write};
use tracing::info;

/// Writes the completion script for `shell` to `out`.
pub fn generate_completions(shell: Shell, cmd: &mut Command, out: &mut dyn Write) {
    let name = cmd.get_name().to_string();
    generate(shell, cmd, name, out);
}

/// Runs the completions command, printing the script to stdout.
///
/// # Examples
///
/// ```no_run
/// use clap::Command;
/// use clap_complete::Shell;
/// use codebase_mcp_perf::commands::completions;
///
/// # #[tokio::main]
/// # async fn main() {
/// let mut cmd = Command::new("migration-perf");
/// let code = completions::run(Shell::Bash, &mut cmd).await.unwrap();
/// assert_eq!(code.as_i32(), 0);
/// # }
/// ```
pub async fn run(shell: Shell, cmd: &mut Command) -> Result<ExitCode> {
    info!("Generating {shell} completions");
    generate_completions(shell, cmd, &mut io::stdout());
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_command() -> Command {
        Command::new("migration-perf")
            .subcommand(Command::new("run"))
            .subcommand(Command::new("parse-log"))
    }

    fn script(shell: Shell) -> String {
        let mut buf = Vec::new();
        generate_completions(shell, &mut sample_command(), &mut buf);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_bash_script_mentions_subcommands() {
        let bash = script(Shell::Bash);
        assert!(bash.contains("migration-perf"));
        assert!(bash.contains("parse-log"));
    }

    #[test]
    fn test_all_shells_produce_output() {
        for shell in [Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell, Shell::Elvish] {
            assert!(!script(shell).is_empty(), "{shell} produced no script");
        }
    }
}
