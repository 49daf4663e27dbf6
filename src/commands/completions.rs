//! # Completions Command Implementation
//!
//! Generates shell completion scripts with `clap_complete`.
//!
//! ```bash
//! seedwright completions bash > ~/.local/share/bash-completion/completions/seedwright
//! seedwright completions zsh > ~/.zfunc/_seedwright
//! ```

use std::io;

use anyhow::Result;
use clap::{Args, CommandFactory, ValueEnum};
use clap_complete::{generate, Shell};

use crate::cli::Cli;

/// Shell types for completion generation
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
    Elvish,
}

impl From<CompletionShell> for Shell {
    fn from(shell: CompletionShell) -> Self {
        match shell {
            CompletionShell::Bash => Shell::Bash,
            CompletionShell::Zsh => Shell::Zsh,
            CompletionShell::Fish => Shell::Fish,
            CompletionShell::PowerShell => Shell::PowerShell,
            CompletionShell::Elvish => Shell::Elvish,
        }
    }
}

/// Generate shell completion scripts
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// The shell to generate completions for
    #[arg(value_enum)]
    pub shell: CompletionShell,
}

/// Write the completion script for the requested shell to stdout
pub fn execute(args: CompletionsArgs) -> Result<()> {
    write_completions(args.shell, &mut io::stdout());
    Ok(())
}

fn write_completions(shell: CompletionShell, out: &mut dyn io::Write) {
    let mut cmd = Cli::command();
    generate(Shell::from(shell), &mut cmd, "seedwright", out);
}
