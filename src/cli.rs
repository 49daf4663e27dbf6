//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::LevelFilter;

use crate::commands;

/// Seedwright - Compose feature modules into a project skeleton
#[derive(Parser, Debug)]
#[command(name = "seedwright")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace); RUST_LOG refines it
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compose modules and write the project to disk
    Apply(commands::apply::ApplyArgs),

    /// Show what a composition would produce without writing anything
    Plan(commands::plan::PlanArgs),

    /// Build every module and report its contributions
    Validate(commands::validate::ValidateArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level)?;

        match self.command {
            Commands::Apply(args) => commands::apply::execute(args, &self.color),
            Commands::Plan(args) => commands::plan::execute(args, &self.color),
            Commands::Validate(args) => commands::validate::execute(args, &self.color),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter: LevelFilter = level.parse().map_err(|_| {
        anyhow::anyhow!(
            "Invalid log level: {level}\n\n\
             hint: Use one of off, error, warn, info, debug, trace"
        )
    })?;

    let mut builder = env_logger::Builder::new();
    builder.filter_level(filter).format_timestamp(None);
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }
    // a logger may already be installed when embedded in tests
    let _ = builder.try_init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "seedwright",
            "validate",
            "-m",
            "core.yaml",
            "--color",
            "never",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.color, "never");
        assert_eq!(cli.log_level, "debug");
    }

    #[test]
    fn test_invalid_log_level() {
        let err = init_logging("loud").unwrap_err();
        assert!(err.to_string().contains("Invalid log level: loud"));
    }
}
