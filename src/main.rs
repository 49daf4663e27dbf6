//! # Seedwright CLI
//!
//! This is the binary entry point for the `seedwright` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Setting up logging and output preferences.
//! - Executing the appropriate command and turning library errors into
//!   user-friendly output.
//!
//! Composition itself lives in the `seedwright` library crate; the binary is a
//! thin wrapper that loads YAML inputs and calls into it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
