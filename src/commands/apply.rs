//! Apply command implementation
//!
//! The apply command composes the given modules, in order, and writes the
//! result into the project root:
//! 1. Manifest merge
//! 2. Ignore merge
//! 3. File materialization
//! 4. Anchor patching
//! 5. Finalization of the aggregated files
//! 6. Writing to disk, then running queued post actions
//!
//! Nothing is written unless every module applies cleanly.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Args;

use seedwright::output::{OutputConfig, Status};
use seedwright::phases::CompositionEngine;
use seedwright::render::TemplateEngine;

use super::{explain, InputArgs};

/// Arguments for the apply command
#[derive(Args, Debug)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Project root to create (defaults to ./<project-name>)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Compose in memory and report, without writing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Write the project but do not run post actions
    #[arg(long)]
    pub skip_post_actions: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the apply command
pub fn execute(args: ApplyArgs, color_flag: &str) -> Result<()> {
    let start_time = Instant::now();
    let out = OutputConfig::from_env_and_flag(color_flag);

    let inputs = args.inputs.load()?;
    let modules = inputs.build_modules()?;

    let project_root = match args.output {
        Some(dir) => dir,
        None => std::env::current_dir()?.join(&inputs.configuration.project_name),
    };

    let renderer = TemplateEngine::new();
    let mut engine = CompositionEngine::new(&inputs.catalog, &inputs.resources, &renderer);
    if args.skip_post_actions {
        engine = engine.skip_post_actions();
    }

    if args.dry_run {
        let state = engine
            .plan(&modules, &inputs.configuration)
            .map_err(|err| explain(err, &inputs.catalog))?;
        if !args.quiet {
            println!(
                "{} Would write {} file(s) to {}",
                out.label(Status::DryRun),
                state.fs.len(),
                out.emphasis(project_root.display())
            );
            if !state.actions.is_empty() {
                println!(
                    "{} Would run {} post action(s)",
                    out.label(Status::DryRun),
                    state.actions.len()
                );
            }
        }
        return Ok(());
    }

    let report = match engine.compose(&modules, &project_root, &inputs.configuration) {
        Ok(report) => report,
        Err(err) => {
            if !args.quiet {
                eprintln!("{} Apply failed", out.label(Status::Error));
            }
            return Err(explain(err, &inputs.catalog));
        }
    };

    if !args.quiet {
        println!(
            "{} Applied {} module(s) in {:.2}s",
            out.label(Status::Ok),
            report.modules,
            start_time.elapsed().as_secs_f64()
        );
        println!(
            "   {} file(s) written to {}",
            report.files.len(),
            out.emphasis(project_root.display())
        );
        if report.skipped_edits > 0 {
            println!(
                "{} {} optional edit(s) skipped",
                out.label(Status::Warning),
                report.skipped_edits
            );
        }
        if report.post_actions > 0 {
            println!("   {} post action(s) ran", report.post_actions);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::write_workspace;
    use std::fs;
    use tempfile::TempDir;

    fn args(inputs: InputArgs, output: PathBuf, dry_run: bool) -> ApplyArgs {
        ApplyArgs {
            inputs,
            output: Some(output),
            dry_run,
            skip_post_actions: false,
            quiet: true,
        }
    }

    #[test]
    fn test_execute_missing_config() {
        let temp = TempDir::new().unwrap();
        let mut inputs = write_workspace(temp.path());
        inputs.config = PathBuf::from("/nonexistent/seedwright.yaml");

        let result = execute(args(inputs, temp.path().join("out"), false), "never");
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Configuration file not found"));
    }

    #[test]
    fn test_execute_writes_project() {
        let temp = TempDir::new().unwrap();
        let inputs = write_workspace(temp.path());
        let output = temp.path().join("out");

        execute(args(inputs, output.clone(), false), "never").unwrap();

        assert_eq!(fs::read_to_string(output.join("README.md")).unwrap(), "# shop\n");
        assert_eq!(
            fs::read_to_string(output.join(".gitignore")).unwrap(),
            "# Build output\ndist/\n\n"
        );
        let manifest = fs::read_to_string(output.join("package.json")).unwrap();
        assert!(manifest.contains("\"lodash\": \"4.17.21\""));
        assert!(manifest.contains("\"build\": \"tsc\""));
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let inputs = write_workspace(temp.path());
        let output = temp.path().join("out");

        execute(args(inputs, output.clone(), true), "never").unwrap();
        assert!(!output.exists());
    }

    #[test]
    fn test_failed_apply_leaves_no_project() {
        let temp = TempDir::new().unwrap();
        let inputs = write_workspace(temp.path());
        fs::write(
            temp.path().join("core.yaml"),
            "slug: core\nfiles:\n  - source: missing.txt\n",
        )
        .unwrap();
        let output = temp.path().join("out");

        let err = execute(args(inputs, output.clone(), false), "never").unwrap_err();
        assert!(format!("{:#}", err).contains("missing.txt"));
        assert!(!output.exists());
    }
}
