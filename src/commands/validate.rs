//! # Validate Command Implementation
//!
//! Builds every module definition against the project configuration and
//! reports what each module contributes. Nothing is composed and no file is
//! read beyond the configuration, the definitions and the catalog, so this is
//! a quick check of module authoring errors: bad slugs, empty declarations,
//! paths escaping the project root.

use anyhow::Result;
use clap::Args;

use seedwright::module::Module;
use seedwright::output::{OutputConfig, Status};

use super::InputArgs;

/// Build every module and report its contributions
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub inputs: InputArgs,
}

/// Execute the `validate` command.
pub fn execute(args: ValidateArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let inputs = args.inputs.load()?;
    inputs.configuration.validate()?;

    let modules = match inputs.build_modules() {
        Ok(modules) => modules,
        Err(err) => {
            eprintln!("{} Validation failed", out.label(Status::Error));
            return Err(err);
        }
    };

    for module in &modules {
        println!(
            "{} {}: {}",
            out.label(Status::Ok),
            out.emphasis(module.slug()),
            summarize(module)
        );
    }
    println!(
        "\n{} module(s) valid for project '{}'",
        modules.len(),
        inputs.configuration.project_name
    );
    Ok(())
}

fn summarize(module: &Module) -> String {
    format!(
        "{} ignore block(s), {} manifest edit(s), {} file(s), {} replacement(s), \
         {} pre-commit filter(s), {} post action(s)",
        module.ignore_blocks().len(),
        module.manifest_edits().len(),
        module.files().len(),
        module.anchor_edits().len(),
        module.pre_commit_actions().len(),
        module.post_actions().len()
    )
}
