//! Phase 5: Finalize
//!
//! Serializes the merged models into the staged tree once every module has
//! been applied:
//!
//! - the manifest is merged into the manifest file a module materialized (and
//!   possibly patched), or written as a new file
//! - the ignore document is appended to an existing ignore file, or written
//!   as a new one
//! - the pre-commit table is merged into the pre-commit file
//!
//! Empty models leave the staged tree untouched.

use log::debug;

use super::ProjectState;
use crate::config::ProjectConfiguration;
use crate::error::Result;

/// Execute Phase 5
pub fn execute(state: &mut ProjectState, configuration: &ProjectConfiguration) -> Result<()> {
    let indentation = configuration.indentation;

    let manifest_path = configuration.manifest_path()?;
    let manifest_path = manifest_path.as_str();
    let existing = state.fs.read_string(manifest_path)?;
    if let Some(content) = state
        .manifest
        .render(existing.as_deref(), manifest_path, indentation)?
    {
        debug!("Writing manifest {}", manifest_path);
        state.fs.write_string(manifest_path, &content)?;
    }

    let ignore_path = configuration.ignore_path()?;
    let ignore_path = ignore_path.as_str();
    let existing = state.fs.read_string(ignore_path)?;
    if let Some(content) = state.ignore.render(existing.as_deref()) {
        debug!("Writing {} ignore block(s) to {}", state.ignore.blocks(), ignore_path);
        state.fs.write_string(ignore_path, &content)?;
    }

    let pre_commit_path = configuration.pre_commit_path()?;
    let pre_commit_path = pre_commit_path.as_str();
    let existing = state.fs.read_string(pre_commit_path)?;
    if let Some(content) = state
        .pre_commit
        .render(existing.as_deref(), pre_commit_path, indentation)?
    {
        debug!("Writing pre-commit actions to {}", pre_commit_path);
        state.fs.write_string(pre_commit_path, &content)?;
    }

    Ok(())
}
