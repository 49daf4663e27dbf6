//! Phase 1: Manifest Merge
//!
//! Merges the module's manifest edits and pre-commit actions into the project
//! state. The first conflict stops the run.

use log::debug;

use super::ProjectState;
use crate::catalog::VersionCatalog;
use crate::error::Result;
use crate::module::Module;

/// Execute Phase 1 for one module
pub fn execute(state: &mut ProjectState, module: &Module, catalog: &dyn VersionCatalog) -> Result<()> {
    debug!(
        "Merging {} manifest edit(s) and {} pre-commit action(s) from '{}'",
        module.manifest_edits().len(),
        module.pre_commit_actions().len(),
        module.slug()
    );
    state.manifest.merge(module.manifest_edits(), catalog)?;
    state.pre_commit.merge(module.pre_commit_actions())?;
    Ok(())
}
