//! Phase 2: Ignore Merge

use super::ProjectState;
use crate::module::Module;

/// Append the module's ignore blocks to the aggregated document
pub fn execute(state: &mut ProjectState, module: &Module) {
    state.ignore.merge(module.ignore_blocks());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{IgnoreBlockBuilder, ModuleBuilder};

    #[test]
    fn test_blocks_follow_module_order() {
        let angular = ModuleBuilder::new("angular")
            .ignore(IgnoreBlockBuilder::comment("Angular").pattern("dist/"))
            .build()
            .unwrap();
        let vite = ModuleBuilder::new("vite")
            .ignore(IgnoreBlockBuilder::comment("Vite").pattern("dist/"))
            .build()
            .unwrap();

        let mut state = ProjectState::new();
        execute(&mut state, &angular);
        execute(&mut state, &vite);

        assert_eq!(state.ignore.document(), "# Angular\ndist/\n\n# Vite\ndist/\n\n");
    }
}
