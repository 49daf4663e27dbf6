//! Phase 4: Anchor Patching
//!
//! Applies a module's anchor edits, in declaration order, to the staged
//! content. Each needle is matched against the current content, so an edit
//! may target text inserted by an earlier edit or module.
//!
//! Mandatory edits fail on a missing target or anchor. Optional edits are
//! skipped with a warning in those two cases; an ambiguous anchor is always
//! an error.

use log::{debug, warn};

use super::{ProjectState, SkippedEdit};
use crate::error::{Error, Result};
use crate::merge::insert_at_anchor;
use crate::module::{AnchorEdit, Module};
use crate::render::{RenderContext, Renderer};

/// Outcome of patching one module
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchSummary {
    pub applied: usize,
    pub skipped: usize,
}

/// Execute Phase 4 for one module
pub fn execute(
    state: &mut ProjectState,
    module: &Module,
    renderer: &dyn Renderer,
    context: &RenderContext,
) -> Result<PatchSummary> {
    let mut summary = PatchSummary::default();
    for edit in module.anchor_edits() {
        match apply_edit(state, edit, renderer, context) {
            Ok(()) => summary.applied += 1,
            Err(err) if !edit.mandatory && is_skippable(&err) => {
                warn!(
                    "Skipping optional edit of '{}' from module '{}': {}",
                    edit.target,
                    module.slug(),
                    err
                );
                state.skipped_edits.push(SkippedEdit {
                    module: module.slug().to_string(),
                    target: edit.target.clone(),
                    reason: err.to_string(),
                });
                summary.skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }
    Ok(summary)
}

fn is_skippable(err: &Error) -> bool {
    matches!(err, Error::TargetMissing { .. } | Error::AnchorNotFound { .. })
}

fn apply_edit(
    state: &mut ProjectState,
    edit: &AnchorEdit,
    renderer: &dyn Renderer,
    context: &RenderContext,
) -> Result<()> {
    let content = state
        .fs
        .read_string(&edit.target)?
        .ok_or_else(|| Error::TargetMissing {
            path: edit.target.clone(),
        })?;

    let payload = if edit.render {
        let name = format!("{} (payload)", edit.target);
        renderer.render(&name, &edit.payload, context)?
    } else {
        edit.payload.clone()
    };

    let patched = insert_at_anchor(&content, &edit.anchor, &payload, &edit.target)?;
    debug!("Patched {} at {:?}", edit.target, edit.anchor.needle());
    state.fs.write_string(&edit.target, &patched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectConfiguration;
    use crate::module::{Anchor, ModuleBuilder, Replacement};
    use crate::render::TemplateEngine;

    fn state_with(path: &str, content: &str) -> ProjectState {
        let mut state = ProjectState::new();
        state.fs.add_file_string(path, content).unwrap();
        state
    }

    fn apply(state: &mut ProjectState, module: &Module) -> Result<PatchSummary> {
        let context = ProjectConfiguration::new("shop").render_context();
        execute(state, module, &TemplateEngine::new(), &context)
    }

    #[test]
    fn test_edits_apply_in_declaration_order() {
        let module = ModuleBuilder::new("vite")
            .mandatory_replacement("vite.config.ts", Replacement::new(Anchor::line_after("plugins: ["), "    // plugins"))
            .mandatory_replacement("vite.config.ts", Replacement::new(Anchor::line_after("// plugins"), "    vue(),"))
            .build()
            .unwrap();

        let mut state = state_with("vite.config.ts", "export default {\n  plugins: [\n  ],\n}\n");
        let summary = apply(&mut state, &module).unwrap();

        assert_eq!(summary, PatchSummary { applied: 2, skipped: 0 });
        assert_eq!(
            state.fs.read_string("vite.config.ts").unwrap().unwrap(),
            "export default {\n  plugins: [\n    // plugins\n    vue(),\n  ],\n}\n"
        );
    }

    #[test]
    fn test_rendered_payload() {
        let module = ModuleBuilder::new("angular")
            .mandatory_replacement(
                "angular.json",
                Replacement::new(Anchor::line_after("\"options\": {"), "  \"outputPath\": \"{{projectBuildDirectory}}/dist\",")
                    .rendered(),
            )
            .build()
            .unwrap();
        let mut state = state_with("angular.json", "{\n\"options\": {\n}\n}\n");
        apply(&mut state, &module).unwrap();
        assert!(state
            .fs
            .read_string("angular.json")
            .unwrap()
            .unwrap()
            .contains("\"outputPath\": \"target/dist\","));
    }

    #[test]
    fn test_mandatory_missing_target() {
        let module = ModuleBuilder::new("jest")
            .mandatory_replacement("package.json", Replacement::new(Anchor::line_before("}"), "x"))
            .build()
            .unwrap();
        let err = apply(&mut ProjectState::new(), &module).unwrap_err();
        assert!(matches!(err, Error::TargetMissing { ref path } if path == "package.json"));
    }

    #[test]
    fn test_mandatory_missing_anchor() {
        let module = ModuleBuilder::new("jest")
            .mandatory_replacement("a.txt", Replacement::new(Anchor::line_before("zzz"), "x"))
            .build()
            .unwrap();
        let err = apply(&mut state_with("a.txt", "a\n"), &module).unwrap_err();
        assert!(matches!(err, Error::AnchorNotFound { .. }));
    }

    #[test]
    fn test_optional_edits_are_skipped_with_warning() {
        testing_logger::setup();
        let module = ModuleBuilder::new("jest")
            .optional_replacement("missing.json", Replacement::new(Anchor::line_before("}"), "x"))
            .optional_replacement("a.txt", Replacement::new(Anchor::line_before("zzz"), "x"))
            .optional_replacement("a.txt", Replacement::new(Anchor::line_after("a"), "b"))
            .build()
            .unwrap();

        let mut state = state_with("a.txt", "a\n");
        let summary = apply(&mut state, &module).unwrap();

        assert_eq!(summary, PatchSummary { applied: 1, skipped: 2 });
        assert_eq!(state.fs.read_string("a.txt").unwrap().unwrap(), "a\nb\n");
        assert_eq!(state.skipped_edits.len(), 2);
        assert_eq!(state.skipped_edits[0].target, "missing.json");

        testing_logger::validate(|captured| {
            let warnings: Vec<_> = captured
                .iter()
                .filter(|entry| entry.level == log::Level::Warn)
                .collect();
            assert_eq!(warnings.len(), 2);
            assert!(warnings[0].body.contains("Skipping optional edit of 'missing.json'"));
        });
    }

    #[test]
    fn test_optional_ambiguous_anchor_still_fails() {
        let module = ModuleBuilder::new("jest")
            .optional_replacement("a.txt", Replacement::new(Anchor::line_after("a"), "x"))
            .build()
            .unwrap();
        let err = apply(&mut state_with("a.txt", "a\na\n"), &module).unwrap_err();
        assert!(matches!(err, Error::AmbiguousAnchor { .. }));
    }
}
