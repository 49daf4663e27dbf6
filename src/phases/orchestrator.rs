//! Orchestrator for a complete composition run
//!
//! This module coordinates all phases behind two entry points:
//! [`CompositionEngine::plan`] builds the final [`ProjectState`] without
//! touching the disk, and [`CompositionEngine::compose`] plans, commits the
//! tree and then runs the queued post actions.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::info;

use super::{finalize, ignore, manifest, materialize, patch, write, ProjectState};
use crate::actions::ActionContext;
use crate::catalog::VersionCatalog;
use crate::config::ProjectConfiguration;
use crate::error::{Error, Result};
use crate::module::Module;
use crate::render::{RenderContext, Renderer};
use crate::resources::ResourceStore;

/// What a composition run produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompositionReport {
    /// Number of modules applied
    pub modules: usize,
    /// Files written, relative to the project root
    pub files: Vec<PathBuf>,
    /// Optional anchor edits that were skipped
    pub skipped_edits: usize,
    /// Post actions that ran
    pub post_actions: usize,
}

/// Applies ordered modules to a project
///
/// Collaborators are injected so runs are deterministic and can use fixture
/// catalogs and in-memory resources.
pub struct CompositionEngine<'a> {
    catalog: &'a dyn VersionCatalog,
    resources: &'a dyn ResourceStore,
    renderer: &'a dyn Renderer,
    run_post_actions: bool,
}

impl<'a> CompositionEngine<'a> {
    pub fn new(
        catalog: &'a dyn VersionCatalog,
        resources: &'a dyn ResourceStore,
        renderer: &'a dyn Renderer,
    ) -> Self {
        Self {
            catalog,
            resources,
            renderer,
            run_post_actions: true,
        }
    }

    /// Commit the tree but leave queued post actions unrun
    pub fn skip_post_actions(mut self) -> Self {
        self.run_post_actions = false;
        self
    }

    /// Run phases 1-5 for every module, in order, without writing anything
    pub fn plan(&self, modules: &[Module], configuration: &ProjectConfiguration) -> Result<ProjectState> {
        configuration.validate()?;
        reject_repeated_modules(modules)?;

        let context = configuration.render_context();
        let mut state = ProjectState::new();
        for module in modules {
            let slug = module.slug().as_str();
            info!("Applying module '{}'", slug);
            self.apply_module(&mut state, module, &context)
                .map_err(|err| err.in_module(slug))?;
        }

        // Phase 5: Finalize
        finalize::execute(&mut state, configuration)?;
        Ok(state)
    }

    fn apply_module(&self, state: &mut ProjectState, module: &Module, context: &RenderContext) -> Result<()> {
        // Phase 1: Manifest Merge
        manifest::execute(state, module, self.catalog)?;

        // Phase 2: Ignore Merge
        ignore::execute(state, module);

        // Phase 3: File Materialization
        let staged = materialize::execute(state, module, self.resources, self.renderer, context)?;

        // Phase 4: Anchor Patching
        let patched = patch::execute(state, module, self.renderer, context)?;

        for action in module.post_actions() {
            state.actions.enqueue(module.slug().as_str(), action.clone());
        }

        info!(
            "Module '{}': {} file(s), {} edit(s) applied, {} skipped, {} post action(s) queued",
            module.slug(),
            staged,
            patched.applied,
            patched.skipped,
            module.post_actions().len()
        );
        Ok(())
    }

    /// Compose `modules` into `project_root`
    ///
    /// Any planning failure leaves the disk untouched. Post actions run after
    /// the commit; a failing action is returned as an error but the committed
    /// tree stays in place.
    pub fn compose(
        &self,
        modules: &[Module],
        project_root: &Path,
        configuration: &ProjectConfiguration,
    ) -> Result<CompositionReport> {
        let state = self.plan(modules, configuration)?;

        // Phase 6: Write to Disk
        let files = write::execute(&state.fs, project_root)?;
        info!("Wrote {} file(s) to {}", files.len(), project_root.display());

        let post_actions = if self.run_post_actions {
            let context = ActionContext {
                project_root,
                configuration,
            };
            state.actions.run_all(&context)?
        } else {
            0
        };

        Ok(CompositionReport {
            modules: modules.len(),
            files,
            skipped_edits: state.skipped_edits.len(),
            post_actions,
        })
    }
}

fn reject_repeated_modules(modules: &[Module]) -> Result<()> {
    let mut seen = HashSet::new();
    for module in modules {
        if !seen.insert(module.slug().as_str()) {
            return Err(Error::InvalidModule {
                module: module.slug().to_string(),
                message: "module is listed more than once".to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::PostAction;
    use crate::catalog::StaticCatalog;
    use crate::module::{Anchor, IgnoreBlockBuilder, ModuleBuilder, Replacement};
    use crate::render::TemplateEngine;
    use crate::resources::{MemoryStore, Source};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn catalog() -> StaticCatalog {
        StaticCatalog::new()
            .with_version("common", "typescript", "5.8.3")
            .with_version("vue", "vue", "3.5.17")
    }

    fn resources() -> MemoryStore {
        MemoryStore::new()
            .with_text(
                "core/package.json.jinja",
                "{\n  \"name\": \"{{ projectName }}\",\n  \"engines\": {\n    \"node\": \">=22\"\n  }\n}\n",
            )
            .with_text("vue/main.ts", "createApp(App).mount('#app');\n")
    }

    fn core() -> Module {
        ModuleBuilder::new("core")
            .add(Source::from("core").template("package.json"), "package.json")
            .dev_dependency("typescript", "common")
            .ignore(IgnoreBlockBuilder::comment("Node").pattern("node_modules/"))
            .build()
            .unwrap()
    }

    fn vue() -> Module {
        ModuleBuilder::new("vue")
            .dependency("vue", "vue")
            .script("dev", "vite")
            .add(Source::from("vue").file("main.ts"), "src/main.ts")
            .mandatory_replacement(
                "package.json",
                Replacement::new(Anchor::line_before("\"engines\":"), "  \"type\": \"module\","),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_plan_runs_every_phase() {
        let (catalog, resources, renderer) = (catalog(), resources(), TemplateEngine::new());
        let engine = CompositionEngine::new(&catalog, &resources, &renderer);
        let state = engine
            .plan(&[core(), vue()], &ProjectConfiguration::new("shop"))
            .unwrap();

        let manifest = state.fs.read_string("package.json").unwrap().unwrap();
        assert_eq!(
            manifest,
            r#"{
  "name": "shop",
  "type": "module",
  "engines": {
    "node": ">=22"
  },
  "scripts": {
    "dev": "vite"
  },
  "dependencies": {
    "vue": "3.5.17"
  },
  "devDependencies": {
    "typescript": "5.8.3"
  }
}
"#
        );
        assert_eq!(state.fs.read_string(".gitignore").unwrap().unwrap(), "# Node\nnode_modules/\n\n");
        assert_eq!(state.origin("src/main.ts"), Some("vue"));
    }

    #[test]
    fn test_errors_carry_module_slug() {
        let (catalog, resources, renderer) = (catalog(), resources(), TemplateEngine::new());
        let engine = CompositionEngine::new(&catalog, &resources, &renderer);
        let err = engine
            .plan(&[vue(), core()], &ProjectConfiguration::new("shop"))
            .unwrap_err();
        assert_eq!(err.module(), Some("vue"));
        assert!(matches!(err.root(), Error::TargetMissing { .. }));
    }

    #[test]
    fn test_repeated_module_is_rejected() {
        let (catalog, resources, renderer) = (catalog(), resources(), TemplateEngine::new());
        let engine = CompositionEngine::new(&catalog, &resources, &renderer);
        let err = engine
            .plan(&[core(), core()], &ProjectConfiguration::new("shop"))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidModule { .. }));
    }

    #[test]
    fn test_compose_commits_then_runs_post_actions() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("shop");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);
        let module = ModuleBuilder::new("check")
            .post_action(PostAction::new("check-manifest", move |context| {
                recorder
                    .lock()
                    .unwrap()
                    .push(context.project_root.join("package.json").exists());
                Ok(())
            }))
            .build()
            .unwrap();

        let (catalog, resources, renderer) = (catalog(), resources(), TemplateEngine::new());
        let engine = CompositionEngine::new(&catalog, &resources, &renderer);
        let report = engine
            .compose(&[core(), module], &root, &ProjectConfiguration::new("shop"))
            .unwrap();

        assert_eq!(report.modules, 2);
        assert_eq!(report.post_actions, 1);
        assert_eq!(*seen.lock().unwrap(), vec![true]);
        assert!(report.files.contains(&PathBuf::from(".gitignore")));
    }

    #[test]
    fn test_skip_post_actions() {
        let temp = TempDir::new().unwrap();
        let module = ModuleBuilder::new("fail")
            .post_action(PostAction::new("boom", |_| {
                Err(Error::Filesystem {
                    message: "should not run".to_string(),
                })
            }))
            .build()
            .unwrap();

        let (catalog, resources, renderer) = (catalog(), resources(), TemplateEngine::new());
        let engine = CompositionEngine::new(&catalog, &resources, &renderer).skip_post_actions();
        let report = engine
            .compose(&[module], &temp.path().join("out"), &ProjectConfiguration::new("shop"))
            .unwrap();
        assert_eq!(report.post_actions, 0);
    }
}
