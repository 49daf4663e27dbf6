//! Phase 3: File Materialization
//!
//! Plans every file of a module before anything is staged:
//!
//! 1.  **Collisions**: A destination already staged by an earlier module, or
//!     planned earlier by the same module, fails with
//!     [`Error::DuplicateDestination`] unless the later declaration is an
//!     intentional overwrite.
//!
//! 2.  **Content**: Static files are loaded from the resource store unchanged;
//!     templates are loaded and rendered with the project context.
//!
//! 3.  **Stage**: Only when the whole plan succeeded are the files added to
//!     the staged tree, so a failing module leaves no partial output.

use std::collections::HashMap;

use log::debug;

use super::ProjectState;
use crate::error::{Error, Result};
use crate::filesystem::File;
use crate::module::{FileKind, FileSpec, Module};
use crate::render::{RenderContext, Renderer};
use crate::resources::ResourceStore;

/// A file ready to be staged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedFile {
    pub destination: String,
    pub file: File,
}

/// Plan a module's files without touching the state
pub fn plan(
    state: &ProjectState,
    files: &[FileSpec],
    resources: &dyn ResourceStore,
    renderer: &dyn Renderer,
    context: &RenderContext,
) -> Result<Vec<MaterializedFile>> {
    let mut planned: Vec<MaterializedFile> = Vec::with_capacity(files.len());
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for spec in files {
        let destination = spec.destination.as_str();
        let already_planned = positions.get(destination).copied();
        if !spec.overwrite && (already_planned.is_some() || state.fs.exists(destination)) {
            return Err(Error::DuplicateDestination {
                path: destination.to_string(),
            });
        }

        let file = load(spec, resources, renderer, context)?;
        debug!("Planned {} ({:?} from {})", destination, spec.kind, spec.source);

        let materialized = MaterializedFile {
            destination: destination.to_string(),
            file,
        };
        match already_planned {
            Some(index) => planned[index] = materialized,
            None => {
                positions.insert(destination, planned.len());
                planned.push(materialized);
            }
        }
    }

    Ok(planned)
}

fn load(
    spec: &FileSpec,
    resources: &dyn ResourceStore,
    renderer: &dyn Renderer,
    context: &RenderContext,
) -> Result<File> {
    let bytes = resources.load(&spec.source)?;
    let content = match spec.kind {
        FileKind::Static => bytes,
        FileKind::Template => {
            let source = String::from_utf8(bytes).map_err(|_| Error::Template {
                message: "template is not valid UTF-8".to_string(),
                template: Some(spec.source.to_string()),
            })?;
            renderer
                .render(spec.source.as_str(), &source, context)?
                .into_bytes()
        }
    };

    let file = File::new(content);
    Ok(if spec.executable { file.executable() } else { file })
}

/// Execute Phase 3 for one module
///
/// Returns the number of staged files.
pub fn execute(
    state: &mut ProjectState,
    module: &Module,
    resources: &dyn ResourceStore,
    renderer: &dyn Renderer,
    context: &RenderContext,
) -> Result<usize> {
    let planned = plan(state, module.files(), resources, renderer, context)?;
    let count = planned.len();
    for materialized in planned {
        state.fs.add_file(&materialized.destination, materialized.file)?;
        state.record_origin(&materialized.destination, module.slug().as_str());
    }
    Ok(count)
}
