//! # CLI Command Implementations
//!
//! Each subcommand of the `seedwright` tool lives in its own file with an
//! `Args` struct derived with `clap` and an `execute` function.
//!
//! The commands that compose modules share [`InputArgs`]: the project
//! configuration, the ordered module definitions, the version catalog and the
//! resource root. Loading them, and turning library errors into hinted
//! messages, happens here.

pub mod apply;
pub mod completions;
pub mod plan;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use log::{debug, info};

use seedwright::catalog::StaticCatalog;
use seedwright::config::{self, ProjectConfiguration};
use seedwright::defaults::{default_catalog_dir, DEFAULT_CONFIG_FILE};
use seedwright::error::Error;
use seedwright::module::{Module, ModuleDefinition, ModuleFactory};
use seedwright::resources::DirectoryStore;
use seedwright::suggestions;

/// Inputs shared by commands that compose modules
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Path to the project configuration file
    #[arg(short, long, value_name = "FILE", env = "SEEDWRIGHT_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Module definition file; repeat in application order, core module first
    #[arg(short = 'm', long = "module", value_name = "FILE")]
    pub modules: Vec<PathBuf>,

    /// Version catalog directory
    ///
    /// Defaults to the `seedwright/catalog` folder of the platform config
    /// directory when it exists; otherwise the catalog is empty.
    #[arg(long, value_name = "DIR", env = "SEEDWRIGHT_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Root folder module sources are resolved against
    #[arg(long, value_name = "DIR", env = "SEEDWRIGHT_RESOURCES", default_value = ".")]
    pub resources: PathBuf,
}

/// Everything a composition needs, loaded from disk
pub struct Inputs {
    pub configuration: ProjectConfiguration,
    pub definitions: Vec<ModuleDefinition>,
    pub catalog: StaticCatalog,
    pub resources: DirectoryStore,
}

impl InputArgs {
    pub fn load(&self) -> Result<Inputs> {
        let configuration = load_configuration(&self.config)?;
        let definitions = load_definitions(&self.modules)?;
        let catalog = load_catalog(self.catalog.as_deref())?;
        Ok(Inputs {
            configuration,
            definitions,
            catalog,
            resources: DirectoryStore::new(&self.resources),
        })
    }
}

impl Inputs {
    /// Build every module for the loaded configuration, in order
    pub fn build_modules(&self) -> Result<Vec<Module>> {
        self.definitions
            .iter()
            .map(|definition| {
                definition
                    .build_module(&self.configuration)
                    .map_err(|err| explain(err, &self.catalog))
            })
            .collect()
    }
}

fn load_configuration(path: &Path) -> Result<ProjectConfiguration> {
    if !path.exists() {
        return Err(suggestions::config_not_found(path));
    }
    debug!("Loading configuration {}", path.display());
    Ok(config::from_file(path)?)
}

fn load_definitions(paths: &[PathBuf]) -> Result<Vec<ModuleDefinition>> {
    if paths.is_empty() {
        return Err(suggestions::no_modules());
    }
    paths
        .iter()
        .map(|path| {
            if !path.exists() {
                return Err(suggestions::module_not_found(path));
            }
            debug!("Loading module definition {}", path.display());
            Ok(ModuleDefinition::from_file(path)?)
        })
        .collect()
}

fn load_catalog(explicit: Option<&Path>) -> Result<StaticCatalog> {
    let dir = match explicit {
        Some(dir) if !dir.is_dir() => return Err(suggestions::catalog_not_found(dir)),
        Some(dir) => dir.to_path_buf(),
        None => {
            let dir = default_catalog_dir();
            if !dir.is_dir() {
                info!("No version catalog at {}; using an empty catalog", dir.display());
                return Ok(StaticCatalog::new());
            }
            dir
        }
    };
    let catalog = StaticCatalog::load_dir(&dir)?;
    info!(
        "Loaded {} catalog entries from {}",
        catalog.len(),
        dir.display()
    );
    Ok(catalog)
}

/// Turn a library error into a message with hints
pub fn explain(error: Error, catalog: &StaticCatalog) -> anyhow::Error {
    if let Error::UnknownPackage { ecosystem, package } = error.root() {
        let message = suggestions::unknown_package(ecosystem, package, &catalog.ecosystems());
        return match error.module() {
            Some(module) => message.context(format!("Module '{}'", module)),
            None => message,
        };
    }
    match suggestions::composition_hint(&error) {
        Some(hint) => anyhow::anyhow!("{}\n\nhint: {}", error, hint),
        None => error.into(),
    }
}

/// A small on-disk workspace shared by command tests
#[cfg(test)]
pub(crate) fn write_workspace(root: &Path) -> InputArgs {
    let write = |relative: &str, content: &str| {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    };

    write("seedwright.yaml", "project-name: shop\n");
    write("catalog/common.json", r#"{"dependencies": {"lodash": "4.17.21"}}"#);
    write("resources/core/README.md.jinja", "# {{ projectName }}\n");
    write(
        "core.yaml",
        r#"
slug: core
source: core
gitignore:
  - comment: Build output
    patterns: [dist/]
dependencies:
  - name: lodash
    ecosystem: common
scripts:
  build: tsc
files:
  - source: README.md
    template: true
"#,
    );

    InputArgs {
        config: root.join("seedwright.yaml"),
        modules: vec![root.join("core.yaml")],
        catalog: Some(root.join("catalog")),
        resources: root.join("resources"),
    }
}
