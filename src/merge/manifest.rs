//! # Manifest Model
//!
//! The in-memory view of the generated project's dependency manifest: runtime
//! dependencies, dev dependencies and scripts. Each table is keyed by name and
//! keeps insertion order, so the serialized manifest lists entries in the order
//! they were first declared across modules.
//!
//! Merging is idempotent for identical declarations. A name (or script key)
//! declared again with a different resolved value is a conflict and fails with
//! [`Error::DuplicateDependency`] or [`Error::DuplicateScript`].

use indexmap::IndexMap;
use log::debug;
use serde_json::Value as JsonValue;

use crate::catalog::VersionCatalog;
use crate::config::Indentation;
use crate::error::{DependencyKind, Error, Result};
use crate::module::{DependencyEdit, ManifestEdit};

use super::{object_entry, parse_json_object, to_json_string};

/// Merged dependencies, dev dependencies and scripts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestModel {
    dependencies: IndexMap<String, String>,
    dev_dependencies: IndexMap<String, String>,
    scripts: IndexMap<String, String>,
}

impl ManifestModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge edits in order, failing on the first conflict
    pub fn merge(&mut self, edits: &[ManifestEdit], catalog: &dyn VersionCatalog) -> Result<()> {
        for edit in edits {
            match edit {
                ManifestEdit::AddDependency(dependency) => {
                    self.add_dependency(DependencyKind::Runtime, dependency, catalog)?
                }
                ManifestEdit::AddDevDependency(dependency) => {
                    self.add_dependency(DependencyKind::Dev, dependency, catalog)?
                }
                ManifestEdit::AddScript { key, command } => self.add_script(key, command)?,
            }
        }
        Ok(())
    }

    fn add_dependency(
        &mut self,
        kind: DependencyKind,
        dependency: &DependencyEdit,
        catalog: &dyn VersionCatalog,
    ) -> Result<()> {
        let version = catalog.resolve(&dependency.ecosystem, dependency.version_package())?;
        let table = match kind {
            DependencyKind::Runtime => &mut self.dependencies,
            DependencyKind::Dev => &mut self.dev_dependencies,
        };

        match table.get(&dependency.name) {
            Some(existing) if *existing == version => Ok(()),
            Some(existing) => Err(Error::DuplicateDependency {
                kind,
                name: dependency.name.clone(),
                existing: existing.clone(),
                requested: version,
            }),
            None => {
                debug!("Adding {} {}@{}", kind, dependency.name, version);
                table.insert(dependency.name.clone(), version);
                Ok(())
            }
        }
    }

    fn add_script(&mut self, key: &str, command: &str) -> Result<()> {
        match self.scripts.get(key) {
            Some(existing) if existing == command => Ok(()),
            Some(existing) => Err(Error::DuplicateScript {
                key: key.to_string(),
                existing: existing.clone(),
                requested: command.to_string(),
            }),
            None => {
                debug!("Adding script {} = {}", key, command);
                self.scripts.insert(key.to_string(), command.to_string());
                Ok(())
            }
        }
    }

    pub fn dependencies(&self) -> &IndexMap<String, String> {
        &self.dependencies
    }

    pub fn dev_dependencies(&self) -> &IndexMap<String, String> {
        &self.dev_dependencies
    }

    pub fn scripts(&self) -> &IndexMap<String, String> {
        &self.scripts
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty() && self.dev_dependencies.is_empty() && self.scripts.is_empty()
    }

    /// Serialize into the native manifest structure
    ///
    /// Entries are merged into `existing` when given. Tables already present
    /// keep their position; missing ones are appended. An entry `existing`
    /// already holds with another value is a conflict, the same value a no-op. Returns `None` when the
    /// model is empty, leaving any existing file as it is.
    pub fn render(
        &self,
        existing: Option<&str>,
        path: &str,
        indentation: Indentation,
    ) -> Result<Option<String>> {
        if self.is_empty() {
            return Ok(None);
        }

        let mut document = parse_json_object(existing, path)?;
        for (key, kind, table) in [
            ("scripts", None, &self.scripts),
            ("dependencies", Some(DependencyKind::Runtime), &self.dependencies),
            ("devDependencies", Some(DependencyKind::Dev), &self.dev_dependencies),
        ] {
            if table.is_empty() {
                continue;
            }
            let section = object_entry(&mut document, key, path)?;
            for (name, value) in table {
                match section.get(name) {
                    Some(JsonValue::String(current)) if current == value => {}
                    Some(current) => {
                        let current = current
                            .as_str()
                            .map_or_else(|| current.to_string(), str::to_string);
                        return Err(match kind {
                            Some(kind) => Error::DuplicateDependency {
                                kind,
                                name: name.clone(),
                                existing: current,
                                requested: value.clone(),
                            },
                            None => Error::DuplicateScript {
                                key: name.clone(),
                                existing: current,
                                requested: value.clone(),
                            },
                        });
                    }
                    None => {
                        section.insert(name.clone(), JsonValue::String(value.clone()));
                    }
                }
            }
        }

        to_json_string(&JsonValue::Object(document), indentation).map(Some)
    }
}
