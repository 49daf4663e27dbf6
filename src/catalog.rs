//! # Version Catalog
//!
//! Modules never hard-code dependency versions. They name an ecosystem tag
//! (for example `angular` or `common`) and the engine asks a
//! [`VersionCatalog`] for the version of that package under that tag.
//!
//! [`StaticCatalog`] is the bundled implementation. Catalog files reuse the
//! native manifest layout, so a catalog entry is simply a `package.json` whose
//! `dependencies` and `devDependencies` list the pinned versions:
//!
//! ```text
//! catalog/
//!   common.json             -> tag "common"
//!   angular/package.json    -> tag "angular"
//! ```

use std::collections::HashMap;
use std::path::Path;

use indexmap::IndexMap;
use log::debug;

use crate::error::{Error, Result};

/// Resolves the version of a package within an ecosystem tag
pub trait VersionCatalog {
    /// Fails with [`Error::UnknownPackage`] when there is no entry.
    fn resolve(&self, ecosystem: &str, package: &str) -> Result<String>;
}

/// In-memory catalog keyed by ecosystem tag then package name
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    entries: HashMap<String, IndexMap<String, String>>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion
    pub fn with_version(mut self, ecosystem: &str, package: &str, version: &str) -> Self {
        self.insert(ecosystem, package, version);
        self
    }

    pub fn insert(&mut self, ecosystem: &str, package: &str, version: &str) {
        self.entries
            .entry(ecosystem.to_string())
            .or_default()
            .insert(package.to_string(), version.to_string());
    }

    /// Register every dependency of a `package.json` document under `ecosystem`
    pub fn load_package_json(&mut self, ecosystem: &str, content: &str) -> Result<()> {
        let document: serde_json::Value =
            serde_json::from_str(content).map_err(|err| Error::ConfigParse {
                message: format!("catalog '{}' is not valid JSON: {}", ecosystem, err),
                hint: None,
            })?;

        for table in ["dependencies", "devDependencies"] {
            let Some(entries) = document.get(table) else {
                continue;
            };
            let entries = entries.as_object().ok_or_else(|| Error::ConfigParse {
                message: format!("catalog '{}': '{}' must be an object", ecosystem, table),
                hint: None,
            })?;
            for (package, version) in entries {
                let version = version.as_str().ok_or_else(|| Error::ConfigParse {
                    message: format!(
                        "catalog '{}': version of '{}' must be a string",
                        ecosystem, package
                    ),
                    hint: None,
                })?;
                self.insert(ecosystem, package, version);
            }
        }
        Ok(())
    }

    /// Load every catalog file of a directory
    ///
    /// `<tag>.json` and `<tag>/package.json` are both accepted. Entries are
    /// read in file-name order so a tag defined twice resolves predictably.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut catalog = Self::new();
        let mut entries = std::fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();

            let (tag, file) = if path.is_dir() {
                let manifest = path.join("package.json");
                if !manifest.is_file() {
                    continue;
                }
                (name, manifest)
            } else if let Some(tag) = name.strip_suffix(".json") {
                (tag.to_string(), path)
            } else {
                continue;
            };

            debug!("Loading version catalog '{}' from {}", tag, file.display());
            let content = std::fs::read_to_string(&file)?;
            catalog.load_package_json(&tag, &content)?;
        }

        Ok(catalog)
    }

    /// Ecosystem tags known to this catalog, sorted
    pub fn ecosystems(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    /// Total number of package entries
    pub fn len(&self) -> usize {
        self.entries.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl VersionCatalog for StaticCatalog {
    fn resolve(&self, ecosystem: &str, package: &str) -> Result<String> {
        self.entries
            .get(ecosystem)
            .and_then(|packages| packages.get(package))
            .cloned()
            .ok_or_else(|| Error::UnknownPackage {
                ecosystem: ecosystem.to_string(),
                package: package.to_string(),
            })
    }
}
