//! Source locators and the stores that resolve them
//!
//! A module never embeds file bodies directly; it points at them with a
//! [`SourceLocator`]. Locators are resolved by a [`ResourceStore`] when the
//! files of a module are planned, which keeps modules cheap to build and lets
//! tests swap the on-disk resource folder for an in-memory one.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::filesystem::MemoryFS;
use crate::path::{join, normalize_relative};

/// Suffix appended to template resources
pub const TEMPLATE_SUFFIX: &str = ".jinja";

/// Opaque reference to raw bytes or a template body
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocator(String);

impl SourceLocator {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a file's bytes are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Copied unchanged
    Static,
    /// Rendered with the project context
    Template,
}

/// A locator together with how its content is used
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub locator: SourceLocator,
    pub kind: FileKind,
}

/// A resource folder that module files are taken from
///
/// ```
/// use seedwright::resources::{FileKind, Source};
///
/// let source = Source::from("client/angular/core");
/// let tsconfig = source.file("tsconfig.json");
/// assert_eq!(tsconfig.locator.as_str(), "client/angular/core/tsconfig.json");
/// assert_eq!(tsconfig.kind, FileKind::Static);
/// assert_eq!(source.template("angular.json").locator.as_str(), "client/angular/core/angular.json.jinja");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    folder: String,
}

impl Source {
    pub fn from(folder: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    /// Sub-folder of this source
    pub fn append(&self, folder: &str) -> Source {
        Source::from(join(&self.folder, folder))
    }

    /// A file copied verbatim
    pub fn file(&self, name: &str) -> SourceFile {
        SourceFile {
            locator: SourceLocator::new(join(&self.folder, name)),
            kind: FileKind::Static,
        }
    }

    /// A template rendered with the project context
    pub fn template(&self, name: &str) -> SourceFile {
        SourceFile {
            locator: SourceLocator::new(format!("{}{}", join(&self.folder, name), TEMPLATE_SUFFIX)),
            kind: FileKind::Template,
        }
    }
}

/// Loads the bytes behind a locator
pub trait ResourceStore {
    fn load(&self, locator: &SourceLocator) -> Result<Vec<u8>>;
}

/// Resources read from a folder on disk
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceStore for DirectoryStore {
    fn load(&self, locator: &SourceLocator) -> Result<Vec<u8>> {
        let relative = normalize_relative(locator.as_str())?;
        let full_path = self.root.join(relative);
        std::fs::read(&full_path).map_err(|err| Error::Resource {
            locator: locator.to_string(),
            message: format!("cannot read '{}': {}", full_path.display(), err),
        })
    }
}

/// Resources held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    files: MemoryFS,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion of a text resource
    pub fn with_text(mut self, locator: &str, content: &str) -> Self {
        self.insert(locator, content.as_bytes().to_vec());
        self
    }

    pub fn insert(&mut self, locator: &str, content: Vec<u8>) {
        // MemoryFS insertion cannot fail
        let _ = self.files.add_file_content(locator, content);
    }
}

impl ResourceStore for MemoryStore {
    fn load(&self, locator: &SourceLocator) -> Result<Vec<u8>> {
        self.files
            .get_file(locator.as_str())
            .map(|file| file.content.clone())
            .ok_or_else(|| Error::Resource {
                locator: locator.to_string(),
                message: "no such resource".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_source_append_and_locators() {
        let source = Source::from("client/angular/core");
        let app = source.append("src/main/webapp/app");
        let template = app.template("app.ts");
        assert_eq!(
            template.locator.as_str(),
            "client/angular/core/src/main/webapp/app/app.ts.jinja"
        );
        assert_eq!(template.kind, FileKind::Template);
        assert_eq!(Source::from(".").file("a.txt").locator.as_str(), "a.txt");
    }

    #[test]
    fn test_directory_store_loads_files() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("core")).unwrap();
        std::fs::write(temp.path().join("core/tsconfig.json"), "{}").unwrap();

        let store = DirectoryStore::new(temp.path());
        let bytes = store.load(&SourceLocator::new("core/tsconfig.json")).unwrap();
        assert_eq!(bytes, b"{}");
    }

    #[test]
    fn test_directory_store_missing_file_is_resource_error() {
        let temp = TempDir::new().unwrap();
        let store = DirectoryStore::new(temp.path());
        let err = store.load(&SourceLocator::new("nope.txt")).unwrap_err();
        assert!(matches!(err, Error::Resource { .. }));
    }

    #[test]
    fn test_directory_store_rejects_traversal() {
        let temp = TempDir::new().unwrap();
        let store = DirectoryStore::new(temp.path());
        let err = store.load(&SourceLocator::new("../secret")).unwrap_err();
        assert!(matches!(err, Error::PathTraversal { .. }));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new().with_text("core/a.txt", "hello");
        assert_eq!(store.load(&SourceLocator::new("core/a.txt")).unwrap(), b"hello");
        assert!(store.load(&SourceLocator::new("core/b.txt")).is_err());
    }
}
