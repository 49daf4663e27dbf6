//! In-memory filesystem used to stage a project tree before it is committed

use crate::error::{Error, Result};
use glob::Pattern;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default permissions for generated files
pub const DEFAULT_PERMISSIONS: u32 = 0o644;

/// Permissions for files declared executable
pub const EXECUTABLE_PERMISSIONS: u32 = 0o755;

/// Represents a file with content and metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    /// File content as bytes
    pub content: Vec<u8>,
    /// File permissions (simplified as u32)
    pub permissions: u32,
}

impl File {
    /// Create a new file with content
    pub fn new(content: Vec<u8>) -> Self {
        Self {
            content,
            permissions: DEFAULT_PERMISSIONS,
        }
    }

    /// Create a new file from string content
    pub fn from_string(content: &str) -> Self {
        Self::new(content.as_bytes().to_vec())
    }

    /// Mark the file as executable
    pub fn executable(mut self) -> Self {
        self.permissions = EXECUTABLE_PERMISSIONS;
        self
    }

    /// Get file size in bytes
    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// In-memory filesystem for staged project content
///
/// Paths are kept sorted so iteration, listing and the final write are
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct MemoryFS {
    /// Files stored as path -> content mapping
    files: BTreeMap<PathBuf, File>,
}

impl MemoryFS {
    /// Create a new empty filesystem
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or update a file
    pub fn add_file<P: AsRef<Path>>(&mut self, path: P, file: File) -> Result<()> {
        let path = path.as_ref().to_path_buf();
        self.files.insert(path, file);
        Ok(())
    }

    /// Add a file with content
    pub fn add_file_content<P: AsRef<Path>>(&mut self, path: P, content: Vec<u8>) -> Result<()> {
        self.add_file(path, File::new(content))
    }

    /// Add a file with string content
    pub fn add_file_string<P: AsRef<Path>>(&mut self, path: P, content: &str) -> Result<()> {
        self.add_file(path, File::from_string(content))
    }

    /// Replace the content of a file, keeping its permissions
    ///
    /// Creates the file with default permissions when it does not exist yet.
    pub fn write_string<P: AsRef<Path>>(&mut self, path: P, content: &str) -> Result<()> {
        let path = path.as_ref();
        match self.files.get_mut(path) {
            Some(file) => {
                file.content = content.as_bytes().to_vec();
                Ok(())
            }
            None => self.add_file_string(path, content),
        }
    }

    /// Get a file by path
    pub fn get_file<P: AsRef<Path>>(&self, path: P) -> Option<&File> {
        self.files.get(path.as_ref())
    }

    /// Read a file as UTF-8 text
    pub fn read_string<P: AsRef<Path>>(&self, path: P) -> Result<Option<String>> {
        let path = path.as_ref();
        match self.files.get(path) {
            Some(file) => String::from_utf8(file.content.clone())
                .map(Some)
                .map_err(|_| Error::Filesystem {
                    message: format!("File '{}' is not valid UTF-8", path.display()),
                }),
            None => Ok(None),
        }
    }

    /// Check if a file exists
    pub fn exists<P: AsRef<Path>>(&self, path: P) -> bool {
        self.files.contains_key(path.as_ref())
    }

    /// List all files
    pub fn list_files(&self) -> Vec<PathBuf> {
        self.files.keys().cloned().collect()
    }

    /// List files matching a glob pattern
    pub fn list_files_glob(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let pattern = Pattern::new(pattern).map_err(Error::Glob)?;
        let mut matches = Vec::new();

        for path in self.files.keys() {
            if let Some(path_str) = path.to_str() {
                if pattern.matches(path_str) {
                    matches.push(path.clone());
                }
            }
        }

        Ok(matches)
    }

    /// Get the number of files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if filesystem is empty
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterate over all files as (path, file) pairs
    pub fn files(&self) -> impl Iterator<Item = (&PathBuf, &File)> {
        self.files.iter()
    }
}
