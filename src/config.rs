//! # Project Configuration
//!
//! This module defines [`ProjectConfiguration`], the caller-chosen options a
//! composition run is parameterized with, and the logic for loading it from a
//! `seedwright.yaml` file.
//!
//! Module factories read the configuration to shape their declarations (for
//! example the indentation of an injected snippet, or which package manager a
//! script should invoke). The composition engine reads it to locate the
//! generated manifest, ignore and pre-commit files and to build the template
//! rendering context. It is never mutated during a run.
//!
//! ## Example
//!
//! ```
//! use seedwright::config;
//!
//! let configuration = config::parse("project-name: shop\npackage-manager: pnpm\n").unwrap();
//! assert_eq!(configuration.project_name, "shop");
//! assert_eq!(configuration.package_manager.run_script_command("watch:test"), "pnpm watch:test");
//! ```

use std::fmt;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::render::RenderContext;

/// Indentation style used in generated structured files and injected snippets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Indentation {
    size: usize,
}

impl Indentation {
    /// Indentation of `size` spaces per level
    pub fn new(size: usize) -> Self {
        Self { size }
    }

    /// Number of spaces per level
    pub fn size(&self) -> usize {
        self.size
    }

    /// One indentation level
    pub fn spaces(&self) -> String {
        " ".repeat(self.size)
    }

    /// `levels` indentation levels
    pub fn times(&self, levels: usize) -> String {
        " ".repeat(self.size * levels)
    }
}

impl Default for Indentation {
    fn default() -> Self {
        Self::new(2)
    }
}

/// Package manager chosen for the generated project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    #[default]
    Npm,
    Pnpm,
    Yarn,
    Bun,
}

impl PackageManager {
    /// Executable name
    pub fn program(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Yarn => "yarn",
            PackageManager::Bun => "bun",
        }
    }

    /// Command line that runs a manifest script with this package manager
    pub fn run_script_command(&self, script: &str) -> String {
        match self {
            PackageManager::Npm | PackageManager::Bun => {
                format!("{} run {}", self.program(), script)
            }
            PackageManager::Pnpm | PackageManager::Yarn => format!("{} {}", self.program(), script),
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// Options for one composition run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ProjectConfiguration {
    /// Project name exposed to templates as `projectName`
    pub project_name: String,
    /// Indentation size in spaces
    #[serde(default)]
    pub indentation: Indentation,
    /// Package manager used by scripts and the install post action
    #[serde(default)]
    pub package_manager: PackageManager,
    /// Build output directory exposed to templates as `projectBuildDirectory`
    #[serde(default = "default_build_directory")]
    pub build_directory: String,
    /// Manifest file receiving merged dependencies and scripts
    #[serde(default = "default_manifest_file")]
    pub manifest_file: String,
    /// Ignore file receiving merged ignore blocks
    #[serde(default = "default_ignore_file")]
    pub ignore_file: String,
    /// File receiving merged pre-commit actions
    #[serde(default = "default_pre_commit_file")]
    pub pre_commit_file: String,
    /// Free-form values passed to templates
    #[serde(default)]
    pub parameters: IndexMap<String, serde_json::Value>,
}

fn default_build_directory() -> String {
    "target".to_string()
}

fn default_manifest_file() -> String {
    "package.json".to_string()
}

fn default_ignore_file() -> String {
    ".gitignore".to_string()
}

fn default_pre_commit_file() -> String {
    ".lintstagedrc.json".to_string()
}

impl ProjectConfiguration {
    /// Configuration with defaults for everything but the project name
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            indentation: Indentation::default(),
            package_manager: PackageManager::default(),
            build_directory: default_build_directory(),
            manifest_file: default_manifest_file(),
            ignore_file: default_ignore_file(),
            pre_commit_file: default_pre_commit_file(),
            parameters: IndexMap::new(),
        }
    }

    pub fn with_indentation(mut self, indentation: Indentation) -> Self {
        self.indentation = indentation;
        self
    }

    pub fn with_package_manager(mut self, package_manager: PackageManager) -> Self {
        self.package_manager = package_manager;
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Check values that serde cannot check on its own
    pub fn validate(&self) -> Result<()> {
        if self.project_name.trim().is_empty() {
            return Err(Error::ConfigParse {
                message: "project-name must not be empty".to_string(),
                hint: Some("Set 'project-name:' in the configuration file".to_string()),
            });
        }
        if self.indentation.size() == 0 {
            return Err(Error::ConfigParse {
                message: "indentation must be at least one space".to_string(),
                hint: None,
            });
        }
        self.manifest_path()?;
        self.ignore_path()?;
        self.pre_commit_path()?;
        Ok(())
    }

    /// Normalized key of the manifest file in the staged tree
    pub fn manifest_path(&self) -> Result<String> {
        project_path("manifest-file", &self.manifest_file)
    }

    /// Normalized key of the ignore file in the staged tree
    pub fn ignore_path(&self) -> Result<String> {
        project_path("ignore-file", &self.ignore_file)
    }

    /// Normalized key of the pre-commit file in the staged tree
    pub fn pre_commit_path(&self) -> Result<String> {
        project_path("pre-commit-file", &self.pre_commit_file)
    }

    /// Values available to templates and template payloads
    ///
    /// Parameters are inserted last and may shadow the built-in keys.
    pub fn render_context(&self) -> RenderContext {
        let mut context = RenderContext::new();
        context.insert("projectName", self.project_name.clone());
        context.insert("packageManager", self.package_manager.program());
        context.insert("indentSize", self.indentation.size());
        context.insert("projectBuildDirectory", self.build_directory.clone());
        for (key, value) in &self.parameters {
            context.insert(key.clone(), value.clone());
        }
        context
    }
}

fn project_path(field: &str, value: &str) -> Result<String> {
    crate::path::normalize_relative(value)
        .map(|path| crate::path::display(&path))
        .map_err(|err| Error::ConfigParse {
            message: format!("{} is not a valid project path: {}", field, err),
            hint: None,
        })
}

/// Parse a project configuration from YAML
pub fn parse(yaml: &str) -> Result<ProjectConfiguration> {
    let configuration: ProjectConfiguration =
        serde_yaml::from_str(yaml).map_err(|err| Error::ConfigParse {
            message: err.to_string(),
            hint: Some("Expected keys: project-name, indentation, package-manager, build-directory, manifest-file, ignore-file, pre-commit-file, parameters".to_string()),
        })?;
    configuration.validate()?;
    Ok(configuration)
}

/// Load a project configuration file
pub fn from_file(path: &Path) -> Result<ProjectConfiguration> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}
