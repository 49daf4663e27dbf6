//! # Modules
//!
//! A [`Module`] is the immutable description of everything one feature
//! contributes to a generated project: ignore rules, manifest edits, files,
//! anchor edits into files it does not own, pre-commit actions and post
//! actions. Modules are produced by [`ModuleBuilder`] (directly, or through a
//! [`ModuleFactory`] such as a declarative [`ModuleDefinition`]) and are only
//! read by the composition engine.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::actions::PostAction;
use crate::config::ProjectConfiguration;
use crate::error::{Error, Result};
use crate::resources::SourceLocator;

pub use crate::resources::FileKind;

pub mod builder;
pub mod definition;

pub use builder::{FileBatch, IgnoreBlockBuilder, ModuleBuilder, Replacement};
pub use definition::ModuleDefinition;

static SLUG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("slug pattern is valid"));

/// Kebab-case module identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleSlug(String);

impl ModuleSlug {
    pub fn parse(slug: &str) -> Result<Self> {
        if SLUG_PATTERN.is_match(slug) {
            Ok(Self(slug.to_string()))
        } else {
            Err(Error::InvalidModule {
                module: slug.to_string(),
                message: "slug must be kebab-case (lowercase letters, digits and dashes)"
                    .to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A dependency declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEdit {
    /// Package name
    pub name: String,
    /// Ecosystem tag the version is looked up under
    pub ecosystem: String,
    /// Package whose version is used instead of `name`'s own entry
    pub version_source: Option<String>,
}

impl DependencyEdit {
    /// The catalog entry this dependency's version comes from
    pub fn version_package(&self) -> &str {
        self.version_source.as_deref().unwrap_or(&self.name)
    }
}

/// One change to the project manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestEdit {
    AddDependency(DependencyEdit),
    AddDevDependency(DependencyEdit),
    AddScript { key: String, command: String },
}

/// A file to materialize in the project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSpec {
    pub source: SourceLocator,
    /// Destination relative to the project root, already normalized
    pub destination: String,
    pub kind: FileKind,
    /// Replace a file planned by an earlier declaration
    pub overwrite: bool,
    pub executable: bool,
}

/// Where a payload goes relative to its needle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anchor {
    /// New lines right before the line holding the needle
    BeforeText(String),
    /// New lines right after the line holding the needle
    AfterText(String),
}

impl Anchor {
    pub fn line_before(needle: impl Into<String>) -> Self {
        Anchor::BeforeText(needle.into())
    }

    pub fn line_after(needle: impl Into<String>) -> Self {
        Anchor::AfterText(needle.into())
    }

    pub fn needle(&self) -> &str {
        match self {
            Anchor::BeforeText(needle) | Anchor::AfterText(needle) => needle,
        }
    }
}

/// Text inserted into an already materialized file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorEdit {
    /// Target relative to the project root, already normalized
    pub target: String,
    pub anchor: Anchor,
    pub payload: String,
    /// Render the payload with the project context before inserting it
    pub render: bool,
    /// A missing target or needle fails the run instead of being skipped
    pub mandatory: bool,
}

/// A labeled group of ignore patterns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreBlock {
    pub comment: Option<String>,
    pub patterns: Vec<String>,
}

/// Commands run on staged files matching a filter before each commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreCommitAction {
    pub filter: String,
    pub commands: Vec<String>,
}

/// Everything one feature contributes to a generated project
#[derive(Debug, Clone)]
pub struct Module {
    pub(crate) slug: ModuleSlug,
    pub(crate) ignore_blocks: Vec<IgnoreBlock>,
    pub(crate) manifest_edits: Vec<ManifestEdit>,
    pub(crate) files: Vec<FileSpec>,
    pub(crate) anchor_edits: Vec<AnchorEdit>,
    pub(crate) pre_commit_actions: Vec<PreCommitAction>,
    pub(crate) post_actions: Vec<PostAction>,
}

impl Module {
    pub fn slug(&self) -> &ModuleSlug {
        &self.slug
    }

    pub fn ignore_blocks(&self) -> &[IgnoreBlock] {
        &self.ignore_blocks
    }

    pub fn manifest_edits(&self) -> &[ManifestEdit] {
        &self.manifest_edits
    }

    pub fn files(&self) -> &[FileSpec] {
        &self.files
    }

    pub fn anchor_edits(&self) -> &[AnchorEdit] {
        &self.anchor_edits
    }

    pub fn pre_commit_actions(&self) -> &[PreCommitAction] {
        &self.pre_commit_actions
    }

    pub fn post_actions(&self) -> &[PostAction] {
        &self.post_actions
    }
}

/// Produces a module for a given project configuration
pub trait ModuleFactory {
    fn build_module(&self, configuration: &ProjectConfiguration) -> Result<Module>;
}

impl<F> ModuleFactory for F
where
    F: Fn(&ProjectConfiguration) -> Result<Module>,
{
    fn build_module(&self, configuration: &ProjectConfiguration) -> Result<Module> {
        self(configuration)
    }
}
