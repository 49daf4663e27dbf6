//! # Error Handling
//!
//! This module defines the centralized error type for `seedwright`. It uses
//! the `thiserror` library to create one `Error` enum covering every failure
//! mode of a composition run, from module validation to post actions.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. Merge, path and anchor variants carry the
//!   offending key, path or needle so a failure can be traced back to the
//!   declaration that caused it.
//!
//! - **`Error::Module`**: Wraps any error raised while a module was being
//!   applied, attaching the module slug. Use [`Error::root`] to match on the
//!   underlying kind.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.

use std::fmt;

use thiserror::Error;

/// Which dependency table of the manifest a declaration targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyKind {
    /// Runtime dependency (`dependencies`)
    Runtime,
    /// Development dependency (`devDependencies`)
    Dev,
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyKind::Runtime => write!(f, "dependency"),
            DependencyKind::Dev => write!(f, "dev dependency"),
        }
    }
}

/// Main error type for seedwright operations
#[derive(Error, Debug)]
pub enum Error {
    /// An error occurred while parsing a project configuration or module
    /// definition file.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A module declaration was rejected when the module was built.
    #[error("Invalid module '{module}': {message}")]
    InvalidModule { module: String, message: String },

    /// The same dependency was declared twice with different resolved versions.
    #[error("Duplicate {kind} '{name}': already resolved to {existing}, now requested as {requested}")]
    DuplicateDependency {
        kind: DependencyKind,
        name: String,
        existing: String,
        requested: String,
    },

    /// The same script key was declared twice with different commands.
    #[error("Duplicate script '{key}': already '{existing}', now requested as '{requested}'")]
    DuplicateScript {
        key: String,
        existing: String,
        requested: String,
    },

    /// The same staged-files filter was declared twice with different commands.
    #[error("Duplicate pre-commit filter '{filter}': already [{existing}], now requested as [{requested}]")]
    DuplicatePreCommitFilter {
        filter: String,
        existing: String,
        requested: String,
    },

    /// Two file declarations target the same destination and the later one
    /// was not declared as an intentional overwrite.
    #[error("Duplicate destination '{path}': file is already planned (declare an overwrite to replace it)")]
    DuplicateDestination { path: String },

    /// A destination or source path is empty, absolute, or escapes its root.
    #[error("Invalid path '{path}': {reason}")]
    PathTraversal { path: String, reason: String },

    /// The anchor needle does not occur in the target file.
    #[error("Anchor not found in '{path}': {needle:?}")]
    AnchorNotFound { path: String, needle: String },

    /// The anchor needle occurs more than once in the target file.
    #[error("Ambiguous anchor in '{path}': {needle:?} occurs {occurrences} times")]
    AmbiguousAnchor {
        path: String,
        needle: String,
        occurrences: usize,
    },

    /// An anchor edit targets a file that has not been materialized.
    #[error("Patch target missing: '{path}' has not been materialized")]
    TargetMissing { path: String },

    /// An error occurred during template rendering.
    ///
    /// May include the name of the problematic template when applicable.
    #[error("Template processing error: {message}{}", template.as_ref().map(|v| format!(" (template: {})", v)).unwrap_or_default())]
    Template {
        message: String,
        /// The template that failed, if known
        template: Option<String>,
    },

    /// A source locator could not be loaded from the resource store.
    #[error("Resource error for '{locator}': {message}")]
    Resource { locator: String, message: String },

    /// The version catalog has no entry for this package.
    #[error("Unknown package '{package}' in version catalog '{ecosystem}'")]
    UnknownPackage { ecosystem: String, package: String },

    /// The manifest file could not be merged.
    #[error("Manifest error in '{path}': {message}")]
    Manifest { path: String, message: String },

    /// A post action failed.
    #[error("Post action '{action}' failed: {message}")]
    Action { action: String, message: String },

    /// An error raised while applying a specific module.
    #[error("Module '{module}': {source}")]
    Module {
        module: String,
        #[source]
        source: Box<Error>,
    },

    /// An error occurred with an in-memory or on-disk filesystem operation.
    #[error("Filesystem operation error: {message}")]
    Filesystem { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    /// An error occurred during serialization.
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl Error {
    /// Attach the slug of the module being applied.
    ///
    /// Errors that already carry a module are returned unchanged so the
    /// innermost attribution wins.
    pub fn in_module(self, module: &str) -> Error {
        match self {
            Error::Module { .. } => self,
            other => Error::Module {
                module: module.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// The slug of the module this error is attributed to, if any.
    pub fn module(&self) -> Option<&str> {
        match self {
            Error::Module { module, .. } => Some(module),
            _ => None,
        }
    }

    /// The underlying error with module attribution peeled off.
    pub fn root(&self) -> &Error {
        match self {
            Error::Module { source, .. } => source.root(),
            other => other,
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
