//! # Seedwright
//!
//! This library composes independently authored feature modules (one per
//! framework, build tool, CI provider, ...) into one consistent project
//! skeleton. It is used by the `seedwright` command-line tool but can be
//! embedded by any generator that wants deterministic, all-or-nothing project
//! composition.
//!
//! ## Quick Example
//!
//! ```
//! use seedwright::catalog::StaticCatalog;
//! use seedwright::config::ProjectConfiguration;
//! use seedwright::module::ModuleBuilder;
//! use seedwright::phases::CompositionEngine;
//! use seedwright::render::TemplateEngine;
//! use seedwright::resources::{MemoryStore, Source};
//!
//! let catalog = StaticCatalog::new().with_version("common", "typescript", "5.8.3");
//! let resources = MemoryStore::new().with_text("core/README.md.jinja", "# {{ projectName }}\n");
//! let renderer = TemplateEngine::new();
//!
//! let core = ModuleBuilder::new("core")
//!     .add(Source::from("core").template("README.md"), "README.md")
//!     .dev_dependency("typescript", "common")
//!     .script("build", "tsc")
//!     .build()
//!     .unwrap();
//!
//! let engine = CompositionEngine::new(&catalog, &resources, &renderer);
//! let state = engine.plan(&[core], &ProjectConfiguration::new("shop")).unwrap();
//!
//! assert_eq!(state.fs.read_string("README.md").unwrap().unwrap(), "# shop\n");
//! assert_eq!(state.manifest.dev_dependencies()["typescript"], "5.8.3");
//! assert!(state.fs.exists("package.json"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Modules (`module`)**: Immutable descriptions of what one feature
//!   contributes, built with `ModuleBuilder` or declared in YAML.
//! - **Merge points (`merge`)**: The manifest model, ignore-file aggregator,
//!   pre-commit table and anchor patcher shared by all modules.
//! - **In-Memory Filesystem (`filesystem`)**: The staged project tree. Nothing
//!   reaches the disk until every module has been applied.
//! - **Collaborators (`catalog`, `render`, `resources`, `actions`)**: Version
//!   lookup, template rendering, resource loading and post actions, all
//!   injected into the engine.
//! - **Phases (`phases`)**: The per-module pipeline and the final commit.
//!
//! ## Execution Flow
//!
//! For each module, in caller-supplied order:
//!
//! 1.  **Manifest**: Merge dependencies, scripts and pre-commit actions.
//! 2.  **Ignore**: Append the module's labeled ignore blocks.
//! 3.  **Materialize**: Plan, render and stage the module's files.
//! 4.  **Patch**: Insert anchor-relative snippets into staged files.
//!
//! Then the merged models are serialized into the staged tree, the tree is
//! committed through a temporary directory, and queued post actions run in
//! order.

pub mod actions;
pub mod catalog;
pub mod config;
pub mod defaults;
pub mod error;
pub mod filesystem;
pub mod merge;
pub mod module;
pub mod output;
pub mod path;
pub mod phases;
pub mod render;
pub mod resources;
pub mod suggestions;

#[cfg(test)]
mod path_proptest;
