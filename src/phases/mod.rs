//! Implementation of the phases of a composition run.
//!
//! ## Overview
//!
//! Every module, in caller-supplied order, goes through four phases before the
//! next module starts:
//! 1. Manifest - merge dependencies, scripts and pre-commit actions
//! 2. Ignore - append the module's ignore blocks
//! 3. Materialize - plan, render and stage the module's files (all or nothing)
//! 4. Patch - apply anchor edits against the staged content
//!
//! The module's post actions are then queued. Once every module is applied:
//! 5. Finalize - serialize the manifest, ignore file and pre-commit file
//! 6. Write - commit the staged tree to disk through a temporary directory
//!
//! The [`orchestrator`] runs the phases and the post-action pipeline. All
//! phases before [`write`] only touch the [`ProjectState`], never the disk.

use std::collections::BTreeMap;

use crate::actions::PostActionPipeline;
use crate::filesystem::MemoryFS;
use crate::merge::{IgnoreFileAggregator, ManifestModel, PreCommitAggregator};

pub mod finalize;
pub mod ignore;
pub mod manifest;
pub mod materialize;
pub mod orchestrator;
pub mod patch;
pub mod write;

pub use orchestrator::{CompositionEngine, CompositionReport};

/// An optional anchor edit that was not applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEdit {
    pub module: String,
    pub target: String,
    pub reason: String,
}

/// Accumulating result of one composition run
#[derive(Debug, Default)]
pub struct ProjectState {
    /// Merged dependencies and scripts
    pub manifest: ManifestModel,
    /// Merged ignore document
    pub ignore: IgnoreFileAggregator,
    /// Merged pre-commit table
    pub pre_commit: PreCommitAggregator,
    /// Staged project tree
    pub fs: MemoryFS,
    /// Post actions queued across modules
    pub actions: PostActionPipeline,
    /// Optional edits skipped because their target or anchor was absent
    pub skipped_edits: Vec<SkippedEdit>,
    /// Slug of the module that last wrote each staged file
    origins: BTreeMap<String, String>,
}

impl ProjectState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Module that materialized `path`
    pub fn origin(&self, path: &str) -> Option<&str> {
        self.origins.get(path).map(String::as_str)
    }

    pub(crate) fn record_origin(&mut self, path: &str, module: &str) {
        self.origins.insert(path.to_string(), module.to_string());
    }
}
