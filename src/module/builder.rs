//! Fluent construction of [`Module`] values
//!
//! The builder only records declarations. Nothing is validated until the
//! terminal [`ModuleBuilder::build`] call, which checks every declaration and
//! either returns an immutable [`Module`] or the first problem found,
//! attributed to the module slug.
//!
//! ```
//! use seedwright::module::{Anchor, IgnoreBlockBuilder, ModuleBuilder, Replacement};
//! use seedwright::resources::Source;
//!
//! let source = Source::from("client/angular/core");
//! let module = ModuleBuilder::new("angular-core")
//!     .ignore(IgnoreBlockBuilder::comment("Angular").pattern(".angular/"))
//!     .dependency("@angular/core", "angular")
//!     .dependency_versioned_as("@angular/common", "angular", "@angular/core")
//!     .script("build", "ng build")
//!     .add(source.template("angular.json"), "angular.json")
//!     .mandatory_replacement(
//!         "package.json",
//!         Replacement::new(Anchor::line_before("\"engines\":"), "  \"cacheDirectories\": [\"node_modules\"],"),
//!     )
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(module.manifest_edits().len(), 3);
//! assert_eq!(module.files()[0].destination, "angular.json");
//! ```

use crate::actions::PostAction;
use crate::error::{Error, Result};
use crate::path::{join, normalize_relative};
use crate::resources::{FileKind, Source, SourceFile};

use super::{
    Anchor, AnchorEdit, DependencyEdit, FileSpec, IgnoreBlock, ManifestEdit, Module, ModuleSlug,
    PreCommitAction,
};

/// A labeled group of ignore patterns under construction
#[derive(Debug, Clone, Default)]
pub struct IgnoreBlockBuilder {
    comment: Option<String>,
    patterns: Vec<String>,
}

impl IgnoreBlockBuilder {
    /// Start a block headed by `comment`
    pub fn comment(comment: impl Into<String>) -> Self {
        Self {
            comment: Some(comment.into()),
            patterns: Vec::new(),
        }
    }

    /// Start a block without a header line
    pub fn unlabeled() -> Self {
        Self::default()
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }
}

/// Files copied from one source folder into one destination folder
#[derive(Debug, Clone)]
pub struct FileBatch {
    source: Source,
    destination: String,
    entries: Vec<(SourceFile, String, bool)>,
}

impl FileBatch {
    pub fn new(source: Source, destination: impl Into<String>) -> Self {
        Self {
            source,
            destination: destination.into(),
            entries: Vec::new(),
        }
    }

    /// Copy `name` verbatim to the same name under the destination folder
    pub fn add_file(mut self, name: &str) -> Self {
        let destination = join(&self.destination, name);
        self.entries.push((self.source.file(name), destination, false));
        self
    }

    /// Render `name` and write it under the destination folder
    pub fn add_template(mut self, name: &str) -> Self {
        let destination = join(&self.destination, name);
        self.entries
            .push((self.source.template(name), destination, false));
        self
    }

    pub fn add_executable(mut self, name: &str) -> Self {
        let destination = join(&self.destination, name);
        self.entries.push((self.source.file(name), destination, true));
        self
    }
}

/// Payload to insert next to an anchor
#[derive(Debug, Clone)]
pub struct Replacement {
    anchor: Anchor,
    payload: String,
    render: bool,
}

impl Replacement {
    pub fn new(anchor: Anchor, payload: impl Into<String>) -> Self {
        Self {
            anchor,
            payload: payload.into(),
            render: false,
        }
    }

    /// Render the payload with the project context before inserting it
    pub fn rendered(mut self) -> Self {
        self.render = true;
        self
    }
}

#[derive(Debug, Clone)]
struct PendingFile {
    source: SourceFile,
    destination: String,
    overwrite: bool,
    executable: bool,
}

#[derive(Debug, Clone)]
struct PendingEdit {
    target: String,
    replacement: Replacement,
    mandatory: bool,
}

/// Collects the declarations of one module
#[derive(Debug, Clone)]
pub struct ModuleBuilder {
    slug: String,
    ignore_blocks: Vec<IgnoreBlockBuilder>,
    manifest_edits: Vec<ManifestEdit>,
    files: Vec<PendingFile>,
    anchor_edits: Vec<PendingEdit>,
    pre_commit_actions: Vec<PreCommitAction>,
    post_actions: Vec<PostAction>,
}

impl ModuleBuilder {
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            ignore_blocks: Vec::new(),
            manifest_edits: Vec::new(),
            files: Vec::new(),
            anchor_edits: Vec::new(),
            pre_commit_actions: Vec::new(),
            post_actions: Vec::new(),
        }
    }

    pub fn ignore(mut self, block: IgnoreBlockBuilder) -> Self {
        self.ignore_blocks.push(block);
        self
    }

    pub fn dependency(self, name: &str, ecosystem: &str) -> Self {
        self.push_dependency(false, name, ecosystem, None)
    }

    /// Dependency whose version is the catalog version of `version_source`
    pub fn dependency_versioned_as(self, name: &str, ecosystem: &str, version_source: &str) -> Self {
        self.push_dependency(false, name, ecosystem, Some(version_source))
    }

    pub fn dev_dependency(self, name: &str, ecosystem: &str) -> Self {
        self.push_dependency(true, name, ecosystem, None)
    }

    pub fn dev_dependency_versioned_as(
        self,
        name: &str,
        ecosystem: &str,
        version_source: &str,
    ) -> Self {
        self.push_dependency(true, name, ecosystem, Some(version_source))
    }

    fn push_dependency(
        mut self,
        dev: bool,
        name: &str,
        ecosystem: &str,
        version_source: Option<&str>,
    ) -> Self {
        let edit = DependencyEdit {
            name: name.to_string(),
            ecosystem: ecosystem.to_string(),
            version_source: version_source.map(str::to_string),
        };
        self.manifest_edits.push(if dev {
            ManifestEdit::AddDevDependency(edit)
        } else {
            ManifestEdit::AddDependency(edit)
        });
        self
    }

    pub fn script(mut self, key: impl Into<String>, command: impl Into<String>) -> Self {
        self.manifest_edits.push(ManifestEdit::AddScript {
            key: key.into(),
            command: command.into(),
        });
        self
    }

    /// Materialize `source` at `destination`
    pub fn add(self, source: SourceFile, destination: &str) -> Self {
        self.push_file(source, destination, false, false)
    }

    /// Materialize `source` at `destination`, replacing a file planned earlier
    pub fn overwrite(self, source: SourceFile, destination: &str) -> Self {
        self.push_file(source, destination, true, false)
    }

    /// Materialize `source` at `destination` with the executable bit set
    pub fn add_executable(self, source: SourceFile, destination: &str) -> Self {
        self.push_file(source, destination, false, true)
    }

    pub fn batch(mut self, batch: FileBatch) -> Self {
        for (source, destination, executable) in batch.entries {
            self = self.push_file(source, &destination, false, executable);
        }
        self
    }

    fn push_file(
        mut self,
        source: SourceFile,
        destination: &str,
        overwrite: bool,
        executable: bool,
    ) -> Self {
        self.files.push(PendingFile {
            source,
            destination: destination.to_string(),
            overwrite,
            executable,
        });
        self
    }

    /// Insert into `target`; a missing target or anchor fails the run
    pub fn mandatory_replacement(mut self, target: &str, replacement: Replacement) -> Self {
        self.anchor_edits.push(PendingEdit {
            target: target.to_string(),
            replacement,
            mandatory: true,
        });
        self
    }

    /// Insert into `target` when both the file and the anchor exist
    pub fn optional_replacement(mut self, target: &str, replacement: Replacement) -> Self {
        self.anchor_edits.push(PendingEdit {
            target: target.to_string(),
            replacement,
            mandatory: false,
        });
        self
    }

    /// Run `commands` on staged files matching `filter` before each commit
    pub fn pre_commit<I, S>(mut self, filter: impl Into<String>, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pre_commit_actions.push(PreCommitAction {
            filter: filter.into(),
            commands: commands.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn post_action(mut self, action: PostAction) -> Self {
        self.post_actions.push(action);
        self
    }

    /// Validate every declaration and produce the module
    pub fn build(self) -> Result<Module> {
        let slug = ModuleSlug::parse(&self.slug)?;
        self.assemble(slug.clone())
            .map_err(|err| err.in_module(slug.as_str()))
    }

    fn assemble(self, slug: ModuleSlug) -> Result<Module> {
        let invalid = |message: String| Error::InvalidModule {
            module: slug.to_string(),
            message,
        };

        let mut ignore_blocks = Vec::with_capacity(self.ignore_blocks.len());
        for block in self.ignore_blocks {
            if block.patterns.is_empty() {
                return Err(invalid("ignore block has no patterns".to_string()));
            }
            if let Some(pattern) = block.patterns.iter().find(|p| p.trim().is_empty()) {
                return Err(invalid(format!("empty ignore pattern {:?}", pattern)));
            }
            ignore_blocks.push(IgnoreBlock {
                comment: block.comment,
                patterns: block.patterns,
            });
        }

        for edit in &self.manifest_edits {
            match edit {
                ManifestEdit::AddDependency(dependency)
                | ManifestEdit::AddDevDependency(dependency) => {
                    if dependency.name.trim().is_empty() {
                        return Err(invalid("dependency name is empty".to_string()));
                    }
                    if dependency.ecosystem.trim().is_empty() {
                        return Err(invalid(format!(
                            "dependency '{}' has no ecosystem",
                            dependency.name
                        )));
                    }
                    if dependency
                        .version_source
                        .as_deref()
                        .is_some_and(|source| source.trim().is_empty())
                    {
                        return Err(invalid(format!(
                            "dependency '{}' has an empty version source",
                            dependency.name
                        )));
                    }
                }
                ManifestEdit::AddScript { key, command } => {
                    if key.trim().is_empty() {
                        return Err(invalid("script key is empty".to_string()));
                    }
                    if command.trim().is_empty() {
                        return Err(invalid(format!("script '{}' has no command", key)));
                    }
                }
            }
        }

        let mut files = Vec::with_capacity(self.files.len());
        for file in self.files {
            let destination = normalize_relative(&file.destination)?;
            files.push(FileSpec {
                source: file.source.locator,
                destination: crate::path::display(&destination),
                kind: file.source.kind,
                overwrite: file.overwrite,
                executable: file.executable,
            });
        }

        let mut anchor_edits = Vec::with_capacity(self.anchor_edits.len());
        for edit in self.anchor_edits {
            let target = normalize_relative(&edit.target)?;
            if edit.replacement.anchor.needle().is_empty() {
                return Err(invalid(format!(
                    "anchor into '{}' has an empty needle",
                    edit.target
                )));
            }
            anchor_edits.push(AnchorEdit {
                target: crate::path::display(&target),
                anchor: edit.replacement.anchor,
                payload: edit.replacement.payload,
                render: edit.replacement.render,
                mandatory: edit.mandatory,
            });
        }

        for action in &self.pre_commit_actions {
            if action.filter.trim().is_empty() {
                return Err(invalid("pre-commit filter is empty".to_string()));
            }
            if action.commands.is_empty() || action.commands.iter().any(|c| c.trim().is_empty()) {
                return Err(invalid(format!(
                    "pre-commit filter '{}' needs non-empty commands",
                    action.filter
                )));
            }
        }

        Ok(Module {
            slug,
            ignore_blocks,
            manifest_edits: self.manifest_edits,
            files,
            anchor_edits,
            pre_commit_actions: self.pre_commit_actions,
            post_actions: self.post_actions,
        })
    }
}
