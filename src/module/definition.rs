//! Declarative modules authored as YAML
//!
//! A [`ModuleDefinition`] is the file form of a module factory. It is parsed
//! once and turned into a [`Module`] for each project configuration, so
//! scripts and payload indentation follow the configured package manager and
//! indentation style.
//!
//! ```yaml
//! slug: angular-jest
//! source: client/angular/jest
//! gitignore:
//!   - comment: Jest
//!     patterns: [coverage/]
//! dev-dependencies:
//!   - name: jest
//!     ecosystem: angular
//! scripts:
//!   test: jest
//!   test:watch: { run: "test --watch" }
//! files:
//!   - source: jest.config.ts
//!     template: true
//! replacements:
//!   - path: package.json
//!     before: '"engines":'
//!     payload: '"jest": {},'
//!     indent: 1
//! post-actions:
//!   - action: install
//! ```

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::actions::{install_packages, run_command, CommandInstaller, PostAction};
use crate::config::ProjectConfiguration;
use crate::error::{Error, Result};
use crate::resources::Source;

use super::{Anchor, IgnoreBlockBuilder, Module, ModuleBuilder, ModuleFactory, Replacement};

/// A module declared in YAML
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ModuleDefinition {
    pub slug: String,
    /// Resource folder file sources are relative to
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default)]
    pub gitignore: Vec<IgnoreDecl>,
    #[serde(default)]
    pub dependencies: Vec<DependencyDecl>,
    #[serde(default)]
    pub dev_dependencies: Vec<DependencyDecl>,
    #[serde(default)]
    pub scripts: IndexMap<String, ScriptDecl>,
    #[serde(default)]
    pub files: Vec<FileDecl>,
    #[serde(default)]
    pub replacements: Vec<ReplacementDecl>,
    #[serde(default)]
    pub pre_commit: Vec<PreCommitDecl>,
    #[serde(default)]
    pub post_actions: Vec<PostActionDecl>,
}

fn default_source() -> String {
    ".".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct IgnoreDecl {
    #[serde(default)]
    pub comment: Option<String>,
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct DependencyDecl {
    pub name: String,
    pub ecosystem: String,
    #[serde(default)]
    pub version_source: Option<String>,
}

/// A literal command, or a script run through the package manager
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScriptDecl {
    Command(String),
    Run { run: String },
}

impl ScriptDecl {
    fn command(&self, configuration: &ProjectConfiguration) -> String {
        match self {
            ScriptDecl::Command(command) => command.clone(),
            ScriptDecl::Run { run } => configuration.package_manager.run_script_command(run),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileDecl {
    /// Path under the module source folder
    pub source: String,
    /// Destination, defaults to `source`
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub template: bool,
    #[serde(default)]
    pub overwrite: bool,
    #[serde(default)]
    pub executable: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ReplacementDecl {
    pub path: String,
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub after: Option<String>,
    pub payload: String,
    /// Indentation levels prefixed to every payload line
    #[serde(default)]
    pub indent: usize,
    #[serde(default)]
    pub template: bool,
    #[serde(default)]
    pub optional: bool,
}

impl ReplacementDecl {
    fn anchor(&self) -> Result<Anchor> {
        match (&self.before, &self.after) {
            (Some(needle), None) => Ok(Anchor::line_before(needle.clone())),
            (None, Some(needle)) => Ok(Anchor::line_after(needle.clone())),
            _ => Err(Error::ConfigParse {
                message: format!(
                    "replacement in '{}' needs exactly one of 'before' or 'after'",
                    self.path
                ),
                hint: None,
            }),
        }
    }

    fn payload(&self, configuration: &ProjectConfiguration) -> String {
        if self.indent == 0 {
            return self.payload.clone();
        }
        let prefix = configuration.indentation.times(self.indent);
        self.payload
            .split('\n')
            .map(|line| {
                if line.is_empty() {
                    line.to_string()
                } else {
                    format!("{}{}", prefix, line)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PreCommitDecl {
    pub filter: String,
    pub commands: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case", deny_unknown_fields)]
pub enum PostActionDecl {
    /// Install the project's packages with the configured package manager
    Install,
    /// Run a program in the project root
    Run {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

impl PostActionDecl {
    fn to_action(&self) -> PostAction {
        match self {
            PostActionDecl::Install => install_packages(Arc::new(CommandInstaller)),
            PostActionDecl::Run { program, args } => run_command(program.clone(), args.clone()),
        }
    }
}

impl ModuleDefinition {
    /// Parse a module definition from YAML
    pub fn parse(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|err| Error::ConfigParse {
            message: format!("invalid module definition: {}", err),
            hint: Some("A module needs at least a 'slug:' key".to_string()),
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content).map_err(|err| match err {
            Error::ConfigParse { message, hint } => Error::ConfigParse {
                message: format!("{}: {}", path.display(), message),
                hint,
            },
            other => other,
        })
    }
}

impl ModuleFactory for ModuleDefinition {
    fn build_module(&self, configuration: &ProjectConfiguration) -> Result<Module> {
        let source = Source::from(self.source.clone());
        let mut builder = ModuleBuilder::new(self.slug.clone());

        for block in &self.gitignore {
            let mut ignore = match &block.comment {
                Some(comment) => IgnoreBlockBuilder::comment(comment.clone()),
                None => IgnoreBlockBuilder::unlabeled(),
            };
            for pattern in &block.patterns {
                ignore = ignore.pattern(pattern.clone());
            }
            builder = builder.ignore(ignore);
        }

        for (decls, dev) in [(&self.dependencies, false), (&self.dev_dependencies, true)] {
            for decl in decls {
                builder = match (dev, decl.version_source.as_deref()) {
                    (false, None) => builder.dependency(&decl.name, &decl.ecosystem),
                    (false, Some(from)) => {
                        builder.dependency_versioned_as(&decl.name, &decl.ecosystem, from)
                    }
                    (true, None) => builder.dev_dependency(&decl.name, &decl.ecosystem),
                    (true, Some(from)) => {
                        builder.dev_dependency_versioned_as(&decl.name, &decl.ecosystem, from)
                    }
                };
            }
        }

        for (key, script) in &self.scripts {
            builder = builder.script(key.clone(), script.command(configuration));
        }

        for file in &self.files {
            let entry = if file.template {
                source.template(&file.source)
            } else {
                source.file(&file.source)
            };
            let destination = file.to.as_deref().unwrap_or(&file.source);
            builder = match (file.overwrite, file.executable) {
                (true, _) => builder.overwrite(entry, destination),
                (false, true) => builder.add_executable(entry, destination),
                (false, false) => builder.add(entry, destination),
            };
        }

        for decl in &self.replacements {
            let anchor = decl.anchor().map_err(|err| err.in_module(&self.slug))?;
            let mut replacement = Replacement::new(anchor, decl.payload(configuration));
            if decl.template {
                replacement = replacement.rendered();
            }
            builder = if decl.optional {
                builder.optional_replacement(&decl.path, replacement)
            } else {
                builder.mandatory_replacement(&decl.path, replacement)
            };
        }

        for decl in &self.pre_commit {
            builder = builder.pre_commit(decl.filter.clone(), decl.commands.clone());
        }

        for decl in &self.post_actions {
            builder = builder.post_action(decl.to_action());
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Indentation, PackageManager};
    use crate::module::{FileKind, ManifestEdit};

    const JEST: &str = r#"
slug: angular-jest
source: client/angular/jest
gitignore:
  - comment: Jest
    patterns: [coverage/]
dev-dependencies:
  - name: jest
    ecosystem: angular
  - name: "@types/jest"
    ecosystem: angular
    version-source: jest
scripts:
  test: jest
  test:watch: { run: "test --watch" }
files:
  - source: jest.config.ts
    template: true
  - source: setup-jest.ts
    to: src/setup-jest.ts
replacements:
  - path: package.json
    before: '"engines":'
    payload: '"jest": {},'
    indent: 1
pre-commit:
  - filter: "*.ts"
    commands: ["jest --findRelatedTests"]
post-actions:
  - action: install
  - action: run
    program: git
    args: [init]
"#;

    #[test]
    fn test_parse_and_build() {
        let definition = ModuleDefinition::parse(JEST).unwrap();
        let configuration = ProjectConfiguration::new("shop")
            .with_package_manager(PackageManager::Pnpm)
            .with_indentation(Indentation::new(4));
        let module = definition.build_module(&configuration).unwrap();

        assert_eq!(module.slug().as_str(), "angular-jest");
        assert_eq!(module.ignore_blocks()[0].comment.as_deref(), Some("Jest"));

        match &module.manifest_edits()[1] {
            ManifestEdit::AddDevDependency(dependency) => {
                assert_eq!(dependency.name, "@types/jest");
                assert_eq!(dependency.version_package(), "jest");
            }
            other => panic!("unexpected edit: {other:?}"),
        }
        assert_eq!(
            module.manifest_edits()[3],
            ManifestEdit::AddScript {
                key: "test:watch".to_string(),
                command: "pnpm test --watch".to_string(),
            }
        );

        let files = module.files();
        assert_eq!(files[0].kind, FileKind::Template);
        assert_eq!(files[0].source.as_str(), "client/angular/jest/jest.config.ts.jinja");
        assert_eq!(files[0].destination, "jest.config.ts");
        assert_eq!(files[1].destination, "src/setup-jest.ts");

        assert_eq!(module.anchor_edits()[0].payload, "    \"jest\": {},");
        assert!(module.anchor_edits()[0].mandatory);
        assert_eq!(module.pre_commit_actions()[0].filter, "*.ts");

        let names: Vec<&str> = module.post_actions().iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["install-packages", "git init"]);
    }

    #[test]
    fn test_replacement_requires_one_anchor() {
        let definition = ModuleDefinition::parse(
            r#"
slug: broken
replacements:
  - path: index.html
    before: "<head>"
    after: "</head>"
    payload: "<meta>"
"#,
        )
        .unwrap();
        let err = definition
            .build_module(&ProjectConfiguration::new("demo"))
            .unwrap_err();
        assert_eq!(err.module(), Some("broken"));
        assert!(matches!(err.root(), Error::ConfigParse { .. }));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = ModuleDefinition::parse("slug: x\nfiels: []\n").unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_gitignore_is_a_list_of_blocks() {
        let definition =
            ModuleDefinition::parse("slug: x\ngitignore:\n  - comment: Jest\n    patterns: [coverage/]\n")
                .unwrap();
        assert_eq!(definition.gitignore[0].patterns, vec!["coverage/"]);

        let err =
            ModuleDefinition::parse("slug: x\ngitignore:\n  comment: Jest\n  patterns: [coverage/]\n")
                .unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_multiline_payload_indentation_skips_blank_lines() {
        let decl = ReplacementDecl {
            path: "a.json".to_string(),
            before: Some("}".to_string()),
            after: None,
            payload: "\"a\": 1,\n\n\"b\": 2,".to_string(),
            indent: 2,
            template: false,
            optional: false,
        };
        let payload = decl.payload(&ProjectConfiguration::new("demo"));
        assert_eq!(payload, "    \"a\": 1,\n\n    \"b\": 2,");
    }
}
