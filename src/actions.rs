//! # Post Actions
//!
//! Post actions are deferred, side-effecting callbacks (installing packages,
//! initializing a repository, ...) that modules declare and that only run
//! once the project tree has been committed to disk.
//!
//! The [`PostActionPipeline`] runs them strictly in enqueue order. The first
//! failing action stops the pipeline and its error is returned; actions that
//! already ran are not undone.

use std::fmt;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;

use log::{debug, info};

use crate::config::{PackageManager, ProjectConfiguration};
use crate::error::{Error, Result};

/// Everything a post action may look at
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    /// Root of the committed project
    pub project_root: &'a Path,
    /// Configuration of the run
    pub configuration: &'a ProjectConfiguration,
}

impl ActionContext<'_> {
    pub fn package_manager(&self) -> PackageManager {
        self.configuration.package_manager
    }
}

type ActionFn = dyn Fn(&ActionContext<'_>) -> Result<()> + Send + Sync;

/// A named deferred callback
#[derive(Clone)]
pub struct PostAction {
    name: String,
    run: Arc<ActionFn>,
}

impl PostAction {
    pub fn new<F>(name: impl Into<String>, run: F) -> Self
    where
        F: Fn(&ActionContext<'_>) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            run: Arc::new(run),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn run(&self, context: &ActionContext<'_>) -> Result<()> {
        (self.run)(context)
    }
}

impl fmt::Debug for PostAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostAction").field("name", &self.name).finish()
    }
}

/// Installs the dependencies of a committed project
pub trait PackageInstaller: Send + Sync {
    fn install(&self, project_root: &Path, package_manager: PackageManager) -> Result<()>;
}

/// Installs packages by running `<package manager> install` in the project root
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandInstaller;

impl PackageInstaller for CommandInstaller {
    fn install(&self, project_root: &Path, package_manager: PackageManager) -> Result<()> {
        let args = vec!["install".to_string()];
        run_program(package_manager.program(), &args, project_root)
    }
}

/// Post action installing the project's packages
pub fn install_packages(installer: Arc<dyn PackageInstaller>) -> PostAction {
    PostAction::new("install-packages", move |context| {
        installer.install(context.project_root, context.package_manager())
    })
}

/// Post action running a program with arguments in the project root
pub fn run_command(program: impl Into<String>, args: Vec<String>) -> PostAction {
    let program = program.into();
    let name = std::iter::once(program.clone())
        .chain(args.iter().cloned())
        .collect::<Vec<_>>()
        .join(" ");
    PostAction::new(name, move |context| {
        run_program(&program, &args, context.project_root)
    })
}

fn run_program(program: &str, args: &[String], cwd: &Path) -> Result<()> {
    let command_line = std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ");
    debug!("Running '{}' in {}", command_line, cwd.display());

    let status = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .status()
        .map_err(|err| Error::Action {
            action: command_line.clone(),
            message: format!("cannot start '{}': {}", program, err),
        })?;

    if !status.success() {
        return Err(Error::Action {
            action: command_line,
            message: format!("exited with {}", status),
        });
    }
    Ok(())
}

#[derive(Debug, Clone)]
struct PendingAction {
    module: String,
    action: PostAction,
}

/// Ordered queue of post actions collected across modules
#[derive(Debug, Clone, Default)]
pub struct PostActionPipeline {
    queue: Vec<PendingAction>,
}

impl PostActionPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an action declared by `module`
    pub fn enqueue(&mut self, module: &str, action: PostAction) {
        self.queue.push(PendingAction {
            module: module.to_string(),
            action,
        });
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// `(module, action name)` pairs in run order
    pub fn describe(&self) -> Vec<(&str, &str)> {
        self.queue
            .iter()
            .map(|pending| (pending.module.as_str(), pending.action.name()))
            .collect()
    }

    /// Run every action in enqueue order, stopping at the first failure
    ///
    /// Returns the number of actions that ran.
    pub fn run_all(&self, context: &ActionContext<'_>) -> Result<usize> {
        for (index, pending) in self.queue.iter().enumerate() {
            info!(
                "Running post action '{}' of module '{}' ({}/{})",
                pending.action.name(),
                pending.module,
                index + 1,
                self.queue.len()
            );
            pending.action.run(context).map_err(|err| {
                let err = match err {
                    Error::Action { .. } => err,
                    other => Error::Action {
                        action: pending.action.name().to_string(),
                        message: other.to_string(),
                    },
                };
                err.in_module(&pending.module)
            })?;
        }
        Ok(self.queue.len())
    }
}
