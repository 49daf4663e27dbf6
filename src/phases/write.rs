//! Phase 6: Writing to Disk
//!
//! This is the final phase of a composition run. Its main responsibility is
//! to expose the staged tree on disk without ever leaving a half-written
//! project behind.
//!
//! ## Process
//!
//! 1.  **Stage**: A temporary directory is created next to the project root
//!     and every staged file is written into it, with parent directories and
//!     permissions (e.g. the executable bit for scripts).
//!
//! 2.  **Check**: When the root already holds content, every target is
//!     checked before anything moves. A target that is a directory, or an
//!     ancestor that is not one, fails the commit with the root untouched.
//!
//! 3.  **Expose**: When the project root is absent or empty, the staging
//!     directory is renamed onto it in one step. Otherwise the staged files
//!     are moved into it one by one. Replaced files are parked in a backup
//!     directory first, so a failed move restores the previous tree.
//!
//! 4.  **Cleanup**: The staging and backup directories are removed on every
//!     path, including failures.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::filesystem::MemoryFS;

const STAGING_PREFIX: &str = ".seedwright-staging-";
const BACKUP_PREFIX: &str = ".seedwright-backup-";

/// Execute Phase 6: commit the staged tree to `project_root`
///
/// Returns the relative paths written, sorted.
pub fn execute(staged: &MemoryFS, project_root: &Path) -> Result<Vec<PathBuf>> {
    if project_root.exists() && !project_root.is_dir() {
        return Err(Error::Filesystem {
            message: format!(
                "Project root '{}' exists and is not a directory",
                project_root.display()
            ),
        });
    }

    let parent = match project_root.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        Some(_) => PathBuf::from("."),
        None => {
            return Err(Error::Filesystem {
                message: format!("Project root '{}' has no parent", project_root.display()),
            })
        }
    };
    fs::create_dir_all(&parent).map_err(|e| Error::Filesystem {
        message: format!("Failed to create directory '{}': {}", parent.display(), e),
    })?;

    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(&parent)
        .map_err(|e| Error::Filesystem {
            message: format!("Failed to create staging directory in '{}': {}", parent.display(), e),
        })?;
    debug!("Staging {} file(s) in {}", staged.len(), staging.path().display());
    write_tree(staged, staging.path())?;

    if project_root.is_dir() && !is_empty_dir(project_root)? {
        info!("Merging into existing directory {}", project_root.display());
        check_targets(staged, project_root)?;
        let backup = tempfile::Builder::new()
            .prefix(BACKUP_PREFIX)
            .tempdir_in(&parent)
            .map_err(|e| Error::Filesystem {
                message: format!("Failed to create backup directory in '{}': {}", parent.display(), e),
            })?;
        move_into(staging.path(), project_root, backup.path())?;
    } else {
        if project_root.is_dir() {
            fs::remove_dir(project_root).map_err(|e| Error::Filesystem {
                message: format!(
                    "Failed to replace empty directory '{}': {}",
                    project_root.display(),
                    e
                ),
            })?;
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(staging.path(), fs::Permissions::from_mode(0o755)).map_err(|e| {
                Error::Filesystem {
                    message: format!("Failed to set permissions on staging directory: {}", e),
                }
            })?;
        }
        fs::rename(staging.path(), project_root).map_err(|e| Error::Filesystem {
            message: format!(
                "Failed to move staged project to '{}': {}",
                project_root.display(),
                e
            ),
        })?;
        info!("Created {}", project_root.display());
    }

    Ok(staged.list_files())
}

/// Write every staged file under `output_path`
pub fn write_tree(staged: &MemoryFS, output_path: &Path) -> Result<()> {
    for (relative_path, file) in staged.files() {
        let full_path = output_path.join(relative_path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::Filesystem {
                message: format!("Failed to create directory '{}': {}", parent.display(), e),
            })?;
        }

        fs::write(&full_path, &file.content).map_err(|e| Error::Filesystem {
            message: format!("Failed to write file '{}': {}", full_path.display(), e),
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(file.permissions);
            fs::set_permissions(&full_path, perms).map_err(|e| Error::Filesystem {
                message: format!(
                    "Failed to set permissions on '{}': {}",
                    full_path.display(),
                    e
                ),
            })?;
        }
    }

    Ok(())
}

fn is_empty_dir(path: &Path) -> Result<bool> {
    let mut entries = fs::read_dir(path).map_err(|e| Error::Filesystem {
        message: format!("Failed to read directory '{}': {}", path.display(), e),
    })?;
    Ok(entries.next().is_none())
}

/// Fail when a staged file cannot be moved into `project_root`
fn check_targets(staged: &MemoryFS, project_root: &Path) -> Result<()> {
    for relative in staged.list_files() {
        let mut current = project_root.to_path_buf();
        let mut components = relative.components().peekable();
        while let Some(component) = components.next() {
            current.push(component);
            let Ok(metadata) = fs::metadata(&current) else {
                break;
            };
            let is_target = components.peek().is_none();
            if is_target && metadata.is_dir() {
                return Err(Error::Filesystem {
                    message: format!(
                        "Cannot write '{}': a directory exists at that path",
                        current.display()
                    ),
                });
            }
            if !is_target && !metadata.is_dir() {
                return Err(Error::Filesystem {
                    message: format!(
                        "Cannot write '{}': '{}' exists and is not a directory",
                        project_root.join(&relative).display(),
                        current.display()
                    ),
                });
            }
        }
    }
    Ok(())
}

/// Moves done so far, undone in reverse order when a later move fails
#[derive(Default)]
struct Journal {
    created_dirs: Vec<PathBuf>,
    moved: Vec<(PathBuf, Option<PathBuf>)>,
}

impl Journal {
    fn create_parents(&mut self, project_root: &Path, target: &Path) -> Result<()> {
        let Some(parent) = target.parent() else {
            return Ok(());
        };
        let missing: Vec<PathBuf> = parent
            .ancestors()
            .take_while(|dir| *dir != project_root && !dir.exists())
            .map(Path::to_path_buf)
            .collect();
        for dir in missing.into_iter().rev() {
            fs::create_dir(&dir).map_err(|e| Error::Filesystem {
                message: format!("Failed to create directory '{}': {}", dir.display(), e),
            })?;
            self.created_dirs.push(dir);
        }
        Ok(())
    }

    fn rollback(self) {
        for (target, backup) in self.moved.into_iter().rev() {
            if let Err(e) = fs::remove_file(&target) {
                warn!("Failed to remove '{}' during rollback: {}", target.display(), e);
            }
            if let Some(backup) = backup {
                if let Err(e) = fs::rename(&backup, &target) {
                    warn!("Failed to restore '{}': {}", target.display(), e);
                }
            }
        }
        for dir in self.created_dirs.into_iter().rev() {
            if let Err(e) = fs::remove_dir(&dir) {
                warn!("Failed to remove '{}' during rollback: {}", dir.display(), e);
            }
        }
    }
}

fn move_into(staging: &Path, project_root: &Path, backup: &Path) -> Result<()> {
    let mut journal = Journal::default();
    match move_files(staging, project_root, backup, &mut journal) {
        Ok(()) => Ok(()),
        Err(err) => {
            warn!("Commit into {} failed, restoring previous files", project_root.display());
            journal.rollback();
            Err(err)
        }
    }
}

fn move_files(staging: &Path, project_root: &Path, backup: &Path, journal: &mut Journal) -> Result<()> {
    for entry in WalkDir::new(staging).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Filesystem {
            message: format!("Failed to walk staging directory: {}", e),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(staging)
            .map_err(|e| Error::Filesystem {
                message: format!("Unexpected staged path '{}': {}", entry.path().display(), e),
            })?;
        let target = project_root.join(relative);
        journal.create_parents(project_root, &target)?;

        let parked = if fs::symlink_metadata(&target).is_ok() {
            let parked = backup.join(relative);
            if let Some(parent) = parked.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::Filesystem {
                    message: format!("Failed to create directory '{}': {}", parent.display(), e),
                })?;
            }
            fs::rename(&target, &parked).map_err(|e| Error::Filesystem {
                message: format!("Failed to back up '{}': {}", target.display(), e),
            })?;
            Some(parked)
        } else {
            None
        };

        if let Err(e) = fs::rename(entry.path(), &target) {
            if let Some(parked) = parked {
                if let Err(e) = fs::rename(&parked, &target) {
                    warn!("Failed to restore '{}': {}", target.display(), e);
                }
            }
            return Err(Error::Filesystem {
                message: format!("Failed to move '{}' into place: {}", target.display(), e),
            });
        }
        journal.moved.push((target, parked));
    }
    Ok(())
}
