//! Path validation utilities for module declarations
//!
//! Every destination, anchor target and source locator declared by a module
//! goes through [`normalize_relative`] before it is used, so the rest of the
//! pipeline only ever sees clean `a/b/c` paths that stay inside their root.

use std::path::PathBuf;

use crate::error::{Error, Result};

/// Normalize a relative path declared by a module
///
/// - Backslashes are treated as separators.
/// - Empty segments and `.` segments are dropped.
/// - Empty paths, absolute paths, drive-prefixed paths and any `..` segment
///   are rejected with [`Error::PathTraversal`].
pub fn normalize_relative(raw: &str) -> Result<PathBuf> {
    let unified = raw.replace('\\', "/");
    let trimmed = unified.trim();

    if trimmed.is_empty() {
        return Err(traversal(raw, "path is empty"));
    }
    if trimmed.starts_with('/') {
        return Err(traversal(raw, "absolute paths are not allowed"));
    }
    if has_drive_prefix(trimmed) {
        return Err(traversal(raw, "drive-prefixed paths are not allowed"));
    }

    let mut segments = Vec::new();
    for segment in trimmed.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return Err(traversal(raw, "'..' segments are not allowed")),
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        return Err(traversal(raw, "path does not name a file"));
    }

    Ok(PathBuf::from(segments.join("/")))
}

/// Join a folder and a file name with a single separator
///
/// Used for batches where one folder prefix is shared by many entries. A `.`
/// folder means the root.
pub fn join(folder: &str, name: &str) -> String {
    let folder = folder.trim_end_matches(['/', '\\']);
    if folder.is_empty() || folder == "." {
        name.to_string()
    } else {
        format!("{}/{}", folder, name)
    }
}

/// Render a normalized path with forward slashes for messages and keys
pub fn display(path: &std::path::Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

fn traversal(path: &str, reason: &str) -> Error {
    Error::PathTraversal {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}
