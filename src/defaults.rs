//! Default values for seedwright configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// Project configuration file looked up when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "seedwright.yaml";

/// Returns the default version catalog directory.
///
/// Uses the platform-appropriate configuration directory:
/// - Linux: `~/.config/seedwright/catalog` (XDG Base Directory)
/// - macOS: `~/Library/Application Support/seedwright/catalog`
/// - Windows: `{FOLDERID_RoamingAppData}\seedwright\catalog`
///
/// Falls back to `.seedwright/catalog` in the current directory if the
/// platform configuration directory cannot be determined.
///
/// This can be overridden by the `--catalog` CLI flag or the
/// `SEEDWRIGHT_CATALOG` environment variable.
pub fn default_catalog_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("seedwright"))
        .unwrap_or_else(|| PathBuf::from(".seedwright"))
        .join("catalog")
}
