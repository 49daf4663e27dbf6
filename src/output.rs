//! # Output Configuration
//!
//! Controls how the CLI decorates its output. Status lines use a symbol when
//! colors are enabled and a bracketed tag otherwise, so logs captured from a
//! pipe stay greppable.
//!
//! ## Respecting User Preferences
//!
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! ## Usage
//!
//! ```
//! use seedwright::output::{OutputConfig, Status};
//!
//! let out = OutputConfig::from_env_and_flag("never");
//! assert_eq!(out.label(Status::Ok), "[OK]");
//! ```

use std::env;
use std::fmt::Display;

use console::style;

/// Output configuration for controlling colors and symbols.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and symbols should be used in output.
    pub use_color: bool,
}

/// Kind of a status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Error,
    Warning,
    Info,
    DryRun,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// `--color=always` overrides `NO_COLOR`; `--color=auto` disables colors
    /// when `NO_COLOR` is set, `CLICOLOR=0`, `TERM=dumb`, or stdout is not a
    /// TTY (unless `CLICOLOR_FORCE=1`).
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // presence alone disables colors, even when empty
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    /// Create a configuration with colors always enabled.
    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    /// Create a configuration with colors always disabled.
    pub fn without_color() -> Self {
        Self { use_color: false }
    }

    /// Prefix for a status line
    pub fn label(&self, status: Status) -> String {
        let (symbol, plain) = match status {
            Status::Ok => ("✔", "[OK]"),
            Status::Error => ("✘", "[ERR]"),
            Status::Warning => ("⚠", "[WARN]"),
            Status::Info => ("•", "[INFO]"),
            Status::DryRun => ("○", "[DRY-RUN]"),
        };
        if !self.use_color {
            return plain.to_string();
        }
        let styled = match status {
            Status::Ok => style(symbol).green(),
            Status::Error => style(symbol).red(),
            Status::Warning => style(symbol).yellow(),
            Status::Info | Status::DryRun => style(symbol).cyan(),
        };
        styled.force_styling(true).to_string()
    }

    /// Emphasize a path or key when colors are enabled
    pub fn emphasis<T: Display>(&self, value: T) -> String {
        if self.use_color {
            style(value).bold().force_styling(true).to_string()
        } else {
            value.to_string()
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}
