//! # Error Suggestions
//!
//! This module provides helper functions for generating helpful error
//! messages with hints and suggestions. Following CLI recommendations,
//! errors should tell users what went wrong AND how to fix it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use seedwright::suggestions;
//!
//! // Instead of:
//! anyhow::bail!("Configuration file not found: {}", path.display());
//!
//! // Use:
//! return Err(suggestions::config_not_found(path));
//! ```

use std::path::Path;

use crate::error::Error;

/// Generate an error for when the project configuration file is not found.
///
/// Includes hints about:
/// - Creating a new config file
/// - Using the -c/--config flag
/// - Using the SEEDWRIGHT_CONFIG environment variable
pub fn config_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Configuration file not found: {path}\n\n\
         hint: Create a seedwright.yaml file with at least 'project-name:'\n\
         hint: Use -c/--config to specify a different path\n\
         hint: Set SEEDWRIGHT_CONFIG environment variable",
        path = path.display()
    )
}

/// Generate an error for a module definition file that does not exist.
pub fn module_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Module definition not found: {path}\n\n\
         hint: Pass every module with -m/--module, in application order\n\
         hint: Paths are relative to the current directory",
        path = path.display()
    )
}

/// Generate an error for when no module was given.
pub fn no_modules() -> anyhow::Error {
    anyhow::anyhow!(
        "No modules to compose\n\n\
         hint: Use -m/--module <FILE> once per module, core module first"
    )
}

/// Generate an error for a catalog directory that does not exist.
pub fn catalog_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Version catalog not found: {path}\n\n\
         hint: A catalog directory holds <tag>.json or <tag>/package.json files\n\
         hint: Use --catalog or SEEDWRIGHT_CATALOG to point at it",
        path = path.display()
    )
}

/// Generate an error for an invalid glob pattern.
///
/// Includes hints about glob syntax.
pub fn invalid_glob(pattern: &str, error: &glob::PatternError) -> anyhow::Error {
    anyhow::anyhow!(
        "Invalid glob pattern: {pattern}\n\
         error: {error}\n\n\
         hint: Use * for single path component, ** for recursive matching\n\
         hint: Use [abc] for character classes, [!abc] to negate\n\
         hint: Escape special characters with backslash"
    )
}

/// Generate an error for a package missing from the catalog.
///
/// Suggests a close ecosystem tag when the requested one looks like a typo.
pub fn unknown_package(ecosystem: &str, package: &str, known_ecosystems: &[&str]) -> anyhow::Error {
    let did_you_mean = if known_ecosystems.contains(&ecosystem) {
        String::new()
    } else {
        find_similar(ecosystem, known_ecosystems)
            .map(|s| format!("\nhint: Did you mean ecosystem '{s}'?"))
            .unwrap_or_default()
    };
    let known = if known_ecosystems.is_empty() {
        "none".to_string()
    } else {
        known_ecosystems.join(", ")
    };

    anyhow::anyhow!(
        "Unknown package '{package}' in version catalog '{ecosystem}'{did_you_mean}\n\n\
         Known ecosystems are: {known}\n\
         hint: Add the package to the catalog's dependencies or devDependencies"
    )
}

/// Hint for a composition error, if one applies.
pub fn composition_hint(error: &Error) -> Option<&'static str> {
    match error.root() {
        Error::DuplicateDestination { .. } => {
            Some("Declare the later file with 'overwrite: true' if replacing it is intended")
        }
        Error::AnchorNotFound { .. } | Error::TargetMissing { .. } => Some(
            "Modules whose edits target another module's output must be listed after it; \
             mark the replacement 'optional: true' if the target may be absent",
        ),
        Error::AmbiguousAnchor { .. } => Some("Use a longer needle that occurs exactly once"),
        Error::DuplicateDependency { .. } | Error::DuplicateScript { .. } => {
            Some("Two modules disagree; align their declarations or drop one of them")
        }
        Error::PathTraversal { .. } => {
            Some("Destinations must be relative paths inside the project root")
        }
        _ => None,
    }
}

/// Find a similar string from a list of candidates using edit distance.
///
/// Returns Some(candidate) if a close match is found (edit distance <= 2).
fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = edit_distance(input, candidate);
            if distance <= 2 && distance < input.len() {
                Some((candidate, distance))
            } else {
                None
            }
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Calculate the Levenshtein edit distance between two strings.
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut previous: Vec<usize> = (0..=b_len).collect();
    let mut current = vec![0usize; b_len + 1];
    for i in 1..=a_len {
        current[0] = i;
        for j in 1..=b_len {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            current[j] = (previous[j] + 1)
                .min(current[j - 1] + 1)
                .min(previous[j - 1] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b_len]
}
