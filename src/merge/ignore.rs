//! Ignore-file aggregation
//!
//! Every module's ignore block becomes a labeled section of one document, in
//! module-application order:
//!
//! ```text
//! # Angular
//! .angular/
//! dist/
//!
//! # Vite
//! dist/
//!
//! ```
//!
//! Patterns are never deduplicated across blocks, so each section still shows
//! which module asked for which rule.

use crate::module::IgnoreBlock;

/// Growing ignore document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreFileAggregator {
    document: String,
    blocks: usize,
}

impl IgnoreFileAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append blocks in order
    pub fn merge(&mut self, blocks: &[IgnoreBlock]) {
        for block in blocks {
            if let Some(comment) = &block.comment {
                self.document.push_str("# ");
                self.document.push_str(comment);
                self.document.push('\n');
            }
            for pattern in &block.patterns {
                self.document.push_str(pattern);
                self.document.push('\n');
            }
            self.document.push('\n');
            self.blocks += 1;
        }
    }

    /// Number of blocks merged so far
    pub fn blocks(&self) -> usize {
        self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks == 0
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    /// Final file content, appended to `existing` when a module materialized one
    ///
    /// Returns `None` when nothing was merged.
    pub fn render(&self, existing: Option<&str>) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let mut content = existing.unwrap_or_default().to_string();
        if !content.is_empty() {
            if !content.ends_with('\n') {
                content.push('\n');
            }
            if !content.ends_with("\n\n") {
                content.push('\n');
            }
        }
        content.push_str(&self.document);
        Some(content)
    }
}
