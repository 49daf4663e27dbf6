//! Pre-commit actions
//!
//! Modules map staged-file filters (globs such as `*.{ts,vue}`) to ordered
//! commands. The merged table is rendered as a JSON object into the
//! configured pre-commit file.

use indexmap::IndexMap;
use serde_json::Value as JsonValue;

use crate::config::Indentation;
use crate::error::{Error, Result};
use crate::module::PreCommitAction;

use super::{parse_json_object, to_json_string};

/// Filter to commands, in first-declared order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreCommitAggregator {
    entries: IndexMap<String, Vec<String>>,
}

impl PreCommitAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge actions; the same filter with other commands is a conflict
    pub fn merge(&mut self, actions: &[PreCommitAction]) -> Result<()> {
        for action in actions {
            match self.entries.get(&action.filter) {
                Some(existing) if *existing == action.commands => {}
                Some(existing) => {
                    return Err(Error::DuplicatePreCommitFilter {
                        filter: action.filter.clone(),
                        existing: existing.join(", "),
                        requested: action.commands.join(", "),
                    })
                }
                None => {
                    self.entries
                        .insert(action.filter.clone(), action.commands.clone());
                }
            }
        }
        Ok(())
    }

    pub fn entries(&self) -> &IndexMap<String, Vec<String>> {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// File content merged into `existing`; `None` when nothing was declared
    pub fn render(
        &self,
        existing: Option<&str>,
        path: &str,
        indentation: Indentation,
    ) -> Result<Option<String>> {
        if self.is_empty() {
            return Ok(None);
        }
        let mut document = parse_json_object(existing, path)?;
        for (filter, commands) in &self.entries {
            let value = match commands.as_slice() {
                [single] => JsonValue::String(single.clone()),
                many => JsonValue::Array(many.iter().cloned().map(JsonValue::String).collect()),
            };
            document.insert(filter.clone(), value);
        }
        to_json_string(&JsonValue::Object(document), indentation).map(Some)
    }
}
