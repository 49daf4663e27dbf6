//! Merge points shared by every module of a composition
//!
//! Each submodule owns one artifact that several modules may contribute to:
//!
//! - [`manifest`] - dependencies, dev dependencies and scripts
//! - [`ignore`] - labeled ignore-file blocks
//! - [`precommit`] - staged-files filters and their commands
//! - [`anchor`] - anchor-relative text insertion into existing files
//!
//! The JSON helpers below are shared by the manifest and pre-commit renderers,
//! which both merge their model into a document a module may already have
//! materialized.

pub mod anchor;
pub mod ignore;
pub mod manifest;
pub mod precommit;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value as JsonValue};

use crate::config::Indentation;
use crate::error::{Error, Result};

pub use anchor::insert as insert_at_anchor;
pub use ignore::IgnoreFileAggregator;
pub use manifest::ManifestModel;
pub use precommit::PreCommitAggregator;

/// Parse an existing JSON document that must be an object
///
/// `None` yields an empty object.
pub(crate) fn parse_json_object(existing: Option<&str>, path: &str) -> Result<Map<String, JsonValue>> {
    let Some(content) = existing else {
        return Ok(Map::new());
    };
    if content.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<JsonValue>(content) {
        Ok(JsonValue::Object(map)) => Ok(map),
        Ok(_) => Err(Error::Manifest {
            path: path.to_string(),
            message: "top-level value must be an object".to_string(),
        }),
        Err(err) => Err(Error::Manifest {
            path: path.to_string(),
            message: format!("not valid JSON: {}", err),
        }),
    }
}

/// The object stored under `key`, created at the end when missing
pub(crate) fn object_entry<'a>(
    document: &'a mut Map<String, JsonValue>,
    key: &str,
    path: &str,
) -> Result<&'a mut Map<String, JsonValue>> {
    document
        .entry(key.to_string())
        .or_insert_with(|| JsonValue::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| Error::Manifest {
            path: path.to_string(),
            message: format!("'{}' must be an object", key),
        })
}

/// Pretty-print with the configured indentation and a trailing newline
pub(crate) fn to_json_string(value: &JsonValue, indentation: Indentation) -> Result<String> {
    let indent = indentation.spaces();
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(indent.as_bytes()));
    value
        .serialize(&mut serializer)
        .map_err(|err| Error::Serialization {
            message: format!("failed to serialize JSON: {}", err),
        })?;
    let mut content = String::from_utf8(buffer).map_err(|err| Error::Serialization {
        message: format!("serialized JSON is not UTF-8: {}", err),
    })?;
    content.push('\n');
    Ok(content)
}
