//! Serialized project snapshots.
//!
//! The storage medium belongs to the host. This module only defines the
//! snapshot shape `{elements, projectName, orientation}` and converts it to
//! and from a [`Document`].

#[cfg(test)]
#[path = "persist_test.rs"]
mod persist_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::consts::DEFAULT_PROJECT_NAME;
use crate::doc::{Document, Element, ElementId, Orientation};

/// Errors from encoding or decoding a project snapshot.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("malformed project snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// The persisted form of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSnapshot {
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default = "default_project_name")]
    pub project_name: String,
    #[serde(default)]
    pub orientation: Orientation,
}

fn default_project_name() -> String {
    DEFAULT_PROJECT_NAME.to_owned()
}

impl From<&Document> for ProjectSnapshot {
    fn from(doc: &Document) -> Self {
        Self {
            elements: doc.snapshot(),
            project_name: doc.project_name.clone(),
            orientation: doc.orientation,
        }
    }
}

impl From<ProjectSnapshot> for Document {
    fn from(snapshot: ProjectSnapshot) -> Self {
        Document::from_parts(snapshot.elements, snapshot.project_name, snapshot.orientation)
    }
}

/// Encode a document as snapshot JSON.
///
/// # Errors
///
/// Returns [`PersistError::Malformed`] if serialization fails, which only
/// happens for non-finite coordinates.
pub fn to_json(doc: &Document) -> Result<String, PersistError> {
    Ok(serde_json::to_string(&ProjectSnapshot::from(doc))?)
}

/// Snapshot with elements left undecoded so each can fail on its own.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSnapshot {
    #[serde(default)]
    elements: Vec<Value>,
    #[serde(default = "default_project_name")]
    project_name: String,
    #[serde(default)]
    orientation: Orientation,
}

/// Decode snapshot JSON one element at a time.
///
/// Elements that do not decode are skipped with a warning. Legacy numeric
/// ids are replaced by fresh UUIDs, and `wallId` references to them are
/// rewritten to match.
///
/// # Errors
///
/// Returns [`PersistError::Malformed`] when the snapshot envelope itself
/// does not parse.
pub fn decode_snapshot(json: &str) -> Result<ProjectSnapshot, PersistError> {
    let raw: RawSnapshot = serde_json::from_str(json)?;

    let mut legacy_ids: HashMap<String, ElementId> = HashMap::new();
    for value in &raw.elements {
        if let Some(n) = value.get("id").filter(|id| id.is_number()) {
            legacy_ids.entry(n.to_string()).or_insert_with(Uuid::new_v4);
        }
    }

    let mut elements = Vec::with_capacity(raw.elements.len());
    for mut value in raw.elements {
        upgrade_legacy_ids(&mut value, &legacy_ids);
        match serde_json::from_value::<Element>(value) {
            Ok(el) => elements.push(el),
            Err(e) => tracing::warn!(error = %e, "skipping unreadable element"),
        }
    }
    if !legacy_ids.is_empty() {
        tracing::info!(count = legacy_ids.len(), "re-keyed legacy numeric ids");
    }

    Ok(ProjectSnapshot { elements, project_name: raw.project_name, orientation: raw.orientation })
}

fn upgrade_legacy_ids(value: &mut Value, legacy_ids: &HashMap<String, ElementId>) {
    let Some(fields) = value.as_object_mut() else {
        return;
    };
    for key in ["id", "wallId"] {
        let Some(slot) = fields.get_mut(key) else {
            continue;
        };
        if slot.is_number() {
            let id = legacy_ids.get(&slot.to_string()).copied().unwrap_or_else(Uuid::new_v4);
            *slot = Value::String(id.to_string());
        }
    }
}

/// Decode snapshot JSON into a document.
///
/// Unreadable elements are skipped and dangling door/window host references
/// are repaired on the way in.
///
/// # Errors
///
/// Returns [`PersistError::Malformed`] when the input does not parse.
pub fn parse_document(json: &str) -> Result<Document, PersistError> {
    let snapshot = decode_snapshot(json)?;
    let mut doc = Document::from(snapshot);
    let dropped = doc.repair();
    if dropped > 0 {
        tracing::warn!(dropped, "dropped doors/windows with no host wall");
    }
    Ok(doc)
}

/// Decode snapshot JSON, falling back to an empty document when it is
/// unreadable.
#[must_use]
pub fn load_document(json: &str) -> Document {
    match parse_document(json) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!(error = %e, "corrupt project snapshot; starting empty");
            Document::new()
        }
    }
}
