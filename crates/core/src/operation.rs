//! Single-property mutation requests.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::json::{Document, PropertyPath};

/// Whether the terminal slot must be absent (Add) or present (Update).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MutationMode {
    /// Insert a value at an absent slot, creating missing containers
    Add,
    /// Replace the value at an existing slot
    Update,
}

impl MutationMode {
    /// Only Add may create missing containers along the path
    pub fn creates_missing(self) -> bool {
        matches!(self, MutationMode::Add)
    }
}

impl fmt::Display for MutationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationMode::Add => write!(f, "ADD"),
            MutationMode::Update => write!(f, "UPDATE"),
        }
    }
}

/// One logical mutation of one property of one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyOperation {
    /// Entity type, also the top-level key of the stored document
    pub entity_type: String,
    /// Entity identifier
    pub entity_id: String,
    /// Location of the property inside the entity body
    pub path: PropertyPath,
    /// New value
    pub value: Document,
    /// Add or Update
    pub mode: MutationMode,
}

impl PropertyOperation {
    /// Build an Add operation
    pub fn add(
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        path: PropertyPath,
        value: impl Into<Document>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            path,
            value: value.into(),
            mode: MutationMode::Add,
        }
    }

    /// Build an Update operation
    pub fn update(
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        path: PropertyPath,
        value: impl Into<Document>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            path,
            value: value.into(),
            mode: MutationMode::Update,
        }
    }
}
