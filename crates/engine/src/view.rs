//! Field-projection view templates.

use std::collections::HashMap;

use registry_core::{Document, RegistryResult};
use serde_json::{Map, Value};

use crate::backend::ViewTemplates;

/// Keeps only the listed top-level fields of records, per entity type.
///
/// Types without a template pass through unchanged. Kept fields appear in
/// template order; listed fields missing from a record are skipped.
#[derive(Debug, Clone, Default)]
pub struct ProjectionView {
    templates: HashMap<String, Vec<String>>,
}

impl ProjectionView {
    /// Create an empty view set (every record passes through).
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the fields to keep for `entity_type` (builder pattern).
    pub fn with_template<I, S>(mut self, entity_type: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.templates.insert(
            entity_type.into(),
            fields.into_iter().map(Into::into).collect(),
        );
        self
    }
}

impl ViewTemplates for ProjectionView {
    fn apply(&self, entity_type: &str, record: Document) -> RegistryResult<Document> {
        let fields = match self.templates.get(entity_type) {
            Some(fields) => fields,
            None => return Ok(record),
        };
        let mut source = match record.into_inner() {
            Value::Object(map) => map,
            other => return Ok(Document::from(other)),
        };
        let mut projected = Map::new();
        for field in fields {
            if let Some(value) = source.remove(field) {
                projected.insert(field.clone(), value);
            }
        }
        Ok(Document::from(Value::Object(projected)))
    }
}
