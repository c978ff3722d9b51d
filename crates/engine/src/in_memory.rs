//! In-memory registry backend
//!
//! [`InMemoryRegistry`] implements every collaborator trait over process
//! memory: entity documents keyed by `(entity type, id)` and audit records
//! keyed by audit collection name. It is used by the test suites and by
//! embedded callers that do not need durable storage.
//!
//! # Design
//!
//! - Documents are stored in their raw form; there is nothing to decrypt,
//!   so `skip_decryption` and `include_signatures` have no effect.
//! - `fields` restricts the entity body to the listed top-level fields.
//! - With the audit trail enabled, each successful create/update appends an
//!   [`AuditRecord`](registry_core::AuditRecord)-shaped row to
//!   `<type><separator><suffix>`.
//!
//! # Search filters
//!
//! `{"filters": {"<path>": {"<op>": <value>}}}` where `<path>` uses the
//! property path grammar and `<op>` is one of `eq`, `neq`, `contains`,
//! `startsWith`, `endsWith`. All conditions must hold. A filter without
//! `filters` matches every record.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::Utc;
use parking_lot::RwLock;
use registry_core::{
    value_at, Document, PropertyPath, RegistryConfig, RegistryError, RegistryResult,
};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::backend::{EntityReader, EntityWriter, ReadOptions, SearchQuery, SearchService};

/// Process-local entity and audit storage.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    config: RegistryConfig,
    /// entity type -> entity id -> full document
    entities: RwLock<HashMap<String, HashMap<String, Value>>>,
    /// audit collection -> records, oldest first
    audit: RwLock<HashMap<String, Vec<Value>>>,
    audit_trail: bool,
    writes: AtomicUsize,
}

impl InMemoryRegistry {
    /// Create an empty registry.
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Record an audit row for every create and update (builder pattern).
    pub fn with_audit_trail(mut self) -> Self {
        self.audit_trail = true;
        self
    }

    /// Store a new entity and return its generated identifier.
    ///
    /// The identifier is also written into the entity body under the
    /// configured uuid property name.
    pub fn create_entity(&self, entity_type: &str, body: Document) -> RegistryResult<String> {
        let mut body = match body.into_inner() {
            Value::Object(map) => map,
            _ => {
                return Err(RegistryError::InvalidDocument {
                    entity_type: entity_type.to_string(),
                    reason: "entity body must be an object".to_string(),
                })
            }
        };
        let id = Uuid::new_v4().to_string();
        body.insert(
            self.config.uuid_property_name.clone(),
            Value::String(id.clone()),
        );

        let mut root = Map::new();
        root.insert(entity_type.to_string(), Value::Object(body));
        let root = Value::Object(root);

        self.append_audit(entity_type, &id, "ADD", None, &root);
        self.entities
            .write()
            .entry(entity_type.to_string())
            .or_default()
            .insert(id.clone(), root);
        tracing::debug!(target: "registry::store", entity_type = %entity_type, entity_id = %id, "Entity created");
        Ok(id)
    }

    /// Store `document` as-is under `(entity_type, entity_id)`.
    ///
    /// Replaces any existing document and records no audit row.
    pub fn insert_entity(&self, entity_type: &str, entity_id: &str, document: Document) {
        self.entities
            .write()
            .entry(entity_type.to_string())
            .or_default()
            .insert(entity_id.to_string(), document.into_inner());
    }

    /// Current stored document, if any.
    pub fn get_entity(&self, entity_type: &str, entity_id: &str) -> Option<Document> {
        self.entities
            .read()
            .get(entity_type)
            .and_then(|by_id| by_id.get(entity_id))
            .cloned()
            .map(Document::from)
    }

    /// Append a raw record to an audit collection.
    pub fn insert_audit_record(&self, collection: &str, record: Document) {
        self.audit
            .write()
            .entry(collection.to_string())
            .or_default()
            .push(record.into_inner());
    }

    /// Records currently held in an audit collection.
    pub fn audit_records(&self, collection: &str) -> Vec<Document> {
        self.audit
            .read()
            .get(collection)
            .map(|records| records.iter().cloned().map(Document::from).collect())
            .unwrap_or_default()
    }

    /// Number of successful `update_entity` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn append_audit(
        &self,
        entity_type: &str,
        entity_id: &str,
        action: &str,
        before: Option<&Value>,
        after: &Value,
    ) {
        if !self.audit_trail {
            return;
        }
        let collection = self.config.audit_collection(entity_type);
        let now = Utc::now();
        let mut record = Map::new();
        record.insert("auditId".into(), json!(Uuid::new_v4().to_string()));
        record.insert("recordId".into(), json!(entity_id));
        record.insert(
            "timeStamp".into(),
            json!(now.format("%Y-%m-%d %H:%M:%S%.3f").to_string()),
        );
        record.insert("date".into(), json!(now.timestamp_millis()));
        record.insert("@type".into(), json!(collection));
        record.insert("action".into(), json!(action));
        record.insert(
            "auditJson".into(),
            Value::Array(top_level_diff(entity_type, before, after)),
        );
        record.insert(
            self.config.uuid_property_name.clone(),
            json!(Uuid::new_v4().to_string()),
        );
        record.insert("userId".into(), json!(""));
        record.insert("transactionId".into(), json!([]));

        self.audit
            .write()
            .entry(collection)
            .or_default()
            .push(Value::Object(record));
    }
}

/// `{op, path}` entries for top-level body fields that changed.
fn top_level_diff(entity_type: &str, before: Option<&Value>, after: &Value) -> Vec<Value> {
    let empty = Map::new();
    let old = before
        .and_then(|doc| doc.get(entity_type))
        .and_then(Value::as_object)
        .unwrap_or(&empty);
    let new = after
        .get(entity_type)
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    let mut ops = Vec::new();
    for (field, value) in new {
        let op = match old.get(field) {
            None => "add",
            Some(prev) if prev != value => "replace",
            Some(_) => continue,
        };
        ops.push(json!({"op": op, "path": format!("/{}/{}", entity_type, field)}));
    }
    for field in old.keys() {
        if !new.contains_key(field) {
            ops.push(json!({"op": "remove", "path": format!("/{}/{}", entity_type, field)}));
        }
    }
    ops
}

impl EntityReader for InMemoryRegistry {
    fn read_entity(
        &self,
        entity_type: &str,
        entity_id: &str,
        options: &ReadOptions,
    ) -> RegistryResult<Document> {
        let mut document = self
            .get_entity(entity_type, entity_id)
            .ok_or_else(|| RegistryError::NotFound {
                entity_type: entity_type.to_string(),
                entity_id: entity_id.to_string(),
            })?;

        if let Some(fields) = &options.fields {
            if let Some(Value::Object(body)) = document.get_mut(entity_type) {
                body.retain(|name, _| fields.contains(name));
            }
        }
        Ok(document)
    }
}

impl EntityWriter for InMemoryRegistry {
    fn update_entity(
        &self,
        entity_type: &str,
        entity_id: &str,
        serialized: &str,
    ) -> RegistryResult<()> {
        let document: Value = serde_json::from_str(serialized)?;

        let previous = {
            let mut entities = self.entities.write();
            let slot = entities
                .get_mut(entity_type)
                .and_then(|by_id| by_id.get_mut(entity_id))
                .ok_or_else(|| RegistryError::NotFound {
                    entity_type: entity_type.to_string(),
                    entity_id: entity_id.to_string(),
                })?;
            std::mem::replace(slot, document.clone())
        };

        self.writes.fetch_add(1, Ordering::SeqCst);
        self.append_audit(entity_type, entity_id, "UPDATE", Some(&previous), &document);
        Ok(())
    }
}

impl SearchService for InMemoryRegistry {
    fn search(&self, query: &SearchQuery) -> RegistryResult<Vec<Document>> {
        let filters = match query.filter.get("filters") {
            None | Some(Value::Null) => None,
            Some(Value::Object(filters)) => Some(filters),
            Some(_) => {
                return Err(RegistryError::InvalidQuery {
                    reason: "'filters' must be an object".to_string(),
                })
            }
        };
        let conditions = compile_filters(filters)?;

        // Audit collections first, then live entities (matched on their body)
        if let Some(records) = self.audit.read().get(&query.collection) {
            return Ok(records
                .iter()
                .filter(|record| conditions.iter().all(|c| c.matches(record)))
                .cloned()
                .map(Document::from)
                .collect());
        }

        let entities = self.entities.read();
        let mut found = Vec::new();
        if let Some(by_id) = entities.get(&query.collection) {
            for document in by_id.values() {
                let body = document.get(&query.collection).unwrap_or(&Value::Null);
                if conditions.iter().all(|c| c.matches(body)) {
                    found.push(Document::from(document.clone()));
                }
            }
        }
        Ok(found)
    }
}

/// Comparison applied to the value found at a filter path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterOp {
    Eq,
    Neq,
    Contains,
    StartsWith,
    EndsWith,
}

impl FilterOp {
    fn parse(name: &str) -> RegistryResult<Self> {
        match name {
            "eq" => Ok(FilterOp::Eq),
            "neq" => Ok(FilterOp::Neq),
            "contains" => Ok(FilterOp::Contains),
            "startsWith" => Ok(FilterOp::StartsWith),
            "endsWith" => Ok(FilterOp::EndsWith),
            other => Err(RegistryError::InvalidQuery {
                reason: format!("unsupported filter operator '{}'", other),
            }),
        }
    }
}

#[derive(Debug)]
struct Condition {
    path: PropertyPath,
    op: FilterOp,
    expected: Value,
}

impl Condition {
    fn matches(&self, record: &Value) -> bool {
        let actual = value_at(record, &self.path);
        match self.op {
            FilterOp::Eq => actual == Some(&self.expected),
            FilterOp::Neq => actual != Some(&self.expected),
            FilterOp::Contains => match (actual, &self.expected) {
                (Some(Value::String(s)), Value::String(needle)) => s.contains(needle.as_str()),
                (Some(Value::Array(items)), expected) => items.contains(expected),
                _ => false,
            },
            FilterOp::StartsWith => match (actual, &self.expected) {
                (Some(Value::String(s)), Value::String(prefix)) => s.starts_with(prefix.as_str()),
                _ => false,
            },
            FilterOp::EndsWith => match (actual, &self.expected) {
                (Some(Value::String(s)), Value::String(suffix)) => s.ends_with(suffix.as_str()),
                _ => false,
            },
        }
    }
}

fn compile_filters(filters: Option<&Map<String, Value>>) -> RegistryResult<Vec<Condition>> {
    let mut conditions = Vec::new();
    let filters = match filters {
        Some(filters) => filters,
        None => return Ok(conditions),
    };
    for (field, ops) in filters {
        let path: PropertyPath = field.parse().map_err(|e| RegistryError::InvalidQuery {
            reason: format!("filter path '{}': {}", field, e),
        })?;
        let ops = ops.as_object().ok_or_else(|| RegistryError::InvalidQuery {
            reason: format!("filter for '{}' must map operators to values", field),
        })?;
        for (op, expected) in ops {
            conditions.push(Condition {
                path: path.clone(),
                op: FilterOp::parse(op)?,
                expected: expected.clone(),
            });
        }
    }
    Ok(conditions)
}
