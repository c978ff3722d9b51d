//! Audit-log retrieval
//!
//! Rewrites a search keyed by entity type into the equivalent search against
//! each type's audit collection, and re-keys the results by collection name.
//!
//! ```text
//! {"Teacher": {"filters": {"recordId": {"eq": "12c6..."}}}}
//!   -> search(collection = "Teacher_Audit", filter = {"filters": {...}})
//!   -> {"Teacher_Audit": [ {...audit record...} ]}
//! ```
//!
//! Entity types are processed independently, in query order. The first
//! failure aborts the whole call; no partial result is returned.

use std::sync::Arc;

use registry_core::{AuditRecord, Document, RegistryConfig, RegistryError, RegistryResult};
use serde_json::{Map, Value};

use crate::backend::{IdentityView, SearchQuery, SearchService, ViewTemplates};

/// Records returned for one audit collection.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditCollection {
    /// Audit collection name, e.g. `Teacher_Audit`
    pub key: String,
    /// Matching records after view-template shaping
    pub records: Vec<Document>,
}

/// Result of [`AuditFilterRewriter::get_audit_log`], keyed by audit collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditQueryResult {
    collections: Vec<AuditCollection>,
}

impl AuditQueryResult {
    /// Records under `key`; None if the key was not part of the query
    pub fn get(&self, key: &str) -> Option<&[Document]> {
        self.collections
            .iter()
            .find(|c| c.key == key)
            .map(|c| c.records.as_slice())
    }

    /// Audit collection names, in query order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.collections.iter().map(|c| c.key.as_str())
    }

    /// Number of collections in the result
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    /// True if the query named no entity types
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Typed audit records under `key` (empty if the key is absent)
    pub fn records(&self, key: &str) -> RegistryResult<Vec<AuditRecord>> {
        self.get(key)
            .unwrap_or_default()
            .iter()
            .map(|doc| serde_json::from_value(doc.as_inner().clone()).map_err(RegistryError::from))
            .collect()
    }

    /// Result envelope: `{ "<type>_Audit": [records...], ... }`
    pub fn into_document(self) -> Document {
        let mut envelope = Map::new();
        for collection in self.collections {
            envelope.insert(
                collection.key,
                Value::Array(
                    collection
                        .records
                        .into_iter()
                        .map(Document::into_inner)
                        .collect(),
                ),
            );
        }
        Document::from(Value::Object(envelope))
    }
}

impl IntoIterator for AuditQueryResult {
    type Item = AuditCollection;
    type IntoIter = std::vec::IntoIter<AuditCollection>;

    fn into_iter(self) -> Self::IntoIter {
        self.collections.into_iter()
    }
}

/// Translates entity-type searches into audit-collection searches.
#[derive(Clone)]
pub struct AuditFilterRewriter {
    search: Arc<dyn SearchService>,
    views: Arc<dyn ViewTemplates>,
    config: RegistryConfig,
}

impl AuditFilterRewriter {
    /// Create a rewriter with no view templates.
    pub fn new(search: Arc<dyn SearchService>, config: RegistryConfig) -> Self {
        Self {
            search,
            views: Arc::new(IdentityView),
            config,
        }
    }

    /// Shape returned records with `views` (builder pattern).
    pub fn with_views(mut self, views: Arc<dyn ViewTemplates>) -> Self {
        self.views = views;
        self
    }

    /// Configuration used for audit collection naming
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Fetch the audit trail for every entity type named in `query`.
    ///
    /// `query` maps entity type to a filter sub-document, which is forwarded
    /// unchanged to the audit collection of that type. Every queried type
    /// appears in the result, with an empty list when nothing matched.
    /// Records are shaped by the view template of their entity type.
    ///
    /// ## Errors
    ///
    /// - `InvalidQuery`: `query` is not an object
    /// - anything returned by the search collaborator or view templates
    pub fn get_audit_log(&self, query: &Document) -> RegistryResult<AuditQueryResult> {
        let entries = query.as_object().ok_or_else(|| RegistryError::InvalidQuery {
            reason: "audit query must be an object keyed by entity type".to_string(),
        })?;

        let mut result = AuditQueryResult::default();
        for (entity_type, filter) in entries {
            let audit_key = self.config.audit_collection(entity_type);
            let search_query = SearchQuery {
                collection: audit_key.clone(),
                filter: Document::from(filter.clone()),
            };

            let records = match self.search.search(&search_query) {
                Ok(records) => records,
                Err(e) => {
                    tracing::warn!(
                        target: "registry::audit",
                        entity_type = %entity_type,
                        collection = %audit_key,
                        error = %e,
                        "Audit search failed"
                    );
                    return Err(e);
                }
            };

            let records = records
                .into_iter()
                .map(|record| self.views.apply(entity_type, record))
                .collect::<RegistryResult<Vec<_>>>()?;

            tracing::debug!(
                target: "registry::audit",
                entity_type = %entity_type,
                collection = %audit_key,
                matched = records.len(),
                "Audit search complete"
            );

            result.collections.push(AuditCollection {
                key: audit_key,
                records,
            });
        }
        Ok(result)
    }
}
