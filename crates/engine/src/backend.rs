//! Collaborator contracts
//!
//! The core never talks to storage directly. Reads, writes, searches and
//! view rendering go through these traits, implemented by the persistence
//! layer (or by [`crate::InMemoryRegistry`] in tests and embedded use).
//!
//! ## Error Handling
//!
//! | Condition | Error |
//! |-----------|-------|
//! | Entity does not exist | `NotFound` |
//! | Backend failure | `Collaborator` |
//!
//! Errors returned by implementations are propagated to the caller unmodified.

use std::collections::BTreeSet;

use registry_core::{Document, RegistryResult};
use serde::{Deserialize, Serialize};

/// How an entity should be read.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReadOptions {
    /// Include signature blocks in the returned document
    pub include_signatures: bool,
    /// Restrict the entity body to these top-level fields
    pub fields: Option<BTreeSet<String>>,
    /// Return the raw stored form, without decryption or redaction
    pub skip_decryption: bool,
}

impl ReadOptions {
    /// Raw stored representation, as required for read-modify-write.
    pub fn raw() -> Self {
        Self {
            include_signatures: false,
            fields: None,
            skip_decryption: true,
        }
    }

    /// Restrict the read to the given top-level fields.
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }
}

/// Source of stored entity documents.
pub trait EntityReader: Send + Sync {
    /// Read the full document of one entity, rooted under its entity type.
    fn read_entity(
        &self,
        entity_type: &str,
        entity_id: &str,
        options: &ReadOptions,
    ) -> RegistryResult<Document>;
}

/// Sink for full-document replacements.
pub trait EntityWriter: Send + Sync {
    /// Replace the stored document of one entity with `serialized`.
    fn update_entity(&self, entity_type: &str, entity_id: &str, serialized: &str)
        -> RegistryResult<()>;
}

/// A filter submitted against one collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Live entity type or audit collection name
    pub collection: String,
    /// Filter sub-document, forwarded unchanged
    pub filter: Document,
}

/// Search over live and audit collections.
pub trait SearchService: Send + Sync {
    /// Raw records of `query.collection` matching `query.filter`.
    fn search(&self, query: &SearchQuery) -> RegistryResult<Vec<Document>>;
}

/// Post-processing applied to each search result.
pub trait ViewTemplates: Send + Sync {
    /// Shape `record` for callers of `entity_type`.
    fn apply(&self, entity_type: &str, record: Document) -> RegistryResult<Document>;
}

/// No templates configured: records pass through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityView;

impl ViewTemplates for IdentityView {
    fn apply(&self, _entity_type: &str, record: Document) -> RegistryResult<Document> {
        Ok(record)
    }
}
