//! Entity registry: property-path writes and audit-log retrieval.
//!
//! [`Registry`] wires the write coordinator and the audit rewriter to one
//! shared backend. Embedders with their own storage use the engine types
//! directly:
//!
//! ```ignore
//! use std::sync::Arc;
//! use entity_registry::registry_engine::{AuditFilterRewriter, EntityWriteCoordinator};
//!
//! let coordinator = EntityWriteCoordinator::new(store.clone(), store.clone());
//! let audit = AuditFilterRewriter::new(search, config);
//! ```

#![warn(missing_docs)]

use std::path::Path;
use std::sync::Arc;

pub mod types;

pub use types::*;

pub use registry_core;
pub use registry_engine;

use registry_engine::{AuditFilterRewriter, EntityWriteCoordinator, InMemoryRegistry};

/// Registry over an in-memory backend.
///
/// Cloning is cheap; clones share the same backend.
#[derive(Clone)]
pub struct Registry {
    store: Arc<InMemoryRegistry>,
    writes: EntityWriteCoordinator,
    audit: AuditFilterRewriter,
}

impl Registry {
    /// In-memory registry with an audit trail recorded on every write.
    pub fn in_memory(config: RegistryConfig) -> Self {
        let store = Arc::new(InMemoryRegistry::new(config.clone()).with_audit_trail());
        let writes = EntityWriteCoordinator::new(store.clone(), store.clone());
        let audit = AuditFilterRewriter::new(store.clone(), config);
        tracing::info!(
            target: "registry::open",
            audit_suffix = %audit.config().audit_suffix,
            "Registry opened"
        );
        Self {
            store,
            writes,
            audit,
        }
    }

    /// In-memory registry configured from a TOML file.
    pub fn open(config_path: impl AsRef<Path>) -> RegistryResult<Self> {
        let config = RegistryConfig::from_toml_file(config_path)?;
        Ok(Self::in_memory(config))
    }

    /// Shape audit results with `views` (builder pattern).
    pub fn with_views(mut self, views: Arc<dyn ViewTemplates>) -> Self {
        self.audit = self.audit.with_views(views);
        self
    }

    /// Active configuration
    pub fn config(&self) -> &RegistryConfig {
        self.audit.config()
    }

    /// Underlying backend
    pub fn store(&self) -> &InMemoryRegistry {
        &self.store
    }

    /// Create an entity; returns its generated identifier.
    pub fn create_entity(&self, entity_type: &str, body: Document) -> RegistryResult<String> {
        self.store.create_entity(entity_type, body)
    }

    /// Stored document for `(entity_type, entity_id)`.
    pub fn read_entity(&self, entity_type: &str, entity_id: &str) -> RegistryResult<Document> {
        self.store
            .read_entity(entity_type, entity_id, &ReadOptions::raw())
    }

    /// Add a new property at `path`. See [`EntityWriteCoordinator::apply_operation`].
    pub fn add_entity_property(
        &self,
        entity_type: &str,
        entity_id: &str,
        path: &str,
        value: impl Into<Document>,
    ) -> RegistryResult<()> {
        self.writes
            .add_entity_property(entity_type, entity_id, path, value.into())
    }

    /// Replace the existing property at `path`.
    pub fn update_entity_property(
        &self,
        entity_type: &str,
        entity_id: &str,
        path: &str,
        value: impl Into<Document>,
    ) -> RegistryResult<()> {
        self.writes
            .update_entity_property(entity_type, entity_id, path, value.into())
    }

    /// Execute a prepared operation.
    pub fn execute(&self, op: PropertyOperation) -> RegistryResult<()> {
        self.writes.execute(op)
    }

    /// Audit trail for every entity type named in `query`.
    pub fn get_audit_log(&self, query: &Document) -> RegistryResult<AuditQueryResult> {
        self.audit.get_audit_log(query)
    }
}
