//! Shared helpers for the comprehensive suite.

use std::sync::Arc;

use entity_registry::registry_engine::EntityWriteCoordinator;
use entity_registry::{
    Document, EntityReader, EntityWriter, ReadOptions, RegistryError, RegistryResult,
};
use parking_lot::Mutex;
use serde_json::Value;

/// Install a test-friendly subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Store that always returns one fixed document and records every call.
pub struct RecordingStore {
    document: Value,
    reads: Mutex<Vec<ReadOptions>>,
    writes: Mutex<Vec<String>>,
}

impl RecordingStore {
    pub fn new(document: Value) -> Arc<Self> {
        Arc::new(Self {
            document,
            reads: Mutex::new(Vec::new()),
            writes: Mutex::new(Vec::new()),
        })
    }

    pub fn reads(&self) -> Vec<ReadOptions> {
        self.reads.lock().clone()
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().clone()
    }
}

impl EntityReader for RecordingStore {
    fn read_entity(
        &self,
        entity_type: &str,
        entity_id: &str,
        options: &ReadOptions,
    ) -> RegistryResult<Document> {
        self.reads.lock().push(options.clone());
        if entity_id == "missing" {
            return Err(RegistryError::NotFound {
                entity_type: entity_type.to_string(),
                entity_id: entity_id.to_string(),
            });
        }
        Ok(Document::from(self.document.clone()))
    }
}

impl EntityWriter for RecordingStore {
    fn update_entity(
        &self,
        _entity_type: &str,
        _entity_id: &str,
        serialized: &str,
    ) -> RegistryResult<()> {
        self.writes.lock().push(serialized.to_string());
        Ok(())
    }
}

/// Coordinator reading from and writing to `store`.
pub fn coordinator_over(store: &Arc<RecordingStore>) -> EntityWriteCoordinator {
    EntityWriteCoordinator::new(store.clone(), store.clone())
}

/// Parse a fixture file embedded with `include_str!`.
pub fn fixture(raw: &str) -> Value {
    serde_json::from_str(raw).expect("fixture is valid JSON")
}
