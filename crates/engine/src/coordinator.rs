//! Single-property read-modify-write.
//!
//! [`EntityWriteCoordinator`] runs one logical property mutation:
//!
//! 1. parse the path (malformed paths never reach a collaborator)
//! 2. read the raw stored document
//! 3. resolve the path inside the entity body, creating containers for Add
//! 4. apply the value at the terminal slot
//! 5. serialize the whole document
//! 6. issue exactly one `update_entity` call
//!
//! Steps 1-5 have no external side effects, so any failure before step 6
//! leaves the backend unchanged. There are no retries. Between the read and
//! the write another writer may commit; the later full-document write wins.

use std::sync::Arc;

use registry_core::{
    Document, MutationMode, NodeKind, PropertyOperation, PropertyPath, RegistryError,
    RegistryResult,
};

use crate::backend::{EntityReader, EntityWriter, ReadOptions};
use crate::mutator;

/// Orchestrates read, resolve, mutate and write for one operation.
///
/// Holds no per-call state; one coordinator can serve concurrent requests.
#[derive(Clone)]
pub struct EntityWriteCoordinator {
    reader: Arc<dyn EntityReader>,
    writer: Arc<dyn EntityWriter>,
}

impl EntityWriteCoordinator {
    /// Create a coordinator over the given read and update collaborators.
    pub fn new(reader: Arc<dyn EntityReader>, writer: Arc<dyn EntityWriter>) -> Self {
        Self { reader, writer }
    }

    /// Apply `value` at `path` of entity `(entity_type, entity_id)`.
    ///
    /// ## Errors
    ///
    /// - `InvalidPath`: malformed path, reported before the read
    /// - `NotFound` / `Collaborator`: from the read or update collaborator
    /// - `InvalidDocument`: stored document is not rooted under `entity_type`
    /// - `PathNotFound` / `PathOutOfRange` / `PathTypeConflict`: path does not
    ///   resolve against the stored shape
    /// - `PropertyAlreadyExists` / `PropertyNotFound`: mode/existence mismatch
    pub fn apply_operation(
        &self,
        entity_type: &str,
        entity_id: &str,
        path: &str,
        value: Document,
        mode: MutationMode,
    ) -> RegistryResult<()> {
        let parsed: PropertyPath = path
            .parse()
            .map_err(|e| RegistryError::invalid_path(path, e))?;
        self.apply_parsed(entity_type, entity_id, &parsed, value, mode)
    }

    /// Apply a prepared [`PropertyOperation`].
    pub fn execute(&self, op: PropertyOperation) -> RegistryResult<()> {
        check_path_shape(&op.path)?;
        self.apply_parsed(&op.entity_type, &op.entity_id, &op.path, op.value, op.mode)
    }

    /// Add a property that must not exist yet.
    pub fn add_entity_property(
        &self,
        entity_type: &str,
        entity_id: &str,
        path: &str,
        value: Document,
    ) -> RegistryResult<()> {
        self.apply_operation(entity_type, entity_id, path, value, MutationMode::Add)
    }

    /// Replace a property that must already exist.
    pub fn update_entity_property(
        &self,
        entity_type: &str,
        entity_id: &str,
        path: &str,
        value: Document,
    ) -> RegistryResult<()> {
        self.apply_operation(entity_type, entity_id, path, value, MutationMode::Update)
    }

    fn apply_parsed(
        &self,
        entity_type: &str,
        entity_id: &str,
        path: &PropertyPath,
        value: Document,
        mode: MutationMode,
    ) -> RegistryResult<()> {
        let document = self
            .reader
            .read_entity(entity_type, entity_id, &ReadOptions::raw())?;

        let payload = match mutate_entity_document(document, entity_type, path, value, mode) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(
                    target: "registry::write",
                    entity_type = %entity_type,
                    entity_id = %entity_id,
                    path = %path,
                    mode = %mode,
                    error = %e,
                    "Property mutation rejected"
                );
                return Err(e);
            }
        };

        tracing::debug!(
            target: "registry::write",
            entity_type = %entity_type,
            entity_id = %entity_id,
            path = %path,
            mode = %mode,
            bytes = payload.len(),
            "Writing entity document"
        );
        self.writer.update_entity(entity_type, entity_id, &payload)
    }
}

/// Reject segment-built paths the textual grammar would not accept,
/// before any collaborator call.
fn check_path_shape(path: &PropertyPath) -> RegistryResult<()> {
    path.validate()
        .map_err(|e| RegistryError::invalid_path(path.to_string(), e))
}

/// Pure part of the write: mutate the entity body of `document` and return
/// the serialized full document.
///
/// `document` must be rooted under `entity_type`, e.g.
/// `{"Student": {"name": "A"}}`; `path` is relative to the entity body.
pub fn mutate_entity_document(
    document: Document,
    entity_type: &str,
    path: &PropertyPath,
    value: Document,
    mode: MutationMode,
) -> RegistryResult<String> {
    let mut root = document.into_inner();
    let body = match root.get_mut(entity_type) {
        Some(body) if body.is_object() => body,
        Some(other) => {
            return Err(RegistryError::InvalidDocument {
                entity_type: entity_type.to_string(),
                reason: format!("entity body is {}, expected object", NodeKind::of(other)),
            })
        }
        None => {
            return Err(RegistryError::InvalidDocument {
                entity_type: entity_type.to_string(),
                reason: format!("missing top-level key '{}'", entity_type),
            })
        }
    };

    // Writing back into the same slot keeps the body's key position
    let detached = Document::from(std::mem::take(body));
    *body = mutator::apply_to_document(detached, path, value, mode)?.into_inner();

    Ok(serde_json::to_string(&root)?)
}
