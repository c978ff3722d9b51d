//! Write and audit engine for the entity registry
//!
//! This crate implements the registry operations on top of the core types:
//! - resolver: walks a PropertyPath to the container that owns its final slot
//! - mutator: ADD/UPDATE of exactly one slot in that container
//! - coordinator: read, mutate, serialize, write for one entity
//! - audit: entity-type audit searches rewritten onto audit collections
//! - backend: collaborator traits for storage, search, and views
//! - in_memory: process-local backend implementing every collaborator
//!
//! Components are stateless apart from the collaborators they hold.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod audit;
pub mod backend;
pub mod coordinator;
pub mod in_memory;
pub mod mutator;
pub mod resolver;
pub mod view;

pub use audit::{AuditCollection, AuditFilterRewriter, AuditQueryResult};
pub use backend::{
    EntityReader, EntityWriter, IdentityView, ReadOptions, SearchQuery, SearchService,
    ViewTemplates,
};
pub use coordinator::{mutate_entity_document, EntityWriteCoordinator};
pub use in_memory::InMemoryRegistry;
pub use mutator::{apply, apply_to_document};
pub use resolver::{resolve, Resolved};
pub use view::ProjectionView;
