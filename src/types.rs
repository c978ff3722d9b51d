//! Public types for the registry API.
//!
//! This module re-exports types from the internal crates with a flat interface.

// Documents and paths
pub use registry_core::{Document, NodeKind, PathSegment, PropertyPath};

// Mutation requests
pub use registry_core::{MutationMode, PropertyOperation};

// Errors
pub use registry_core::{PathParseError, RegistryError, RegistryResult};

// Configuration and audit rows
pub use registry_core::{AuditAction, AuditRecord, RegistryConfig};

// Collaborator seams
pub use registry_engine::{
    EntityReader, EntityWriter, ReadOptions, SearchQuery, SearchService, ViewTemplates,
};

// Audit query results
pub use registry_engine::{AuditCollection, AuditQueryResult};
