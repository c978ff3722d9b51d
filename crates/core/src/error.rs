//! Registry error types
//!
//! Every failure the core can report is a [`RegistryError`]. Errors are
//! surfaced to the immediate caller unmodified: the core performs no retries
//! and no partial commits, so any error raised before the final write leaves
//! the backend untouched.

use crate::json::{NodeKind, PathParseError};
use thiserror::Error;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Boxed source error from a collaborator
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by the path engine, the audit rewriter and collaborators.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Malformed path syntax. Reported before any collaborator call.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath {
        /// Path text as supplied
        path: String,
        /// Parser diagnostic
        reason: String,
    },

    /// A container field is absent and the operation may not create it
    #[error("path '{path}' not found: field '{field}' is absent")]
    PathNotFound {
        /// Full path
        path: String,
        /// First absent field
        field: String,
    },

    /// A container index is beyond the array bounds
    #[error("path '{path}' out of range: index {index} on array of length {len}")]
    PathOutOfRange {
        /// Full path
        path: String,
        /// Requested index
        index: usize,
        /// Array length at that point
        len: usize,
    },

    /// The document shape is incompatible with the requested path
    #[error("path '{path}' conflicts with document shape: segment '{segment}' expects {expected}, found {actual}")]
    PathTypeConflict {
        /// Full path
        path: String,
        /// Segment that could not be applied
        segment: String,
        /// Node kind the segment needs
        expected: NodeKind,
        /// Node kind found in the document
        actual: NodeKind,
    },

    /// ADD against a slot that already holds a value
    #[error("property '{path}' already exists")]
    PropertyAlreadyExists {
        /// Full path
        path: String,
    },

    /// UPDATE against a slot that holds no value
    #[error("property '{path}' not found")]
    PropertyNotFound {
        /// Full path
        path: String,
    },

    /// The entity does not exist
    #[error("entity {entity_type}/{entity_id} not found")]
    NotFound {
        /// Entity type
        entity_type: String,
        /// Entity identifier
        entity_id: String,
    },

    /// Stored document is not rooted under its entity type
    #[error("document for {entity_type} is malformed: {reason}")]
    InvalidDocument {
        /// Entity type the document was read for
        entity_type: String,
        /// What is wrong with it
        reason: String,
    },

    /// Audit or search query is not of the expected shape
    #[error("invalid query: {reason}")]
    InvalidQuery {
        /// What is wrong with the query
        reason: String,
    },

    /// Read/update/search backend failure
    #[error("{operation} failed: {message}")]
    Collaborator {
        /// Collaborator call, e.g. `update_entity`
        operation: &'static str,
        /// Backend diagnostic
        message: String,
        /// Underlying backend error, if any
        #[source]
        source: Option<BoxedSource>,
    },

    /// Configuration could not be loaded
    #[error("configuration error: {reason}")]
    Config {
        /// Read or parse failure
        reason: String,
    },

    /// Document (de)serialization failure
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RegistryError {
    /// Build an [`RegistryError::InvalidPath`] from a parse failure
    pub fn invalid_path(path: impl Into<String>, err: PathParseError) -> Self {
        RegistryError::InvalidPath {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    /// Build a collaborator error without an underlying source
    pub fn collaborator(operation: &'static str, message: impl Into<String>) -> Self {
        RegistryError::Collaborator {
            operation,
            message: message.into(),
            source: None,
        }
    }

    /// Errors caused by the request itself rather than the backend
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            RegistryError::InvalidPath { .. }
                | RegistryError::PathNotFound { .. }
                | RegistryError::PathOutOfRange { .. }
                | RegistryError::PathTypeConflict { .. }
                | RegistryError::PropertyAlreadyExists { .. }
                | RegistryError::PropertyNotFound { .. }
                | RegistryError::InvalidQuery { .. }
        )
    }

    /// Entity or property absence
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RegistryError::NotFound { .. }
                | RegistryError::PathNotFound { .. }
                | RegistryError::PropertyNotFound { .. }
        )
    }
}
