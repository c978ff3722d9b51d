//! Core types for the entity registry
//!
//! This crate defines the shared vocabulary of the registry:
//! - Document / PropertyPath: entity records and paths into them
//! - PropertyOperation / MutationMode: one single-property mutation request
//! - RegistryError: the error taxonomy for every layer
//! - RegistryConfig: audit collection naming and identifier settings
//! - AuditRecord: typed view of an audit trail row

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod audit;
pub mod config;
pub mod error;
pub mod json;
pub mod operation;

pub use audit::{AuditAction, AuditRecord};
pub use config::RegistryConfig;
pub use error::{BoxedSource, RegistryError, RegistryResult};
pub use json::{value_at, Document, NodeKind, PathParseError, PathSegment, PropertyPath};
pub use operation::{MutationMode, PropertyOperation};
