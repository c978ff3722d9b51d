//! Terminal-slot mutation.
//!
//! Applies an Add or Update at the slot selected by the terminal segment of a
//! resolved path. Field order of the containing object is preserved: Add
//! appends the new field at the end, Update replaces in place.

use registry_core::{
    Document, MutationMode, PathSegment, PropertyPath, RegistryError, RegistryResult,
};
use serde_json::Value;

use crate::resolver::{self, type_conflict};

/// Apply `value` at the terminal slot of `container`.
///
/// `path` is only used for error reporting.
pub fn apply(
    container: &mut Value,
    terminal: &PathSegment,
    value: Value,
    mode: MutationMode,
    path: &PropertyPath,
) -> RegistryResult<()> {
    match (container, terminal) {
        (Value::Object(map), PathSegment::Field(name)) => match mode {
            MutationMode::Add => {
                if map.contains_key(name) {
                    return Err(RegistryError::PropertyAlreadyExists {
                        path: path.to_string(),
                    });
                }
                map.insert(name.clone(), value);
                Ok(())
            }
            MutationMode::Update => match map.get_mut(name) {
                Some(slot) => {
                    *slot = value;
                    Ok(())
                }
                None => Err(RegistryError::PropertyNotFound {
                    path: path.to_string(),
                }),
            },
        },
        (Value::Array(items), PathSegment::Index(idx)) => match mode {
            MutationMode::Add => {
                if *idx > items.len() {
                    return Err(RegistryError::PathOutOfRange {
                        path: path.to_string(),
                        index: *idx,
                        len: items.len(),
                    });
                }
                items.insert(*idx, value);
                Ok(())
            }
            MutationMode::Update => match items.get_mut(*idx) {
                Some(slot) => {
                    *slot = value;
                    Ok(())
                }
                None => Err(RegistryError::PropertyNotFound {
                    path: path.to_string(),
                }),
            },
        },
        (Value::Array(items), PathSegment::Append) => match mode {
            MutationMode::Add => {
                items.push(value);
                Ok(())
            }
            MutationMode::Update => Err(RegistryError::PropertyNotFound {
                path: path.to_string(),
            }),
        },
        (other, segment) => Err(type_conflict(path, segment, other)),
    }
}

/// Resolve `path` in `document` and apply `value` there.
///
/// Consumes the working copy and returns the new root. On error the working
/// copy is dropped, so a caller that still holds the original never observes
/// a partially created container.
pub fn apply_to_document(
    mut document: Document,
    path: &PropertyPath,
    value: Document,
    mode: MutationMode,
) -> RegistryResult<Document> {
    let resolved = resolver::resolve(document.as_inner_mut(), path, mode.creates_missing())?;
    apply(
        resolved.container,
        resolved.terminal,
        value.into_inner(),
        mode,
        path,
    )?;
    Ok(document)
}
