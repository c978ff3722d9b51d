//! Path resolution against an entity body.
//!
//! [`resolve`] walks the container segments of a [`PropertyPath`] from a
//! document root and hands back an exclusive borrow of the container that
//! holds the terminal slot, together with the terminal segment. What happens
//! at the terminal slot is decided by the mutator.
//!
//! ## Container creation
//!
//! When `create_missing` is set, an absent field (or the array position one
//! past the end) is filled with an empty container before descending. The
//! kind of the new container follows the *next* segment:
//!
//! | Next segment | Created container |
//! |--------------|-------------------|
//! | `Field`      | object            |
//! | `Index`/`Append` | array         |
//!
//! ## Errors
//!
//! | Condition | Error |
//! |-----------|-------|
//! | Empty path, non-terminal append marker | `InvalidPath` |
//! | Absent field, creation disabled | `PathNotFound` |
//! | Index beyond bounds (or at bounds without creation) | `PathOutOfRange` |
//! | Field on array/leaf, index on object/leaf | `PathTypeConflict` |

use registry_core::{NodeKind, PathSegment, PropertyPath, RegistryError, RegistryResult};
use serde_json::{Map, Value};

/// Container holding the terminal slot, plus the terminal segment.
#[derive(Debug)]
pub struct Resolved<'doc, 'path> {
    /// Object or array node that owns the terminal slot
    pub container: &'doc mut Value,
    /// Last segment of the path
    pub terminal: &'path PathSegment,
}

/// Empty container matching what `next` selects.
fn empty_container_for(next: &PathSegment) -> Value {
    if next.selects_array() {
        Value::Array(Vec::new())
    } else {
        Value::Object(Map::new())
    }
}

/// Kind of node a segment must be applied to.
pub(crate) fn expected_kind(segment: &PathSegment) -> NodeKind {
    if segment.is_field() {
        NodeKind::Object
    } else {
        NodeKind::Array
    }
}

pub(crate) fn type_conflict(
    path: &PropertyPath,
    segment: &PathSegment,
    actual: &Value,
) -> RegistryError {
    RegistryError::PathTypeConflict {
        path: path.to_string(),
        segment: segment.to_string(),
        expected: expected_kind(segment),
        actual: NodeKind::of(actual),
    }
}

/// Resolve `path` against `root`.
///
/// Returns the container of the terminal slot. With `create_missing` the
/// walk may insert empty containers into `root`; callers that need the
/// original untouched must resolve against a working copy.
pub fn resolve<'doc, 'path>(
    root: &'doc mut Value,
    path: &'path PropertyPath,
    create_missing: bool,
) -> RegistryResult<Resolved<'doc, 'path>> {
    let segments = path.segments();
    let (terminal, containers) = segments.split_last().ok_or_else(|| RegistryError::InvalidPath {
        path: String::new(),
        reason: "path is empty".to_string(),
    })?;

    let mut current = root;
    for (i, segment) in containers.iter().enumerate() {
        // containers[i + 1] or the terminal segment
        let next = segments.get(i + 1).unwrap_or(terminal);
        current = descend(current, segment, next, create_missing, path)?;
    }

    Ok(Resolved {
        container: current,
        terminal,
    })
}

/// One container step of the walk.
fn descend<'doc>(
    node: &'doc mut Value,
    segment: &PathSegment,
    next: &PathSegment,
    create_missing: bool,
    path: &PropertyPath,
) -> RegistryResult<&'doc mut Value> {
    match segment {
        PathSegment::Field(name) => {
            let map = match node {
                Value::Object(map) => map,
                other => return Err(type_conflict(path, segment, other)),
            };
            if !map.contains_key(name) {
                if !create_missing {
                    return Err(RegistryError::PathNotFound {
                        path: path.to_string(),
                        field: name.clone(),
                    });
                }
                map.insert(name.clone(), empty_container_for(next));
            }
            map.get_mut(name).ok_or_else(|| RegistryError::PathNotFound {
                path: path.to_string(),
                field: name.clone(),
            })
        }
        PathSegment::Index(idx) => {
            let items = match node {
                Value::Array(items) => items,
                other => return Err(type_conflict(path, segment, other)),
            };
            let len = items.len();
            if *idx == len && create_missing {
                items.push(empty_container_for(next));
            }
            items
                .get_mut(*idx)
                .ok_or(RegistryError::PathOutOfRange {
                    path: path.to_string(),
                    index: *idx,
                    len,
                })
        }
        PathSegment::Append => Err(RegistryError::InvalidPath {
            path: path.to_string(),
            reason: "append marker '[-]' must be the last segment".to_string(),
        }),
    }
}
