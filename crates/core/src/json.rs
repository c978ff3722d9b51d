//! Document and property-path types
//!
//! This module defines the types the registry uses to address entity records:
//! - Document: Newtype wrapper around serde_json::Value (field order preserved)
//! - NodeKind: Object / Array / Leaf classification of a node
//! - PropertyPath: Path into an entity body (e.g., "address.permanent[2].pincode")
//! - PathSegment: Individual path component (Field, Index or Append)

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::str::FromStr;
use thiserror::Error;

/// Entity document, as read from and written back to storage.
///
/// Derefs to the wrapped `serde_json::Value`. The compact form from
/// [`Document::to_json_string`] is what the coordinator hands to the writer.
///
/// Object nodes keep insertion order, so a document read from storage and
/// written back serializes its untouched fields in the same order.
///
/// # Examples
///
/// ```
/// use registry_core::{Document, NodeKind};
///
/// let doc: Document = r#"{"Student":{"name":"A"}}"#.parse().unwrap();
/// assert_eq!(doc.kind(), NodeKind::Object);
/// assert_eq!(doc.to_json_string(), r#"{"Student":{"name":"A"}}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Value);

impl Document {
    /// `null`
    pub fn null() -> Self {
        Document(Value::Null)
    }

    /// `{}`
    pub fn object() -> Self {
        Document(Value::Object(serde_json::Map::new()))
    }

    /// `[]`
    pub fn array() -> Self {
        Document(Value::Array(Vec::new()))
    }

    /// Wrap a raw value
    pub fn from_value(value: Value) -> Self {
        Document(value)
    }

    /// Unwrap into the raw value
    pub fn into_inner(self) -> Value {
        self.0
    }

    /// Borrow the raw value
    pub fn as_inner(&self) -> &Value {
        &self.0
    }

    /// Mutably borrow the raw value
    pub fn as_inner_mut(&mut self) -> &mut Value {
        &mut self.0
    }

    /// Kind of the root node
    pub fn kind(&self) -> NodeKind {
        NodeKind::of(&self.0)
    }

    /// Serialize to compact JSON string (the canonical textual form)
    pub fn to_json_string(&self) -> String {
        self.0.to_string()
    }

    /// Look up the node addressed by `path`, starting at this node.
    ///
    /// Returns None when any segment is missing or addresses the wrong kind
    /// of node. The append marker never addresses an existing node.
    pub fn get_path(&self, path: &PropertyPath) -> Option<&Value> {
        value_at(&self.0, path)
    }
}

/// Look up the node addressed by `path` inside a raw JSON value.
///
/// See [`Document::get_path`].
pub fn value_at<'a>(root: &'a Value, path: &PropertyPath) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.segments() {
        current = match (segment, current) {
            (PathSegment::Field(name), Value::Object(map)) => map.get(name)?,
            (PathSegment::Index(idx), Value::Array(items)) => items.get(*idx)?,
            _ => return None,
        };
    }
    Some(current)
}

impl FromStr for Document {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s).map(Document)
    }
}

impl Deref for Document {
    type Target = Value;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Document {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Default is null
impl Default for Document {
    fn default() -> Self {
        Self::null()
    }
}

impl From<Value> for Document {
    fn from(v: Value) -> Self {
        Document(v)
    }
}

impl From<Document> for Value {
    fn from(v: Document) -> Self {
        v.0
    }
}

impl From<&str> for Document {
    fn from(v: &str) -> Self {
        Document(Value::String(v.to_string()))
    }
}

impl From<String> for Document {
    fn from(v: String) -> Self {
        Document(Value::String(v))
    }
}

impl From<i64> for Document {
    fn from(v: i64) -> Self {
        Document(Value::Number(v.into()))
    }
}

impl From<bool> for Document {
    fn from(v: bool) -> Self {
        Document(Value::Bool(v))
    }
}

/// Shape of a document node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Ordered mapping of field name to node
    Object,
    /// Ordered sequence of nodes
    Array,
    /// Scalar (string, number, bool, null)
    Leaf,
}

impl NodeKind {
    /// Classify a raw JSON value
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Object(_) => NodeKind::Object,
            Value::Array(_) => NodeKind::Array,
            _ => NodeKind::Leaf,
        }
    }

    /// Whether nodes of this kind can hold children
    pub fn is_container(self) -> bool {
        !matches!(self, NodeKind::Leaf)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Object => write!(f, "object"),
            NodeKind::Array => write!(f, "array"),
            NodeKind::Leaf => write!(f, "leaf"),
        }
    }
}

// PropertyPath and PathSegment

/// Error type for property path parsing
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathParseError {
    /// Empty path string
    #[error("path is empty")]
    Empty,
    /// Empty field name (leading, trailing or doubled separator)
    #[error("empty field name in path at position {0}")]
    EmptyField(usize),
    /// Unclosed bracket
    #[error("unclosed bracket starting at position {0}")]
    UnclosedBracket(usize),
    /// Invalid array index
    #[error("invalid array index at position {0}: {1:?}")]
    InvalidIndex(usize, String),
    /// Unexpected character
    #[error("unexpected character '{0}' at position {1}")]
    UnexpectedChar(char, usize),
    /// Append marker followed by further segments
    #[error("append marker '[-]' must be the last segment (found at segment {0})")]
    AppendNotTerminal(usize),
    /// Field segment that the textual form cannot express
    #[error("field name {1:?} at segment {0} is empty or contains '.', '[' or ']'")]
    InvalidFieldName(usize, String),
}

/// A segment in a property path
///
/// # Examples
///
/// ```
/// use registry_core::PathSegment;
///
/// let field = PathSegment::Field("name".to_string());
/// let idx = PathSegment::Index(0);
/// assert!(field.is_field());
/// assert!(idx.selects_array());
/// assert!(PathSegment::Append.selects_array());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathSegment {
    /// Object member: `.name`
    Field(String),
    /// Array element: `[0]`
    Index(usize),
    /// One past the last array element: `[-]`
    Append,
}

impl PathSegment {
    /// True for `Field` segments
    pub fn is_field(&self) -> bool {
        matches!(self, PathSegment::Field(_))
    }

    /// True for segments that address an array (`Index` or `Append`)
    pub fn selects_array(&self) -> bool {
        matches!(self, PathSegment::Index(_) | PathSegment::Append)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field(name) => write!(f, "{}", name),
            PathSegment::Index(i) => write!(f, "[{}]", i),
            PathSegment::Append => write!(f, "[-]"),
        }
    }
}

/// A path into an entity body
///
/// PropertyPath addresses one location inside an entity document using
/// field and array-element selectors. Paths are relative to the entity body,
/// i.e. the object stored under the entity type key.
///
/// # Path Syntax
///
/// | Syntax | Meaning | Example |
/// |--------|---------|---------|
/// | `key` | Object field (first token) | `address` |
/// | `.key` | Nested field | `address.city` |
/// | `[n]` | Array element | `phones[0]` |
/// | `[-]` | Append position (last token only) | `phones[-]` |
///
/// # Examples
///
/// ```
/// use registry_core::PropertyPath;
///
/// let built = PropertyPath::field("address").key("permanent").index(2).key("pincode");
/// let parsed: PropertyPath = "address.permanent[2].pincode".parse().unwrap();
/// assert_eq!(parsed, built);
/// assert_eq!(parsed.to_string(), "address.permanent[2].pincode");
/// ```
///
/// Serializes as its textual form, so `"path": "address[0].city"` in a
/// [`crate::PropertyOperation`] goes through the parser on the way in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PropertyPath {
    segments: Vec<PathSegment>,
}

impl PropertyPath {
    /// Start a path with a field segment
    pub fn field(name: impl Into<String>) -> Self {
        PropertyPath {
            segments: vec![PathSegment::Field(name.into())],
        }
    }

    /// Create a path from a vector of segments
    ///
    /// No validation is done here; see [`PropertyPath::validate`].
    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        PropertyPath { segments }
    }

    /// Check that the segments are expressible in the textual form.
    ///
    /// Parsed paths always pass. Paths assembled from segments or builders
    /// can carry an empty field name, a field name containing a separator,
    /// or an append marker before the end.
    pub fn validate(&self) -> Result<(), PathParseError> {
        if self.segments.is_empty() {
            return Err(PathParseError::Empty);
        }
        let last = self.segments.len() - 1;
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if name.is_empty() || !name.chars().all(is_field_char) => {
                    return Err(PathParseError::InvalidFieldName(i, name.clone()));
                }
                PathSegment::Append if i != last => {
                    return Err(PathParseError::AppendNotTerminal(i));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Get the path segments
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Number of segments in the path
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Check if the path has no segments
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append a field segment (builder pattern)
    pub fn key(mut self, name: impl Into<String>) -> Self {
        self.segments.push(PathSegment::Field(name.into()));
        self
    }

    /// Append an index segment (builder pattern)
    pub fn index(mut self, idx: usize) -> Self {
        self.segments.push(PathSegment::Index(idx));
        self
    }

    /// Append the append marker (builder pattern)
    pub fn append(mut self) -> Self {
        self.segments.push(PathSegment::Append);
        self
    }

    /// Get the parent path (None for single-segment paths)
    pub fn parent(&self) -> Option<PropertyPath> {
        if self.segments.len() <= 1 {
            None
        } else {
            let mut parent = self.clone();
            parent.segments.pop();
            Some(parent)
        }
    }

    /// Get the terminal segment
    pub fn last_segment(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// Check if this path is a prefix of another (or equal)
    pub fn is_ancestor_of(&self, other: &PropertyPath) -> bool {
        if self.segments.len() > other.segments.len() {
            return false;
        }
        self.segments
            .iter()
            .zip(other.segments.iter())
            .all(|(a, b)| a == b)
    }
}

fn is_field_char(c: char) -> bool {
    !matches!(c, '.' | '[' | ']')
}

impl FromStr for PropertyPath {
    type Err = PathParseError;

    /// Parse a path from a string
    ///
    /// Supported syntax:
    /// - `foo` - object field (no leading separator)
    /// - `foo.bar` - nested fields
    /// - `foo[0]` - field then index
    /// - `foo[0].bar` - mixed
    /// - `foo[-]` - append to the array at `foo`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PathParseError::Empty);
        }

        let mut segments = Vec::new();
        let chars: Vec<char> = s.chars().collect();
        let mut i = 0;

        while i < chars.len() {
            match chars[i] {
                '.' => {
                    if segments.is_empty() {
                        return Err(PathParseError::EmptyField(i));
                    }
                    i += 1;
                    let start = i;
                    while i < chars.len() && is_field_char(chars[i]) {
                        i += 1;
                    }
                    if i == start {
                        return Err(PathParseError::EmptyField(start));
                    }
                    segments.push(PathSegment::Field(chars[start..i].iter().collect()));
                }
                '[' => {
                    let start = i;
                    i += 1;
                    let idx_start = i;

                    // Find closing bracket
                    while i < chars.len() && chars[i] != ']' {
                        if chars[i] == '[' {
                            return Err(PathParseError::UnclosedBracket(start));
                        }
                        i += 1;
                    }

                    if i >= chars.len() {
                        return Err(PathParseError::UnclosedBracket(start));
                    }

                    let idx_str: String = chars[idx_start..i].iter().collect();
                    if idx_str == "-" {
                        segments.push(PathSegment::Append);
                    } else if !idx_str.is_empty() && idx_str.chars().all(|c| c.is_ascii_digit()) {
                        let idx = idx_str
                            .parse::<usize>()
                            .map_err(|_| PathParseError::InvalidIndex(idx_start, idx_str.clone()))?;
                        segments.push(PathSegment::Index(idx));
                    } else {
                        return Err(PathParseError::InvalidIndex(idx_start, idx_str));
                    }
                    i += 1; // Skip closing bracket
                }
                ']' => return Err(PathParseError::UnexpectedChar(']', i)),
                c => {
                    // A bare field name is only valid as the first token
                    if !segments.is_empty() {
                        return Err(PathParseError::UnexpectedChar(c, i));
                    }
                    let start = i;
                    while i < chars.len() && is_field_char(chars[i]) {
                        i += 1;
                    }
                    segments.push(PathSegment::Field(chars[start..i].iter().collect()));
                }
            }
        }

        let path = PropertyPath { segments };
        path.validate()?;
        Ok(path)
    }
}

impl TryFrom<String> for PropertyPath {
    type Error = PathParseError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        text.parse()
    }
}

impl From<PropertyPath> for String {
    fn from(path: PropertyPath) -> Self {
        path.to_string()
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            match seg {
                PathSegment::Field(name) if i > 0 => write!(f, ".{}", name)?,
                other => write!(f, "{}", other)?,
            }
        }
        Ok(())
    }
}
