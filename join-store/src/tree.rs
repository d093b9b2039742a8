//! Path-addressed JSON document tree.
//!
//! The whole database is one JSON value. Every read and write names a node
//! by a `/`-separated path. Writing `null` deletes, and objects left empty by
//! a delete disappear with it, so a missing node and an empty one look the
//! same to readers.

use serde_json::{Map, Value};
use uuid::Uuid;

/// Characters a path segment may not contain.
const FORBIDDEN: [char; 5] = ['.', '$', '#', '[', ']'];

/// Errors from parsing a document path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Two slashes in a row.
    #[error("path {0:?} contains an empty segment")]
    EmptySegment(String),

    /// A segment contains `.`, `$`, `#`, `[` or `]`.
    #[error("path segment {0:?} contains a forbidden character")]
    InvalidSegment(String),
}

/// Errors from a write to the tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// The path was malformed.
    #[error(transparent)]
    Path(#[from] PathError),

    /// `PATCH` bodies must be JSON objects.
    #[error("patch body must be an object")]
    PatchNotObject,
}

/// A parsed document path. The empty path is the root.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocPath(Vec<String>);

impl DocPath {
    /// Parses `a/b/c`. Leading and trailing slashes are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] for empty segments or forbidden characters.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let trimmed = raw.trim_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        let mut segments = Vec::new();
        for segment in trimmed.split('/') {
            if segment.is_empty() {
                return Err(PathError::EmptySegment(raw.to_owned()));
            }
            if segment.contains(FORBIDDEN) {
                return Err(PathError::InvalidSegment(segment.to_owned()));
            }
            segments.push(segment.to_owned());
        }
        Ok(Self(segments))
    }

    /// Path segments, root first.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// This path with `child` appended.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] if `child` is not a valid relative path.
    pub fn join(&self, child: &str) -> Result<Self, PathError> {
        let mut joined = self.0.clone();
        joined.extend(Self::parse(child)?.0);
        Ok(Self(joined))
    }
}

impl std::fmt::Display for DocPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}", self.0.join("/"))
    }
}

/// The database.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentTree {
    root: Value,
}

impl DocumentTree {
    /// An empty database.
    #[must_use]
    pub const fn new() -> Self {
        Self { root: Value::Null }
    }

    /// A database holding `value`, with nulls and empty objects pruned.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        Self {
            root: normalize(value),
        }
    }

    /// Snapshot of the node at `path`; `null` when absent.
    #[must_use]
    pub fn get(&self, path: &DocPath) -> Value {
        let mut node = &self.root;
        for segment in path.segments() {
            match node.get(segment) {
                Some(child) => node = child,
                None => return Value::Null,
            }
        }
        node.clone()
    }

    /// Replaces the node at `path`. Writing `null` deletes it.
    pub fn put(&mut self, path: &DocPath, value: Value) {
        let value = normalize(value);
        if value.is_null() {
            self.delete(path);
        } else {
            set_at(&mut self.root, path.segments(), value);
        }
    }

    /// Stores `value` under a new time-ordered child key of `path` and
    /// returns the key.
    ///
    /// # Errors
    ///
    /// Never fails for a valid parent path; the error is kept for symmetry
    /// with other writes.
    pub fn post(&mut self, path: &DocPath, value: Value) -> Result<String, TreeError> {
        let key = Uuid::now_v7().simple().to_string();
        let child = path.join(&key)?;
        self.put(&child, value);
        Ok(key)
    }

    /// Writes each field of `fields` below `path`, leaving other children
    /// alone. Field names may be relative paths; `null` fields delete.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::PatchNotObject`] for non-object bodies and
    /// [`TreeError::Path`] for invalid field names. Nothing is written on
    /// error.
    pub fn patch(&mut self, path: &DocPath, fields: Value) -> Result<(), TreeError> {
        let Value::Object(fields) = fields else {
            return Err(TreeError::PatchNotObject);
        };
        let writes = fields
            .into_iter()
            .map(|(name, value)| Ok((path.join(&name)?, value)))
            .collect::<Result<Vec<_>, PathError>>()?;
        for (child, value) in writes {
            self.put(&child, value);
        }
        Ok(())
    }

    /// Removes the node at `path` and any parents it leaves empty.
    pub fn delete(&mut self, path: &DocPath) {
        remove_at(&mut self.root, path.segments());
        if is_empty(&self.root) {
            self.root = Value::Null;
        }
    }

    /// The root value.
    #[must_use]
    pub const fn root(&self) -> &Value {
        &self.root
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn normalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let pruned: Map<String, Value> = map
                .into_iter()
                .map(|(k, v)| (k, normalize(v)))
                .filter(|(_, v)| !v.is_null())
                .collect();
            if pruned.is_empty() {
                Value::Null
            } else {
                Value::Object(pruned)
            }
        }
        other => other,
    }
}

fn set_at(node: &mut Value, segments: &[String], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        *node = value;
        return;
    };
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(map) = node {
        let child = map.entry(first.clone()).or_insert(Value::Null);
        set_at(child, rest, value);
    }
}

fn remove_at(node: &mut Value, segments: &[String]) {
    let Some((first, rest)) = segments.split_first() else {
        *node = Value::Null;
        return;
    };
    let Value::Object(map) = node else {
        return;
    };
    if rest.is_empty() {
        map.remove(first);
    } else if let Some(child) = map.get_mut(first) {
        remove_at(child, rest);
        if is_empty(child) {
            map.remove(first);
        }
    }
}
