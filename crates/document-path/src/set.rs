use serde_json::{Map, Value};

use crate::types::{Document, NodeKind, Path};
use crate::PathError;

/// Write `value` at `path`, creating intermediate objects as needed.
///
/// The final key is overwritten; sibling keys at every level are kept.
/// Returns the value previously stored at the path, if any.
///
/// # Errors
///
/// - [`PathError::ReadOnlyRoot`] for `spec` paths
/// - [`PathError::Unaddressable`] for a bare or unknown root
/// - [`PathError::TypeConflict`] when a node on the way is a list or scalar
pub fn set(doc: &mut Document, path: &Path, value: Value) -> Result<Option<Value>, PathError> {
    match path.root() {
        Some(root) if !root.is_writable() => {
            return Err(PathError::ReadOnlyRoot {
                path: path.raw().to_string(),
                root,
            })
        }
        _ => {}
    }

    let (base, keys) = doc
        .descent_mut(path)
        .ok_or_else(|| PathError::Unaddressable {
            path: path.raw().to_string(),
        })?;

    let mut current = as_object_mut(base, path, &path.segments()[0])?;
    let (last, parents) = keys
        .split_last()
        .ok_or_else(|| PathError::Unaddressable {
            path: path.raw().to_string(),
        })?;

    for key in parents {
        let child = current
            .entry(key.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        current = as_object_mut(child, path, key)?;
    }

    Ok(current.insert(last.clone(), value))
}

/// Non-mutating variant of [`set`]: returns a new document with the value
/// written, leaving `doc` untouched.
pub fn with_value(doc: &Document, path: &Path, value: Value) -> Result<Document, PathError> {
    let mut next = doc.clone();
    set(&mut next, path, value)?;
    Ok(next)
}

fn as_object_mut<'a>(
    node: &'a mut Value,
    path: &Path,
    segment: &str,
) -> Result<&'a mut Map<String, Value>, PathError> {
    let found = NodeKind::of(node);
    match node {
        Value::Object(map) => Ok(map),
        _ => Err(PathError::TypeConflict {
            path: path.raw().to_string(),
            segment: segment.to_string(),
            found,
        }),
    }
}

impl Document {
    /// See [`with_value`].
    pub fn with_value(&self, path: &Path, value: Value) -> Result<Document, PathError> {
        with_value(self, path, value)
    }
}
