use serde_json::Value;

use crate::types::{Arity, Document, Path, ResolvedRef};
use crate::validate::validate_path;
use crate::PathError;

/// Resolve a path against a document.
///
/// Descends from the root named by the first segment through each
/// remaining segment as an object key. Never mutates the document.
///
/// # Errors
///
/// [`PathError::NotFound`], echoing the raw path, when the root is unknown,
/// the path names only a root, a key is missing, or a node that must be
/// descended into is not an object.
pub fn resolve<'a>(doc: &'a Document, path: &Path) -> Result<&'a Value, PathError> {
    let not_found = || PathError::NotFound {
        path: path.raw().to_string(),
    };

    let (mut current, keys) = doc.descent(path).ok_or_else(not_found)?;
    for key in keys {
        current = match current {
            Value::Object(map) => map.get(key).ok_or_else(not_found)?,
            _ => return Err(not_found()),
        };
    }
    Ok(current)
}

/// Resolve a path, returning `None` instead of an error.
pub fn get<'a>(doc: &'a Document, path: &Path) -> Option<&'a Value> {
    resolve(doc, path).ok()
}

/// Resolve the path held by a reference field and check its shape.
///
/// With [`Arity::Single`] the value must be a string. With
/// [`Arity::Multiple`] it must be a list of strings; `null` entries are
/// skipped, and an empty result is not an error here.
///
/// # Errors
///
/// [`PathError::Parse`] for a malformed path, [`PathError::NotFound`] when
/// it does not resolve, [`PathError::Type`] when the value has the wrong
/// shape.
pub fn resolve_reference(
    doc: &Document,
    raw: &str,
    arity: Arity,
) -> Result<ResolvedRef, PathError> {
    let path = Path::parse(raw)?;
    validate_path(&path)?;
    let value = resolve(doc, &path)?;

    match arity {
        Arity::Single => match value {
            Value::String(s) => Ok(ResolvedRef::Single(s.clone())),
            _ => Err(PathError::Type {
                path: raw.to_string(),
                expected: "string",
            }),
        },
        Arity::Multiple => {
            let items = value.as_array().ok_or_else(|| PathError::Type {
                path: raw.to_string(),
                expected: "list of strings",
            })?;
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(s) => out.push(s.clone()),
                    Value::Null => {}
                    _ => {
                        return Err(PathError::Type {
                            path: raw.to_string(),
                            expected: "list of strings",
                        })
                    }
                }
            }
            Ok(ResolvedRef::Multiple(out))
        }
    }
}
