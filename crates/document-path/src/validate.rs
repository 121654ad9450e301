//! Validation of paths before they are used.

use crate::types::Path;
use crate::PathError;

/// Maximum allowed raw path length.
const MAX_PATH_LENGTH: usize = 1024;

/// Maximum allowed number of segments.
const MAX_PATH_DEPTH: usize = 256;

/// Check a parsed path against the length and depth limits.
///
/// # Errors
///
/// Returns [`PathError::TooLong`] if either limit is exceeded.
pub fn validate_path(path: &Path) -> Result<(), PathError> {
    if path.raw().len() > MAX_PATH_LENGTH || path.segments().len() > MAX_PATH_DEPTH {
        return Err(PathError::TooLong {
            path: path.raw().to_string(),
        });
    }
    Ok(())
}

/// Parse and validate a write target.
///
/// A target must name at least one key below `status` or `context`.
///
/// # Errors
///
/// Any parse or limit error, [`PathError::ReadOnlyRoot`] for `spec`, and
/// [`PathError::Unaddressable`] for bare or unknown roots.
///
/// # Example
///
/// ```
/// use fn_msgraph_path::validate_target;
///
/// validate_target("status.groupObjectIDs").unwrap();
/// validate_target("context.[apiextensions.crossplane.io/environment].ids").unwrap();
/// validate_target("spec.groups").unwrap_err();
/// validate_target("status").unwrap_err();
/// validate_target("").unwrap_err();
/// ```
pub fn validate_target(raw: &str) -> Result<Path, PathError> {
    let path = Path::parse(raw)?;
    validate_path(&path)?;
    match path.root() {
        Some(root) if !root.is_writable() => Err(PathError::ReadOnlyRoot {
            path: raw.to_string(),
            root,
        }),
        Some(_) if path.is_addressable() => Ok(path),
        _ => Err(PathError::Unaddressable {
            path: raw.to_string(),
        }),
    }
}
