//! Field paths over composite resource documents.
//!
//! A path such as `status.groups` or
//! `context.[apiextensions.crossplane.io/environment].groups` names a value
//! below one of three roots: `spec` and `status` of the resource, or the
//! pipeline `context`. This crate parses such paths, resolves them, and
//! writes values back without disturbing sibling data.
//!
//! # Example
//!
//! ```
//! use fn_msgraph_path::{resolve, set, Document, Path};
//! use serde_json::json;
//!
//! let mut doc = Document::from_resource(json!({
//!     "status": {"groups": ["Developers", "Operations"]}
//! }));
//!
//! let groups = Path::parse("status.groups").unwrap();
//! assert_eq!(resolve(&doc, &groups).unwrap(), &json!(["Developers", "Operations"]));
//!
//! let target = Path::parse("status.groupObjectIDs").unwrap();
//! set(&mut doc, &target, json!([{"id": "group-id-1"}])).unwrap();
//! assert_eq!(doc.resource["status"]["groups"], json!(["Developers", "Operations"]));
//! assert_eq!(doc.resource["status"]["groupObjectIDs"], json!([{"id": "group-id-1"}]));
//! ```

use thiserror::Error;

pub mod get;
pub mod set;
pub mod types;
pub mod util;
pub mod validate;

pub use get::{get, resolve, resolve_reference};
pub use set::{set, with_value};
pub use types::{Arity, Document, NodeKind, Path, ResolvedRef, Root, Segment};
pub use util::{format_segments, parse_segments};
pub use validate::{validate_path, validate_target};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("invalid path {path:?}: {reason}")]
    Parse { path: String, reason: &'static str },
    #[error("{path} not found")]
    NotFound { path: String },
    #[error("{path} is not a {expected}")]
    Type {
        path: String,
        expected: &'static str,
    },
    #[error("cannot write {path}: {segment} holds a {found}, not an object")]
    TypeConflict {
        path: String,
        segment: String,
        found: NodeKind,
    },
    #[error("cannot write {path}: {root} is read-only")]
    ReadOnlyRoot { path: String, root: Root },
    #[error("{path} does not name a key below status or context")]
    Unaddressable { path: String },
    #[error("path {path} is too long")]
    TooLong { path: String },
}

impl PathError {
    pub(crate) fn parse(path: &str, reason: &'static str) -> Self {
        PathError::Parse {
            path: path.to_string(),
            reason,
        }
    }

    /// The raw path the error refers to.
    pub fn path(&self) -> &str {
        match self {
            PathError::Parse { path, .. }
            | PathError::NotFound { path }
            | PathError::Type { path, .. }
            | PathError::TypeConflict { path, .. }
            | PathError::ReadOnlyRoot { path, .. }
            | PathError::Unaddressable { path }
            | PathError::TooLong { path } => path,
        }
    }
}
