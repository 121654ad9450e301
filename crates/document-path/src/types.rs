//! Type definitions for field paths and the documents they address.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::util::{format_segments, parse_segments};
use crate::PathError;

/// A single step of a field path: an object key.
pub type Segment = String;

/// The document root a path starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Root {
    /// `spec` of the composite resource.
    Spec,
    /// `status` of the composite resource.
    Status,
    /// The pipeline context, a sibling of the resource.
    Context,
}

impl Root {
    pub fn as_str(&self) -> &'static str {
        match self {
            Root::Spec => "spec",
            Root::Status => "status",
            Root::Context => "context",
        }
    }

    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "spec" => Some(Root::Spec),
            "status" => Some(Root::Status),
            "context" => Some(Root::Context),
            _ => None,
        }
    }

    /// Only `status` and `context` may be written to.
    pub fn is_writable(&self) -> bool {
        matches!(self, Root::Status | Root::Context)
    }
}

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed field path such as `status.groups` or
/// `context.[apiextensions.crossplane.io/environment].name`.
///
/// The raw input string is kept so that errors can echo exactly what the
/// caller wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    raw: String,
    segments: Vec<Segment>,
}

impl Path {
    /// Parse a raw path string.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::Parse`] for an empty path or malformed bracket
    /// syntax. Unknown roots and bare roots parse fine and fail on use.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let segments = parse_segments(raw)?;
        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// Build a path from already split segments.
    ///
    /// The raw form is rendered with brackets around segments that need them.
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self {
            raw: format_segments(&segments),
            segments,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The root named by the first segment, if it is a known one.
    pub fn root(&self) -> Option<Root> {
        self.segments.first().and_then(|s| Root::from_segment(s))
    }

    /// The segments below the root.
    pub fn keys(&self) -> &[Segment] {
        self.segments.get(1..).unwrap_or_default()
    }

    /// A path is addressable when its root is known and at least one key
    /// follows it.
    pub fn is_addressable(&self) -> bool {
        self.root().is_some() && self.segments.len() >= 2
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// How many values a reference field expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// A single string, e.g. `groupRef`.
    Single,
    /// A list of strings, e.g. `groupsRef`.
    Multiple,
}

/// The value a reference field resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedRef {
    Single(String),
    Multiple(Vec<String>),
}

impl ResolvedRef {
    pub fn into_single(self) -> Option<String> {
        match self {
            ResolvedRef::Single(s) => Some(s),
            ResolvedRef::Multiple(_) => None,
        }
    }

    pub fn into_multiple(self) -> Option<Vec<String>> {
        match self {
            ResolvedRef::Multiple(v) => Some(v),
            ResolvedRef::Single(_) => None,
        }
    }
}

/// Kind of a document node, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Object,
    List,
    String,
    Number,
    Bool,
    Null,
}

impl NodeKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Object(_) => NodeKind::Object,
            Value::Array(_) => NodeKind::List,
            Value::String(_) => NodeKind::String,
            Value::Number(_) => NodeKind::Number,
            Value::Bool(_) => NodeKind::Bool,
            Value::Null => NodeKind::Null,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Object => "object",
            NodeKind::List => "list",
            NodeKind::String => "string",
            NodeKind::Number => "number",
            NodeKind::Bool => "bool",
            NodeKind::Null => "null",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The documents one invocation works on.
///
/// `spec` and `status` live inside `resource`; `context` is a sibling.
/// A `Null` root is treated as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub resource: Value,
    pub context: Value,
}

impl Document {
    pub fn new(resource: Value, context: Value) -> Self {
        Self { resource, context }
    }

    /// A document holding only a resource.
    pub fn from_resource(resource: Value) -> Self {
        Self {
            resource,
            context: Value::Null,
        }
    }

    /// The node a path starts descending from, plus the keys to follow.
    ///
    /// `spec`/`status` paths descend from the resource with the root segment
    /// as the first key; `context` paths descend from the context itself.
    pub(crate) fn descent<'p>(&self, path: &'p Path) -> Option<(&Value, &'p [Segment])> {
        if !path.is_addressable() {
            return None;
        }
        match path.root()? {
            Root::Spec | Root::Status => Some((&self.resource, path.segments())),
            Root::Context => Some((&self.context, path.keys())),
        }
    }

    /// Mutable counterpart of [`Document::descent`]. Absent (`Null`) roots
    /// are replaced with an empty object so writes have somewhere to land.
    pub(crate) fn descent_mut<'p>(
        &mut self,
        path: &'p Path,
    ) -> Option<(&mut Value, &'p [Segment])> {
        if !path.is_addressable() {
            return None;
        }
        let (base, keys) = match path.root()? {
            Root::Spec | Root::Status => (&mut self.resource, path.segments()),
            Root::Context => (&mut self.context, path.keys()),
        };
        if base.is_null() {
            *base = Value::Object(Map::new());
        }
        Some((base, keys))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_root_roundtrip() {
        for root in [Root::Spec, Root::Status, Root::Context] {
            assert_eq!(Root::from_segment(root.as_str()), Some(root));
        }
        assert_eq!(Root::from_segment("metadata"), None);
    }

    #[test]
    fn test_root_writable() {
        assert!(!Root::Spec.is_writable());
        assert!(Root::Status.is_writable());
        assert!(Root::Context.is_writable());
    }

    #[test]
    fn test_path_accessors() {
        let path = Path::parse("status.groups").unwrap();
        assert_eq!(path.raw(), "status.groups");
        assert_eq!(path.root(), Some(Root::Status));
        assert_eq!(path.keys(), &["groups".to_string()]);
        assert!(path.is_addressable());
    }

    #[test]
    fn test_bare_root_not_addressable() {
        let path = Path::parse("status").unwrap();
        assert!(!path.is_addressable());
        let path = Path::parse("metadata.name").unwrap();
        assert!(!path.is_addressable());
    }

    #[test]
    fn test_from_segments_brackets_dotted_keys() {
        let path = Path::from_segments(vec![
            "context".to_string(),
            "apiextensions.crossplane.io/environment".to_string(),
            "name".to_string(),
        ]);
        assert_eq!(
            path.raw(),
            "context.[apiextensions.crossplane.io/environment].name"
        );
    }

    #[test]
    fn test_node_kind() {
        assert_eq!(NodeKind::of(&json!({})), NodeKind::Object);
        assert_eq!(NodeKind::of(&json!([])), NodeKind::List);
        assert_eq!(NodeKind::of(&json!("x")), NodeKind::String);
        assert_eq!(NodeKind::of(&json!(1)), NodeKind::Number);
        assert_eq!(NodeKind::of(&json!(true)), NodeKind::Bool);
        assert_eq!(NodeKind::of(&json!(null)), NodeKind::Null);
    }

    #[test]
    fn test_resolved_ref_projection() {
        assert_eq!(
            ResolvedRef::Single("a".into()).into_single(),
            Some("a".to_string())
        );
        assert_eq!(ResolvedRef::Single("a".into()).into_multiple(), None);
        assert_eq!(
            ResolvedRef::Multiple(vec!["a".into()]).into_multiple(),
            Some(vec!["a".to_string()])
        );
    }
}
