//! Operation invocations: one watched resource instead of a composed
//! pipeline document.

use serde_json::{Map, Value};

use crate::envelope::RunFunctionRequest;
use crate::error::OperationError;

/// Requirement key carrying the watched resource.
pub const WATCHED_RESOURCE: &str = "ops.crossplane.io/watched-resource";

/// Finalizer present on composite resources only.
pub const COMPOSITE_FINALIZER: &str = "composite.apiextensions.crossplane.io";

/// Name of the desired resource emitted by an operation.
pub const OPERATION_OUTPUT_NAME: &str = "xr";

/// Take the single watched composite resource out of `req`.
pub fn watched_resource(req: &RunFunctionRequest) -> Result<Value, OperationError> {
    let required = req
        .required_resources
        .get(WATCHED_RESOURCE)
        .ok_or(OperationError::RequirementMissing(WATCHED_RESOURCE))?;
    let items = required.items.as_deref().unwrap_or_default();
    let [item] = items else {
        return Err(OperationError::Cardinality { got: items.len() });
    };
    let resource = match item.body() {
        Some(Value::Object(body)) if !body.is_empty() => Value::Object(body.clone()),
        _ => return Err(OperationError::EmptyResource),
    };
    if !is_composite(&resource) {
        return Err(OperationError::UnsupportedKind);
    }
    Ok(resource)
}

/// Whether `resource` carries the composite finalizer.
pub fn is_composite(resource: &Value) -> bool {
    resource
        .pointer("/metadata/finalizers")
        .and_then(Value::as_array)
        .is_some_and(|finalizers| {
            finalizers
                .iter()
                .any(|f| f.as_str() == Some(COMPOSITE_FINALIZER))
        })
}

/// Build the resource emitted by an operation: the identity of `resource`
/// plus its annotations, with the two execution annotations merged in.
pub fn annotate(resource: &Value, entries: &[(String, String)]) -> Value {
    let mut annotations = resource
        .pointer("/metadata/annotations")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    for (key, value) in entries {
        annotations.insert(key.clone(), Value::String(value.clone()));
    }

    let mut metadata = Map::new();
    for key in ["name", "namespace"] {
        if let Some(value) = resource.pointer(&format!("/metadata/{key}")) {
            metadata.insert(key.to_string(), value.clone());
        }
    }
    metadata.insert("annotations".to_string(), Value::Object(annotations));

    let mut out = Map::new();
    for key in ["apiVersion", "kind"] {
        if let Some(value) = resource.get(key) {
            out.insert(key.to_string(), value.clone());
        }
    }
    out.insert("metadata".to_string(), Value::Object(metadata));
    Value::Object(out)
}
