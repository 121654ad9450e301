//! Errors surfaced to the caller as fatal results.
//!
//! The `Display` output of each variant is the message reported on the
//! response, so the wording here is part of the function's contract.

use fn_msgraph_path::PathError;
use thiserror::Error;

use crate::directory::QueryError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FunctionError {
    #[error("cannot get Function input: {0}")]
    Input(String),

    #[error("failed to get {name} credentials")]
    Credentials { name: String },

    #[error("Unrecognized target field: {raw}")]
    Target { raw: String },

    #[error("cannot resolve {field}Ref: {source}")]
    Reference {
        field: &'static str,
        #[source]
        source: PathError,
    },

    #[error("unsupported query type: {0}")]
    UnsupportedQueryType(String),

    #[error("unsupported identity.type: {0}")]
    UnsupportedIdentityType(String),

    #[error("{0}")]
    InvalidParameters(&'static str),

    #[error("{0}")]
    Query(#[from] QueryError),

    #[error("query timed out after {secs}s")]
    QueryTimeout { secs: u64 },

    #[error("cannot write query result: {0}")]
    Write(#[source] PathError),

    #[error("operation: {0}")]
    Operation(#[from] OperationError),
}

/// Problems with the shape of an operation invocation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OperationError {
    #[error("no resource to process with name {0}")]
    RequirementMissing(&'static str),

    #[error("incorrect number of resources sent to the function. expected 1, got {got}")]
    Cardinality { got: usize },

    #[error("Resource.Object property in operation resource can not be empty")]
    EmptyResource,

    #[error("function-msgraph support only operations on composite resources")]
    UnsupportedKind,
}
