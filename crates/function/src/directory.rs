//! The directory-query collaborator.
//!
//! The function never talks to a directory itself; it hands a
//! [`QueryRequest`] to a [`DirectoryQuery`] and writes back whatever
//! records come out.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::query::{QueryKind, QueryRequest};

/// Decoded credential fields, e.g. `clientId`, `tenantId` or
/// `federatedTokenFile`.
pub type CredentialSet = BTreeMap<String, String>;

/// A failed query. The message is reported verbatim.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct QueryError {
    message: String,
}

impl QueryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait DirectoryQuery: Send + Sync {
    /// Run one query and return its records.
    async fn query(
        &self,
        credentials: &CredentialSet,
        request: &QueryRequest,
    ) -> Result<Value, QueryError>;
}

/// A directory answering from a fixed JSON document.
///
/// The fixture maps query kinds to records:
///
/// ```json
/// {
///   "UserValidation": [{"id": "u1", "userPrincipalName": "user@example.com"}],
///   "GroupObjectIDs": [{"id": "g1", "displayName": "Developers"}],
///   "ServicePrincipalDetails": [{"id": "sp1", "displayName": "MyServiceApp"}],
///   "GroupMembership": {"Developers": [{"id": "u1", "type": "user"}]}
/// }
/// ```
///
/// Lookups return the matching records in request order; names without a
/// record are left out.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    fixture: Map<String, Value>,
}

impl StaticDirectory {
    pub fn new(fixture: Value) -> Result<Self, QueryError> {
        match fixture {
            Value::Object(fixture) => Ok(Self { fixture }),
            other => Err(QueryError::new(format!(
                "directory fixture must be an object, got {other}"
            ))),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, QueryError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| QueryError::new(format!("cannot parse directory fixture: {e}")))?;
        Self::new(value)
    }

    fn records(&self, kind: QueryKind) -> &[Value] {
        self.fixture
            .get(kind.as_str())
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn lookup(&self, request: &QueryRequest, fields: &[&str]) -> Value {
        let records = self.records(request.kind);
        let found = request
            .names()
            .into_iter()
            .filter_map(|name| {
                records.iter().find(|record| {
                    fields
                        .iter()
                        .any(|field| record.get(*field).and_then(Value::as_str) == Some(name))
                })
            })
            .cloned()
            .collect();
        Value::Array(found)
    }

    fn members(&self, request: &QueryRequest) -> Value {
        let members = request.parameters.group.as_deref().and_then(|group| {
            self.fixture
                .get(QueryKind::GroupMembership.as_str())
                .and_then(|groups| groups.get(group))
        });
        members.cloned().unwrap_or_else(|| Value::Array(Vec::new()))
    }
}

#[async_trait]
impl DirectoryQuery for StaticDirectory {
    async fn query(
        &self,
        _credentials: &CredentialSet,
        request: &QueryRequest,
    ) -> Result<Value, QueryError> {
        let records = match request.kind {
            QueryKind::UserValidation => self.lookup(request, &["userPrincipalName", "mail"]),
            QueryKind::GroupObjectIds | QueryKind::ServicePrincipalDetails => {
                self.lookup(request, &["displayName"])
            }
            QueryKind::GroupMembership => self.members(request),
        };
        Ok(records)
    }
}
