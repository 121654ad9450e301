#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use function_msgraph::{
    Clock, CredentialSet, DirectoryQuery, Function, QueryError, QueryRequest, RunFunctionRequest,
};
use serde_json::{json, Value};

pub const FIXED_TIME: &str = "2025-01-01T00:00:00+01:00";

pub const XR: &str = r#"{"apiVersion":"example.org/v1","kind":"XR","metadata":{"name":"cool-xr","finalizers":["composite.apiextensions.crossplane.io"]},"spec":{"count":2}}"#;

type Handler = dyn Fn(&CredentialSet, &QueryRequest) -> Result<Value, QueryError> + Send + Sync;

/// A directory answering through a closure, counting calls.
pub struct MockDirectory {
    handler: Box<Handler>,
    calls: AtomicUsize,
}

impl MockDirectory {
    pub fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&CredentialSet, &QueryRequest) -> Result<Value, QueryError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            calls: AtomicUsize::new(0),
        })
    }

    /// A directory that always answers with `records`.
    pub fn returning(records: Value) -> Arc<Self> {
        Self::new(move |_, _| Ok(records.clone()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DirectoryQuery for MockDirectory {
    async fn query(
        &self,
        credentials: &CredentialSet,
        request: &QueryRequest,
    ) -> Result<Value, QueryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.handler)(credentials, request)
    }
}

pub struct FixedClock;

impl Clock for FixedClock {
    fn now_rfc3339(&self) -> String {
        FIXED_TIME.to_string()
    }
}

pub fn function(directory: Arc<MockDirectory>) -> Function {
    Function::new(directory).with_clock(Arc::new(FixedClock))
}

pub fn credentials() -> Value {
    let creds = r#"{
"clientId": "test-client-id",
"clientSecret": "test-client-secret",
"subscriptionId": "test-subscription-id",
"tenantId": "test-tenant-id"
}"#;
    json!({
        "azure-creds": {"credentialData": {"data": {"credentials": STANDARD.encode(creds)}}}
    })
}

pub fn xr() -> Value {
    serde_json::from_str(XR).unwrap()
}

pub fn request(value: Value) -> RunFunctionRequest {
    serde_json::from_value(value).unwrap()
}

/// A pipeline request with the given input and observed composite.
pub fn pipeline_request(input: Value, observed: Value) -> RunFunctionRequest {
    request(json!({
        "meta": {"tag": "hello"},
        "input": input,
        "observed": {"composite": {"resource": observed}},
        "credentials": credentials()
    }))
}

/// An operation request watching the given resources.
pub fn operation_request(input: Value, items: Value) -> RunFunctionRequest {
    request(json!({
        "meta": {"tag": "hello"},
        "input": input,
        "credentials": credentials(),
        "requiredResources": {
            "ops.crossplane.io/watched-resource": {"items": items}
        }
    }))
}

pub fn group_records() -> Value {
    json!([
        {"id": "group-id-1", "displayName": "Developers", "description": "Development team"},
        {"id": "group-id-2", "displayName": "Operations", "description": "Operations team"},
        {"id": "group-id-3", "displayName": "All Company", "description": "All company group"}
    ])
}

pub fn user_records() -> Value {
    json!([{
        "id": "test-user-id",
        "displayName": "Test User",
        "userPrincipalName": "user@example.com",
        "mail": "user@example.com"
    }])
}

pub fn success_condition() -> Value {
    json!({
        "type": "FunctionSuccess",
        "status": "STATUS_CONDITION_TRUE",
        "reason": "Success",
        "target": "TARGET_COMPOSITE_AND_CLAIM"
    })
}

pub fn normal_result(kind: &str) -> Value {
    json!({
        "severity": "SEVERITY_NORMAL",
        "message": format!("QueryType: \"{kind}\""),
        "target": "TARGET_COMPOSITE"
    })
}

pub fn fatal_result(message: &str) -> Value {
    json!({
        "severity": "SEVERITY_FATAL",
        "message": message,
        "target": "TARGET_COMPOSITE"
    })
}
