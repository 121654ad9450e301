//! The JSON request/response envelope exchanged with the caller.
//!
//! Field names follow the function protocol's JSON mapping (camelCase,
//! enum values as their full upper-case names, durations as `"<n>s"`).

use std::collections::BTreeMap;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::directory::CredentialSet;
use crate::error::FunctionError;

/// Key inside a credential secret holding the JSON-encoded credential set.
pub const CREDENTIALS_KEY: &str = "credentials";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunFunctionRequest {
    pub meta: RequestMeta,
    pub input: Option<Value>,
    pub observed: State,
    pub desired: State,
    pub context: Option<Value>,
    pub credentials: BTreeMap<String, Credentials>,
    pub required_resources: BTreeMap<String, Resources>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestMeta {
    pub tag: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct State {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composite: Option<Resource>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub resources: BTreeMap<String, Resource>,
}

impl State {
    pub fn is_empty(&self) -> bool {
        self.composite.is_none() && self.resources.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Resource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Value>,
}

impl Resource {
    pub fn new(resource: Value) -> Self {
        Self {
            resource: Some(resource),
        }
    }

    /// The resource body, if one was sent and it is not `null`.
    pub fn body(&self) -> Option<&Value> {
        self.resource.as_ref().filter(|v| !v.is_null())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resources {
    pub items: Option<Vec<Resource>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Credentials {
    pub credential_data: Option<CredentialData>,
}

/// Secret data; values are base64 encoded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialData {
    pub data: BTreeMap<String, String>,
}

impl RunFunctionRequest {
    /// Decode the credential set stored under `name`.
    ///
    /// The secret must carry a [`CREDENTIALS_KEY`] entry whose decoded
    /// bytes are a JSON object of strings.
    pub fn credentials_for(&self, name: &str) -> Result<CredentialSet, FunctionError> {
        let failed = || FunctionError::Credentials {
            name: name.to_string(),
        };
        let encoded = self
            .credentials
            .get(name)
            .and_then(|c| c.credential_data.as_ref())
            .and_then(|d| d.data.get(CREDENTIALS_KEY))
            .ok_or_else(failed)?;
        let raw = STANDARD.decode(encoded).map_err(|_| failed())?;
        serde_json::from_slice(&raw).map_err(|_| failed())
    }

    /// The observed composite resource body, if any.
    pub fn observed_composite(&self) -> Option<&Value> {
        self.observed.composite.as_ref().and_then(Resource::body)
    }

    /// The desired composite resource body, if any.
    pub fn desired_composite(&self) -> Option<&Value> {
        self.desired.composite.as_ref().and_then(Resource::body)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunFunctionResponse {
    pub meta: ResponseMeta,
    #[serde(skip_serializing_if = "State::is_empty")]
    pub desired: State,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<FunctionResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseMeta {
    pub tag: String,
    pub ttl: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionResult {
    pub severity: Severity,
    pub message: String,
    pub target: Target,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(rename = "type")]
    pub kind: String,
    pub status: ConditionStatus,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub target: Target,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    #[serde(rename = "SEVERITY_FATAL")]
    Fatal,
    #[serde(rename = "SEVERITY_WARNING")]
    Warning,
    #[serde(rename = "SEVERITY_NORMAL")]
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    #[serde(rename = "TARGET_COMPOSITE")]
    Composite,
    #[serde(rename = "TARGET_COMPOSITE_AND_CLAIM")]
    CompositeAndClaim,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    #[serde(rename = "STATUS_CONDITION_TRUE")]
    True,
    #[serde(rename = "STATUS_CONDITION_FALSE")]
    False,
}

impl RunFunctionResponse {
    /// Start a response to `req`: the tag, desired state and context are
    /// carried over unchanged.
    pub fn to(req: &RunFunctionRequest, ttl: Duration) -> Self {
        Self {
            meta: ResponseMeta {
                tag: req.meta.tag.clone(),
                ttl: format!("{}s", ttl.as_secs()),
            },
            desired: req.desired.clone(),
            results: Vec::new(),
            conditions: Vec::new(),
            context: req.context.clone(),
        }
    }

    pub fn fatal(&mut self, err: &FunctionError) {
        self.results.push(FunctionResult {
            severity: Severity::Fatal,
            message: err.to_string(),
            target: Target::Composite,
        });
    }

    pub fn normal(&mut self, message: impl Into<String>) {
        self.results.push(FunctionResult {
            severity: Severity::Normal,
            message: message.into(),
            target: Target::Composite,
        });
    }

    pub fn success(&mut self) {
        self.conditions.push(Condition {
            kind: "FunctionSuccess".to_string(),
            status: ConditionStatus::True,
            reason: "Success".to_string(),
            message: None,
            target: Target::CompositeAndClaim,
        });
    }

    pub fn skipped(&mut self, message: impl Into<String>) {
        self.conditions.push(Condition {
            kind: "FunctionSkip".to_string(),
            status: ConditionStatus::True,
            reason: "SkippedQuery".to_string(),
            message: Some(message.into()),
            target: Target::CompositeAndClaim,
        });
    }

    pub fn desired_composite(&self) -> Option<&Value> {
        self.desired.composite.as_ref().and_then(Resource::body)
    }

    pub fn set_desired_composite(&mut self, resource: Value) {
        self.desired.composite = Some(Resource::new(resource));
    }

    pub fn set_desired_resource(&mut self, name: &str, resource: Value) {
        self.desired
            .resources
            .insert(name.to_string(), Resource::new(resource));
    }

    /// The response context as an object; `null` or absent reads as empty.
    pub fn context_or_empty(&self) -> Value {
        match &self.context {
            Some(Value::Null) | None => Value::Object(Map::new()),
            Some(context) => context.clone(),
        }
    }

    pub fn set_context(&mut self, context: Value) {
        self.context = Some(context);
    }

    pub fn is_fatal(&self) -> bool {
        self.results.iter().any(|r| r.severity == Severity::Fatal)
    }
}
