//! The function input, as written in a composition pipeline step.

use std::fmt;
use std::str::FromStr;

use fn_msgraph_path::{resolve_reference, validate_target, Arity, Document, Path};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FunctionError;
use crate::query::QueryParameters;

/// Input of one pipeline step.
///
/// Each `*Ref` field holds a path resolved against the document; when set
/// it replaces the literal field of the same name.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Input {
    pub api_version: Option<String>,
    pub kind: Option<String>,
    #[serde(default)]
    pub query_type: String,
    #[serde(default)]
    pub users: Vec<Option<String>>,
    pub users_ref: Option<String>,
    pub group: Option<String>,
    pub group_ref: Option<String>,
    #[serde(default)]
    pub groups: Vec<Option<String>>,
    pub groups_ref: Option<String>,
    #[serde(default)]
    pub service_principals: Vec<Option<String>>,
    pub service_principals_ref: Option<String>,
    pub target: Option<String>,
    #[serde(default)]
    pub skip_query_when_target_has_data: bool,
    pub identity: Option<Identity>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Identity {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// How the directory collaborator should authenticate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentityType {
    #[default]
    AzureServicePrincipalCredentials,
    AzureWorkloadIdentityCredentials,
}

impl IdentityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityType::AzureServicePrincipalCredentials => "AzureServicePrincipalCredentials",
            IdentityType::AzureWorkloadIdentityCredentials => "AzureWorkloadIdentityCredentials",
        }
    }
}

impl FromStr for IdentityType {
    type Err = FunctionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AzureServicePrincipalCredentials" => Ok(IdentityType::AzureServicePrincipalCredentials),
            "AzureWorkloadIdentityCredentials" => Ok(IdentityType::AzureWorkloadIdentityCredentials),
            other => Err(FunctionError::UnsupportedIdentityType(other.to_string())),
        }
    }
}

impl fmt::Display for IdentityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Input {
    pub fn from_value(value: &Value) -> Result<Self, FunctionError> {
        Input::deserialize(value).map_err(|e| FunctionError::Input(e.to_string()))
    }

    /// The validated write target.
    pub fn target(&self) -> Result<Path, FunctionError> {
        let raw = self.target.as_deref().unwrap_or_default();
        validate_target(raw).map_err(|_| FunctionError::Target {
            raw: raw.to_string(),
        })
    }

    /// The identity type, defaulting to service principal credentials.
    pub fn identity_type(&self) -> Result<IdentityType, FunctionError> {
        match self.identity.as_ref().and_then(|i| i.kind.as_deref()) {
            None | Some("") => Ok(IdentityType::default()),
            Some(kind) => kind.parse(),
        }
    }

    /// Resolve reference fields against `doc` and merge them with the
    /// literal fields.
    pub fn resolve_parameters(&self, doc: &Document) -> Result<QueryParameters, FunctionError> {
        let users = match ref_path(&self.users_ref) {
            Some(raw) => resolve_list(doc, "users", raw)?,
            None => literal_list(&self.users),
        };
        let group = match ref_path(&self.group_ref) {
            Some(raw) => Some(resolve_single(doc, "group", raw)?),
            None => self.group.clone(),
        };
        let groups = match ref_path(&self.groups_ref) {
            Some(raw) => resolve_list(doc, "groups", raw)?,
            None => literal_list(&self.groups),
        };
        let service_principals = match ref_path(&self.service_principals_ref) {
            Some(raw) => resolve_list(doc, "servicePrincipals", raw)?,
            None => literal_list(&self.service_principals),
        };

        Ok(QueryParameters {
            users,
            group,
            groups,
            service_principals,
        })
    }
}

fn ref_path(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|raw| !raw.is_empty())
}

fn literal_list(items: &[Option<String>]) -> Vec<String> {
    items.iter().flatten().cloned().collect()
}

fn resolve_single(doc: &Document, field: &'static str, raw: &str) -> Result<String, FunctionError> {
    resolve_reference(doc, raw, Arity::Single)
        .map(|r| r.into_single().unwrap_or_default())
        .map_err(|source| FunctionError::Reference { field, source })
}

fn resolve_list(doc: &Document, field: &'static str, raw: &str) -> Result<Vec<String>, FunctionError> {
    resolve_reference(doc, raw, Arity::Multiple)
        .map(|r| r.into_multiple().unwrap_or_default())
        .map_err(|source| FunctionError::Reference { field, source })
}
