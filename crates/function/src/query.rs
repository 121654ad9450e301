//! Query kinds and their handlers.
//!
//! `queryType` is parsed once into a [`QueryKind`]; everything kind-specific
//! (which parameters are required, what the request carries, how records
//! are normalised) lives behind that kind's [`QueryHandler`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FunctionError;
use crate::input::IdentityType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryKind {
    /// Look up users by user principal name.
    UserValidation,
    /// List the members of one group.
    GroupMembership,
    /// Look up groups by display name.
    #[serde(rename = "GroupObjectIDs")]
    GroupObjectIds,
    /// Look up service principals by display name.
    ServicePrincipalDetails,
}

impl QueryKind {
    pub const ALL: [QueryKind; 4] = [
        QueryKind::UserValidation,
        QueryKind::GroupMembership,
        QueryKind::GroupObjectIds,
        QueryKind::ServicePrincipalDetails,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::UserValidation => "UserValidation",
            QueryKind::GroupMembership => "GroupMembership",
            QueryKind::GroupObjectIds => "GroupObjectIDs",
            QueryKind::ServicePrincipalDetails => "ServicePrincipalDetails",
        }
    }

    pub fn handler(&self) -> &'static dyn QueryHandler {
        match self {
            QueryKind::UserValidation => &UserValidation,
            QueryKind::GroupMembership => &GroupMembership,
            QueryKind::GroupObjectIds => &GroupObjectIds,
            QueryKind::ServicePrincipalDetails => &ServicePrincipalDetails,
        }
    }
}

impl FromStr for QueryKind {
    type Err = FunctionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QueryKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| FunctionError::UnsupportedQueryType(s.to_string()))
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters after reference fields have been resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParameters {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub service_principals: Vec<String>,
}

/// What is handed to the directory collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub kind: QueryKind,
    pub identity: IdentityType,
    pub parameters: QueryParameters,
}

impl QueryRequest {
    /// The names being looked up, whichever parameter carries them.
    pub fn names(&self) -> Vec<&str> {
        let p = &self.parameters;
        match self.kind {
            QueryKind::UserValidation => p.users.iter().map(String::as_str).collect(),
            QueryKind::GroupMembership => p.group.iter().map(String::as_str).collect(),
            QueryKind::GroupObjectIds => p.groups.iter().map(String::as_str).collect(),
            QueryKind::ServicePrincipalDetails => {
                p.service_principals.iter().map(String::as_str).collect()
            }
        }
    }
}

pub trait QueryHandler: Send + Sync {
    fn kind(&self) -> QueryKind;

    /// Reject parameter sets the query cannot run with.
    fn validate(&self, params: &QueryParameters) -> Result<(), FunctionError>;

    /// Keep only the parameters this kind uses.
    fn build_request(&self, params: QueryParameters, identity: IdentityType) -> QueryRequest;

    /// Normalise the collaborator's answer into a list of records: `null`
    /// becomes an empty list, a lone record a one-element list, and `null`
    /// records are dropped.
    fn shape_result(&self, records: Value) -> Value {
        match records {
            Value::Null => Value::Array(Vec::new()),
            Value::Array(items) => Value::Array(items.into_iter().filter(|r| !r.is_null()).collect()),
            other => Value::Array(vec![other]),
        }
    }
}

struct UserValidation;
struct GroupMembership;
struct GroupObjectIds;
struct ServicePrincipalDetails;

impl QueryHandler for UserValidation {
    fn kind(&self) -> QueryKind {
        QueryKind::UserValidation
    }

    fn validate(&self, params: &QueryParameters) -> Result<(), FunctionError> {
        if params.users.is_empty() {
            return Err(FunctionError::InvalidParameters("no users provided for validation"));
        }
        Ok(())
    }

    fn build_request(&self, params: QueryParameters, identity: IdentityType) -> QueryRequest {
        QueryRequest {
            kind: self.kind(),
            identity,
            parameters: QueryParameters {
                users: params.users,
                ..Default::default()
            },
        }
    }
}

impl QueryHandler for GroupMembership {
    fn kind(&self) -> QueryKind {
        QueryKind::GroupMembership
    }

    fn validate(&self, params: &QueryParameters) -> Result<(), FunctionError> {
        match params.group.as_deref() {
            None | Some("") => Err(FunctionError::InvalidParameters("no group name provided")),
            Some(_) => Ok(()),
        }
    }

    fn build_request(&self, params: QueryParameters, identity: IdentityType) -> QueryRequest {
        QueryRequest {
            kind: self.kind(),
            identity,
            parameters: QueryParameters {
                group: params.group,
                ..Default::default()
            },
        }
    }
}

impl QueryHandler for GroupObjectIds {
    fn kind(&self) -> QueryKind {
        QueryKind::GroupObjectIds
    }

    fn validate(&self, params: &QueryParameters) -> Result<(), FunctionError> {
        if params.groups.is_empty() {
            return Err(FunctionError::InvalidParameters("no group names provided"));
        }
        Ok(())
    }

    fn build_request(&self, params: QueryParameters, identity: IdentityType) -> QueryRequest {
        QueryRequest {
            kind: self.kind(),
            identity,
            parameters: QueryParameters {
                groups: params.groups,
                ..Default::default()
            },
        }
    }
}

impl QueryHandler for ServicePrincipalDetails {
    fn kind(&self) -> QueryKind {
        QueryKind::ServicePrincipalDetails
    }

    fn validate(&self, params: &QueryParameters) -> Result<(), FunctionError> {
        if params.service_principals.is_empty() {
            return Err(FunctionError::InvalidParameters(
                "no service principal names provided",
            ));
        }
        Ok(())
    }

    fn build_request(&self, params: QueryParameters, identity: IdentityType) -> QueryRequest {
        QueryRequest {
            kind: self.kind(),
            identity,
            parameters: QueryParameters {
                service_principals: params.service_principals,
                ..Default::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params() -> QueryParameters {
        QueryParameters {
            users: vec!["user@example.com".into()],
            group: Some("Developers".into()),
            groups: vec!["Developers".into(), "Operations".into()],
            service_principals: vec!["MyServiceApp".into()],
        }
    }

    #[test]
    fn test_parse_kinds() {
        for kind in QueryKind::ALL {
            assert_eq!(kind.as_str().parse::<QueryKind>().unwrap(), kind);
            assert_eq!(kind.handler().kind(), kind);
        }
        assert_eq!(
            "InvalidType".parse::<QueryKind>().unwrap_err().to_string(),
            "unsupported query type: InvalidType"
        );
    }

    #[test]
    fn test_serde_names_match_query_type() {
        for kind in QueryKind::ALL {
            assert_eq!(serde_json::to_value(kind).unwrap(), json!(kind.as_str()));
        }
    }

    #[test]
    fn test_validation_messages() {
        let empty = QueryParameters::default();
        let cases = [
            (QueryKind::UserValidation, "no users provided for validation"),
            (QueryKind::GroupMembership, "no group name provided"),
            (QueryKind::GroupObjectIds, "no group names provided"),
            (QueryKind::ServicePrincipalDetails, "no service principal names provided"),
        ];
        for (kind, message) in cases {
            let handler = kind.handler();
            assert_eq!(handler.validate(&empty).unwrap_err().to_string(), message);
            assert!(handler.validate(&params()).is_ok());
        }
    }

    #[test]
    fn test_empty_group_name_rejected() {
        let params = QueryParameters {
            group: Some(String::new()),
            ..Default::default()
        };
        assert!(QueryKind::GroupMembership.handler().validate(&params).is_err());
    }

    #[test]
    fn test_build_request_keeps_relevant_parameters() {
        let request = QueryKind::GroupObjectIds
            .handler()
            .build_request(params(), IdentityType::default());
        assert_eq!(request.kind, QueryKind::GroupObjectIds);
        assert_eq!(request.names(), vec!["Developers", "Operations"]);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "kind": "GroupObjectIDs",
                "identity": "AzureServicePrincipalCredentials",
                "parameters": {"groups": ["Developers", "Operations"]}
            })
        );

        let request = QueryKind::GroupMembership
            .handler()
            .build_request(params(), IdentityType::AzureWorkloadIdentityCredentials);
        assert_eq!(request.names(), vec!["Developers"]);
        assert!(request.parameters.users.is_empty());
    }

    #[test]
    fn test_shape_result() {
        let handler = QueryKind::UserValidation.handler();
        assert_eq!(handler.shape_result(json!(null)), json!([]));
        assert_eq!(handler.shape_result(json!({"id": "a"})), json!([{"id": "a"}]));
        assert_eq!(
            handler.shape_result(json!([{"id": "a"}, null, {"id": "b"}])),
            json!([{"id": "a"}, {"id": "b"}])
        );
    }
}
