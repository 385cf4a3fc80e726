//! GraphQL wire envelope and typed operations.
//!
//! # Design
//! An operation is a zero-sized type implementing `GraphqlOperation`; the
//! query text and name are associated constants so they cannot drift apart.
//! Responses are first decoded into `GraphqlResponse<Value>` so links can
//! observe them without knowing the operation's data type, then converted
//! into the typed payload.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::types::ExpertsData;

/// Typed GraphQL operation definition.
pub trait GraphqlOperation {
    type Variables: Serialize;
    type ResponseData: DeserializeOwned;

    const QUERY: &'static str;
    const OPERATION_NAME: &'static str;

    fn variables(&self) -> Self::Variables;
}

/// Variables of an operation that takes none. Serializes as `{}`.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct NoVariables {}

/// The list screen's only query.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetExperts;

impl GraphqlOperation for GetExperts {
    type Variables = NoVariables;
    type ResponseData = ExpertsData;

    const QUERY: &'static str = "query GetExperts {
  experts {
    expertID
    firstName
    lastName
    personalID
    birthDate
    addressID
    contactID
    email
    specialization
    marketHourlyRate
    marketDailyRate
    educationLevel
    seniorityLevelID
    createdAt
  }
}";
    const OPERATION_NAME: &'static str = "GetExperts";

    fn variables(&self) -> NoVariables {
        NoVariables {}
    }
}

/// Request body posted to the GraphQL endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRequest<'a, V> {
    pub query: &'a str,
    pub operation_name: &'a str,
    pub variables: &'a V,
}

/// Untyped view of an operation, as seen by links.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub name: String,
    pub variables: Value,
}

impl Operation {
    pub fn of<O: GraphqlOperation>(op: &O) -> Result<Self, serde_json::Error> {
        Ok(Self {
            name: O::OPERATION_NAME.to_string(),
            variables: serde_json::to_value(op.variables())?,
        })
    }
}

/// Servers may send `null` for list fields they have nothing to say about.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Location of a GraphQL error within the query text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphqlErrorLocation {
    pub line: u32,
    pub column: u32,
}

/// Path segment of a GraphQL error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GraphqlPathSegment {
    Key(String),
    Index(i64),
}

/// A graph-level error returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphqlError {
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub locations: Vec<GraphqlErrorLocation>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: Vec<GraphqlPathSegment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl GraphqlError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: Vec::new(),
            path: Vec::new(),
            extensions: None,
        }
    }
}

/// GraphQL response container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct GraphqlResponse<T> {
    #[serde(default)]
    pub data: Option<T>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub errors: Vec<GraphqlError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl<T> GraphqlResponse<T> {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// `true` when the body carries neither data nor errors, which no
    /// conforming server produces.
    pub fn is_empty(&self) -> bool {
        self.data.is_none() && self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_experts_request_body() {
        let vars = GetExperts.variables();
        let body = GraphqlRequest {
            query: GetExperts::QUERY,
            operation_name: GetExperts::OPERATION_NAME,
            variables: &vars,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["operationName"], "GetExperts");
        assert_eq!(json["variables"], serde_json::json!({}));
        assert!(json["query"].as_str().unwrap().starts_with("query GetExperts"));
    }

    #[test]
    fn operation_view_carries_name_and_variables() {
        let op = Operation::of(&GetExperts).unwrap();
        assert_eq!(op.name, "GetExperts");
        assert_eq!(op.variables, serde_json::json!({}));
    }

    #[test]
    fn null_data_with_errors() {
        let resp: GraphqlResponse<Value> = serde_json::from_str(
            r#"{"data":null,"errors":[{"message":"boom","path":["experts",0],"locations":[{"line":2,"column":3}]}]}"#,
        )
        .unwrap();
        assert!(resp.data.is_none());
        assert!(resp.has_errors());
        assert_eq!(resp.errors[0].message, "boom");
        assert_eq!(
            resp.errors[0].path,
            vec![GraphqlPathSegment::Key("experts".into()), GraphqlPathSegment::Index(0)]
        );
    }

    #[test]
    fn null_error_fields_keep_the_message() {
        let resp: GraphqlResponse<Value> = serde_json::from_str(
            r#"{"data":null,"errors":[{"message":"Access denied","locations":null,"path":null}]}"#,
        )
        .unwrap();
        assert_eq!(resp.errors[0].message, "Access denied");
        assert!(resp.errors[0].locations.is_empty());
        assert!(resp.errors[0].path.is_empty());
    }

    #[test]
    fn null_errors_list_is_no_errors() {
        let resp: GraphqlResponse<Value> =
            serde_json::from_str(r#"{"data":{"experts":[]},"errors":null}"#).unwrap();
        assert!(!resp.has_errors());
        assert!(!resp.is_empty());
    }

    #[test]
    fn empty_object_is_empty_response() {
        let resp: GraphqlResponse<Value> = serde_json::from_str("{}").unwrap();
        assert!(resp.is_empty());
    }
}
