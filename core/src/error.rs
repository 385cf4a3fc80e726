//! Error types for the experts client.
//!
//! # Design
//! Two kinds of failure reach the screen: graph-level errors returned by the
//! server (`Graphql`) and transport-level failures (`Transport`, or
//! `HttpError` when the host did get a response but it was not a GraphQL
//! payload). Serde failures get their own variants for debugging.

use thiserror::Error;

use crate::graphql::GraphqlError;
use crate::http::TransportError;

/// Errors returned by `ExpertsClient` operations.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The server answered with GraphQL errors. Displays the first message.
    #[error("{}", first_message(.errors))]
    Graphql { errors: Vec<GraphqlError> },

    /// The round-trip failed before a response arrived.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server returned a non-2xx status without a GraphQL payload.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

impl ApiError {
    /// `true` for failures where no usable GraphQL response was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_) | ApiError::HttpError { .. })
    }
}

fn first_message(errors: &[GraphqlError]) -> &str {
    errors
        .first()
        .map(|e| e.message.as_str())
        .unwrap_or("unknown GraphQL error")
}

/// Invalid client settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("settings are not valid JSON: {0}")]
    Parse(String),

    #[error("host must not be empty")]
    EmptyHost,

    #[error("port must not be zero")]
    InvalidPort,

    #[error("unsupported scheme {0:?}")]
    InvalidScheme(String),

    #[error("path must start with '/': {0:?}")]
    InvalidPath(String),

    #[error("variant {0} requires a pinned certificate")]
    MissingCertificate(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::TransportErrorKind;

    #[test]
    fn graphql_error_displays_first_message() {
        let err = ApiError::Graphql {
            errors: vec![GraphqlError::new("first"), GraphqlError::new("second")],
        };
        assert_eq!(err.to_string(), "first");
        assert!(!err.is_transport());
    }

    #[test]
    fn transport_error_is_transparent() {
        let err: ApiError = TransportError::new(TransportErrorKind::Connect, "refused").into();
        assert_eq!(err.to_string(), "connection failed: refused");
        assert!(err.is_transport());
    }
}
