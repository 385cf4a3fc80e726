//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests, responses and transport failures as
//! plain data. The core builds `HttpRequest` values and parses `HttpResponse`
//! values without ever touching the network. The host executes the I/O,
//! including TLS and any certificate pinning, and reports either a response
//! or a `TransportError` back to the core.
//!
//! All fields use owned types (`String`, `Vec`) so values can cross the FFI
//! boundary without lifetime concerns.

use std::time::Duration;

use thiserror::Error;

/// HTTP method for a request. GraphQL operations are always posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Post,
}

/// An HTTP request described as plain data.
///
/// `timeout` is the total time the host may spend on the round-trip. `None`
/// means the host's own default applies.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Category of a failed round-trip, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Timeout,
    Connect,
    Tls,
    Other,
}

impl TransportErrorKind {
    fn label(self) -> &'static str {
        match self {
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Connect => "connection failed",
            TransportErrorKind::Tls => "TLS failure",
            TransportErrorKind::Other => "network error",
        }
    }
}

/// A round-trip that never produced an HTTP response.
///
/// Certificate pinning failures are reported as `Tls` and carry no extra
/// detail, so callers cannot tell them apart from any other TLS failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}: {message}", kind.label())]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(after: Duration) -> Self {
        Self::new(
            TransportErrorKind::Timeout,
            format!("no response within {}s", after.as_secs()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let req = HttpRequest {
            method: HttpMethod::Post,
            url: "https://example.test/graphql".to_string(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: None,
            timeout: None,
        };
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header("accept"), None);
    }

    #[test]
    fn success_range_is_2xx() {
        let mut resp = HttpResponse {
            status: 204,
            headers: Vec::new(),
            body: String::new(),
        };
        assert!(resp.is_success());
        resp.status = 302;
        assert!(!resp.is_success());
    }

    #[test]
    fn timeout_error_mentions_duration() {
        let err = TransportError::timeout(Duration::from_secs(10));
        assert_eq!(err.kind, TransportErrorKind::Timeout);
        assert_eq!(err.to_string(), "timeout: no response within 10s");
    }
}
