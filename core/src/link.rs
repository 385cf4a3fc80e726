//! Request/response observers composed in front of the transport.
//!
//! # Design
//! A `LinkChain` holds links in composition order. Outgoing operations visit
//! the links front to back; responses and failures visit them back to front,
//! as if each link wrapped everything after it. Links only observe: they get
//! shared references and cannot alter payloads, retry, or short-circuit.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info};

use crate::error::ApiError;
use crate::graphql::{GraphqlResponse, Operation};

/// A composable observer in the query-execution chain.
pub trait Link: Send + Sync + fmt::Debug {
    fn on_request(&self, _operation: &Operation) {}

    fn on_response(&self, _operation: &Operation, _response: &GraphqlResponse<Value>) {}

    /// Called for failures that produced no GraphQL payload.
    fn on_failure(&self, _operation: &Operation, _error: &ApiError) {}
}

/// Logs every operation and every response.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggerLink;

impl Link for LoggerLink {
    fn on_request(&self, operation: &Operation) {
        info!(
            operation = %operation.name,
            variables = %operation.variables,
            "[GraphQL Request]"
        );
    }

    fn on_response(&self, operation: &Operation, response: &GraphqlResponse<Value>) {
        info!(operation = %operation.name, response = ?response, "[GraphQL Response]");
    }
}

/// Reports graph-level errors and transport failures.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorLink;

impl Link for ErrorLink {
    fn on_response(&self, operation: &Operation, response: &GraphqlResponse<Value>) {
        if response.has_errors() {
            error!(operation = %operation.name, errors = ?response.errors, "[GraphQL Error]");
        }
    }

    fn on_failure(&self, operation: &Operation, err: &ApiError) {
        error!(operation = %operation.name, error = %err, "[Network Error]");
    }
}

/// Ordered sequence of links.
#[derive(Debug, Clone, Default)]
pub struct LinkChain {
    links: Vec<Arc<dyn Link>>,
}

impl LinkChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// The chain every client variant starts from: logger, then error link.
    pub fn standard() -> Self {
        Self::new().with(LoggerLink).with(ErrorLink)
    }

    pub fn with(mut self, link: impl Link + 'static) -> Self {
        self.links.push(Arc::new(link));
        self
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub(crate) fn request(&self, operation: &Operation) {
        for link in &self.links {
            link.on_request(operation);
        }
    }

    pub(crate) fn response(&self, operation: &Operation, response: &GraphqlResponse<Value>) {
        for link in self.links.iter().rev() {
            link.on_response(operation, response);
        }
    }

    pub(crate) fn failure(&self, operation: &Operation, err: &ApiError) {
        for link in self.links.iter().rev() {
            link.on_failure(operation, err);
        }
    }
}
