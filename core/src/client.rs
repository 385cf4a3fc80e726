//! GraphQL request builder and response parser for the experts API.
//!
//! # Design
//! `ExpertsClient` holds configuration only: endpoint, link chain, cache,
//! optional pin and timeout. Each query is split into `build_query`, which
//! runs the links over the outgoing operation and produces an `HttpRequest`,
//! and `parse_query` / `fail_query`, which run the links over whatever came
//! back. The host executes the HTTP round-trip in between.

use std::time::Duration;

use serde_json::Value;

use crate::cache::{FetchPolicy, InMemoryCache};
use crate::config::{ClientSettings, ClientVariant};
use crate::endpoint::{resolve_endpoint, Endpoint, GatewayDiscovery};
use crate::error::{ApiError, ConfigError};
use crate::graphql::{GetExperts, GraphqlOperation, GraphqlRequest, GraphqlResponse, Operation};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, TransportError};
use crate::link::{Link, LinkChain};
use crate::pinning::PinnedCertificate;
use crate::types::ExpertsData;

/// Step-by-step construction of an `ExpertsClient`.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    endpoint: Endpoint,
    links: LinkChain,
    cache: InMemoryCache,
    pin: Option<PinnedCertificate>,
    timeout: Option<Duration>,
    fetch_policy: FetchPolicy,
}

impl ClientBuilder {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            links: LinkChain::new(),
            cache: InMemoryCache::new(),
            pin: None,
            timeout: None,
            fetch_policy: FetchPolicy::default(),
        }
    }

    /// Append a link after the ones already added.
    pub fn link(mut self, link: impl Link + 'static) -> Self {
        self.links = self.links.with(link);
        self
    }

    pub fn links(mut self, links: LinkChain) -> Self {
        self.links = links;
        self
    }

    pub fn cache(mut self, cache: InMemoryCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn pin(mut self, pin: PinnedCertificate) -> Self {
        self.pin = Some(pin);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn fetch_policy(mut self, policy: FetchPolicy) -> Self {
        self.fetch_policy = policy;
        self
    }

    pub fn build(self) -> ExpertsClient {
        ExpertsClient {
            endpoint: self.endpoint,
            links: self.links,
            cache: self.cache,
            pin: self.pin,
            timeout: self.timeout,
            fetch_policy: self.fetch_policy,
        }
    }
}

/// Configured query-execution client.
#[derive(Debug, Clone)]
pub struct ExpertsClient {
    endpoint: Endpoint,
    links: LinkChain,
    cache: InMemoryCache,
    pin: Option<PinnedCertificate>,
    timeout: Option<Duration>,
    fetch_policy: FetchPolicy,
}

impl ExpertsClient {
    /// Basic client: logger and error links, no pin, no timeout.
    pub fn new(endpoint: Endpoint) -> Self {
        Self::builder(endpoint).links(LinkChain::standard()).build()
    }

    pub fn builder(endpoint: Endpoint) -> ClientBuilder {
        ClientBuilder::new(endpoint)
    }

    /// Assemble the client variant named by `settings`.
    ///
    /// Discovery only runs for `ClientVariant::Discovered`, once, here.
    pub fn from_settings(
        settings: &ClientSettings,
        discovery: &dyn GatewayDiscovery,
        pin: Option<PinnedCertificate>,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;
        let configured = settings.endpoint();
        let endpoint = match settings.variant {
            ClientVariant::Discovered => resolve_endpoint(discovery, &configured),
            ClientVariant::Basic | ClientVariant::Pinned => configured,
        };

        let mut builder = Self::builder(endpoint)
            .links(LinkChain::standard())
            .fetch_policy(settings.fetch_policy);
        if let Some(timeout) = settings.timeout() {
            builder = builder.timeout(timeout);
        }
        if settings.variant.requires_pin() {
            let pin = pin.ok_or(ConfigError::MissingCertificate(settings.variant.name()))?;
            builder = builder.pin(pin);
        }
        Ok(builder.build())
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn cache(&self) -> &InMemoryCache {
        &self.cache
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn fetch_policy(&self) -> FetchPolicy {
        self.fetch_policy
    }

    pub fn is_pinned(&self) -> bool {
        self.pin.is_some()
    }

    /// Cached data for `O`, if a previous fetch succeeded.
    pub fn read_cache<O: GraphqlOperation>(&self) -> Option<O::ResponseData> {
        let data = self.cache.read(O::OPERATION_NAME)?;
        serde_json::from_value(data).ok()
    }

    pub fn build_query<O: GraphqlOperation>(&self, op: &O) -> Result<HttpRequest, ApiError> {
        let operation =
            Operation::of(op).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let body = serde_json::to_string(&GraphqlRequest {
            query: O::QUERY,
            operation_name: O::OPERATION_NAME,
            variables: &operation.variables,
        })
        .map_err(|e| ApiError::SerializationError(e.to_string()))?;

        self.links.request(&operation);

        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.endpoint.url(),
            headers: vec![
                ("content-type".to_string(), "application/json".to_string()),
                ("accept".to_string(), "application/json".to_string()),
            ],
            body: Some(body),
            timeout: self.timeout,
        })
    }

    /// Interpret the host's response to a request built by `build_query`.
    ///
    /// A payload with any GraphQL errors is an error outcome even when it
    /// also carries data. Only clean results reach the cache.
    pub fn parse_query<O: GraphqlOperation>(
        &self,
        op: &O,
        response: HttpResponse,
    ) -> Result<O::ResponseData, ApiError> {
        let operation =
            Operation::of(op).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let parsed = serde_json::from_str::<GraphqlResponse<Value>>(&response.body);
        let envelope = match parsed {
            Ok(envelope) if !envelope.is_empty() => envelope,
            _ if !response.is_success() => {
                return Err(self.report(
                    &operation,
                    ApiError::HttpError {
                        status: response.status,
                        body: response.body,
                    },
                ));
            }
            Ok(_) => {
                return Err(self.report(
                    &operation,
                    ApiError::DeserializationError(
                        "response carries neither data nor errors".to_string(),
                    ),
                ));
            }
            Err(e) => {
                return Err(self.report(&operation, ApiError::DeserializationError(e.to_string())));
            }
        };

        self.links.response(&operation, &envelope);

        if envelope.has_errors() {
            return Err(ApiError::Graphql {
                errors: envelope.errors,
            });
        }
        let data = envelope.data.unwrap_or(Value::Null);
        let typed = serde_json::from_value(data.clone()).map_err(|e| {
            self.report(&operation, ApiError::DeserializationError(e.to_string()))
        })?;
        self.cache.write(O::OPERATION_NAME, data);
        Ok(typed)
    }

    /// Record a round-trip that never produced a response.
    pub fn fail_query<O: GraphqlOperation>(&self, op: &O, error: TransportError) -> ApiError {
        let name = O::OPERATION_NAME.to_string();
        let operation = Operation::of(op).unwrap_or(Operation {
            name,
            variables: Value::Null,
        });
        self.report(&operation, ApiError::Transport(error))
    }

    /// Check the server's leaf certificate. Unpinned clients accept anything
    /// the host's trust store accepted.
    pub fn verify_peer_certificate(&self, der: &[u8]) -> Result<(), TransportError> {
        match &self.pin {
            Some(pin) => pin.verify(der),
            None => Ok(()),
        }
    }

    pub fn build_get_experts(&self) -> Result<HttpRequest, ApiError> {
        self.build_query(&GetExperts)
    }

    pub fn parse_get_experts(&self, response: HttpResponse) -> Result<ExpertsData, ApiError> {
        self.parse_query(&GetExperts, response)
    }

    pub fn fail_get_experts(&self, error: TransportError) -> ApiError {
        self.fail_query(&GetExperts, error)
    }

    fn report(&self, operation: &Operation, err: ApiError) -> ApiError {
        self.links.failure(operation, &err);
        err
    }
}
