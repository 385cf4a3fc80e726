//! Client core for the experts list app.
//!
//! # Overview
//! Builds GraphQL `HttpRequest` values and parses `HttpResponse` values
//! without touching the network (host-does-IO pattern). The mobile host
//! executes the actual HTTP round-trip, including TLS, and reports back.
//!
//! # Design
//! - `ExpertsClient` is configured once: endpoint, link chain, cache,
//!   optional certificate pin and timeout. Three variants (basic, pinned,
//!   discovered) are assembled from `ClientSettings`.
//! - Links observe every operation and response in a fixed order and never
//!   alter payloads.
//! - `ExpertsScreen` drives the list screen's loading/error/success states
//!   and maps experts to display rows.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod cache;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod graphql;
pub mod http;
pub mod link;
pub mod pinning;
pub mod screen;
pub mod types;

pub use cache::{FetchPolicy, InMemoryCache};
pub use client::{ClientBuilder, ExpertsClient};
pub use config::{ClientSettings, ClientVariant};
pub use endpoint::{Endpoint, GatewayDiscovery, RouteTableDiscovery, StaticDiscovery};
pub use error::{ApiError, ConfigError};
pub use graphql::{GetExperts, GraphqlError, GraphqlOperation, GraphqlResponse, Operation};
pub use http::{HttpMethod, HttpRequest, HttpResponse, TransportError, TransportErrorKind};
pub use link::{ErrorLink, Link, LinkChain, LoggerLink};
pub use pinning::{PinnedCertificate, PinningError};
pub use screen::{ExpertRow, ExpertsScreen, QueryState, View};
pub use types::{Expert, ExpertsData};
