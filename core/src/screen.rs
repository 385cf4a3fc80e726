//! State and row layout of the experts list screen.
//!
//! # Design
//! The screen never performs I/O. `mount` either serves the cache or hands
//! the host a request to execute; the host then calls `receive` with the
//! response or `fail` with the transport error. `render` turns the current
//! state into what the host's UI toolkit should draw.

use tracing::warn;

use crate::cache::FetchPolicy;
use crate::client::ExpertsClient;
use crate::error::ApiError;
use crate::graphql::GetExperts;
use crate::http::{HttpRequest, HttpResponse, TransportError};
use crate::types::Expert;

pub const SCREEN_TITLE: &str = "Seznam expertů";
pub const ERROR_PREFIX: &str = "Chyba: ";
const NOT_PROVIDED: &str = "Neuvedeno";

/// Result of the screen's query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState {
    Loading,
    Error { message: String },
    Success { experts: Vec<Expert> },
}

/// One visual row of the list, keyed by expert ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpertRow {
    pub key: String,
    pub title: String,
    pub details: Vec<String>,
}

impl From<&Expert> for ExpertRow {
    fn from(e: &Expert) -> Self {
        Self {
            key: e.expert_id.to_string(),
            title: format!("{} {}", e.first_name, e.last_name),
            details: vec![
                format!("ID: {}", e.expert_id),
                format!("Osobní ID: {}", text_or_missing(&e.personal_id)),
                format!("Datum narození: {}", text_or_missing(&e.birth_date)),
                format!("Adresa ID: {}", id_or_missing(e.address_id)),
                format!("Kontakt ID: {}", id_or_missing(e.contact_id)),
                format!("Email: {}", e.email),
                format!("Specializace: {}", text_or_missing(&e.specialization)),
                format!("Hodinová sazba: {} Kč", e.market_hourly_rate),
                format!("Denní sazba: {} Kč", e.market_daily_rate),
                format!("Vzdělání: {}", text_or_missing(&e.education_level)),
                format!("Seniority level ID: {}", e.seniority_level_id),
                format!("Vytvořeno: {}", e.created_at),
            ],
        }
    }
}

/// Empty strings count as missing, like absent ones.
fn text_or_missing(value: &Option<String>) -> &str {
    match value.as_deref() {
        Some(s) if !s.is_empty() => s,
        _ => NOT_PROVIDED,
    }
}

/// Only absent IDs are missing; zero is a real ID.
fn id_or_missing(value: Option<i64>) -> String {
    value.map_or_else(|| NOT_PROVIDED.to_string(), |id| id.to_string())
}

/// What the host should draw for the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Spinner,
    ErrorText(String),
    List { title: String, rows: Vec<ExpertRow> },
}

/// The experts list screen. One instance per mounted screen.
#[derive(Debug, Clone)]
pub struct ExpertsScreen {
    state: QueryState,
    in_flight: bool,
}

impl Default for ExpertsScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpertsScreen {
    pub fn new() -> Self {
        Self {
            state: QueryState::Loading,
            in_flight: false,
        }
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Start the screen's query.
    ///
    /// Returns the request the host must execute, or `None` when the cache
    /// answered, a query is already in flight, or the request could not be
    /// built (the state then says why).
    pub fn mount(&mut self, client: &ExpertsClient) -> Option<HttpRequest> {
        if self.in_flight {
            return None;
        }
        if client.fetch_policy() == FetchPolicy::CacheFirst {
            if let Some(data) = client.read_cache::<GetExperts>() {
                self.state = QueryState::Success {
                    experts: data.experts,
                };
                return None;
            }
        }
        match client.build_get_experts() {
            Ok(request) => {
                self.state = QueryState::Loading;
                self.in_flight = true;
                Some(request)
            }
            Err(e) => {
                self.settle(Err(e));
                None
            }
        }
    }

    /// Deliver the host's response to the request returned by `mount`.
    pub fn receive(&mut self, client: &ExpertsClient, response: HttpResponse) {
        if !self.in_flight {
            warn!(status = response.status, "response arrived with no query in flight");
            return;
        }
        let outcome = client.parse_get_experts(response).map(|data| data.experts);
        self.settle(outcome);
    }

    /// Report that the request returned by `mount` never got a response.
    pub fn fail(&mut self, client: &ExpertsClient, error: TransportError) {
        if !self.in_flight {
            warn!(error = %error, "transport failure with no query in flight");
            return;
        }
        let err = client.fail_get_experts(error);
        self.settle(Err(err));
    }

    fn settle(&mut self, outcome: Result<Vec<Expert>, ApiError>) {
        self.in_flight = false;
        self.state = match outcome {
            Ok(experts) => QueryState::Success { experts },
            Err(e) => QueryState::Error {
                message: e.to_string(),
            },
        };
    }

    pub fn rows(&self) -> Vec<ExpertRow> {
        match &self.state {
            QueryState::Success { experts } => experts.iter().map(ExpertRow::from).collect(),
            QueryState::Loading | QueryState::Error { .. } => Vec::new(),
        }
    }

    pub fn render(&self) -> View {
        match &self.state {
            QueryState::Loading => View::Spinner,
            QueryState::Error { message } => View::ErrorText(format!("{ERROR_PREFIX}{message}")),
            QueryState::Success { .. } => View::List {
                title: SCREEN_TITLE.to_string(),
                rows: self.rows(),
            },
        }
    }
}
