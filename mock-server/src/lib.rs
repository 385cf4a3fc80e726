use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expert {
    #[serde(rename = "expertID")]
    pub expert_id: i64,
    pub first_name: String,
    pub last_name: String,
    #[serde(rename = "personalID")]
    pub personal_id: Option<String>,
    pub birth_date: Option<String>,
    #[serde(rename = "addressID")]
    pub address_id: Option<i64>,
    #[serde(rename = "contactID")]
    pub contact_id: Option<i64>,
    pub email: String,
    pub specialization: Option<String>,
    pub market_hourly_rate: f64,
    pub market_daily_rate: f64,
    pub education_level: Option<String>,
    #[serde(rename = "seniorityLevelID")]
    pub seniority_level_id: i64,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub operation_name: Option<String>,
    #[serde(default)]
    pub variables: Value,
}

/// What the server answers with. Non-empty `errors` makes every query fail
/// with those messages.
#[derive(Clone, Debug, Default)]
pub struct MockState {
    pub experts: Vec<Expert>,
    pub errors: Vec<String>,
}

impl MockState {
    pub fn seeded() -> Self {
        Self {
            experts: seed_experts(),
            errors: Vec::new(),
        }
    }

    pub fn failing(messages: &[&str]) -> Self {
        Self {
            experts: Vec::new(),
            errors: messages.iter().map(|m| m.to_string()).collect(),
        }
    }
}

/// Shared, read-only server state. Tests pick the state per router.
pub type Db = Arc<MockState>;

pub fn seed_experts() -> Vec<Expert> {
    vec![
        Expert {
            expert_id: 1,
            first_name: "Jana".to_string(),
            last_name: "Nováková".to_string(),
            personal_id: Some("855412/1234".to_string()),
            birth_date: Some("1985-04-12".to_string()),
            address_id: Some(11),
            contact_id: Some(21),
            email: "jana.novakova@example.cz".to_string(),
            specialization: Some("Data engineering".to_string()),
            market_hourly_rate: 1200.0,
            market_daily_rate: 9000.0,
            education_level: Some("Ing.".to_string()),
            seniority_level_id: 3,
            created_at: "2024-01-15T09:30:00Z".to_string(),
        },
        Expert {
            expert_id: 2,
            first_name: "Petr".to_string(),
            last_name: "Svoboda".to_string(),
            personal_id: None,
            birth_date: None,
            address_id: None,
            contact_id: Some(22),
            email: "petr.svoboda@example.cz".to_string(),
            specialization: None,
            market_hourly_rate: 850.5,
            market_daily_rate: 6400.0,
            education_level: None,
            seniority_level_id: 1,
            created_at: "2024-02-01T14:00:00Z".to_string(),
        },
        Expert {
            expert_id: 3,
            first_name: "Lucie".to_string(),
            last_name: "Černá".to_string(),
            personal_id: Some(String::new()),
            birth_date: Some("1990-11-30".to_string()),
            address_id: Some(0),
            contact_id: None,
            email: "lucie.cerna@example.cz".to_string(),
            specialization: Some("Security".to_string()),
            market_hourly_rate: 1500.0,
            market_daily_rate: 11000.0,
            education_level: Some("Mgr.".to_string()),
            seniority_level_id: 4,
            created_at: "2024-03-10T08:15:00Z".to_string(),
        },
    ]
}

pub fn app() -> Router {
    app_with(MockState::seeded())
}

pub fn app_with(state: MockState) -> Router {
    let db: Db = Arc::new(state);
    Router::new().route("/graphql", post(graphql)).with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, state: MockState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(state)).await
}

fn errors_body(messages: &[String]) -> Value {
    let errors: Vec<Value> = messages.iter().map(|m| json!({ "message": m })).collect();
    json!({ "data": null, "errors": errors })
}

async fn graphql(State(db): State<Db>, Json(req): Json<GraphqlRequest>) -> (StatusCode, Json<Value>) {
    info!(operation = ?req.operation_name, variables = %req.variables, "graphql request");

    if req.query.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(errors_body(&["Must provide query string.".to_string()])),
        );
    }

    let state = db.as_ref();
    if !state.errors.is_empty() {
        warn!(errors = ?state.errors, "answering with configured errors");
        return (StatusCode::OK, Json(errors_body(&state.errors)));
    }

    let is_get_experts = match req.operation_name.as_deref() {
        Some(name) => name == "GetExperts",
        None => req.query.contains("experts"),
    };
    if !is_get_experts {
        let name = req.operation_name.unwrap_or_default();
        return (
            StatusCode::OK,
            Json(errors_body(&[format!("Unknown operation \"{name}\"")])),
        );
    }

    (
        StatusCode::OK,
        Json(json!({ "data": { "experts": state.experts } })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expert_serializes_with_graphql_field_names() {
        let json = serde_json::to_value(&seed_experts()[0]).unwrap();
        assert_eq!(json["expertID"], 1);
        assert_eq!(json["firstName"], "Jana");
        assert_eq!(json["seniorityLevelID"], 3);
        assert_eq!(json["marketDailyRate"], 9000.0);
    }

    #[test]
    fn optional_fields_serialize_as_null() {
        let json = serde_json::to_value(&seed_experts()[1]).unwrap();
        assert!(json["personalID"].is_null());
        assert!(json["addressID"].is_null());
    }

    #[test]
    fn seed_ids_are_unique_and_ordered() {
        let ids: Vec<i64> = seed_experts().iter().map(|e| e.expert_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn request_defaults_missing_fields() {
        let req: GraphqlRequest = serde_json::from_str(r#"{"query":"{ experts { expertID } }"}"#).unwrap();
        assert!(req.operation_name.is_none());
        assert!(req.variables.is_null());
    }

    #[test]
    fn errors_body_lists_every_message() {
        let body = errors_body(&["a".to_string(), "b".to_string()]);
        assert!(body["data"].is_null());
        assert_eq!(body["errors"][1]["message"], "b");
    }
}
