//! Domain DTOs for the experts API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates. Field
//! names follow the server's camelCase GraphQL schema.

use serde::{Deserialize, Serialize};

/// A professional and their billing/profile attributes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Expert {
    #[serde(rename = "expertID")]
    pub expert_id: i64,
    pub first_name: String,
    pub last_name: String,
    #[serde(rename = "personalID", default)]
    pub personal_id: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(rename = "addressID", default)]
    pub address_id: Option<i64>,
    #[serde(rename = "contactID", default)]
    pub contact_id: Option<i64>,
    pub email: String,
    #[serde(default)]
    pub specialization: Option<String>,
    pub market_hourly_rate: f64,
    pub market_daily_rate: f64,
    #[serde(default)]
    pub education_level: Option<String>,
    #[serde(rename = "seniorityLevelID")]
    pub seniority_level_id: i64,
    pub created_at: String,
}

/// `data` payload of the `GetExperts` query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpertsData {
    pub experts: Vec<Expert>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expert_uses_server_field_names() {
        let json = r#"{
            "expertID": 7,
            "firstName": "Jana",
            "lastName": "Nováková",
            "personalID": null,
            "birthDate": "1985-04-12",
            "addressID": 3,
            "contactID": null,
            "email": "jana@example.cz",
            "specialization": "Rust",
            "marketHourlyRate": 1200.5,
            "marketDailyRate": 9000,
            "educationLevel": null,
            "seniorityLevelID": 2,
            "createdAt": "2024-01-01T10:00:00Z"
        }"#;
        let expert: Expert = serde_json::from_str(json).unwrap();
        assert_eq!(expert.expert_id, 7);
        assert_eq!(expert.birth_date.as_deref(), Some("1985-04-12"));
        assert_eq!(expert.address_id, Some(3));
        assert!(expert.contact_id.is_none());
        assert_eq!(expert.market_daily_rate, 9000.0);

        let back = serde_json::to_value(&expert).unwrap();
        assert_eq!(back["expertID"], 7);
        assert_eq!(back["seniorityLevelID"], 2);
        assert!(back.get("expert_id").is_none());
    }

    #[test]
    fn optional_fields_may_be_omitted() {
        let json = r#"{
            "expertID": 1,
            "firstName": "Petr",
            "lastName": "Svoboda",
            "email": "petr@example.cz",
            "marketHourlyRate": 800,
            "marketDailyRate": 6000,
            "seniorityLevelID": 1,
            "createdAt": "2024-02-02T08:30:00Z"
        }"#;
        let expert: Expert = serde_json::from_str(json).unwrap();
        assert!(expert.personal_id.is_none());
        assert!(expert.specialization.is_none());
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let result: Result<Expert, _> = serde_json::from_str(r#"{"expertID":1}"#);
        assert!(result.is_err());
    }
}
