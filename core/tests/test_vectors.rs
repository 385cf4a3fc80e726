//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! The vector file describes the expected request, simulated responses, and
//! expected parse results or errors. Comparing parsed JSON (not raw strings)
//! avoids false negatives from field-ordering differences.

use experts_core::{
    ApiError, Endpoint, ExpertsClient, ExpertsData, ExpertsScreen, GetExperts, GraphqlOperation,
    HttpMethod, HttpResponse,
};

const BASE_URL: &str = "http://localhost:3000";

fn client() -> ExpertsClient {
    ExpertsClient::new(Endpoint::new("http", "localhost", 3000, "/graphql"))
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "POST" => HttpMethod::Post,
        other => panic!("unknown method: {other}"),
    }
}

fn simulated(case: &serde_json::Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers: Vec::new(),
        body: sim["body"].as_str().unwrap().to_string(),
    }
}

fn vectors() -> serde_json::Value {
    let raw = include_str!("../../test-vectors/get_experts.json");
    serde_json::from_str(raw).unwrap()
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

#[test]
fn get_experts_request_vector() {
    let vectors = vectors();
    let expected_req = &vectors["expected_request"];

    let req = client().build_get_experts().unwrap();
    assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()));
    assert_eq!(req.url, format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()));

    let expected_headers: Vec<(String, String)> = expected_req["headers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let arr = h.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect();
    assert_eq!(req.headers, expected_headers);

    let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
    assert_eq!(body["operationName"], expected_req["body"]["operationName"]);
    assert_eq!(body["variables"], expected_req["body"]["variables"]);
    assert_eq!(body["query"], GetExperts::QUERY);
}

// ---------------------------------------------------------------------------
// Parse
// ---------------------------------------------------------------------------

#[test]
fn get_experts_response_vectors() {
    let vectors = vectors();
    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let result = c.parse_get_experts(simulated(case));

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            match expected_error.as_str().unwrap() {
                "Graphql" => assert!(matches!(err, ApiError::Graphql { .. }), "{name}: expected Graphql"),
                "HttpError" => assert!(matches!(err, ApiError::HttpError { .. }), "{name}: expected HttpError"),
                "DeserializationError" => {
                    assert!(matches!(err, ApiError::DeserializationError(_)), "{name}: expected DeserializationError")
                }
                other => panic!("{name}: unknown expected_error: {other}"),
            }
            if let Some(message) = case.get("expected_message") {
                assert_eq!(err.to_string(), message.as_str().unwrap(), "{name}: message");
            }
        } else {
            let data = result.unwrap();
            let expected: ExpertsData = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(data, expected, "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Screen
// ---------------------------------------------------------------------------

#[test]
fn get_experts_screen_vectors() {
    let vectors = vectors();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let c = client();
        let mut screen = ExpertsScreen::new();
        screen.mount(&c).unwrap();
        screen.receive(&c, simulated(case));

        match case.get("expected_rows") {
            Some(n) => assert_eq!(screen.rows().len() as u64, n.as_u64().unwrap(), "{name}: rows"),
            None => assert!(screen.rows().is_empty(), "{name}: error state has no rows"),
        }
    }
}
