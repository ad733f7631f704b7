//! Common test utilities for integration tests
//!
//! Every test app talks to its own wiremock server standing in for the
//! Withings API, so the full stack from router to HTTP client is exercised.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use body_scan_backend::{
    config::{AppConfig, ServerConfig, WithingsConfig},
    routes,
    state::AppState,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
    pub withings: MockServer,
}

/// Response captured by the test helpers
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("response body is not JSON")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl TestApp {
    /// Create a test application backed by a mock Withings server
    pub async fn new() -> Self {
        let withings = MockServer::start().await;
        let state = AppState::new(test_config(&withings.uri())).expect("Failed to build state");
        let app = routes::create_router(state);

        Self { app, withings }
    }

    /// Create a test application without Withings client credentials
    pub async fn unconfigured() -> Self {
        let withings = MockServer::start().await;
        let mut config = test_config(&withings.uri());
        config.withings.client_id.clear();
        config.withings.client_secret.clear();
        let app = routes::create_router(AppState::new(config).expect("Failed to build state"));

        Self { app, withings }
    }

    /// Send a request and capture the response
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            headers,
            body: String::from_utf8(body.to_vec()).unwrap(),
        }
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self.send(request).await;
        (response.status, response.body)
    }

    /// Make a POST request with JSON body
    pub async fn post(&self, path: &str, body: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = self.send(request).await;
        (response.status, response.body)
    }

    /// Serve the given groups for `access_token`
    pub async fn mock_measures(&self, access_token: &str, groups: Value) {
        Mock::given(method("POST"))
            .and(path("/measure"))
            .and(body_string_contains(format!("access_token={access_token}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 0,
                "body": {"measuregrps": groups, "more": 0}
            })))
            .mount(&self.withings)
            .await;
    }

    /// Reject `access_token` with Withings' invalid-token status
    pub async fn mock_expired(&self, access_token: &str) {
        Mock::given(method("POST"))
            .and(path("/measure"))
            .and(body_string_contains(format!("access_token={access_token}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 401,
                "error": "invalid_token"
            })))
            .mount(&self.withings)
            .await;
    }

    /// Answer a refresh grant with a new pair
    pub async fn mock_refresh(&self, access_token: &str, refresh_token: &str) {
        Mock::given(method("POST"))
            .and(path("/v2/oauth2"))
            .and(body_string_contains("grant_type=refresh_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 0,
                "body": {
                    "access_token": access_token,
                    "refresh_token": refresh_token,
                    "expires_in": 10800,
                    "userid": "12345"
                }
            })))
            .mount(&self.withings)
            .await;
    }
}

/// Two sessions a week apart: weight 112.0 → 111.0, fat 30.0 → 29.5
pub fn two_sessions() -> Value {
    json!([
        {"date": 1755238320, "measures": [
            {"type": 1, "value": 1110, "unit": -1},
            {"type": 6, "value": 295, "unit": -1},
            {"type": 8, "value": 750, "unit": -1}
        ]},
        {"date": 1754633520, "measures": [
            {"type": 1, "value": 1120, "unit": -1},
            {"type": 6, "value": 300, "unit": -1},
            {"type": 8, "value": 752, "unit": -1}
        ]}
    ])
}

fn test_config(base: &str) -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        withings: WithingsConfig {
            client_id: "test-client".to_string(),
            client_secret: "test-secret".to_string(),
            redirect_uri: "http://localhost:8080/api/withings/callback".to_string(),
            authorize_url: format!("{}/oauth2_user/authorize2", base),
            token_url: format!("{}/v2/oauth2", base),
            measure_url: format!("{}/measure", base),
            scope: "user.metrics".to_string(),
            timeout_secs: 5,
            max_pages: 5,
        },
        ..AppConfig::default()
    }
}
