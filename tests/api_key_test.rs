//! Integration tests for the API key gate:
//! - reads stay open, mutations require the configured key
//! - missing and wrong keys are rejected with 401
//! - an unconfigured key leaves the whole surface open
//! - rejected requests still carry a request ID

mod common;

use axum::http::{Method, StatusCode};
use common::{response_json, TestApp};
use serde_json::json;

const KEY: &str = "test-api-key-0123456789";

#[tokio::test]
async fn reads_never_require_a_key() {
    let app = TestApp::with_api_key(KEY).await;

    for uri in [
        "/api/v1/campaigns",
        "/api/v1/clients",
        "/api/v1/invoices",
        "/api/v1/dashboard/ops-status",
        "/api/v1/health",
    ] {
        let response = app.get(uri).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
    }
}

#[tokio::test]
async fn mutations_require_the_key() {
    let app = TestApp::with_api_key(KEY).await;
    let payload = json!({ "name": "Luminous Records" });

    let response = app.post("/api/v1/clients", payload.clone()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Unauthorized");
    assert_eq!(body["message"], "API key required");

    let response = app
        .request(
            Method::POST,
            "/api/v1/clients",
            Some(payload.clone()),
            Some("wrong-key"),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Invalid API key");

    let response = app
        .request(Method::POST, "/api/v1/clients", Some(payload), Some(KEY))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn the_key_gates_every_mutating_method() {
    let app = TestApp::with_api_key(KEY).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/vendors",
            Some(json!({ "name": "StreamLift Media", "cost_rate": "0.004" })),
            Some(KEY),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let vendor = response_json(response).await;
    let vendor_id = vendor["data"]["id"].as_str().unwrap().to_string();

    // PUT without the key.
    let response = app
        .put(
            &format!("/api/v1/vendors/{vendor_id}"),
            json!({ "name": "StreamLift Rebranded" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // DELETE without the key.
    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/vendors/{vendor_id}"),
            None,
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Same requests succeed once the key is presented.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/vendors/{vendor_id}"),
            Some(json!({ "name": "StreamLift Rebranded" })),
            Some(KEY),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/vendors/{vendor_id}"),
            None,
            Some(KEY),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["is_active"], false);
}

#[tokio::test]
async fn no_configured_key_leaves_the_surface_open() {
    let app = TestApp::new().await;

    let response = app
        .post("/api/v1/clients", json!({ "name": "Open Door Records" }))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn rejected_requests_still_carry_a_request_id() {
    let app = TestApp::with_api_key(KEY).await;

    let response = app.post("/api/v1/clients", json!({ "name": "Nope" })).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("request id header on auth failures");
    assert!(!request_id.to_str().unwrap().is_empty());
}
