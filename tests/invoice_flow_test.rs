//! Integration tests for invoicing:
//! - auto-generated invoice numbers and the uniqueness backstop
//! - the pending -> paid / pending -> void lifecycle
//! - creation validation (amounts, dates, cross-client campaigns)
//! - overdue, status, and client filters with pagination

mod common;

use axum::http::StatusCode;
use chrono::{Datelike, Duration, Utc};
use common::{create_and_read, response_json, TestApp};
use serde_json::{json, Value};

async fn seed_client(app: &TestApp, name: &str) -> String {
    let client = create_and_read(app, "/api/v1/clients", json!({ "name": name })).await;
    client["id"].as_str().unwrap().to_string()
}

async fn create_invoice(app: &TestApp, payload: Value) -> Value {
    create_and_read(app, "/api/v1/invoices", payload).await
}

// ---------------------------------------------------------------------------
// Invoice numbering
// ---------------------------------------------------------------------------

#[tokio::test]
async fn omitted_invoice_numbers_are_generated_in_sequence() {
    let app = TestApp::new().await;
    let client_id = seed_client(&app, "Luminous Records").await;
    let due = (Utc::now().date_naive() + Duration::days(30)).to_string();
    let year = Utc::now().date_naive().year();

    let first = create_invoice(
        &app,
        json!({ "client_id": client_id, "amount": "1200.00", "due_date": due }),
    )
    .await;
    assert_eq!(first["invoice_number"], format!("INV-{year}-0001"));
    assert_eq!(first["status"], "pending");
    assert_eq!(first["currency"], "USD");
    assert_eq!(first["is_overdue"], false);
    assert!(first["paid_at"].is_null());

    let second = create_invoice(
        &app,
        json!({ "client_id": client_id, "amount": "800.00", "due_date": due }),
    )
    .await;
    assert_eq!(second["invoice_number"], format!("INV-{year}-0002"));
}

#[tokio::test]
async fn explicit_invoice_numbers_are_validated_and_unique() {
    let app = TestApp::new().await;
    let client_id = seed_client(&app, "Harbor & Hart").await;
    let due = (Utc::now().date_naive() + Duration::days(14)).to_string();

    let invoice = create_invoice(
        &app,
        json!({
            "client_id": client_id,
            "invoice_number": "INV-2030-0042",
            "amount": "500.00",
            "due_date": due
        }),
    )
    .await;
    assert_eq!(invoice["invoice_number"], "INV-2030-0042");

    // Same number again collides with the unique index.
    let response = app
        .post(
            "/api/v1/invoices",
            json!({
                "client_id": client_id,
                "invoice_number": "INV-2030-0042",
                "amount": "900.00",
                "due_date": due
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = response_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("already exists"));

    for malformed in ["INV-30-0042", "INV-2030-42", "inv-2030-0042", "2030-0042"] {
        let response = app
            .post(
                "/api/v1/invoices",
                json!({
                    "client_id": client_id,
                    "invoice_number": malformed,
                    "amount": "100.00",
                    "due_date": due
                }),
            )
            .await;
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "{malformed} should be rejected"
        );
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn paid_and_void_invoices_are_final() {
    let app = TestApp::new().await;
    let client_id = seed_client(&app, "Aria Collective").await;
    let due = (Utc::now().date_naive() + Duration::days(30)).to_string();

    let invoice = create_invoice(
        &app,
        json!({ "client_id": client_id, "amount": "2500.00", "due_date": due }),
    )
    .await;
    let invoice_id = invoice["id"].as_str().unwrap();

    let response = app
        .put(
            &format!("/api/v1/invoices/{invoice_id}/status"),
            json!({ "status": "paid" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["status"], "paid");
    assert!(body["data"]["paid_at"].is_string());

    // Paid is terminal: no voiding, no reopening.
    for next in ["void", "pending"] {
        let response = app
            .put(
                &format!("/api/v1/invoices/{invoice_id}/status"),
                json!({ "status": next }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "paid -> {next}");
    }

    let voided = create_invoice(
        &app,
        json!({ "client_id": client_id, "amount": "300.00", "due_date": due }),
    )
    .await;
    let voided_id = voided["id"].as_str().unwrap();

    let response = app
        .put(
            &format!("/api/v1/invoices/{voided_id}/status"),
            json!({ "status": "void" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["status"], "void");
    assert!(body["data"]["paid_at"].is_null());

    let response = app
        .put(
            &format!("/api/v1/invoices/{voided_id}/status"),
            json!({ "status": "paid" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invoice_creation_validates_its_inputs() {
    let app = TestApp::new().await;
    let client_id = seed_client(&app, "Midnight Canvas").await;
    let other_client_id = seed_client(&app, "Velvet Atlas").await;
    let today = Utc::now().date_naive();
    let due = (today + Duration::days(30)).to_string();

    // Non-positive amounts.
    for amount in ["0", "-10.00"] {
        let response = app
            .post(
                "/api/v1/invoices",
                json!({ "client_id": client_id, "amount": amount, "due_date": due }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "amount {amount}");
    }

    // Due date before the issue date.
    let response = app
        .post(
            "/api/v1/invoices",
            json!({
                "client_id": client_id,
                "amount": "100.00",
                "issue_date": today.to_string(),
                "due_date": (today - Duration::days(1)).to_string()
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Currency must be a 3-letter code.
    let response = app
        .post(
            "/api/v1/invoices",
            json!({
                "client_id": client_id,
                "amount": "100.00",
                "currency": "DOLLARS",
                "due_date": due
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown client.
    let response = app
        .post(
            "/api/v1/invoices",
            json!({
                "client_id": uuid::Uuid::new_v4(),
                "amount": "100.00",
                "due_date": due
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Campaign attached to a different client.
    let campaign = create_and_read(
        &app,
        "/api/v1/campaigns",
        json!({
            "client_id": client_id,
            "name": "Undertow",
            "artist_name": "Cascade Theory",
            "platform": "spotify"
        }),
    )
    .await;
    let response = app
        .post(
            "/api/v1/invoices",
            json!({
                "client_id": other_client_id,
                "campaign_id": campaign["id"],
                "amount": "100.00",
                "due_date": due
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("different client"));

    // Unknown campaign.
    let response = app
        .post(
            "/api/v1/invoices",
            json!({
                "client_id": client_id,
                "campaign_id": uuid::Uuid::new_v4(),
                "amount": "100.00",
                "due_date": due
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Listing and filters
// ---------------------------------------------------------------------------

#[tokio::test]
async fn overdue_filter_returns_only_pending_invoices_past_due() {
    let app = TestApp::new().await;
    let client_id = seed_client(&app, "Luminous Records").await;
    let today = Utc::now().date_naive();

    create_invoice(
        &app,
        json!({
            "client_id": client_id,
            "amount": "1000.00",
            "due_date": (today + Duration::days(30)).to_string()
        }),
    )
    .await;
    let overdue = create_invoice(
        &app,
        json!({
            "client_id": client_id,
            "amount": "2000.00",
            "issue_date": (today - Duration::days(40)).to_string(),
            "due_date": (today - Duration::days(10)).to_string()
        }),
    )
    .await;
    let paid = create_invoice(
        &app,
        json!({
            "client_id": client_id,
            "amount": "750.00",
            "due_date": (today + Duration::days(7)).to_string()
        }),
    )
    .await;
    let response = app
        .put(
            &format!("/api/v1/invoices/{}/status", paid["id"].as_str().unwrap()),
            json!({ "status": "paid" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get("/api/v1/invoices").await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["total"], 3);

    let response = app.get("/api/v1/invoices?overdue_only=true").await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["total"], 1);
    let item = &body["data"]["items"][0];
    assert_eq!(item["id"], overdue["id"]);
    assert_eq!(item["is_overdue"], true);
    assert_eq!(item["days_overdue"], 10);

    let response = app.get("/api/v1/invoices?status=paid").await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["id"], paid["id"]);

    let response = app
        .get(&format!("/api/v1/invoices?client_id={}", uuid::Uuid::new_v4()))
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["total"], 0);
    assert_eq!(body["data"]["items"], json!([]));
}

#[tokio::test]
async fn invoice_listing_paginates() {
    let app = TestApp::new().await;
    let client_id = seed_client(&app, "Aria Collective").await;
    let due = (Utc::now().date_naive() + Duration::days(30)).to_string();

    for amount in ["100.00", "200.00", "300.00"] {
        create_invoice(
            &app,
            json!({ "client_id": client_id, "amount": amount, "due_date": due }),
        )
        .await;
    }

    let response = app.get("/api/v1/invoices?limit=2").await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["total_pages"], 2);

    let response = app.get("/api/v1/invoices?limit=2&page=2").await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["page"], 2);
}

#[tokio::test]
async fn fetching_an_unknown_invoice_returns_not_found() {
    let app = TestApp::new().await;

    let response = app
        .get(&format!("/api/v1/invoices/{}", uuid::Uuid::new_v4()))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Not Found");
    assert!(body["message"].as_str().unwrap().contains("not found"));
}
