//! End-to-end tests for the campaign lifecycle:
//! - Draft creation and activation
//! - Vendor allocations and cumulative delivery
//! - Status transition rules and cancellation
//! - Pacing measurement over the flight window

mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use common::{create_and_read, response_json, TestApp};
use serde_json::json;

async fn seed_client(app: &TestApp, name: &str) -> String {
    let client = create_and_read(
        app,
        "/api/v1/clients",
        json!({ "name": name, "email": "roster@label.example" }),
    )
    .await;
    client["id"].as_str().expect("client id").to_string()
}

async fn seed_vendor(app: &TestApp, name: &str) -> String {
    let vendor = create_and_read(
        app,
        "/api/v1/vendors",
        json!({ "name": name, "cost_rate": "0.004", "daily_capacity": 20000 }),
    )
    .await;
    vendor["id"].as_str().expect("vendor id").to_string()
}

async fn activate(app: &TestApp, campaign_id: &str) {
    let response = app
        .put(
            &format!("/api/v1/campaigns/{}/status", campaign_id),
            json!({ "status": "active" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ==================== Lifecycle ====================

#[tokio::test]
async fn campaign_walks_from_draft_to_complete() {
    let app = TestApp::new().await;
    let client_id = seed_client(&app, "Luminous Records").await;
    let vendor_id = seed_vendor(&app, "StreamLift Media").await;

    let start = (Utc::now().date_naive() - Duration::days(10)).to_string();
    let campaign = create_and_read(
        &app,
        "/api/v1/campaigns",
        json!({
            "client_id": client_id,
            "name": "Neon Skyline Push",
            "artist_name": "Ava Reyes",
            "platform": "spotify",
            "goal": 100_000,
            "start_date": start,
            "duration_days": 30
        }),
    )
    .await;
    assert_eq!(campaign["status"], "draft");
    let campaign_id = campaign["id"].as_str().expect("campaign id");

    activate(&app, campaign_id).await;

    let allocation = create_and_read(
        &app,
        &format!("/api/v1/campaigns/{}/allocations", campaign_id),
        json!({ "vendor_id": vendor_id, "allocated_units": 100_000 }),
    )
    .await;
    let allocation_id = allocation["id"].as_str().expect("allocation id");
    assert_eq!(allocation["delivered_units"], 0);
    assert_eq!(allocation["payment_status"], "unpaid");

    // Two cumulative delivery reports.
    let response = app
        .post(
            &format!("/api/v1/allocations/{}/delivery", allocation_id),
            json!({ "delivered_units": 20_000 }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .post(
            &format!("/api/v1/allocations/{}/delivery", allocation_id),
            json!({ "delivered_units": 45_000 }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["delivered_units"], 45_000);
    assert!(body["data"]["last_delivery_at"].is_string());

    // Detail view folds allocations in.
    let response = app.get(&format!("/api/v1/campaigns/{}", campaign_id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let detail = response_json(response).await;
    assert_eq!(detail["data"]["allocations"].as_array().unwrap().len(), 1);
    assert_eq!(detail["data"]["allocations"][0]["delivered_units"], 45_000);

    // Vendor gets paid, campaign wraps up.
    let response = app
        .put(
            &format!("/api/v1/allocations/{}/payment", allocation_id),
            json!({ "payment_status": "paid" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .put(
            &format!("/api/v1/campaigns/{}/status", campaign_id),
            json!({ "status": "complete" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["status"], "complete");
}

#[tokio::test]
async fn delivered_totals_never_move_backward() {
    let app = TestApp::new().await;
    let client_id = seed_client(&app, "Aria Collective").await;
    let vendor_id = seed_vendor(&app, "EchoChamber Curation").await;

    let campaign = create_and_read(
        &app,
        "/api/v1/campaigns",
        json!({
            "client_id": client_id,
            "name": "Static Bloom",
            "artist_name": "Korvett",
            "platform": "soundcloud",
            "goal": 40_000
        }),
    )
    .await;
    let campaign_id = campaign["id"].as_str().unwrap();
    activate(&app, campaign_id).await;

    let allocation = create_and_read(
        &app,
        &format!("/api/v1/campaigns/{}/allocations", campaign_id),
        json!({ "vendor_id": vendor_id, "allocated_units": 40_000 }),
    )
    .await;
    let allocation_id = allocation["id"].as_str().unwrap();

    let delivery_uri = format!("/api/v1/allocations/{}/delivery", allocation_id);
    let response = app.post(&delivery_uri, json!({ "delivered_units": 10_000 })).await;
    assert_eq!(response.status(), StatusCode::OK);

    // A lower cumulative total is rejected outright.
    let response = app.post(&delivery_uri, json!({ "delivered_units": 9_000 })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = response_json(response).await;
    assert!(error["message"]
        .as_str()
        .unwrap()
        .contains("cannot decrease"));

    // Repeating the same total is an idempotent no-op.
    let response = app.post(&delivery_uri, json!({ "delivered_units": 10_000 })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["delivered_units"], 10_000);

    // Negative totals fail validation before any lookup.
    let response = app.post(&delivery_uri, json!({ "delivered_units": -5 })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cancelled_campaigns_take_no_further_work() {
    let app = TestApp::new().await;
    let client_id = seed_client(&app, "Harbor & Hart").await;
    let vendor_id = seed_vendor(&app, "ViralVision Network").await;

    let campaign = create_and_read(
        &app,
        "/api/v1/campaigns",
        json!({
            "client_id": client_id,
            "name": "Fault Lines",
            "artist_name": "Delta Mirage",
            "platform": "youtube",
            "goal": 90_000
        }),
    )
    .await;
    let campaign_id = campaign["id"].as_str().unwrap();
    activate(&app, campaign_id).await;

    let allocation = create_and_read(
        &app,
        &format!("/api/v1/campaigns/{}/allocations", campaign_id),
        json!({ "vendor_id": vendor_id, "allocated_units": 90_000 }),
    )
    .await;
    let allocation_id = allocation["id"].as_str().unwrap();

    let response = app
        .post(&format!("/api/v1/campaigns/{}/cancel", campaign_id), json!({}))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["status"], "cancelled");

    // No new allocations.
    let response = app
        .post(
            &format!("/api/v1/campaigns/{}/allocations", campaign_id),
            json!({ "vendor_id": vendor_id, "allocated_units": 1_000 }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // No new delivery on existing allocations.
    let response = app
        .post(
            &format!("/api/v1/allocations/{}/delivery", allocation_id),
            json!({ "delivered_units": 5_000 }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Terminal states stay terminal.
    let response = app
        .put(
            &format!("/api/v1/campaigns/{}/status", campaign_id),
            json!({ "status": "active" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bookings_delete_only_while_the_campaign_is_draft() {
    let app = TestApp::new().await;
    let client_id = seed_client(&app, "Harbor & Hart").await;
    let vendor_id = seed_vendor(&app, "PlaylistPush Partners").await;

    let campaign = create_and_read(
        &app,
        "/api/v1/campaigns",
        json!({
            "client_id": client_id,
            "name": "First Frost",
            "artist_name": "Lena Mae",
            "platform": "spotify",
            "goal": 50_000
        }),
    )
    .await;
    let campaign_id = campaign["id"].as_str().unwrap();

    let allocation = create_and_read(
        &app,
        &format!("/api/v1/campaigns/{}/allocations", campaign_id),
        json!({ "vendor_id": vendor_id, "allocated_units": 30_000 }),
    )
    .await;
    let placement = create_and_read(
        &app,
        &format!("/api/v1/campaigns/{}/placements", campaign_id),
        json!({ "vendor_id": vendor_id, "playlist_name": "Fresh Finds Unofficial" }),
    )
    .await;

    // A mis-entered booking comes straight back out of a draft.
    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/allocations/{}", allocation["id"].as_str().unwrap()),
            None,
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["deleted"], true);

    let response = app
        .get(&format!("/api/v1/campaigns/{}/allocations", campaign_id))
        .await;
    let listing = response_json(response).await;
    assert_eq!(listing["data"].as_array().unwrap().len(), 0);

    // Once the campaign goes live the delivery record is fixed.
    activate(&app, campaign_id).await;
    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/placements/{}", placement["id"].as_str().unwrap()),
            None,
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = response_json(response).await;
    assert!(error["message"].as_str().unwrap().contains("draft"));

    // The placement is still there.
    let response = app
        .get(&format!("/api/v1/campaigns/{}/placements", campaign_id))
        .await;
    let listing = response_json(response).await;
    assert_eq!(listing["data"].as_array().unwrap().len(), 1);

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/allocations/{}", uuid::Uuid::new_v4()),
            None,
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ==================== Transitions and validation ====================

#[tokio::test]
async fn status_transitions_follow_the_lifecycle_graph() {
    let app = TestApp::new().await;
    let client_id = seed_client(&app, "Midnight Canvas").await;

    let campaign = create_and_read(
        &app,
        "/api/v1/campaigns",
        json!({
            "client_id": client_id,
            "name": "Night Drive",
            "artist_name": "Korvett",
            "platform": "spotify"
        }),
    )
    .await;
    let campaign_id = campaign["id"].as_str().unwrap();
    let status_uri = format!("/api/v1/campaigns/{}/status", campaign_id);

    // Draft cannot jump straight to paused or complete.
    for target in ["paused", "complete"] {
        let response = app.put(&status_uri, json!({ "status": target })).await;
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "draft -> {} should be rejected",
            target
        );
    }

    // Draft -> active -> paused -> active is the supported path.
    for target in ["active", "paused", "active"] {
        let response = app.put(&status_uri, json!({ "status": target })).await;
        assert_eq!(response.status(), StatusCode::OK, "transition to {}", target);
    }
}

#[tokio::test]
async fn campaign_creation_validates_its_inputs() {
    let app = TestApp::new().await;
    let client_id = seed_client(&app, "Luminous Records").await;

    // Unknown client.
    let response = app
        .post(
            "/api/v1/campaigns",
            json!({
                "client_id": uuid::Uuid::new_v4(),
                "name": "Orphaned",
                "artist_name": "Nobody",
                "platform": "spotify"
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Empty artist name fails validation.
    let response = app
        .post(
            "/api/v1/campaigns",
            json!({
                "client_id": client_id,
                "name": "No Artist",
                "artist_name": "",
                "platform": "spotify"
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Zero goal is rejected; goal is optional but must be positive when given.
    let response = app
        .post(
            "/api/v1/campaigns",
            json!({
                "client_id": client_id,
                "name": "Zero Goal",
                "artist_name": "Ava Reyes",
                "platform": "spotify",
                "goal": 0
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ==================== Pacing ====================

#[tokio::test]
async fn pacing_endpoint_measures_active_flights() {
    let app = TestApp::new().await;
    let client_id = seed_client(&app, "Aria Collective").await;
    let vendor_id = seed_vendor(&app, "PlaylistPush Partners").await;

    let start = (Utc::now().date_naive() - Duration::days(10)).to_string();
    let campaign = create_and_read(
        &app,
        "/api/v1/campaigns",
        json!({
            "client_id": client_id,
            "name": "Violet Hour",
            "artist_name": "Lena Mae",
            "platform": "spotify",
            "goal": 10_000,
            "start_date": start,
            "duration_days": 20
        }),
    )
    .await;
    let campaign_id = campaign["id"].as_str().unwrap();
    activate(&app, campaign_id).await;

    let allocation = create_and_read(
        &app,
        &format!("/api/v1/campaigns/{}/allocations", campaign_id),
        json!({ "vendor_id": vendor_id, "allocated_units": 10_000 }),
    )
    .await;
    app.post(
        &format!("/api/v1/allocations/{}/delivery", allocation["id"].as_str().unwrap()),
        json!({ "delivered_units": 6_000 }),
    )
    .await;

    let response = app
        .get(&format!("/api/v1/campaigns/{}/pacing", campaign_id))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let report = &body["data"];

    // Halfway through the flight with 60% delivered: ahead of schedule.
    assert_eq!(report["basis"], "measured");
    assert_eq!(report["status"], "on_track");
    assert_eq!(report["actual_units"], 6_000);
    assert_eq!(report["elapsed_days"], 10);
    assert!(report["pace"].as_f64().unwrap() > 1.0);
    assert_eq!(report["goal"], 10_000);
}

#[tokio::test]
async fn pacing_without_goal_reports_the_gap_not_an_alert() {
    let app = TestApp::new().await;
    let client_id = seed_client(&app, "Midnight Canvas").await;

    let campaign = create_and_read(
        &app,
        "/api/v1/campaigns",
        json!({
            "client_id": client_id,
            "name": "Afterglow",
            "artist_name": "Ava Reyes",
            "platform": "youtube"
        }),
    )
    .await;
    let campaign_id = campaign["id"].as_str().unwrap();
    activate(&app, campaign_id).await;

    let response = app
        .get(&format!("/api/v1/campaigns/{}/pacing", campaign_id))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;

    // Unmeasurable campaigns report a neutral pace and the reason.
    assert_eq!(body["data"]["basis"], "missing_goal");
    assert_eq!(body["data"]["status"], "on_track");
    assert_eq!(body["data"]["pace"].as_f64().unwrap(), 1.0);

    let response = app
        .get(&format!("/api/v1/campaigns/{}/pacing", uuid::Uuid::new_v4()))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ==================== Groups ====================

#[tokio::test]
async fn group_detail_rolls_up_member_pacing() {
    let app = TestApp::new().await;
    let client_id = seed_client(&app, "Luminous Records").await;

    let group = create_and_read(
        &app,
        "/api/v1/campaign-groups",
        json!({ "client_id": client_id, "name": "Summer Tour Push" }),
    )
    .await;
    let group_id = group["id"].as_str().unwrap();

    let start = (Utc::now().date_naive() - Duration::days(10)).to_string();
    for (name, platform, goal) in [
        ("Tour Spotify", "spotify", Some(40_000)),
        ("Tour YouTube", "youtube", None),
    ] {
        let mut payload = json!({
            "client_id": client_id,
            "campaign_group_id": group_id,
            "name": name,
            "artist_name": "Ava Reyes",
            "platform": platform,
            "start_date": start.clone(),
            "duration_days": 20
        });
        if let Some(goal) = goal {
            payload["goal"] = json!(goal);
        }
        create_and_read(&app, "/api/v1/campaigns", payload).await;
    }
    // A campaign outside the group stays out of the rollup.
    create_and_read(
        &app,
        "/api/v1/campaigns",
        json!({
            "client_id": client_id,
            "name": "Solo Single",
            "artist_name": "Ava Reyes",
            "platform": "instagram"
        }),
    )
    .await;

    let response = app
        .get(&format!("/api/v1/campaign-groups/{}", group_id))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let data = &body["data"];

    assert_eq!(data["id"].as_str().unwrap(), group_id);
    assert_eq!(data["name"], "Summer Tour Push");

    let members = data["campaigns"].as_array().expect("member rollup");
    assert_eq!(members.len(), 2);
    let by_name = |name: &str| {
        members
            .iter()
            .find(|c| c["name"] == name)
            .unwrap_or_else(|| panic!("missing member {name}"))
    };
    assert_eq!(by_name("Tour Spotify")["basis"], "measured");
    assert_eq!(by_name("Tour Spotify")["unit_label"], "streams");
    assert_eq!(by_name("Tour YouTube")["basis"], "missing_goal");
}

#[tokio::test]
async fn deleting_a_group_ungroups_its_campaigns() {
    let app = TestApp::new().await;
    let client_id = seed_client(&app, "Luminous Records").await;

    let group = create_and_read(
        &app,
        "/api/v1/campaign-groups",
        json!({ "client_id": client_id, "name": "Album Rollout" }),
    )
    .await;
    let group_id = group["id"].as_str().unwrap();

    let campaign = create_and_read(
        &app,
        "/api/v1/campaigns",
        json!({
            "client_id": client_id,
            "campaign_group_id": group_id,
            "name": "Neon Skyline",
            "artist_name": "Ava Reyes",
            "platform": "spotify"
        }),
    )
    .await;
    assert_eq!(campaign["campaign_group_id"].as_str().unwrap(), group_id);

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/campaign-groups/{}", group_id),
            None,
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The campaign survives, detached from the deleted group.
    let response = app
        .get(&format!("/api/v1/campaigns/{}", campaign["id"].as_str().unwrap()))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let detail = response_json(response).await;
    assert!(detail["data"]["campaign_group_id"].is_null());
}
