mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn stats_count_live_rows_and_only_present_categories() {
    let app = TestApp::new().await;
    app.create("/tickets", json!({"title": "a", "created_by": 1, "priority": "high"}))
        .await;
    app.create("/tickets", json!({"title": "b", "created_by": 1, "priority": "high", "status": "closed"}))
        .await;
    app.create("/tickets", json!({"title": "c", "created_by": 1}))
        .await;
    app.create("/assets", json!({"asset_tag": "A-1", "name": "Fan", "condition": "broken"}))
        .await;
    app.create("/assets", json!({"asset_tag": "A-2", "name": "Heater", "condition": "fair"}))
        .await;
    app.create("/tools", json!({"tool_name": "Drill"})).await;
    app.create("/staff", json!({"employee_id": "EMP-001", "name": "Active"}))
        .await;
    app.create("/staff", json!({"employee_id": "EMP-002", "name": "Gone", "status": "inactive"}))
        .await;

    let (status, body) = app.get("/dashboard/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Dashboard statistics retrieved successfully");
    let data = &body["data"];
    assert_eq!(
        data["overview"],
        json!({"total_tickets": 3, "active_assets": 1, "total_tools": 1, "total_staff": 1})
    );
    assert_eq!(data["ticket_by_status"], json!({"open": 2, "closed": 1}));
    assert_eq!(data["ticket_by_priority"], json!({"high": 2, "medium": 1}));
    assert_eq!(data["asset_by_condition"], json!({"broken": 1, "fair": 1}));
    assert_eq!(data["tool_by_status"], json!({"available": 1}));
}

#[tokio::test]
async fn stats_on_empty_database() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/dashboard/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["overview"]["total_tickets"], 0);
    assert_eq!(body["data"]["ticket_by_status"], json!({}));
}

#[tokio::test]
async fn recent_tickets_are_capped_at_ten() {
    let app = TestApp::new().await;
    for n in 0..12 {
        app.create("/tickets", json!({"title": format!("ticket {n}"), "created_by": 1}))
            .await;
    }

    let (_, body) = app.get("/dashboard/recent-tickets").await;
    let tickets = body["data"].as_array().unwrap();
    assert_eq!(tickets.len(), 10);
    assert_eq!(tickets[0]["title"], "ticket 11");
    assert_eq!(body["message"], "Retrieved 10 recent tickets");
}

#[tokio::test]
async fn activity_feed_merges_tickets_and_checkouts() {
    let app = TestApp::new().await;
    let tech = app.user("john.doe").await;
    app.create("/tickets", json!({"title": "Broken light", "created_by": tech}))
        .await;
    let drill = app.create("/tools", json!({"tool_name": "Cordless Drill"})).await;
    app.post(&format!("/tools/{drill}/checkout"), json!({"user_id": tech}))
        .await;
    let meter = app.create("/tools", json!({"tool_name": "Multimeter"})).await;
    app.post(&format!("/tools/{meter}/checkout"), json!({"user_id": 999}))
        .await;

    let (status, body) = app.get("/dashboard/recent-activities").await;
    assert_eq!(status, StatusCode::OK);
    let feed = body["data"].as_array().unwrap();
    assert_eq!(feed.len(), 3);

    assert_eq!(feed[0]["type"], "tool_checkout");
    assert_eq!(feed[0]["description"], "Tool checked out: Multimeter");
    assert_eq!(feed[0]["user"], "Unknown");
    assert_eq!(feed[1]["description"], "Tool checked out: Cordless Drill");
    assert_eq!(feed[1]["user"], "john.doe");
    assert_eq!(feed[2]["type"], "ticket_created");
    assert_eq!(feed[2]["description"], "New ticket created: Broken light");
    assert_eq!(feed[2]["user"], "john.doe");
}

#[tokio::test]
async fn activity_feed_skips_returned_tools() {
    let app = TestApp::new().await;
    let drill = app.create("/tools", json!({"tool_name": "Cordless Drill"})).await;
    app.post(&format!("/tools/{drill}/checkout"), json!({"user_id": 1}))
        .await;
    app.request(axum::http::Method::POST, &format!("/tools/{drill}/checkin"), None)
        .await;

    let (_, body) = app.get("/dashboard/recent-activities").await;
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["message"], "Retrieved 0 recent activities");
}
