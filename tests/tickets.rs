mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::{json, Value};

#[tokio::test]
async fn create_applies_defaults_and_resolves_names() {
    let app = TestApp::new().await;
    let manager = app.user("sifiso.shezi").await;

    let (status, body) = app
        .post("/tickets", json!({"title": "Leaking tap", "created_by": manager}))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Ticket created successfully");
    let ticket = &body["data"];
    assert_eq!(ticket["status"], "open");
    assert_eq!(ticket["priority"], "medium");
    assert_eq!(ticket["resolved_at"], Value::Null);
    assert_eq!(ticket["creator_name"], "sifiso.shezi");
    assert_eq!(ticket["assignee_name"], Value::Null);
    assert!(body.get("errors").is_none());
}

#[tokio::test]
async fn blank_title_is_a_validation_error() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post("/tickets", json!({"title": "  ", "created_by": 1}))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["data"], Value::Null);
    assert_eq!(body["message"], "Failed to create ticket");
    assert_eq!(body["errors"], json!(["title is required"]));
}

#[tokio::test]
async fn malformed_body_and_bad_query_are_rejected_in_the_envelope() {
    let app = TestApp::new().await;

    let (status, body) = app.post("/tickets", json!({"title": "No creator"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid request body");

    let (status, body) = app.get("/tickets?status=done").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid query parameters");
}

#[tokio::test]
async fn resolution_is_stamped_once_and_survives_reopening() {
    let app = TestApp::new().await;
    let id = app
        .create("/tickets", json!({"title": "Broken light", "created_by": 1}))
        .await;

    let (status, body) = app
        .put(&format!("/tickets/{id}/status"), json!({"status": "resolved"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    let stamp = body["data"]["resolved_at"].clone();
    assert!(stamp.is_string());

    let (_, body) = app
        .put(&format!("/tickets/{id}/status"), json!({"status": "open"}))
        .await;
    assert_eq!(body["data"]["status"], "open");
    assert_eq!(body["data"]["resolved_at"], stamp);

    let (_, body) = app
        .put(&format!("/tickets/{id}"), json!({"status": "closed"}))
        .await;
    assert_eq!(body["data"]["status"], "closed");
    assert_eq!(body["data"]["resolved_at"], stamp);
}

#[tokio::test]
async fn ticket_created_closed_is_already_stamped() {
    let app = TestApp::new().await;
    let (_, body) = app
        .post(
            "/tickets",
            json!({"title": "Logged after the fact", "created_by": 1, "status": "closed"}),
        )
        .await;
    assert!(body["data"]["resolved_at"].is_string());
}

#[tokio::test]
async fn assigning_moves_ticket_in_progress() {
    let app = TestApp::new().await;
    let tech = app.user("john.doe").await;
    let id = app
        .create("/tickets", json!({"title": "AC not cooling", "created_by": 999}))
        .await;

    let (status, body) = app
        .put(&format!("/tickets/{id}/assign"), json!({"assigned_to": tech}))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "in_progress");
    assert_eq!(body["data"]["assigned_to"], tech);
    assert_eq!(body["data"]["assignee_name"], "john.doe");
    // Creator 999 was never registered
    assert_eq!(body["data"]["creator_name"], Value::Null);
}

#[tokio::test]
async fn update_clears_nullable_fields_only_when_sent_null() {
    let app = TestApp::new().await;
    let id = app
        .create(
            "/tickets",
            json!({"title": "Door", "created_by": 1, "location": "Block A", "category": "Carpentry"}),
        )
        .await;

    let (_, body) = app
        .put(&format!("/tickets/{id}"), json!({"location": null}))
        .await;
    assert_eq!(body["data"]["location"], Value::Null);
    assert_eq!(body["data"]["category"], "Carpentry");
}

#[tokio::test]
async fn partial_update_touches_only_the_sent_field() {
    let app = TestApp::new().await;
    let id = app
        .create(
            "/tickets",
            json!({"title": "Flickering lights", "created_by": 1, "location": "Block B"}),
        )
        .await;
    let (_, body) = app
        .put(&format!("/tickets/{id}/status"), json!({"status": "resolved"}))
        .await;
    let before = body["data"].clone();

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    let (status, body) = app
        .put(&format!("/tickets/{id}"), json!({"priority": "high"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    let after = body["data"].clone();

    assert_eq!(after["priority"], "high");
    let (old_stamp, new_stamp) = (
        before["updated_at"].as_str().unwrap(),
        after["updated_at"].as_str().unwrap(),
    );
    assert!(new_stamp > old_stamp, "{old_stamp} -> {new_stamp}");

    let unchanged = |mut ticket: Value| {
        let fields = ticket.as_object_mut().unwrap();
        fields.remove("priority");
        fields.remove("updated_at");
        ticket
    };
    assert_eq!(unchanged(after), unchanged(before.clone()));

    let (_, body) = app.get(&format!("/tickets/{id}")).await;
    assert_eq!(body["data"]["created_at"], before["created_at"]);
    assert_eq!(body["data"]["resolved_at"], before["resolved_at"]);
    assert_eq!(body["data"]["location"], "Block B");
}

#[tokio::test]
async fn malformed_id_is_rejected_in_the_envelope() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/tickets/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["data"], Value::Null);
    assert_eq!(body["message"], "Invalid path parameter");
    assert!(body["errors"][0].as_str().unwrap().contains("abc"));

    let (status, body) = app
        .put("/service_providers/1/services/x", json!({"name": "Pruning"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid path parameter");
}

#[tokio::test]
async fn list_filters_and_orders_newest_first() {
    let app = TestApp::new().await;
    app.create("/tickets", json!({"title": "first", "created_by": 1, "priority": "high"}))
        .await;
    app.create("/tickets", json!({"title": "second", "created_by": 1, "priority": "low"}))
        .await;
    app.create("/tickets", json!({"title": "third", "created_by": 1, "priority": "high"}))
        .await;

    let (status, body) = app.get("/tickets?priority=high").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Retrieved 2 tickets");
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["third", "first"]);
}

#[tokio::test]
async fn delete_returns_no_content_then_not_found() {
    let app = TestApp::new().await;
    let id = app
        .create("/tickets", json!({"title": "Temporary", "created_by": 1}))
        .await;

    let (status, body) = app.delete(&format!("/tickets/{id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = app.get(&format!("/tickets/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Ticket not found");

    let (status, _) = app.delete(&format!("/tickets/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn routes_are_also_served_under_api_prefix() {
    let app = TestApp::new().await;
    let id = app
        .create("/api/tickets", json!({"title": "Prefixed", "created_by": 1}))
        .await;

    let (status, body) = app.get(&format!("/tickets/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Prefixed");

    let (status, _) = app.get("/api/tickets").await;
    assert_eq!(status, StatusCode::OK);
}
