mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::{json, Value};

#[tokio::test]
async fn user_defaults_and_uniqueness() {
    let app = TestApp::new().await;
    let (status, body) = app
        .post("/users", json!({"username": "admin", "email": "admin@facilitiespro.com"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["role"], "user");

    let (status, body) = app
        .post("/users", json!({"username": "admin", "email": "other@facilitiespro.com"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"], json!(["username already exists"]));

    let (status, body) = app
        .post("/users", json!({"username": "other", "email": "admin@facilitiespro.com"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"], json!(["email already exists"]));
}

#[tokio::test]
async fn list_filters_by_role() {
    let app = TestApp::new().await;
    app.post(
        "/users",
        json!({"username": "john.doe", "email": "john@facilitiespro.com", "role": "technician"}),
    )
    .await;
    app.user("visitor").await;

    let (_, body) = app.get("/users?role=technician").await;
    let users = body["data"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["username"], "john.doe");
}

#[tokio::test]
async fn assignments_collect_back_references() {
    let app = TestApp::new().await;
    let tech = app.user("john.doe").await;
    let manager = app.user("sifiso.shezi").await;

    app.create(
        "/tickets",
        json!({"title": "Fix hallway light", "created_by": manager, "assigned_to": tech}),
    )
    .await;
    app.create("/tickets", json!({"title": "Order bulbs", "created_by": tech}))
        .await;
    app.create("/assets", json!({"asset_tag": "LAP-01", "name": "Laptop", "assigned_to": tech}))
        .await;
    let tool = app.create("/tools", json!({"tool_name": "Multimeter"})).await;
    app.post(&format!("/tools/{tool}/checkout"), json!({"user_id": tech}))
        .await;

    let (status, body) = app.get(&format!("/users/{tech}/assignments")).await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["user"]["username"], "john.doe");
    assert_eq!(data["assigned_tickets"][0]["title"], "Fix hallway light");
    assert_eq!(data["assigned_tickets"][0]["creator_name"], "sifiso.shezi");
    assert_eq!(data["created_tickets"][0]["title"], "Order bulbs");
    assert_eq!(data["assets"][0]["asset_tag"], "LAP-01");
    assert_eq!(data["checked_out_tools"][0]["tool_name"], "Multimeter");
}

#[tokio::test]
async fn deleting_user_leaves_references_with_null_names() {
    let app = TestApp::new().await;
    let tech = app.user("john.doe").await;
    let ticket = app
        .create("/tickets", json!({"title": "Fix door", "created_by": tech}))
        .await;

    let (status, _) = app.delete(&format!("/users/{tech}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.get(&format!("/tickets/{ticket}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["created_by"], tech);
    assert_eq!(body["data"]["creator_name"], Value::Null);

    let (status, _) = app.get(&format!("/users/{tech}/assignments")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_check_answers_ok() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}
