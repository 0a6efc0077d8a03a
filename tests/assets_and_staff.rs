mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::{json, Value};

#[tokio::test]
async fn asset_tag_must_be_unique_on_create_and_update() {
    let app = TestApp::new().await;
    app.create("/assets", json!({"asset_tag": "AC-001", "name": "Air Conditioner"}))
        .await;
    let projector = app
        .create("/assets", json!({"asset_tag": "PROJ-001", "name": "Projector"}))
        .await;

    let (status, body) = app
        .post("/assets", json!({"asset_tag": "AC-001", "name": "Another"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Failed to create asset");
    assert_eq!(body["errors"], json!(["asset_tag already exists"]));

    let (status, _) = app
        .put(&format!("/assets/{projector}"), json!({"asset_tag": "AC-001"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Keeping its own tag is not a conflict
    let (status, _) = app
        .put(&format!("/assets/{projector}"), json!({"asset_tag": "PROJ-001", "name": "HD Projector"}))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn scan_finds_asset_by_tag() {
    let app = TestApp::new().await;
    let owner = app.user("sifiso.shezi").await;
    app.create(
        "/assets",
        json!({
            "asset_tag": "AC-001",
            "name": "Air Conditioner",
            "condition": "fair",
            "purchase_date": "2020-01-15",
            "assigned_to": owner
        }),
    )
    .await;

    let (status, body) = app.get("/assets/scan/AC-001").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Asset found successfully");
    assert_eq!(body["data"]["purchase_date"], "2020-01-15");
    assert_eq!(body["data"]["condition"], "fair");
    assert_eq!(body["data"]["assignee_name"], "sifiso.shezi");

    let (status, body) = app.get("/assets/scan/NOPE-404").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No asset found with this barcode");
}

#[tokio::test]
async fn malformed_date_is_rejected() {
    let app = TestApp::new().await;
    let (status, body) = app
        .post(
            "/assets",
            json!({"asset_tag": "X-1", "name": "Thing", "warranty_expiry": "15/01/2020"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn asset_condition_filter() {
    let app = TestApp::new().await;
    app.create("/assets", json!({"asset_tag": "A-1", "name": "Fan", "condition": "broken"}))
        .await;
    app.create("/assets", json!({"asset_tag": "A-2", "name": "Heater"}))
        .await;

    let (_, body) = app.get("/assets?condition=broken").await;
    let assets = body["data"].as_array().unwrap();
    assert_eq!(assets.len(), 1);
    assert_eq!(assets[0]["asset_tag"], "A-1");
    assert_eq!(assets[0]["assignee_name"], Value::Null);
}

#[tokio::test]
async fn staff_crud() {
    let app = TestApp::new().await;
    let id = app
        .create(
            "/staff",
            json!({"employee_id": "EMP-001", "name": "Sifiso Shezi", "department": "Facilities"}),
        )
        .await;

    let (status, body) = app
        .post("/staff", json!({"employee_id": "EMP-001", "name": "Someone Else"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"], json!(["employee_id already exists"]));

    let (status, body) = app
        .put(&format!("/staff/{id}"), json!({"status": "inactive", "phone": "+27-11-123-4567"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "inactive");
    assert_eq!(body["data"]["department"], "Facilities");

    let (_, body) = app.get("/staff?status=active").await;
    assert_eq!(body["data"], json!([]));

    let (status, _) = app.delete(&format!("/staff/{id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = app.get(&format!("/staff/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Staff member not found");
}
