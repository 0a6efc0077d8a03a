mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::{json, Value};

async fn provider(app: &TestApp, code: &str) -> i64 {
    app.create(
        "/service_providers",
        json!({"name": code.to_uppercase(), "code": code, "tagline": "Grounds care"}),
    )
    .await
}

#[tokio::test]
async fn provider_view_nests_children() {
    let app = TestApp::new().await;
    let id = provider(&app, "leitch").await;

    app.create(
        &format!("/service_providers/{id}/services"),
        json!({"name": "Grounds Maintenance"}),
    )
    .await;
    app.create(
        &format!("/service_providers/{id}/metrics"),
        json!({"metric_name": "Client Satisfaction", "metric_value": "98%", "metric_type": "percentage", "display_order": 2}),
    )
    .await;
    app.create(
        &format!("/service_providers/{id}/metrics"),
        json!({"metric_name": "Hours This Week", "metric_value": "24", "display_order": 1}),
    )
    .await;
    for day in 1..=7 {
        app.create(
            &format!("/service_providers/{id}/activities"),
            json!({
                "activity_type": "maintenance",
                "description": format!("Lawn cut, day {day}"),
                "activity_date": format!("2026-09-{day:02}T08:00:00")
            }),
        )
        .await;
    }

    let (status, body) = app.get(&format!("/service_providers/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let data = &body["data"];
    assert_eq!(data["code"], "leitch");
    assert_eq!(data["status"], "active");

    let services = data["services"].as_array().unwrap();
    assert_eq!(services.len(), 1);
    assert_eq!(services[0]["is_active"], true);
    assert!(services[0].get("provider_id").is_none());

    let metrics: Vec<&str> = data["metrics"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["metric_name"].as_str().unwrap())
        .collect();
    assert_eq!(metrics, vec!["Hours This Week", "Client Satisfaction"]);
    assert_eq!(data["metrics"][0]["metric_type"], "text");

    let activities: Vec<&str> = data["recent_activities"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["description"].as_str().unwrap())
        .collect();
    assert_eq!(
        activities,
        vec![
            "Lawn cut, day 7",
            "Lawn cut, day 6",
            "Lawn cut, day 5",
            "Lawn cut, day 4",
            "Lawn cut, day 3"
        ]
    );
}

#[tokio::test]
async fn provider_code_is_unique() {
    let app = TestApp::new().await;
    provider(&app, "csg").await;
    let other = provider(&app, "livclean").await;

    let (status, body) = app
        .post("/service_providers", json!({"name": "Dup", "code": "csg"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"], json!(["code already exists"]));

    let (status, _) = app
        .put(&format!("/service_providers/{other}"), json!({"code": "csg"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn children_are_scoped_to_their_provider() {
    let app = TestApp::new().await;
    let stores = provider(&app, "stores").await;
    let leitch = provider(&app, "leitch").await;
    let service = app
        .create(
            &format!("/service_providers/{stores}/services"),
            json!({"name": "Inventory Control"}),
        )
        .await;

    let (status, _) = app
        .get(&format!("/service_providers/{stores}/services/{service}"))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .get(&format!("/service_providers/{leitch}/services/{service}"))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Service not found");

    let (status, body) = app.get("/service_providers/999/services").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Service provider not found");
}

#[tokio::test]
async fn schedule_must_book_a_service_of_the_same_provider() {
    let app = TestApp::new().await;
    let stores = provider(&app, "stores").await;
    let leitch = provider(&app, "leitch").await;
    let foreign = app
        .create(
            &format!("/service_providers/{stores}/services"),
            json!({"name": "Inventory Control"}),
        )
        .await;
    let own = app
        .create(
            &format!("/service_providers/{leitch}/services"),
            json!({"name": "Irrigation Systems"}),
        )
        .await;

    let visit = |service_id: i64| {
        json!({
            "service_id": service_id,
            "scheduled_date": "2026-11-02T00:00:00",
            "scheduled_time": "09:30:00",
            "requested_by": 42
        })
    };

    let (status, body) = app
        .post(&format!("/service_providers/{leitch}/schedules"), visit(foreign))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"], json!(["Service does not belong to this provider"]));

    let (status, body) = app
        .post(&format!("/service_providers/{leitch}/schedules"), visit(9999))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Service not found");

    let (status, body) = app
        .post(&format!("/service_providers/{leitch}/schedules"), visit(own))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let schedule = &body["data"];
    assert_eq!(schedule["status"], "scheduled");
    assert_eq!(schedule["scheduled_time"], "09:30:00");
    assert_eq!(schedule["provider_name"], "LEITCH");
    assert_eq!(schedule["service_name"], "Irrigation Systems");
    assert_eq!(schedule["requested_by"], 42);

    let id = schedule["id"].as_i64().unwrap();
    let (status, _) = app
        .put(
            &format!("/service_providers/{leitch}/schedules/{id}"),
            json!({"service_id": foreign}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .put(
            &format!("/service_providers/{leitch}/schedules/{id}"),
            json!({"status": "completed", "special_requirements": "Gate code 1234"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "completed");
    assert_eq!(body["data"]["service_id"], own);
}

#[tokio::test]
async fn deleting_provider_removes_every_child() {
    let app = TestApp::new().await;
    let id = provider(&app, "sabeliwe").await;
    let service = app
        .create(
            &format!("/service_providers/{id}/services"),
            json!({"name": "Pest Control"}),
        )
        .await;
    let metric = app
        .create(
            &format!("/service_providers/{id}/metrics"),
            json!({"metric_name": "Garden Health Score", "metric_value": "95%"}),
        )
        .await;
    let activity = app
        .create(
            &format!("/service_providers/{id}/activities"),
            json!({"activity_type": "inspection", "description": "Pest control inspection passed"}),
        )
        .await;
    app.create(
        &format!("/service_providers/{id}/schedules"),
        json!({"service_id": service, "scheduled_date": "2026-11-02T00:00:00", "scheduled_time": "07:30:00"}),
    )
    .await;

    let (status, body) = app.delete(&format!("/service_providers/{id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = app.get(&format!("/service_providers/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    for path in [
        format!("/service_providers/{id}/services/{service}"),
        format!("/service_providers/{id}/metrics/{metric}"),
        format!("/service_providers/{id}/activities/{activity}"),
    ] {
        let (status, _) = app.get(&path).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{path}");
    }

    use facilities_server::entities::{provider_activity, provider_metric, provider_service, service_schedule};
    use sea_orm::{EntityTrait, PaginatorTrait};
    assert_eq!(provider_service::Entity::find().count(&app.db).await.unwrap(), 0);
    assert_eq!(provider_metric::Entity::find().count(&app.db).await.unwrap(), 0);
    assert_eq!(provider_activity::Entity::find().count(&app.db).await.unwrap(), 0);
    assert_eq!(service_schedule::Entity::find().count(&app.db).await.unwrap(), 0);
}

#[tokio::test]
async fn child_updates_and_deletes() {
    let app = TestApp::new().await;
    let id = provider(&app, "csg").await;
    let metric = app
        .create(
            &format!("/service_providers/{id}/metrics"),
            json!({"metric_name": "Meals Served Today", "metric_value": "342", "metric_type": "number"}),
        )
        .await;

    let (status, body) = app
        .put(
            &format!("/service_providers/{id}/metrics/{metric}"),
            json!({"metric_value": "355"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["metric_value"], "355");
    assert_eq!(body["data"]["metric_type"], "number");

    let (status, _) = app
        .delete(&format!("/service_providers/{id}/metrics/{metric}"))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = app.get(&format!("/service_providers/{id}/metrics")).await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn schedule_accepts_a_bare_date() {
    let app = TestApp::new().await;
    let id = provider(&app, "livclean").await;
    let service = app
        .create(
            &format!("/service_providers/{id}/services"),
            json!({"name": "Deep Cleaning"}),
        )
        .await;

    let (status, body) = app
        .post(
            &format!("/service_providers/{id}/schedules"),
            json!({"service_id": service, "scheduled_date": "2026-11-02", "scheduled_time": "08:00:00"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["scheduled_date"], "2026-11-02T00:00:00");

    let schedule = body["data"]["id"].as_i64().unwrap();
    let (status, body) = app
        .put(
            &format!("/service_providers/{id}/schedules/{schedule}"),
            json!({"scheduled_date": "2026-11-09"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["scheduled_date"], "2026-11-09T00:00:00");

    let (status, body) = app
        .put(
            &format!("/service_providers/{id}/schedules/{schedule}"),
            json!({"scheduled_date": "soon"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid request body");
}

#[tokio::test]
async fn deleting_a_service_drops_its_schedules() {
    let app = TestApp::new().await;
    let id = provider(&app, "sabeliwe").await;
    let kept = app
        .create(&format!("/service_providers/{id}/services"), json!({"name": "Access Control"}))
        .await;
    let dropped = app
        .create(&format!("/service_providers/{id}/services"), json!({"name": "Guard Patrol"}))
        .await;
    for service in [kept, dropped] {
        app.create(
            &format!("/service_providers/{id}/schedules"),
            json!({"service_id": service, "scheduled_date": "2026-11-02T00:00:00", "scheduled_time": "18:00:00"}),
        )
        .await;
    }

    let (status, body) = app
        .delete(&format!("/service_providers/{id}/services/{dropped}"))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (_, body) = app.get(&format!("/service_providers/{id}/schedules")).await;
    let schedules = body["data"].as_array().unwrap();
    assert_eq!(schedules.len(), 1);
    assert_eq!(schedules[0]["service_id"], kept);

    let (status, _) = app
        .get(&format!("/service_providers/{id}/services/{dropped}"))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
