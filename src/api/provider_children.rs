//! Nested CRUD for the records a service provider owns.
//!
//! Every handler first resolves the parent provider (404 when missing), then
//! only ever reads or writes children whose `provider_id` matches it, so a
//! child reached through the wrong provider is reported as not found.

use std::collections::HashMap;

use axum::{
    extract::Extension,
    http::StatusCode,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{de, Deserialize, Deserializer, Serialize};

use super::extract::{require_text, ApiJson, ApiPath};
use super::response::{deleted, ApiResponse};
use super::service_provider::find_provider;
use super::{record_action, ApiError};
use crate::entities::{
    provider_activity, provider_metric::{self, MetricType}, provider_service,
    service_schedule::{self, ScheduleStatus},
};

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateServiceRequest {
    pub name: String,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
}

async fn find_service<C>(
    db: &C,
    provider_id: i32,
    service_id: i32,
) -> Result<Option<provider_service::Model>, DbErr>
where
    C: ConnectionTrait,
{
    provider_service::Entity::find_by_id(service_id)
        .filter(provider_service::Column::ProviderId.eq(provider_id))
        .one(db)
        .await
}

async fn owned_service<C>(
    db: &C,
    provider_id: i32,
    service_id: i32,
) -> Result<provider_service::Model, ApiError>
where
    C: ConnectionTrait,
{
    find_provider(db, provider_id).await?;
    find_service(db, provider_id, service_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Service"))
}

// GET /service_providers/:id/services
pub async fn list_services(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath(provider_id): ApiPath<i32>,
) -> Result<ApiResponse<Vec<provider_service::Model>>, ApiError> {
    find_provider(&db, provider_id).await?;
    let services = provider_service::Entity::find()
        .filter(provider_service::Column::ProviderId.eq(provider_id))
        .order_by_asc(provider_service::Column::Id)
        .all(&db)
        .await?;

    let message = format!("Retrieved {} services", services.len());
    Ok(ApiResponse::ok(services, message))
}

// POST /service_providers/:id/services
pub async fn create_service(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath(provider_id): ApiPath<i32>,
    ApiJson(payload): ApiJson<CreateServiceRequest>,
) -> Result<ApiResponse<provider_service::Model>, ApiError> {
    find_provider(&db, provider_id).await?;
    require_text("name", &payload.name, "Failed to create service")?;

    let service = provider_service::ActiveModel {
        provider_id: Set(provider_id),
        name: Set(payload.name),
        description: Set(payload.description),
        is_active: Set(payload.is_active.unwrap_or(true)),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    record_action("provider_services", "create_service", service.id, "Provider service added");
    Ok(ApiResponse::created(service, "Service created successfully"))
}

// GET /service_providers/:id/services/:child_id
pub async fn get_service(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath((provider_id, service_id)): ApiPath<(i32, i32)>,
) -> Result<ApiResponse<provider_service::Model>, ApiError> {
    let service = owned_service(&db, provider_id, service_id).await?;
    Ok(ApiResponse::ok(service, "Service retrieved successfully"))
}

// PUT /service_providers/:id/services/:child_id
pub async fn update_service(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath((provider_id, service_id)): ApiPath<(i32, i32)>,
    ApiJson(payload): ApiJson<UpdateServiceRequest>,
) -> Result<ApiResponse<provider_service::Model>, ApiError> {
    let service = owned_service(&db, provider_id, service_id).await?;

    let mut active = service.into_active_model();
    if let Some(name) = payload.name {
        require_text("name", &name, "Failed to update service")?;
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }

    let service = active.update(&db).await?;
    record_action("provider_services", "update_service", service.id, "Provider service updated");
    Ok(ApiResponse::ok(service, "Service updated successfully"))
}

// DELETE /service_providers/:id/services/:child_id
pub async fn delete_service(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath((provider_id, service_id)): ApiPath<(i32, i32)>,
) -> Result<StatusCode, ApiError> {
    let txn = db.begin().await?;
    owned_service(&txn, provider_id, service_id).await?;
    // Schedules hang off the service as well as the provider
    service_schedule::Entity::delete_many()
        .filter(service_schedule::Column::ServiceId.eq(service_id))
        .exec(&txn)
        .await?;
    provider_service::Entity::delete_by_id(service_id)
        .exec(&txn)
        .await?;
    txn.commit().await?;

    record_action("provider_services", "delete_service", service_id, "Provider service removed");
    Ok(deleted())
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateMetricRequest {
    pub metric_name: String,
    pub metric_value: String,
    pub metric_type: Option<MetricType>,
    pub display_order: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateMetricRequest {
    pub metric_name: Option<String>,
    pub metric_value: Option<String>,
    pub metric_type: Option<MetricType>,
    pub display_order: Option<i32>,
}

async fn owned_metric(
    db: &DatabaseConnection,
    provider_id: i32,
    metric_id: i32,
) -> Result<provider_metric::Model, ApiError> {
    find_provider(db, provider_id).await?;
    provider_metric::Entity::find_by_id(metric_id)
        .filter(provider_metric::Column::ProviderId.eq(provider_id))
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Metric"))
}

// GET /service_providers/:id/metrics
pub async fn list_metrics(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath(provider_id): ApiPath<i32>,
) -> Result<ApiResponse<Vec<provider_metric::Model>>, ApiError> {
    find_provider(&db, provider_id).await?;
    let metrics = provider_metric::Entity::find()
        .filter(provider_metric::Column::ProviderId.eq(provider_id))
        .order_by_asc(provider_metric::Column::DisplayOrder)
        .order_by_asc(provider_metric::Column::Id)
        .all(&db)
        .await?;

    let message = format!("Retrieved {} metrics", metrics.len());
    Ok(ApiResponse::ok(metrics, message))
}

// POST /service_providers/:id/metrics
pub async fn create_metric(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath(provider_id): ApiPath<i32>,
    ApiJson(payload): ApiJson<CreateMetricRequest>,
) -> Result<ApiResponse<provider_metric::Model>, ApiError> {
    const FAILED: &str = "Failed to create metric";
    find_provider(&db, provider_id).await?;
    require_text("metric_name", &payload.metric_name, FAILED)?;
    require_text("metric_value", &payload.metric_value, FAILED)?;

    let metric = provider_metric::ActiveModel {
        provider_id: Set(provider_id),
        metric_name: Set(payload.metric_name),
        metric_value: Set(payload.metric_value),
        metric_type: Set(payload.metric_type.unwrap_or(MetricType::Text)),
        display_order: Set(payload.display_order.unwrap_or(0)),
        updated_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    record_action("provider_metrics", "create_metric", metric.id, "Provider metric added");
    Ok(ApiResponse::created(metric, "Metric created successfully"))
}

// GET /service_providers/:id/metrics/:child_id
pub async fn get_metric(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath((provider_id, metric_id)): ApiPath<(i32, i32)>,
) -> Result<ApiResponse<provider_metric::Model>, ApiError> {
    let metric = owned_metric(&db, provider_id, metric_id).await?;
    Ok(ApiResponse::ok(metric, "Metric retrieved successfully"))
}

// PUT /service_providers/:id/metrics/:child_id
pub async fn update_metric(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath((provider_id, metric_id)): ApiPath<(i32, i32)>,
    ApiJson(payload): ApiJson<UpdateMetricRequest>,
) -> Result<ApiResponse<provider_metric::Model>, ApiError> {
    const FAILED: &str = "Failed to update metric";
    let metric = owned_metric(&db, provider_id, metric_id).await?;

    let mut active = metric.into_active_model();
    if let Some(metric_name) = payload.metric_name {
        require_text("metric_name", &metric_name, FAILED)?;
        active.metric_name = Set(metric_name);
    }
    if let Some(metric_value) = payload.metric_value {
        require_text("metric_value", &metric_value, FAILED)?;
        active.metric_value = Set(metric_value);
    }
    if let Some(metric_type) = payload.metric_type {
        active.metric_type = Set(metric_type);
    }
    if let Some(display_order) = payload.display_order {
        active.display_order = Set(display_order);
    }
    active.updated_at = Set(chrono::Utc::now().naive_utc());

    let metric = active.update(&db).await?;
    record_action("provider_metrics", "update_metric", metric.id, "Provider metric updated");
    Ok(ApiResponse::ok(metric, "Metric updated successfully"))
}

// DELETE /service_providers/:id/metrics/:child_id
pub async fn delete_metric(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath((provider_id, metric_id)): ApiPath<(i32, i32)>,
) -> Result<StatusCode, ApiError> {
    owned_metric(&db, provider_id, metric_id).await?;
    provider_metric::Entity::delete_by_id(metric_id)
        .exec(&db)
        .await?;

    record_action("provider_metrics", "delete_metric", metric_id, "Provider metric removed");
    Ok(deleted())
}

// ---------------------------------------------------------------------------
// Activities
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateActivityRequest {
    pub activity_type: String,
    pub description: String,
    pub activity_date: Option<NaiveDateTime>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateActivityRequest {
    pub activity_type: Option<String>,
    pub description: Option<String>,
    pub activity_date: Option<NaiveDateTime>,
}

async fn owned_activity(
    db: &DatabaseConnection,
    provider_id: i32,
    activity_id: i32,
) -> Result<provider_activity::Model, ApiError> {
    find_provider(db, provider_id).await?;
    provider_activity::Entity::find_by_id(activity_id)
        .filter(provider_activity::Column::ProviderId.eq(provider_id))
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Activity"))
}

// GET /service_providers/:id/activities
pub async fn list_activities(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath(provider_id): ApiPath<i32>,
) -> Result<ApiResponse<Vec<provider_activity::Model>>, ApiError> {
    find_provider(&db, provider_id).await?;
    let activities = provider_activity::Entity::find()
        .filter(provider_activity::Column::ProviderId.eq(provider_id))
        .order_by_desc(provider_activity::Column::ActivityDate)
        .order_by_desc(provider_activity::Column::Id)
        .all(&db)
        .await?;

    let message = format!("Retrieved {} activities", activities.len());
    Ok(ApiResponse::ok(activities, message))
}

// POST /service_providers/:id/activities
pub async fn create_activity(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath(provider_id): ApiPath<i32>,
    ApiJson(payload): ApiJson<CreateActivityRequest>,
) -> Result<ApiResponse<provider_activity::Model>, ApiError> {
    const FAILED: &str = "Failed to create activity";
    find_provider(&db, provider_id).await?;
    require_text("activity_type", &payload.activity_type, FAILED)?;
    require_text("description", &payload.description, FAILED)?;

    let now = chrono::Utc::now().naive_utc();
    let activity = provider_activity::ActiveModel {
        provider_id: Set(provider_id),
        activity_type: Set(payload.activity_type),
        description: Set(payload.description),
        activity_date: Set(payload.activity_date.unwrap_or(now)),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    record_action("provider_activities", "create_activity", activity.id, "Provider activity logged");
    Ok(ApiResponse::created(activity, "Activity created successfully"))
}

// GET /service_providers/:id/activities/:child_id
pub async fn get_activity(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath((provider_id, activity_id)): ApiPath<(i32, i32)>,
) -> Result<ApiResponse<provider_activity::Model>, ApiError> {
    let activity = owned_activity(&db, provider_id, activity_id).await?;
    Ok(ApiResponse::ok(activity, "Activity retrieved successfully"))
}

// PUT /service_providers/:id/activities/:child_id
pub async fn update_activity(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath((provider_id, activity_id)): ApiPath<(i32, i32)>,
    ApiJson(payload): ApiJson<UpdateActivityRequest>,
) -> Result<ApiResponse<provider_activity::Model>, ApiError> {
    const FAILED: &str = "Failed to update activity";
    let activity = owned_activity(&db, provider_id, activity_id).await?;

    let mut active = activity.into_active_model();
    if let Some(activity_type) = payload.activity_type {
        require_text("activity_type", &activity_type, FAILED)?;
        active.activity_type = Set(activity_type);
    }
    if let Some(description) = payload.description {
        require_text("description", &description, FAILED)?;
        active.description = Set(description);
    }
    if let Some(activity_date) = payload.activity_date {
        active.activity_date = Set(activity_date);
    }

    let activity = active.update(&db).await?;
    record_action("provider_activities", "update_activity", activity.id, "Provider activity updated");
    Ok(ApiResponse::ok(activity, "Activity updated successfully"))
}

// DELETE /service_providers/:id/activities/:child_id
pub async fn delete_activity(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath((provider_id, activity_id)): ApiPath<(i32, i32)>,
) -> Result<StatusCode, ApiError> {
    owned_activity(&db, provider_id, activity_id).await?;
    provider_activity::Entity::delete_by_id(activity_id)
        .exec(&db)
        .await?;

    record_action("provider_activities", "delete_activity", activity_id, "Provider activity removed");
    Ok(deleted())
}

// ---------------------------------------------------------------------------
// Schedules
// ---------------------------------------------------------------------------

/// Accepts `2026-11-02T09:00:00`, `2026-11-02 09:00:00` or a bare
/// `2026-11-02` (midnight).
fn parse_schedule_date(raw: &str) -> Option<NaiveDateTime> {
    raw.parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            raw.parse::<NaiveDate>()
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn schedule_date<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_schedule_date(&raw)
        .ok_or_else(|| de::Error::custom(format!("invalid scheduled_date `{raw}`")))
}

fn optional_schedule_date<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    schedule_date(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
pub struct CreateScheduleRequest {
    pub service_id: i32,
    #[serde(deserialize_with = "schedule_date")]
    pub scheduled_date: NaiveDateTime,
    pub scheduled_time: NaiveTime,
    pub special_requirements: Option<String>,
    pub status: Option<ScheduleStatus>,
    pub requested_by: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateScheduleRequest {
    pub service_id: Option<i32>,
    #[serde(default, deserialize_with = "optional_schedule_date")]
    pub scheduled_date: Option<NaiveDateTime>,
    pub scheduled_time: Option<NaiveTime>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub special_requirements: Option<Option<String>>,
    pub status: Option<ScheduleStatus>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub requested_by: Option<Option<i32>>,
}

#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    #[serde(flatten)]
    pub schedule: service_schedule::Model,
    pub provider_name: String,
    pub service_name: Option<String>,
}

/// A schedule may only book a service offered by the same provider. An
/// unknown service id is a 404, someone else's service a 400.
async fn ensure_service_of_provider(
    db: &DatabaseConnection,
    provider_id: i32,
    service_id: i32,
    message: &str,
) -> Result<provider_service::Model, ApiError> {
    let service = provider_service::Entity::find_by_id(service_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Service"))?;
    if service.provider_id != provider_id {
        return Err(ApiError::validation(
            message,
            "Service does not belong to this provider",
        ));
    }
    Ok(service)
}

async fn render_schedules(
    db: &DatabaseConnection,
    provider_id: i32,
    schedules: Vec<service_schedule::Model>,
) -> Result<Vec<ScheduleResponse>, ApiError> {
    let provider = find_provider(db, provider_id).await?;
    let services: HashMap<i32, String> = provider_service::Entity::find()
        .filter(provider_service::Column::ProviderId.eq(provider_id))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, s.name))
        .collect();

    Ok(schedules
        .into_iter()
        .map(|schedule| ScheduleResponse {
            provider_name: provider.name.clone(),
            service_name: services.get(&schedule.service_id).cloned(),
            schedule,
        })
        .collect())
}

async fn render_schedule(
    db: &DatabaseConnection,
    schedule: service_schedule::Model,
) -> Result<ScheduleResponse, ApiError> {
    render_schedules(db, schedule.provider_id, vec![schedule])
        .await?
        .pop()
        .ok_or_else(|| ApiError::not_found("Schedule"))
}

async fn owned_schedule(
    db: &DatabaseConnection,
    provider_id: i32,
    schedule_id: i32,
) -> Result<service_schedule::Model, ApiError> {
    find_provider(db, provider_id).await?;
    service_schedule::Entity::find_by_id(schedule_id)
        .filter(service_schedule::Column::ProviderId.eq(provider_id))
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Schedule"))
}

// GET /service_providers/:id/schedules
pub async fn list_schedules(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath(provider_id): ApiPath<i32>,
) -> Result<ApiResponse<Vec<ScheduleResponse>>, ApiError> {
    find_provider(&db, provider_id).await?;
    let schedules = service_schedule::Entity::find()
        .filter(service_schedule::Column::ProviderId.eq(provider_id))
        .order_by_asc(service_schedule::Column::ScheduledDate)
        .order_by_asc(service_schedule::Column::ScheduledTime)
        .order_by_asc(service_schedule::Column::Id)
        .all(&db)
        .await?;

    let schedules = render_schedules(&db, provider_id, schedules).await?;
    let message = format!("Retrieved {} schedules", schedules.len());
    Ok(ApiResponse::ok(schedules, message))
}

// POST /service_providers/:id/schedules
pub async fn create_schedule(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath(provider_id): ApiPath<i32>,
    ApiJson(payload): ApiJson<CreateScheduleRequest>,
) -> Result<ApiResponse<ScheduleResponse>, ApiError> {
    find_provider(&db, provider_id).await?;
    ensure_service_of_provider(&db, provider_id, payload.service_id, "Failed to create schedule")
        .await?;

    let now = chrono::Utc::now().naive_utc();
    let schedule = service_schedule::ActiveModel {
        provider_id: Set(provider_id),
        service_id: Set(payload.service_id),
        scheduled_date: Set(payload.scheduled_date),
        scheduled_time: Set(payload.scheduled_time),
        special_requirements: Set(payload.special_requirements),
        status: Set(payload.status.unwrap_or(ScheduleStatus::Scheduled)),
        requested_by: Set(payload.requested_by),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    record_action("service_schedules", "create_schedule", schedule.id, "Service visit scheduled");
    Ok(ApiResponse::created(
        render_schedule(&db, schedule).await?,
        "Schedule created successfully",
    ))
}

// GET /service_providers/:id/schedules/:child_id
pub async fn get_schedule(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath((provider_id, schedule_id)): ApiPath<(i32, i32)>,
) -> Result<ApiResponse<ScheduleResponse>, ApiError> {
    let schedule = owned_schedule(&db, provider_id, schedule_id).await?;
    Ok(ApiResponse::ok(
        render_schedule(&db, schedule).await?,
        "Schedule retrieved successfully",
    ))
}

// PUT /service_providers/:id/schedules/:child_id
pub async fn update_schedule(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath((provider_id, schedule_id)): ApiPath<(i32, i32)>,
    ApiJson(payload): ApiJson<UpdateScheduleRequest>,
) -> Result<ApiResponse<ScheduleResponse>, ApiError> {
    let schedule = owned_schedule(&db, provider_id, schedule_id).await?;

    let mut active = schedule.into_active_model();
    if let Some(service_id) = payload.service_id {
        ensure_service_of_provider(&db, provider_id, service_id, "Failed to update schedule")
            .await?;
        active.service_id = Set(service_id);
    }
    if let Some(scheduled_date) = payload.scheduled_date {
        active.scheduled_date = Set(scheduled_date);
    }
    if let Some(scheduled_time) = payload.scheduled_time {
        active.scheduled_time = Set(scheduled_time);
    }
    if let Some(special_requirements) = payload.special_requirements {
        active.special_requirements = Set(special_requirements);
    }
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    if let Some(requested_by) = payload.requested_by {
        active.requested_by = Set(requested_by);
    }
    active.updated_at = Set(chrono::Utc::now().naive_utc());

    let schedule = active.update(&db).await?;
    record_action("service_schedules", "update_schedule", schedule.id, "Service visit rescheduled");
    Ok(ApiResponse::ok(
        render_schedule(&db, schedule).await?,
        "Schedule updated successfully",
    ))
}

// DELETE /service_providers/:id/schedules/:child_id
pub async fn delete_schedule(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath((provider_id, schedule_id)): ApiPath<(i32, i32)>,
) -> Result<StatusCode, ApiError> {
    owned_schedule(&db, provider_id, schedule_id).await?;
    service_schedule::Entity::delete_by_id(schedule_id)
        .exec(&db)
        .await?;

    record_action("service_schedules", "delete_schedule", schedule_id, "Service visit cancelled");
    Ok(deleted())
}
