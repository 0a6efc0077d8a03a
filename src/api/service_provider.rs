use axum::{
    extract::Extension,
    http::StatusCode,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, LoaderTrait, ModelTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};

use super::extract::{require_text, ApiJson, ApiPath, ApiQuery};
use super::response::{deleted, ApiResponse};
use super::{ensure_unique, record_action, ApiError};
use crate::entities::{
    provider_activity, provider_metric, provider_service,
    service_provider::{self, ProviderStatus},
    service_schedule,
};

/// How many activities the provider card shows.
pub const RECENT_ACTIVITY_LIMIT: usize = 5;

#[derive(Debug, Default, Deserialize)]
pub struct ProviderFilter {
    pub status: Option<ProviderStatus>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProviderRequest {
    pub name: String,
    pub code: String,
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub operating_hours: Option<String>,
    pub status: Option<ProviderStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProviderRequest {
    pub name: Option<String>,
    pub code: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub tagline: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub icon: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub contact_phone: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub contact_email: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub operating_hours: Option<Option<String>>,
    pub status: Option<ProviderStatus>,
}

/// A provider together with its services, metrics and latest activities.
#[derive(Debug, Serialize)]
pub struct ProviderResponse {
    #[serde(flatten)]
    pub provider: service_provider::Model,
    pub services: Vec<provider_service::Model>,
    pub metrics: Vec<provider_metric::Model>,
    pub recent_activities: Vec<provider_activity::Model>,
}

/// Newest activities first by `activity_date`, ties broken by insertion order.
pub fn recent_activities(
    mut activities: Vec<provider_activity::Model>,
    limit: usize,
) -> Vec<provider_activity::Model> {
    activities.sort_by(|a, b| {
        b.activity_date
            .cmp(&a.activity_date)
            .then_with(|| b.id.cmp(&a.id))
    });
    activities.truncate(limit);
    activities
}

pub(crate) async fn compose<C>(
    db: &C,
    providers: Vec<service_provider::Model>,
) -> Result<Vec<ProviderResponse>, DbErr>
where
    C: ConnectionTrait,
{
    let services = providers.load_many(provider_service::Entity, db).await?;
    let metrics = providers.load_many(provider_metric::Entity, db).await?;
    let activities = providers.load_many(provider_activity::Entity, db).await?;

    Ok(providers
        .into_iter()
        .zip(services)
        .zip(metrics)
        .zip(activities)
        .map(|(((provider, mut services), mut metrics), activities)| {
            services.sort_by_key(|s| s.id);
            metrics.sort_by_key(|m| (m.display_order, m.id));
            ProviderResponse {
                provider,
                services,
                metrics,
                recent_activities: recent_activities(activities, RECENT_ACTIVITY_LIMIT),
            }
        })
        .collect())
}

async fn compose_one(
    db: &DatabaseConnection,
    provider: service_provider::Model,
) -> Result<ProviderResponse, ApiError> {
    compose(db, vec![provider])
        .await?
        .pop()
        .ok_or_else(|| ApiError::not_found("Service provider"))
}

pub(crate) async fn find_provider<C>(db: &C, provider_id: i32) -> Result<service_provider::Model, ApiError>
where
    C: ConnectionTrait,
{
    service_provider::Entity::find_by_id(provider_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Service provider"))
}

// GET /service_providers
pub async fn list_providers(
    Extension(db): Extension<DatabaseConnection>,
    ApiQuery(filter): ApiQuery<ProviderFilter>,
) -> Result<ApiResponse<Vec<ProviderResponse>>, ApiError> {
    let mut query = service_provider::Entity::find();
    if let Some(status) = filter.status {
        query = query.filter(service_provider::Column::Status.eq(status));
    }
    let providers = query
        .order_by_desc(service_provider::Column::CreatedAt)
        .order_by_desc(service_provider::Column::Id)
        .all(&db)
        .await?;

    let providers = compose(&db, providers).await?;
    let message = format!("Retrieved {} service providers", providers.len());
    Ok(ApiResponse::ok(providers, message))
}

// GET /service_providers/:id
pub async fn get_provider(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath(provider_id): ApiPath<i32>,
) -> Result<ApiResponse<ProviderResponse>, ApiError> {
    let provider = find_provider(&db, provider_id).await?;
    Ok(ApiResponse::ok(
        compose_one(&db, provider).await?,
        "Service provider retrieved successfully",
    ))
}

// POST /service_providers
pub async fn create_provider(
    Extension(db): Extension<DatabaseConnection>,
    ApiJson(payload): ApiJson<CreateProviderRequest>,
) -> Result<ApiResponse<ProviderResponse>, ApiError> {
    const FAILED: &str = "Failed to create service provider";
    require_text("name", &payload.name, FAILED)?;
    require_text("code", &payload.code, FAILED)?;
    ensure_unique::<service_provider::Entity, _>(
        &db,
        service_provider::Column::Code,
        service_provider::Column::Id,
        &payload.code,
        None,
        FAILED,
    )
    .await?;

    let now = chrono::Utc::now().naive_utc();
    let provider = service_provider::ActiveModel {
        name: Set(payload.name),
        code: Set(payload.code),
        tagline: Set(payload.tagline),
        description: Set(payload.description),
        icon: Set(payload.icon),
        contact_phone: Set(payload.contact_phone),
        contact_email: Set(payload.contact_email),
        operating_hours: Set(payload.operating_hours),
        status: Set(payload.status.unwrap_or(ProviderStatus::Active)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    record_action("service_providers", "create_provider", provider.id, "Service provider onboarded");
    Ok(ApiResponse::created(
        compose_one(&db, provider).await?,
        "Service provider created successfully",
    ))
}

// PUT /service_providers/:id
pub async fn update_provider(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath(provider_id): ApiPath<i32>,
    ApiJson(payload): ApiJson<UpdateProviderRequest>,
) -> Result<ApiResponse<ProviderResponse>, ApiError> {
    const FAILED: &str = "Failed to update service provider";
    let provider = find_provider(&db, provider_id).await?;

    let mut active = provider.into_active_model();
    if let Some(name) = payload.name {
        require_text("name", &name, FAILED)?;
        active.name = Set(name);
    }
    if let Some(code) = payload.code {
        require_text("code", &code, FAILED)?;
        ensure_unique::<service_provider::Entity, _>(
            &db,
            service_provider::Column::Code,
            service_provider::Column::Id,
            &code,
            Some(provider_id),
            FAILED,
        )
        .await?;
        active.code = Set(code);
    }
    if let Some(tagline) = payload.tagline {
        active.tagline = Set(tagline);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(icon) = payload.icon {
        active.icon = Set(icon);
    }
    if let Some(contact_phone) = payload.contact_phone {
        active.contact_phone = Set(contact_phone);
    }
    if let Some(contact_email) = payload.contact_email {
        active.contact_email = Set(contact_email);
    }
    if let Some(operating_hours) = payload.operating_hours {
        active.operating_hours = Set(operating_hours);
    }
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    active.updated_at = Set(chrono::Utc::now().naive_utc());

    let provider = active.update(&db).await?;
    record_action("service_providers", "update_provider", provider.id, "Service provider updated");
    Ok(ApiResponse::ok(
        compose_one(&db, provider).await?,
        "Service provider updated successfully",
    ))
}

// DELETE /service_providers/:id
pub async fn delete_provider(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath(provider_id): ApiPath<i32>,
) -> Result<StatusCode, ApiError> {
    // Children go first and in the same transaction, so a failure part way
    // leaves the whole aggregate in place.
    let txn = db.begin().await?;
    let provider = find_provider(&txn, provider_id).await?;

    service_schedule::Entity::delete_many()
        .filter(service_schedule::Column::ProviderId.eq(provider_id))
        .exec(&txn)
        .await?;
    provider_activity::Entity::delete_many()
        .filter(provider_activity::Column::ProviderId.eq(provider_id))
        .exec(&txn)
        .await?;
    provider_metric::Entity::delete_many()
        .filter(provider_metric::Column::ProviderId.eq(provider_id))
        .exec(&txn)
        .await?;
    provider_service::Entity::delete_many()
        .filter(provider_service::Column::ProviderId.eq(provider_id))
        .exec(&txn)
        .await?;
    provider.delete(&txn).await?;
    txn.commit().await?;

    record_action("service_providers", "delete_provider", provider_id, "Service provider removed");
    Ok(deleted())
}
