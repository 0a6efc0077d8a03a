use axum::{
    extract::Extension,
    http::StatusCode,
};
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};

use super::extract::{require_text, ApiJson, ApiPath, ApiQuery};
use super::response::{deleted, ApiResponse};
use super::{ensure_unique, record_action, usernames, ApiError};
use crate::entities::asset::{self, ItemCondition};

#[derive(Debug, Default, Deserialize)]
pub struct AssetFilter {
    pub category: Option<String>,
    pub condition: Option<ItemCondition>,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAssetRequest {
    pub asset_tag: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub condition: Option<ItemCondition>,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_expiry: Option<NaiveDate>,
    pub assigned_to: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateAssetRequest {
    pub asset_tag: Option<String>,
    pub name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub category: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub location: Option<Option<String>>,
    pub condition: Option<ItemCondition>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub purchase_date: Option<Option<NaiveDate>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub warranty_expiry: Option<Option<NaiveDate>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub assigned_to: Option<Option<i32>>,
}

#[derive(Debug, Serialize)]
pub struct AssetResponse {
    #[serde(flatten)]
    pub asset: asset::Model,
    pub assignee_name: Option<String>,
}

pub(crate) async fn render_assets<C>(
    db: &C,
    assets: Vec<asset::Model>,
) -> Result<Vec<AssetResponse>, DbErr>
where
    C: ConnectionTrait,
{
    let names = usernames(db, assets.iter().map(|a| a.assigned_to)).await?;
    Ok(assets
        .into_iter()
        .map(|asset| AssetResponse {
            assignee_name: asset.assigned_to.and_then(|id| names.get(&id).cloned()),
            asset,
        })
        .collect())
}

async fn render_asset(db: &DatabaseConnection, asset: asset::Model) -> Result<AssetResponse, ApiError> {
    render_assets(db, vec![asset])
        .await?
        .pop()
        .ok_or_else(|| ApiError::not_found("Asset"))
}

// GET /assets
pub async fn list_assets(
    Extension(db): Extension<DatabaseConnection>,
    ApiQuery(filter): ApiQuery<AssetFilter>,
) -> Result<ApiResponse<Vec<AssetResponse>>, ApiError> {
    let assets = asset::Entity::find()
        .filter(
            Condition::all()
                .add_option(filter.category.map(|c| asset::Column::Category.eq(c)))
                .add_option(filter.condition.map(|c| asset::Column::Condition.eq(c)))
                .add_option(filter.location.map(|l| asset::Column::Location.eq(l))),
        )
        .order_by_desc(asset::Column::CreatedAt)
        .order_by_desc(asset::Column::Id)
        .all(&db)
        .await?;

    let assets = render_assets(&db, assets).await?;
    let message = format!("Retrieved {} assets", assets.len());
    Ok(ApiResponse::ok(assets, message))
}

// POST /assets
pub async fn create_asset(
    Extension(db): Extension<DatabaseConnection>,
    ApiJson(payload): ApiJson<CreateAssetRequest>,
) -> Result<ApiResponse<AssetResponse>, ApiError> {
    const FAILED: &str = "Failed to create asset";
    require_text("asset_tag", &payload.asset_tag, FAILED)?;
    require_text("name", &payload.name, FAILED)?;
    ensure_unique::<asset::Entity, _>(
        &db,
        asset::Column::AssetTag,
        asset::Column::Id,
        &payload.asset_tag,
        None,
        FAILED,
    )
    .await?;

    let now = chrono::Utc::now().naive_utc();
    let new_asset = asset::ActiveModel {
        asset_tag: Set(payload.asset_tag),
        name: Set(payload.name),
        description: Set(payload.description),
        category: Set(payload.category),
        location: Set(payload.location),
        condition: Set(payload.condition.unwrap_or(ItemCondition::Good)),
        purchase_date: Set(payload.purchase_date),
        warranty_expiry: Set(payload.warranty_expiry),
        assigned_to: Set(payload.assigned_to),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let asset = new_asset.insert(&db).await?;
    record_action("assets", "create_asset", asset.id, "Asset registered");

    Ok(ApiResponse::created(
        render_asset(&db, asset).await?,
        "Asset created successfully",
    ))
}

// GET /assets/:id
pub async fn get_asset(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath(asset_id): ApiPath<i32>,
) -> Result<ApiResponse<AssetResponse>, ApiError> {
    let asset = asset::Entity::find_by_id(asset_id)
        .one(&db)
        .await?
        .ok_or_else(|| ApiError::not_found("Asset"))?;

    Ok(ApiResponse::ok(
        render_asset(&db, asset).await?,
        "Asset retrieved successfully",
    ))
}

// GET /assets/scan/:barcode
pub async fn scan_asset(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath(barcode): ApiPath<String>,
) -> Result<ApiResponse<AssetResponse>, ApiError> {
    let asset = asset::Entity::find()
        .filter(asset::Column::AssetTag.eq(barcode))
        .one(&db)
        .await?
        .ok_or_else(|| ApiError::NotFound("No asset found with this barcode".to_string()))?;

    Ok(ApiResponse::ok(
        render_asset(&db, asset).await?,
        "Asset found successfully",
    ))
}

// PUT /assets/:id
pub async fn update_asset(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath(asset_id): ApiPath<i32>,
    ApiJson(payload): ApiJson<UpdateAssetRequest>,
) -> Result<ApiResponse<AssetResponse>, ApiError> {
    const FAILED: &str = "Failed to update asset";
    let asset = asset::Entity::find_by_id(asset_id)
        .one(&db)
        .await?
        .ok_or_else(|| ApiError::not_found("Asset"))?;

    let mut active = asset.into_active_model();
    if let Some(asset_tag) = payload.asset_tag {
        require_text("asset_tag", &asset_tag, FAILED)?;
        ensure_unique::<asset::Entity, _>(
            &db,
            asset::Column::AssetTag,
            asset::Column::Id,
            &asset_tag,
            Some(asset_id),
            FAILED,
        )
        .await?;
        active.asset_tag = Set(asset_tag);
    }
    if let Some(name) = payload.name {
        require_text("name", &name, FAILED)?;
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(category) = payload.category {
        active.category = Set(category);
    }
    if let Some(location) = payload.location {
        active.location = Set(location);
    }
    if let Some(condition) = payload.condition {
        active.condition = Set(condition);
    }
    if let Some(purchase_date) = payload.purchase_date {
        active.purchase_date = Set(purchase_date);
    }
    if let Some(warranty_expiry) = payload.warranty_expiry {
        active.warranty_expiry = Set(warranty_expiry);
    }
    if let Some(assigned_to) = payload.assigned_to {
        active.assigned_to = Set(assigned_to);
    }
    active.updated_at = Set(chrono::Utc::now().naive_utc());

    let asset = active.update(&db).await?;
    record_action("assets", "update_asset", asset.id, "Asset updated");

    Ok(ApiResponse::ok(
        render_asset(&db, asset).await?,
        "Asset updated successfully",
    ))
}

// DELETE /assets/:id
pub async fn delete_asset(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath(asset_id): ApiPath<i32>,
) -> Result<StatusCode, ApiError> {
    let res = asset::Entity::delete_by_id(asset_id).exec(&db).await?;
    if res.rows_affected == 0 {
        return Err(ApiError::not_found("Asset"));
    }
    record_action("assets", "delete_asset", asset_id, "Asset deleted");
    Ok(deleted())
}
