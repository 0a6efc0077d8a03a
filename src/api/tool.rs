use axum::{
    extract::Extension,
    http::StatusCode,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};

use super::extract::{require_text, ApiJson, ApiPath, ApiQuery};
use super::response::{deleted, ApiResponse};
use super::{ensure_unique, record_action, usernames, ApiError};
use crate::entities::tool::{self, ItemCondition, ToolStatus};

#[derive(Debug, Default, Deserialize)]
pub struct ToolFilter {
    /// Matches `tool_category`.
    pub category: Option<String>,
    pub condition: Option<ItemCondition>,
    pub status: Option<ToolStatus>,
}

#[derive(Debug, Deserialize)]
pub struct CreateToolRequest {
    pub tool_name: String,
    pub tool_category: Option<String>,
    pub serial_number: Option<String>,
    pub condition: Option<ItemCondition>,
    pub status: Option<ToolStatus>,
    pub location: Option<String>,
}

/// Plain edit of a tool record. Setting `status` here skips the
/// checkout/checkin guards and leaves the holder columns alone.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateToolRequest {
    pub tool_name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub tool_category: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub serial_number: Option<Option<String>>,
    pub condition: Option<ItemCondition>,
    pub status: Option<ToolStatus>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub location: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub user_id: i32,
}

#[derive(Debug, Serialize)]
pub struct ToolResponse {
    #[serde(flatten)]
    pub tool: tool::Model,
    pub checked_out_user_name: Option<String>,
}

pub(crate) async fn render_tools<C>(db: &C, tools: Vec<tool::Model>) -> Result<Vec<ToolResponse>, DbErr>
where
    C: ConnectionTrait,
{
    let names = usernames(db, tools.iter().map(|t| t.checked_out_to)).await?;
    Ok(tools
        .into_iter()
        .map(|tool| ToolResponse {
            checked_out_user_name: tool.checked_out_to.and_then(|id| names.get(&id).cloned()),
            tool,
        })
        .collect())
}

async fn render_tool(db: &DatabaseConnection, tool: tool::Model) -> Result<ToolResponse, ApiError> {
    render_tools(db, vec![tool])
        .await?
        .pop()
        .ok_or_else(|| ApiError::not_found("Tool"))
}

async fn find_tool(db: &DatabaseConnection, tool_id: i32) -> Result<tool::Model, ApiError> {
    tool::Entity::find_by_id(tool_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Tool"))
}

// GET /tools
pub async fn list_tools(
    Extension(db): Extension<DatabaseConnection>,
    ApiQuery(filter): ApiQuery<ToolFilter>,
) -> Result<ApiResponse<Vec<ToolResponse>>, ApiError> {
    let tools = tool::Entity::find()
        .filter(
            Condition::all()
                .add_option(filter.category.map(|c| tool::Column::ToolCategory.eq(c)))
                .add_option(filter.condition.map(|c| tool::Column::Condition.eq(c)))
                .add_option(filter.status.map(|s| tool::Column::Status.eq(s))),
        )
        .order_by_desc(tool::Column::CreatedAt)
        .order_by_desc(tool::Column::Id)
        .all(&db)
        .await?;

    let tools = render_tools(&db, tools).await?;
    let message = format!("Retrieved {} tools", tools.len());
    Ok(ApiResponse::ok(tools, message))
}

// POST /tools
pub async fn create_tool(
    Extension(db): Extension<DatabaseConnection>,
    ApiJson(payload): ApiJson<CreateToolRequest>,
) -> Result<ApiResponse<ToolResponse>, ApiError> {
    const FAILED: &str = "Failed to create tool";
    require_text("tool_name", &payload.tool_name, FAILED)?;
    if let Some(serial) = payload.serial_number.as_deref() {
        ensure_unique::<tool::Entity, _>(
            &db,
            tool::Column::SerialNumber,
            tool::Column::Id,
            serial,
            None,
            FAILED,
        )
        .await?;
    }

    let now = chrono::Utc::now().naive_utc();
    let new_tool = tool::ActiveModel {
        tool_name: Set(payload.tool_name),
        tool_category: Set(payload.tool_category),
        serial_number: Set(payload.serial_number),
        condition: Set(payload.condition.unwrap_or(ItemCondition::Good)),
        status: Set(payload.status.unwrap_or(ToolStatus::Available)),
        location: Set(payload.location),
        checked_out_to: Set(None),
        checked_out_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let tool = new_tool.insert(&db).await?;
    record_action("tools", "create_tool", tool.id, "Tool registered");

    Ok(ApiResponse::created(
        render_tool(&db, tool).await?,
        "Tool created successfully",
    ))
}

// GET /tools/:id
pub async fn get_tool(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath(tool_id): ApiPath<i32>,
) -> Result<ApiResponse<ToolResponse>, ApiError> {
    let tool = find_tool(&db, tool_id).await?;
    Ok(ApiResponse::ok(
        render_tool(&db, tool).await?,
        "Tool retrieved successfully",
    ))
}

// PUT /tools/:id
pub async fn update_tool(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath(tool_id): ApiPath<i32>,
    ApiJson(payload): ApiJson<UpdateToolRequest>,
) -> Result<ApiResponse<ToolResponse>, ApiError> {
    const FAILED: &str = "Failed to update tool";
    let tool = find_tool(&db, tool_id).await?;

    let mut active = tool.into_active_model();
    if let Some(tool_name) = payload.tool_name {
        require_text("tool_name", &tool_name, FAILED)?;
        active.tool_name = Set(tool_name);
    }
    if let Some(tool_category) = payload.tool_category {
        active.tool_category = Set(tool_category);
    }
    if let Some(serial_number) = payload.serial_number {
        if let Some(serial) = serial_number.as_deref() {
            ensure_unique::<tool::Entity, _>(
                &db,
                tool::Column::SerialNumber,
                tool::Column::Id,
                serial,
                Some(tool_id),
                FAILED,
            )
            .await?;
        }
        active.serial_number = Set(serial_number);
    }
    if let Some(condition) = payload.condition {
        active.condition = Set(condition);
    }
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    if let Some(location) = payload.location {
        active.location = Set(location);
    }
    active.updated_at = Set(chrono::Utc::now().naive_utc());

    let tool = active.update(&db).await?;
    record_action("tools", "update_tool", tool.id, "Tool updated");

    Ok(ApiResponse::ok(
        render_tool(&db, tool).await?,
        "Tool updated successfully",
    ))
}

// DELETE /tools/:id
pub async fn delete_tool(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath(tool_id): ApiPath<i32>,
) -> Result<StatusCode, ApiError> {
    let res = tool::Entity::delete_by_id(tool_id).exec(&db).await?;
    if res.rows_affected == 0 {
        return Err(ApiError::not_found("Tool"));
    }
    record_action("tools", "delete_tool", tool_id, "Tool deleted");
    Ok(deleted())
}

// POST /tools/:id/checkout
pub async fn checkout_tool(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath(tool_id): ApiPath<i32>,
    ApiJson(payload): ApiJson<CheckoutRequest>,
) -> Result<ApiResponse<ToolResponse>, ApiError> {
    let tool = find_tool(&db, tool_id).await?;
    let active = tool.checkout(payload.user_id, chrono::Utc::now().naive_utc())?;

    let tool = active.update(&db).await?;
    record_action("tools", "checkout_tool", tool.id, "Tool checked out");
    crate::metrics::tool_checked_out();

    Ok(ApiResponse::ok(
        render_tool(&db, tool).await?,
        "Tool checked out successfully",
    ))
}

// POST /tools/:id/checkin
pub async fn checkin_tool(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath(tool_id): ApiPath<i32>,
) -> Result<ApiResponse<ToolResponse>, ApiError> {
    let tool = find_tool(&db, tool_id).await?;
    let active = tool.checkin(chrono::Utc::now().naive_utc())?;

    let tool = active.update(&db).await?;
    record_action("tools", "checkin_tool", tool.id, "Tool checked in");
    crate::metrics::tool_checked_in();

    Ok(ApiResponse::ok(
        render_tool(&db, tool).await?,
        "Tool checked in successfully",
    ))
}
