use axum::{
    extract::Extension,
    http::StatusCode,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};

use super::asset::{render_assets, AssetResponse};
use super::extract::{require_text, ApiJson, ApiPath, ApiQuery};
use super::response::{deleted, ApiResponse};
use super::ticket::{render_tickets, TicketResponse};
use super::tool::{render_tools, ToolResponse};
use super::{ensure_unique, record_action, ApiError};
use crate::entities::{
    asset, ticket, tool,
    user::{self, UserRole},
};

#[derive(Debug, Default, Deserialize)]
pub struct UserFilter {
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub role: Option<UserRole>,
    pub full_name: Option<String>,
    pub department: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub full_name: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub department: Option<Option<String>>,
}

/// Everything in the facility that points back at one user.
#[derive(Debug, Serialize)]
pub struct Assignments {
    pub user: user::Model,
    pub assigned_tickets: Vec<TicketResponse>,
    pub created_tickets: Vec<TicketResponse>,
    pub assets: Vec<AssetResponse>,
    pub checked_out_tools: Vec<ToolResponse>,
}

async fn find_user(db: &DatabaseConnection, user_id: i32) -> Result<user::Model, ApiError> {
    user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))
}

// GET /users
pub async fn list_users(
    Extension(db): Extension<DatabaseConnection>,
    ApiQuery(filter): ApiQuery<UserFilter>,
) -> Result<ApiResponse<Vec<user::Model>>, ApiError> {
    let mut query = user::Entity::find();
    if let Some(role) = filter.role {
        query = query.filter(user::Column::Role.eq(role));
    }
    let users = query.order_by_asc(user::Column::Username).all(&db).await?;

    let message = format!("Retrieved {} users", users.len());
    Ok(ApiResponse::ok(users, message))
}

// POST /users
pub async fn create_user(
    Extension(db): Extension<DatabaseConnection>,
    ApiJson(payload): ApiJson<CreateUserRequest>,
) -> Result<ApiResponse<user::Model>, ApiError> {
    const FAILED: &str = "Failed to create user";
    require_text("username", &payload.username, FAILED)?;
    require_text("email", &payload.email, FAILED)?;
    ensure_unique::<user::Entity, _>(
        &db,
        user::Column::Username,
        user::Column::Id,
        &payload.username,
        None,
        FAILED,
    )
    .await?;
    ensure_unique::<user::Entity, _>(
        &db,
        user::Column::Email,
        user::Column::Id,
        &payload.email,
        None,
        FAILED,
    )
    .await?;

    let now = chrono::Utc::now().naive_utc();
    let user = user::ActiveModel {
        username: Set(payload.username),
        email: Set(payload.email),
        role: Set(payload.role.unwrap_or(UserRole::User)),
        full_name: Set(payload.full_name),
        department: Set(payload.department),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    record_action("users", "create_user", user.id, "User registered");
    Ok(ApiResponse::created(user, "User created successfully"))
}

// GET /users/:id
pub async fn get_user(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath(user_id): ApiPath<i32>,
) -> Result<ApiResponse<user::Model>, ApiError> {
    let user = find_user(&db, user_id).await?;
    Ok(ApiResponse::ok(user, "User retrieved successfully"))
}

// PUT /users/:id
pub async fn update_user(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath(user_id): ApiPath<i32>,
    ApiJson(payload): ApiJson<UpdateUserRequest>,
) -> Result<ApiResponse<user::Model>, ApiError> {
    const FAILED: &str = "Failed to update user";
    let user = find_user(&db, user_id).await?;

    let mut active = user.into_active_model();
    if let Some(username) = payload.username {
        require_text("username", &username, FAILED)?;
        ensure_unique::<user::Entity, _>(
            &db,
            user::Column::Username,
            user::Column::Id,
            &username,
            Some(user_id),
            FAILED,
        )
        .await?;
        active.username = Set(username);
    }
    if let Some(email) = payload.email {
        require_text("email", &email, FAILED)?;
        ensure_unique::<user::Entity, _>(
            &db,
            user::Column::Email,
            user::Column::Id,
            &email,
            Some(user_id),
            FAILED,
        )
        .await?;
        active.email = Set(email);
    }
    if let Some(role) = payload.role {
        active.role = Set(role);
    }
    if let Some(full_name) = payload.full_name {
        active.full_name = Set(full_name);
    }
    if let Some(department) = payload.department {
        active.department = Set(department);
    }
    active.updated_at = Set(chrono::Utc::now().naive_utc());

    let user = active.update(&db).await?;
    record_action("users", "update_user", user.id, "User updated");
    Ok(ApiResponse::ok(user, "User updated successfully"))
}

// DELETE /users/:id
pub async fn delete_user(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath(user_id): ApiPath<i32>,
) -> Result<StatusCode, ApiError> {
    // Referencing tickets, assets and tools are left as they are
    let res = user::Entity::delete_by_id(user_id).exec(&db).await?;
    if res.rows_affected == 0 {
        return Err(ApiError::not_found("User"));
    }
    record_action("users", "delete_user", user_id, "User removed");
    Ok(deleted())
}

// GET /users/:id/assignments
pub async fn get_assignments(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath(user_id): ApiPath<i32>,
) -> Result<ApiResponse<Assignments>, ApiError> {
    let user = find_user(&db, user_id).await?;

    let assigned = ticket::Entity::find()
        .filter(ticket::Column::AssignedTo.eq(user_id))
        .order_by_desc(ticket::Column::CreatedAt)
        .order_by_desc(ticket::Column::Id)
        .all(&db)
        .await?;
    let created = ticket::Entity::find()
        .filter(ticket::Column::CreatedBy.eq(user_id))
        .order_by_desc(ticket::Column::CreatedAt)
        .order_by_desc(ticket::Column::Id)
        .all(&db)
        .await?;
    let assets = asset::Entity::find()
        .filter(asset::Column::AssignedTo.eq(user_id))
        .order_by_asc(asset::Column::AssetTag)
        .all(&db)
        .await?;
    let tools = tool::Entity::find()
        .filter(tool::Column::CheckedOutTo.eq(user_id))
        .order_by_desc(tool::Column::CheckedOutAt)
        .all(&db)
        .await?;

    let assignments = Assignments {
        user,
        assigned_tickets: render_tickets(&db, assigned).await?,
        created_tickets: render_tickets(&db, created).await?,
        assets: render_assets(&db, assets).await?,
        checked_out_tools: render_tools(&db, tools).await?,
    };
    Ok(ApiResponse::ok(assignments, "User assignments retrieved successfully"))
}
