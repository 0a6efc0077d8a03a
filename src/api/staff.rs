use axum::{
    extract::Extension,
    http::StatusCode,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;

use super::extract::{require_text, ApiJson, ApiPath, ApiQuery};
use super::response::{deleted, ApiResponse};
use super::{ensure_unique, record_action, ApiError};
use crate::entities::staff::{self, StaffStatus};

#[derive(Debug, Default, Deserialize)]
pub struct StaffFilter {
    pub department: Option<String>,
    pub status: Option<StaffStatus>,
}

#[derive(Debug, Deserialize)]
pub struct CreateStaffRequest {
    pub employee_id: String,
    pub name: String,
    pub department: Option<String>,
    pub position: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Option<StaffStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateStaffRequest {
    pub employee_id: Option<String>,
    pub name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub department: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub position: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub email: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub phone: Option<Option<String>>,
    pub status: Option<StaffStatus>,
}

async fn find_staff(db: &DatabaseConnection, staff_id: i32) -> Result<staff::Model, ApiError> {
    staff::Entity::find_by_id(staff_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Staff member"))
}

// GET /staff
pub async fn list_staff(
    Extension(db): Extension<DatabaseConnection>,
    ApiQuery(filter): ApiQuery<StaffFilter>,
) -> Result<ApiResponse<Vec<staff::Model>>, ApiError> {
    let members = staff::Entity::find()
        .filter(
            Condition::all()
                .add_option(filter.department.map(|d| staff::Column::Department.eq(d)))
                .add_option(filter.status.map(|s| staff::Column::Status.eq(s))),
        )
        .order_by_desc(staff::Column::CreatedAt)
        .order_by_desc(staff::Column::Id)
        .all(&db)
        .await?;

    let message = format!("Retrieved {} staff members", members.len());
    Ok(ApiResponse::ok(members, message))
}

// POST /staff
pub async fn create_staff(
    Extension(db): Extension<DatabaseConnection>,
    ApiJson(payload): ApiJson<CreateStaffRequest>,
) -> Result<ApiResponse<staff::Model>, ApiError> {
    const FAILED: &str = "Failed to create staff member";
    require_text("employee_id", &payload.employee_id, FAILED)?;
    require_text("name", &payload.name, FAILED)?;
    ensure_unique::<staff::Entity, _>(
        &db,
        staff::Column::EmployeeId,
        staff::Column::Id,
        &payload.employee_id,
        None,
        FAILED,
    )
    .await?;

    let now = chrono::Utc::now().naive_utc();
    let member = staff::ActiveModel {
        employee_id: Set(payload.employee_id),
        name: Set(payload.name),
        department: Set(payload.department),
        position: Set(payload.position),
        email: Set(payload.email),
        phone: Set(payload.phone),
        status: Set(payload.status.unwrap_or(StaffStatus::Active)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    record_action("staff", "create_staff", member.id, "Staff member added");
    Ok(ApiResponse::created(member, "Staff member created successfully"))
}

// GET /staff/:id
pub async fn get_staff_member(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath(staff_id): ApiPath<i32>,
) -> Result<ApiResponse<staff::Model>, ApiError> {
    let member = find_staff(&db, staff_id).await?;
    Ok(ApiResponse::ok(member, "Staff member retrieved successfully"))
}

// PUT /staff/:id
pub async fn update_staff(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath(staff_id): ApiPath<i32>,
    ApiJson(payload): ApiJson<UpdateStaffRequest>,
) -> Result<ApiResponse<staff::Model>, ApiError> {
    const FAILED: &str = "Failed to update staff member";
    let member = find_staff(&db, staff_id).await?;

    let mut active = member.into_active_model();
    if let Some(employee_id) = payload.employee_id {
        require_text("employee_id", &employee_id, FAILED)?;
        ensure_unique::<staff::Entity, _>(
            &db,
            staff::Column::EmployeeId,
            staff::Column::Id,
            &employee_id,
            Some(staff_id),
            FAILED,
        )
        .await?;
        active.employee_id = Set(employee_id);
    }
    if let Some(name) = payload.name {
        require_text("name", &name, FAILED)?;
        active.name = Set(name);
    }
    if let Some(department) = payload.department {
        active.department = Set(department);
    }
    if let Some(position) = payload.position {
        active.position = Set(position);
    }
    if let Some(email) = payload.email {
        active.email = Set(email);
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(phone);
    }
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    active.updated_at = Set(chrono::Utc::now().naive_utc());

    let member = active.update(&db).await?;
    record_action("staff", "update_staff", member.id, "Staff member updated");
    Ok(ApiResponse::ok(member, "Staff member updated successfully"))
}

// DELETE /staff/:id
pub async fn delete_staff(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath(staff_id): ApiPath<i32>,
) -> Result<StatusCode, ApiError> {
    let res = staff::Entity::delete_by_id(staff_id).exec(&db).await?;
    if res.rows_affected == 0 {
        return Err(ApiError::not_found("Staff member"));
    }
    record_action("staff", "delete_staff", staff_id, "Staff member removed");
    Ok(deleted())
}
