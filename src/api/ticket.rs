use axum::{
    extract::Extension,
    http::StatusCode,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};

use super::extract::{require_text, ApiJson, ApiPath, ApiQuery};
use super::response::{deleted, ApiResponse};
use super::{record_action, usernames, ApiError};
use crate::entities::ticket::{self, resolution_stamp, TicketPriority, TicketStatus};

#[derive(Debug, Default, Deserialize)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    pub assigned_to: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<TicketPriority>,
    pub status: Option<TicketStatus>,
    pub category: Option<String>,
    pub assigned_to: Option<i32>,
    pub created_by: i32,
    pub location: Option<String>,
}

/// Partial update. A key sent as `null` clears a nullable column; an absent
/// key leaves it alone.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTicketRequest {
    pub title: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub description: Option<Option<String>>,
    pub priority: Option<TicketPriority>,
    pub status: Option<TicketStatus>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub category: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub assigned_to: Option<Option<i32>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub location: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct AssignTicketRequest {
    pub assigned_to: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: TicketStatus,
}

#[derive(Debug, Serialize)]
pub struct TicketResponse {
    #[serde(flatten)]
    pub ticket: ticket::Model,
    pub assignee_name: Option<String>,
    pub creator_name: Option<String>,
}

/// Attaches assignee and creator usernames to a batch of tickets.
pub(crate) async fn render_tickets<C>(
    db: &C,
    tickets: Vec<ticket::Model>,
) -> Result<Vec<TicketResponse>, DbErr>
where
    C: ConnectionTrait,
{
    let names = usernames(
        db,
        tickets
            .iter()
            .flat_map(|t| [t.assigned_to, Some(t.created_by)]),
    )
    .await?;

    Ok(tickets
        .into_iter()
        .map(|ticket| TicketResponse {
            assignee_name: ticket.assigned_to.and_then(|id| names.get(&id).cloned()),
            creator_name: names.get(&ticket.created_by).cloned(),
            ticket,
        })
        .collect())
}

async fn render_ticket(
    db: &DatabaseConnection,
    ticket: ticket::Model,
) -> Result<TicketResponse, ApiError> {
    let mut rendered = render_tickets(db, vec![ticket]).await?;
    rendered
        .pop()
        .ok_or_else(|| ApiError::not_found("Ticket"))
}

async fn find_ticket(db: &DatabaseConnection, ticket_id: i32) -> Result<ticket::Model, ApiError> {
    ticket::Entity::find_by_id(ticket_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Ticket"))
}

// GET /tickets
pub async fn list_tickets(
    Extension(db): Extension<DatabaseConnection>,
    ApiQuery(filter): ApiQuery<TicketFilter>,
) -> Result<ApiResponse<Vec<TicketResponse>>, ApiError> {
    let tickets = ticket::Entity::find()
        .filter(
            Condition::all()
                .add_option(filter.status.map(|s| ticket::Column::Status.eq(s)))
                .add_option(filter.priority.map(|p| ticket::Column::Priority.eq(p)))
                .add_option(filter.assigned_to.map(|u| ticket::Column::AssignedTo.eq(u))),
        )
        .order_by_desc(ticket::Column::CreatedAt)
        .order_by_desc(ticket::Column::Id)
        .all(&db)
        .await?;

    let tickets = render_tickets(&db, tickets).await?;
    let message = format!("Retrieved {} tickets", tickets.len());
    Ok(ApiResponse::ok(tickets, message))
}

// POST /tickets
pub async fn create_ticket(
    Extension(db): Extension<DatabaseConnection>,
    ApiJson(payload): ApiJson<CreateTicketRequest>,
) -> Result<ApiResponse<TicketResponse>, ApiError> {
    require_text("title", &payload.title, "Failed to create ticket")?;

    let now = chrono::Utc::now().naive_utc();
    let status = payload.status.unwrap_or(TicketStatus::Open);
    let new_ticket = ticket::ActiveModel {
        title: Set(payload.title),
        description: Set(payload.description),
        priority: Set(payload.priority.unwrap_or(TicketPriority::Medium)),
        status: Set(status),
        category: Set(payload.category),
        assigned_to: Set(payload.assigned_to),
        created_by: Set(payload.created_by),
        location: Set(payload.location),
        created_at: Set(now),
        updated_at: Set(now),
        resolved_at: Set(resolution_stamp(None, status, now)),
        ..Default::default()
    };

    let ticket = new_ticket.insert(&db).await?;
    record_action("tickets", "create_ticket", ticket.id, "Ticket created");
    crate::metrics::ticket_created(ticket.priority);

    Ok(ApiResponse::created(
        render_ticket(&db, ticket).await?,
        "Ticket created successfully",
    ))
}

// GET /tickets/:id
pub async fn get_ticket(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath(ticket_id): ApiPath<i32>,
) -> Result<ApiResponse<TicketResponse>, ApiError> {
    let ticket = find_ticket(&db, ticket_id).await?;
    Ok(ApiResponse::ok(
        render_ticket(&db, ticket).await?,
        "Ticket retrieved successfully",
    ))
}

// PUT /tickets/:id
pub async fn update_ticket(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath(ticket_id): ApiPath<i32>,
    ApiJson(payload): ApiJson<UpdateTicketRequest>,
) -> Result<ApiResponse<TicketResponse>, ApiError> {
    let ticket = find_ticket(&db, ticket_id).await?;
    let previous = ticket.status;
    let resolved_at = ticket.resolved_at;
    let now = chrono::Utc::now().naive_utc();

    let mut active = ticket.into_active_model();
    if let Some(title) = payload.title {
        require_text("title", &title, "Failed to update ticket")?;
        active.title = Set(title);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(priority) = payload.priority {
        active.priority = Set(priority);
    }
    if let Some(category) = payload.category {
        active.category = Set(category);
    }
    if let Some(assigned_to) = payload.assigned_to {
        active.assigned_to = Set(assigned_to);
    }
    if let Some(location) = payload.location {
        active.location = Set(location);
    }
    if let Some(status) = payload.status {
        active.status = Set(status);
        active.resolved_at = Set(resolution_stamp(resolved_at, status, now));
    }
    active.updated_at = Set(now);

    let ticket = active.update(&db).await?;
    note_resolution(previous, &ticket);
    record_action("tickets", "update_ticket", ticket.id, "Ticket updated");

    Ok(ApiResponse::ok(
        render_ticket(&db, ticket).await?,
        "Ticket updated successfully",
    ))
}

// DELETE /tickets/:id
pub async fn delete_ticket(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath(ticket_id): ApiPath<i32>,
) -> Result<StatusCode, ApiError> {
    let res = ticket::Entity::delete_by_id(ticket_id).exec(&db).await?;
    if res.rows_affected == 0 {
        return Err(ApiError::not_found("Ticket"));
    }
    record_action("tickets", "delete_ticket", ticket_id, "Ticket deleted");
    Ok(deleted())
}

// PUT /tickets/:id/assign
pub async fn assign_ticket(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath(ticket_id): ApiPath<i32>,
    ApiJson(payload): ApiJson<AssignTicketRequest>,
) -> Result<ApiResponse<TicketResponse>, ApiError> {
    let ticket = find_ticket(&db, ticket_id).await?;

    // Assignment always means someone is now working on it
    let mut active = ticket.into_active_model();
    active.assigned_to = Set(Some(payload.assigned_to));
    active.status = Set(TicketStatus::InProgress);
    active.updated_at = Set(chrono::Utc::now().naive_utc());

    let ticket = active.update(&db).await?;
    record_action("tickets", "assign_ticket", ticket.id, "Ticket assigned");

    Ok(ApiResponse::ok(
        render_ticket(&db, ticket).await?,
        "Ticket assigned successfully",
    ))
}

// PUT /tickets/:id/status
pub async fn update_ticket_status(
    Extension(db): Extension<DatabaseConnection>,
    ApiPath(ticket_id): ApiPath<i32>,
    ApiJson(payload): ApiJson<UpdateStatusRequest>,
) -> Result<ApiResponse<TicketResponse>, ApiError> {
    let ticket = find_ticket(&db, ticket_id).await?;
    let previous = ticket.status;
    let now = chrono::Utc::now().naive_utc();

    let mut active: ticket::ActiveModel = ticket.clone().into();
    active.status = Set(payload.status);
    active.resolved_at = Set(resolution_stamp(ticket.resolved_at, payload.status, now));
    active.updated_at = Set(now);

    let ticket = active.update(&db).await?;
    note_resolution(previous, &ticket);
    record_action("tickets", "update_ticket_status", ticket.id, "Ticket status changed");

    Ok(ApiResponse::ok(
        render_ticket(&db, ticket).await?,
        "Ticket status updated successfully",
    ))
}

fn note_resolution(previous: TicketStatus, ticket: &ticket::Model) {
    if !previous.is_terminal() && ticket.status.is_terminal() {
        crate::metrics::ticket_resolved();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_distinguishes_null_from_absent() {
        let payload: UpdateTicketRequest =
            serde_json::from_str(r#"{"assigned_to": null, "priority": "high"}"#).unwrap();
        assert_eq!(payload.assigned_to, Some(None));
        assert_eq!(payload.priority, Some(TicketPriority::High));
        assert_eq!(payload.location, None);
        assert_eq!(payload.title, None);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let parsed = serde_json::from_str::<UpdateStatusRequest>(r#"{"status": "done"}"#);
        assert!(parsed.is_err());
    }
}
