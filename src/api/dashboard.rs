use std::collections::BTreeMap;

use axum::extract::Extension;
use chrono::NaiveDateTime;
use sea_orm::{
    sea_query::Expr, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::Serialize;

use super::response::ApiResponse;
use super::ticket::{render_tickets, TicketResponse};
use super::{usernames, ApiError};
use crate::entities::{
    asset::{self, ItemCondition},
    staff::{self, StaffStatus},
    ticket,
    tool::{self, ToolStatus},
};

pub const RECENT_TICKET_LIMIT: u64 = 10;
/// Entries taken from each source before merging.
pub const FEED_SOURCE_LIMIT: u64 = 5;
pub const FEED_LIMIT: usize = 10;

const UNKNOWN_USER: &str = "Unknown";

#[derive(Debug, Serialize)]
pub struct Overview {
    pub total_tickets: u64,
    /// Assets in any condition except broken.
    pub active_assets: u64,
    pub total_tools: u64,
    /// Staff with status active.
    pub total_staff: u64,
}

/// Only categories with at least one row appear in the maps.
#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub overview: Overview,
    pub ticket_by_status: BTreeMap<String, i64>,
    pub ticket_by_priority: BTreeMap<String, i64>,
    pub asset_by_condition: BTreeMap<String, i64>,
    pub tool_by_status: BTreeMap<String, i64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    TicketCreated,
    ToolCheckout,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActivityEntry {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub description: String,
    pub timestamp: NaiveDateTime,
    pub user: String,
}

/// Interleaves ticket and checkout entries, newest first, capped at
/// [`FEED_LIMIT`]. Equal timestamps keep tickets ahead of checkouts.
pub fn merge_feed(tickets: Vec<ActivityEntry>, checkouts: Vec<ActivityEntry>) -> Vec<ActivityEntry> {
    let mut feed: Vec<ActivityEntry> = tickets.into_iter().chain(checkouts).collect();
    feed.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    feed.truncate(FEED_LIMIT);
    feed
}

/// `SELECT column, COUNT(*) ... GROUP BY column`, keyed by the stored value.
async fn tally<E, C>(db: &C, column: E::Column) -> Result<BTreeMap<String, i64>, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let rows: Vec<(String, i64)> = E::find()
        .select_only()
        .column(column)
        .column_as(Expr::col(column).count(), "count")
        .group_by(column)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows.into_iter().collect())
}

async fn collect_stats(db: &DatabaseConnection) -> Result<DashboardStats, DbErr> {
    let overview = Overview {
        total_tickets: ticket::Entity::find().count(db).await?,
        active_assets: asset::Entity::find()
            .filter(asset::Column::Condition.ne(ItemCondition::Broken))
            .count(db)
            .await?,
        total_tools: tool::Entity::find().count(db).await?,
        total_staff: staff::Entity::find()
            .filter(staff::Column::Status.eq(StaffStatus::Active))
            .count(db)
            .await?,
    };

    Ok(DashboardStats {
        overview,
        ticket_by_status: tally::<ticket::Entity, _>(db, ticket::Column::Status).await?,
        ticket_by_priority: tally::<ticket::Entity, _>(db, ticket::Column::Priority).await?,
        asset_by_condition: tally::<asset::Entity, _>(db, asset::Column::Condition).await?,
        tool_by_status: tally::<tool::Entity, _>(db, tool::Column::Status).await?,
    })
}

async fn collect_feed(db: &DatabaseConnection) -> Result<Vec<ActivityEntry>, DbErr> {
    let tickets = ticket::Entity::find()
        .order_by_desc(ticket::Column::CreatedAt)
        .order_by_desc(ticket::Column::Id)
        .limit(FEED_SOURCE_LIMIT)
        .all(db)
        .await?;

    // NULL checkout stamps would sort first on Postgres, so drop them up front
    let tools = tool::Entity::find()
        .filter(tool::Column::Status.eq(ToolStatus::InUse))
        .filter(tool::Column::CheckedOutAt.is_not_null())
        .order_by_desc(tool::Column::CheckedOutAt)
        .order_by_desc(tool::Column::Id)
        .limit(FEED_SOURCE_LIMIT)
        .all(db)
        .await?;

    let names = usernames(
        db,
        tickets
            .iter()
            .map(|t| Some(t.created_by))
            .chain(tools.iter().map(|t| t.checked_out_to)),
    )
    .await?;
    let user = |id: Option<i32>| {
        id.and_then(|id| names.get(&id).cloned())
            .unwrap_or_else(|| UNKNOWN_USER.to_string())
    };

    let ticket_entries = tickets
        .into_iter()
        .map(|t| ActivityEntry {
            kind: ActivityKind::TicketCreated,
            description: format!("New ticket created: {}", t.title),
            timestamp: t.created_at,
            user: user(Some(t.created_by)),
        })
        .collect();
    let checkout_entries = tools
        .into_iter()
        .filter_map(|t| {
            t.checked_out_at.map(|at| ActivityEntry {
                kind: ActivityKind::ToolCheckout,
                description: format!("Tool checked out: {}", t.tool_name),
                timestamp: at,
                user: user(t.checked_out_to),
            })
        })
        .collect();

    Ok(merge_feed(ticket_entries, checkout_entries))
}

// GET /dashboard/stats
pub async fn get_stats(
    Extension(db): Extension<DatabaseConnection>,
) -> Result<ApiResponse<DashboardStats>, ApiError> {
    let stats = collect_stats(&db)
        .await
        .map_err(|e| ApiError::unexpected("Failed to retrieve dashboard statistics", e))?;
    Ok(ApiResponse::ok(stats, "Dashboard statistics retrieved successfully"))
}

// GET /dashboard/recent-tickets
pub async fn get_recent_tickets(
    Extension(db): Extension<DatabaseConnection>,
) -> Result<ApiResponse<Vec<TicketResponse>>, ApiError> {
    const FAILED: &str = "Failed to retrieve recent tickets";
    let tickets = ticket::Entity::find()
        .order_by_desc(ticket::Column::CreatedAt)
        .order_by_desc(ticket::Column::Id)
        .limit(RECENT_TICKET_LIMIT)
        .all(&db)
        .await
        .map_err(|e| ApiError::unexpected(FAILED, e))?;
    let tickets = render_tickets(&db, tickets)
        .await
        .map_err(|e| ApiError::unexpected(FAILED, e))?;

    let message = format!("Retrieved {} recent tickets", tickets.len());
    Ok(ApiResponse::ok(tickets, message))
}

// GET /dashboard/recent-activities
pub async fn get_recent_activities(
    Extension(db): Extension<DatabaseConnection>,
) -> Result<ApiResponse<Vec<ActivityEntry>>, ApiError> {
    let feed = collect_feed(&db)
        .await
        .map_err(|e| ApiError::unexpected("Failed to retrieve recent activities", e))?;
    let message = format!("Retrieved {} recent activities", feed.len());
    Ok(ApiResponse::ok(feed, message))
}
