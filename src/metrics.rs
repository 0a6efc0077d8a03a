use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};

use crate::entities::{
    asset, service_provider, staff, ticket,
    ticket::{TicketPriority, TicketStatus},
    tool::{self, ToolStatus},
    user,
};

/// Seeds the `facilities_*` gauges from the current table sizes.
///
/// Gauges are a startup snapshot plus in-process counters; a failed count is
/// logged and reported as zero rather than blocking startup.
pub async fn init_metrics(db: &DatabaseConnection) {
    let users = count_or_zero("users", user::Entity::find().count(db).await);
    metrics::gauge!("facilities_users_total").set(users as f64);

    let tickets = count_or_zero("tickets", ticket::Entity::find().count(db).await);
    metrics::gauge!("facilities_tickets_total").set(tickets as f64);

    let open_tickets = count_or_zero(
        "open tickets",
        ticket::Entity::find()
            .filter(ticket::Column::Status.is_in([TicketStatus::Open, TicketStatus::InProgress]))
            .count(db)
            .await,
    );
    metrics::gauge!("facilities_open_tickets").set(open_tickets as f64);

    let assets = count_or_zero("assets", asset::Entity::find().count(db).await);
    metrics::gauge!("facilities_assets_total").set(assets as f64);

    let tools = count_or_zero("tools", tool::Entity::find().count(db).await);
    metrics::gauge!("facilities_tools_total").set(tools as f64);

    let tools_in_use = count_or_zero(
        "tools in use",
        tool::Entity::find()
            .filter(tool::Column::Status.eq(ToolStatus::InUse))
            .count(db)
            .await,
    );
    metrics::gauge!("facilities_tools_in_use").set(tools_in_use as f64);

    let staff = count_or_zero("staff", staff::Entity::find().count(db).await);
    metrics::gauge!("facilities_staff_total").set(staff as f64);

    let providers = count_or_zero("providers", service_provider::Entity::find().count(db).await);
    metrics::gauge!("facilities_service_providers_total").set(providers as f64);

    tracing::info!(
        "Initialized metrics: Users={}, Tickets={}, Assets={}, Tools={}, Staff={}, Providers={}",
        users,
        tickets,
        assets,
        tools,
        staff,
        providers
    );
}

fn count_or_zero(what: &str, counted: Result<u64, sea_orm::DbErr>) -> u64 {
    counted.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to count {}", what);
        0
    })
}

pub fn ticket_created(priority: TicketPriority) {
    let priority = match priority {
        TicketPriority::Low => "low",
        TicketPriority::Medium => "medium",
        TicketPriority::High => "high",
    };
    metrics::counter!("facilities_tickets_created_total", "priority" => priority).increment(1);
    metrics::gauge!("facilities_tickets_total").increment(1.0);
    metrics::gauge!("facilities_open_tickets").increment(1.0);
}

pub fn ticket_resolved() {
    metrics::counter!("facilities_tickets_resolved_total").increment(1);
    metrics::gauge!("facilities_open_tickets").decrement(1.0);
}

pub fn tool_checked_out() {
    metrics::counter!("facilities_tool_checkouts_total").increment(1);
    metrics::gauge!("facilities_tools_in_use").increment(1.0);
}

pub fn tool_checked_in() {
    metrics::counter!("facilities_tool_checkins_total").increment(1);
    metrics::gauge!("facilities_tools_in_use").decrement(1.0);
}
