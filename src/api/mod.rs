use std::collections::{BTreeSet, HashMap};

use axum::{
    routing::{get, post, put},
    Extension, Router,
};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, IdenStatic,
    PaginatorTrait, QueryFilter, QuerySelect, QueryTrait,
};

use crate::entities::user;

pub mod asset;
pub mod dashboard;
pub mod error;
pub mod extract;
pub mod provider_children;
pub mod response;
pub mod service_provider;
pub mod staff;
pub mod ticket;
pub mod tool;
pub mod user_directory;

pub use error::ApiError;

async fn health_check() -> &'static str {
    "OK"
}

/// Every resource route, without process-level layers (metrics, CORS).
pub fn routes() -> Router {
    Router::new()
        .route("/tickets", get(ticket::list_tickets).post(ticket::create_ticket))
        .route(
            "/tickets/:id",
            get(ticket::get_ticket)
                .put(ticket::update_ticket)
                .delete(ticket::delete_ticket),
        )
        .route("/tickets/:id/assign", put(ticket::assign_ticket))
        .route("/tickets/:id/status", put(ticket::update_ticket_status))
        .route("/assets", get(asset::list_assets).post(asset::create_asset))
        .route("/assets/scan/:barcode", get(asset::scan_asset))
        .route(
            "/assets/:id",
            get(asset::get_asset)
                .put(asset::update_asset)
                .delete(asset::delete_asset),
        )
        .route("/tools", get(tool::list_tools).post(tool::create_tool))
        .route(
            "/tools/:id",
            get(tool::get_tool)
                .put(tool::update_tool)
                .delete(tool::delete_tool),
        )
        .route("/tools/:id/checkout", post(tool::checkout_tool))
        .route("/tools/:id/checkin", post(tool::checkin_tool))
        .route("/staff", get(staff::list_staff).post(staff::create_staff))
        .route(
            "/staff/:id",
            get(staff::get_staff_member)
                .put(staff::update_staff)
                .delete(staff::delete_staff),
        )
        .route(
            "/service_providers",
            get(service_provider::list_providers).post(service_provider::create_provider),
        )
        .route(
            "/service_providers/:id",
            get(service_provider::get_provider)
                .put(service_provider::update_provider)
                .delete(service_provider::delete_provider),
        )
        .route(
            "/service_providers/:id/services",
            get(provider_children::list_services).post(provider_children::create_service),
        )
        .route(
            "/service_providers/:id/services/:child_id",
            get(provider_children::get_service)
                .put(provider_children::update_service)
                .delete(provider_children::delete_service),
        )
        .route(
            "/service_providers/:id/metrics",
            get(provider_children::list_metrics).post(provider_children::create_metric),
        )
        .route(
            "/service_providers/:id/metrics/:child_id",
            get(provider_children::get_metric)
                .put(provider_children::update_metric)
                .delete(provider_children::delete_metric),
        )
        .route(
            "/service_providers/:id/activities",
            get(provider_children::list_activities).post(provider_children::create_activity),
        )
        .route(
            "/service_providers/:id/activities/:child_id",
            get(provider_children::get_activity)
                .put(provider_children::update_activity)
                .delete(provider_children::delete_activity),
        )
        .route(
            "/service_providers/:id/schedules",
            get(provider_children::list_schedules).post(provider_children::create_schedule),
        )
        .route(
            "/service_providers/:id/schedules/:child_id",
            get(provider_children::get_schedule)
                .put(provider_children::update_schedule)
                .delete(provider_children::delete_schedule),
        )
        .route("/dashboard/stats", get(dashboard::get_stats))
        .route("/dashboard/recent-tickets", get(dashboard::get_recent_tickets))
        .route(
            "/dashboard/recent-activities",
            get(dashboard::get_recent_activities),
        )
        .route(
            "/users",
            get(user_directory::list_users).post(user_directory::create_user),
        )
        .route(
            "/users/:id",
            get(user_directory::get_user)
                .put(user_directory::update_user)
                .delete(user_directory::delete_user),
        )
        .route("/users/:id/assignments", get(user_directory::get_assignments))
}

/// The application router: resource routes served both at the root and
/// under `/api`, with the database handle and per-request tracing attached.
pub fn router(db: DatabaseConnection) -> Router {
    let routes = routes();

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", routes.clone())
        .merge(routes)
        .layer(Extension(db))
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<axum::body::Body>| {
                    let matched_path = request
                        .extensions()
                        .get::<axum::extract::MatchedPath>()
                        .map(|matched| matched.as_str());

                    // "METHOD /path" (e.g. "POST /tools/:id/checkout")
                    let span_name = if let Some(path) = matched_path {
                        format!("{} {}", request.method(), path)
                    } else {
                        format!("{} {}", request.method(), request.uri().path())
                    };

                    tracing::info_span!(
                        "request",
                        "otel.name" = span_name,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        // Filled in by handlers
                        table = tracing::field::Empty,
                        action = tracing::field::Empty,
                        record_id = tracing::field::Empty,
                        business_event = tracing::field::Empty,
                        error = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency = tracing::field::Empty,
                    )
                })
                .on_request(|_request: &axum::http::Request<axum::body::Body>, _span: &tracing::Span| {})
                .on_response(
                    |response: &axum::http::Response<_>, latency: std::time::Duration, span: &tracing::Span| {
                        span.record("status", tracing::field::display(response.status()));
                        span.record("latency", tracing::field::debug(latency));
                        tracing::info!("request completed");
                    },
                ),
        )
}

/// Tags the current request span with what the handler did.
pub(crate) fn record_action(table: &str, action: &str, record_id: i32, business_event: &str) {
    tracing::Span::current()
        .record("table", table)
        .record("action", action)
        .record("record_id", record_id)
        .record("business_event", business_event);
}

/// Resolves user ids to usernames with a single query.
///
/// Missing users are simply absent from the map, so callers render their
/// display name as null.
pub(crate) async fn usernames<C>(
    db: &C,
    ids: impl IntoIterator<Item = Option<i32>>,
) -> Result<HashMap<i32, String>, DbErr>
where
    C: ConnectionTrait,
{
    let ids: BTreeSet<i32> = ids.into_iter().flatten().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(i32, String)> = user::Entity::find()
        .select_only()
        .column(user::Column::Id)
        .column(user::Column::Username)
        .filter(user::Column::Id.is_in(ids))
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows.into_iter().collect())
}

/// Fails with a validation error when another row already holds `value` in
/// `column`. `except` skips the row being updated.
pub(crate) async fn ensure_unique<E, C>(
    db: &C,
    column: E::Column,
    id_column: E::Column,
    value: &str,
    except: Option<i32>,
    message: &str,
) -> Result<(), ApiError>
where
    E: EntityTrait,
    E::Model: Sync,
    C: ConnectionTrait,
{
    let taken = E::find()
        .filter(column.eq(value))
        .apply_if(except, |query, id| query.filter(id_column.ne(id)))
        .count(db)
        .await?;

    if taken > 0 {
        return Err(ApiError::validation(
            message,
            format!("{} already exists", column.as_str()),
        ));
    }
    Ok(())
}
