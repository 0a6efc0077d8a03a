use axum::{http::HeaderValue, routing::get};
use facilities_server::{api, config::Config, migrator};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env if present (dotenvy)
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    facilities_server::telemetry::init_telemetry("facilities-server", &config)?;

    let (prometheus_layer, metric_handle): (_, PrometheusHandle) =
        axum_prometheus::PrometheusMetricLayer::pair();

    let mut options = ConnectOptions::new(config.database_url.clone());
    options.sqlx_logging(false);
    let db = Database::connect(options).await?;

    if config.run_migrations {
        migrator::Migrator::up(&db, None).await?;
        tracing::info!("migrations applied");
    }

    facilities_server::metrics::init_metrics(&db).await;

    let cors = tower_http::cors::CorsLayer::new()
        .allow_origin(config.cors_origin.parse::<HeaderValue>()?)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
        ])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let app = api::router(db)
        .layer(prometheus_layer)
        .layer(cors)
        .route("/metrics", get(|| async move { metric_handle.render() }));

    tracing::info!("listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
