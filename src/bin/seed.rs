use facilities_server::{config, migrator, seed};
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = config::Config::from_env()?;
    facilities_server::telemetry::init_telemetry("facilities-seed", &config)?;

    let reset = std::env::var("SEED_RESET")
        .ok()
        .and_then(|raw| config::parse_flag(&raw))
        .unwrap_or(false);

    let db = Database::connect(&config.database_url).await?;
    migrator::Migrator::up(&db, None).await?;

    let report = seed::seed(&db, reset).await?;
    tracing::info!(
        users = report.users,
        tickets = report.tickets,
        assets = report.assets,
        tools = report.tools,
        staff = report.staff,
        providers = report.providers,
        reset,
        "sample data created"
    );
    Ok(())
}
