pub mod api;
pub mod config;
pub mod entities;
pub mod metrics;
pub mod migrator;
pub mod seed;
pub mod telemetry;

pub use sea_orm;
