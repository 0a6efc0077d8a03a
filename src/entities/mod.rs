pub mod asset;
pub mod provider_activity;
pub mod provider_metric;
pub mod provider_service;
pub mod sea_orm_active_enums;
pub mod service_provider;
pub mod service_schedule;
pub mod staff;
pub mod ticket;
pub mod tool;
pub mod user;

pub use asset::Entity as Asset;
pub use provider_activity::Entity as ProviderActivity;
pub use provider_metric::Entity as ProviderMetric;
pub use provider_service::Entity as ProviderService;
pub use service_provider::Entity as ServiceProvider;
pub use service_schedule::Entity as ServiceSchedule;
pub use staff::Entity as Staff;
pub use ticket::Entity as Ticket;
pub use tool::Entity as Tool;
pub use user::Entity as User;
