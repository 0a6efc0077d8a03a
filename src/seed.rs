//! Sample facility data for demos and local development.

use chrono::{Duration, NaiveDate};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, Set,
    TransactionTrait,
};

use crate::entities::{
    asset::{self, ItemCondition},
    provider_activity,
    provider_metric::{self, MetricType},
    provider_service,
    service_provider::{self, ProviderStatus},
    service_schedule,
    staff::{self, StaffStatus},
    ticket::{self, TicketPriority, TicketStatus},
    tool::{self, ToolStatus},
    user::{self, UserRole},
};

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("database already contains users; set SEED_RESET=true to wipe it first")]
    AlreadySeeded,
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Row counts written by one seeding run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub tickets: usize,
    pub assets: usize,
    pub tools: usize,
    pub staff: usize,
    pub providers: usize,
}

struct ProviderSeed {
    name: &'static str,
    code: &'static str,
    tagline: &'static str,
    description: &'static str,
    icon: &'static str,
    contact_phone: &'static str,
    contact_email: &'static str,
    operating_hours: &'static str,
    services: [&'static str; 4],
    metrics: [(&'static str, &'static str, MetricType); 4],
    activities: [(&'static str, &'static str); 4],
}

const PROVIDERS: [ProviderSeed; 5] = [
    ProviderSeed {
        name: "STORES & INFRASTRUCTURE",
        code: "stores",
        tagline: "Precision Management | ISO 41001 Excellence",
        description: "Comprehensive asset management and infrastructure oversight for the campus facilities.",
        icon: "fas fa-warehouse",
        contact_phone: "+27 31 123 4567",
        contact_email: "stores@facilitiespro.com",
        operating_hours: "Mon-Fri: 8:00 AM - 5:00 PM",
        services: [
            "Asset Register Management",
            "Work Order Processing",
            "Inventory Control",
            "Compliance Monitoring",
        ],
        metrics: [
            ("Assets Under Management", "428", MetricType::Number),
            ("Inventory Accuracy", "97.3%", MetricType::Percentage),
            ("Active Work Orders", "12", MetricType::Number),
            ("Compliance Score", "100%", MetricType::Percentage),
        ],
        activities: [
            ("task_completed", "Asset PROJ-001 registered and tagged"),
            ("task_completed", "Work order #WO-2025-001 completed"),
            ("audit_completed", "Monthly inventory audit completed"),
            ("compliance_check", "ISO 41001 compliance review passed"),
        ],
    },
    ProviderSeed {
        name: "LEITCH LANDSCAPE",
        code: "leitch",
        tagline: "Commercial Landscaping Services",
        description: "Professional landscaping and grounds maintenance services for corporate facilities.",
        icon: "fas fa-tree",
        contact_phone: "+27 31 234 5678",
        contact_email: "info@leitchlandscape.co.za",
        operating_hours: "Mon-Fri: 7:00 AM - 4:00 PM",
        services: [
            "Landscape Design & Installation",
            "Grounds Maintenance",
            "Irrigation Systems",
            "Seasonal Plantings",
        ],
        metrics: [
            ("Hours This Week", "24", MetricType::Number),
            ("Tasks Completed", "9", MetricType::Number),
            ("Active Projects", "3", MetricType::Number),
            ("Client Satisfaction", "98%", MetricType::Percentage),
        ],
        activities: [
            ("maintenance", "Completed weekly lawn maintenance"),
            ("installation", "Installed new irrigation system - Block A"),
            ("preparation", "Seasonal flower bed preparation"),
            ("assessment", "Tree pruning and health assessment"),
        ],
    },
    ProviderSeed {
        name: "SABELIWE GARDEN",
        code: "sabeliwe",
        tagline: "Garden & Property Maintenance",
        description: "Specialized garden maintenance and property care services.",
        icon: "fas fa-leaf",
        contact_phone: "+27 31 345 6789",
        contact_email: "contact@sabeliwegarden.co.za",
        operating_hours: "Mon-Fri: 7:30 AM - 4:30 PM",
        services: [
            "Garden Maintenance",
            "Plant Care & Nurturing",
            "Pest Control",
            "Seasonal Garden Planning",
        ],
        metrics: [
            ("Hours This Week", "18", MetricType::Number),
            ("Tasks Completed", "7", MetricType::Number),
            ("Active Projects", "2", MetricType::Number),
            ("Garden Health Score", "95%", MetricType::Percentage),
        ],
        activities: [
            ("maintenance", "Completed rose garden pruning"),
            ("treatment", "Applied organic fertilizer treatment"),
            ("inspection", "Pest control inspection passed"),
            ("installation", "New herb garden installation started"),
        ],
    },
    ProviderSeed {
        name: "CSG FOODS",
        code: "csg",
        tagline: "Canteen & Catering Services",
        description: "Professional food service and catering for corporate dining facilities.",
        icon: "fas fa-utensils",
        contact_phone: "+27 31 456 7890",
        contact_email: "catering@csgfoods.co.za",
        operating_hours: "Mon-Fri: 6:00 AM - 6:00 PM",
        services: [
            "Daily Meal Service",
            "Special Event Catering",
            "Menu Planning",
            "Food Safety Compliance",
        ],
        metrics: [
            ("Meals Served Today", "342", MetricType::Number),
            ("Customer Satisfaction", "94%", MetricType::Percentage),
            ("Special Events", "2", MetricType::Number),
            ("Food Safety Score", "100%", MetricType::Percentage),
        ],
        activities: [
            ("service", "Served 342 meals today"),
            ("catering", "Catered executive board meeting"),
            ("planning", "Weekly menu planning completed"),
            ("audit", "Food safety audit passed with excellence"),
        ],
    },
    ProviderSeed {
        name: "LIVCLEAN",
        code: "livclean",
        tagline: "Cleaning & Sanitation Services",
        description: "Professional cleaning and sanitation services for corporate facilities.",
        icon: "fas fa-broom",
        contact_phone: "+27 31 567 8901",
        contact_email: "services@livclean.co.za",
        operating_hours: "Mon-Fri: 6:00 AM - 10:00 PM",
        services: [
            "Daily Office Cleaning",
            "Deep Sanitization",
            "Restroom Maintenance",
            "Waste Management",
        ],
        metrics: [
            ("Areas Completed", "98%", MetricType::Percentage),
            ("Quality Score", "4.8/5", MetricType::Text),
            ("Special Requests", "2", MetricType::Number),
            ("Compliance Rate", "100%", MetricType::Percentage),
        ],
        activities: [
            ("cleaning", "Completed daily office cleaning rounds"),
            ("sanitization", "Deep sanitization of conference rooms"),
            ("maintenance", "Restroom supplies restocked"),
            ("inspection", "Quality inspection passed - all areas"),
        ],
    },
];

/// Hours before "now" for each seeded activity, newest first.
const ACTIVITY_AGE_HOURS: [i64; 4] = [2, 5, 11, 20];

/// Writes the sample data set in a single transaction.
///
/// Refuses to run against a database that already has users unless `reset`
/// is set, in which case every table is emptied first.
pub async fn seed(db: &DatabaseConnection, reset: bool) -> Result<SeedReport, SeedError> {
    let txn = db.begin().await?;

    if reset {
        clear(&txn).await?;
    } else if user::Entity::find().count(&txn).await? > 0 {
        return Err(SeedError::AlreadySeeded);
    }

    let mut report = SeedReport::default();
    let now = chrono::Utc::now().naive_utc();

    let new_user = |username: &str, email: &str, role: UserRole, full_name: &str, department: &str| {
        user::ActiveModel {
            username: Set(username.to_string()),
            email: Set(email.to_string()),
            role: Set(role),
            full_name: Set(Some(full_name.to_string())),
            department: Set(Some(department.to_string())),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
    };
    let admin = new_user("admin", "admin@facilitiespro.com", UserRole::Admin, "Site Administrator", "Facilities")
        .insert(&txn)
        .await?;
    let manager = new_user("sifiso.shezi", "sifiso@facilitiespro.com", UserRole::Manager, "Sifiso Shezi", "Facilities")
        .insert(&txn)
        .await?;
    let technician = new_user("john.doe", "john@facilitiespro.com", UserRole::Technician, "John Doe", "Maintenance")
        .insert(&txn)
        .await?;
    report.users = 3;
    tracing::debug!(admin = admin.id, manager = manager.id, technician = technician.id, "seeded users");

    ticket::ActiveModel {
        title: Set("Air conditioning not working in Conference Room A".to_string()),
        description: Set(Some("The AC unit is not cooling properly".to_string())),
        priority: Set(TicketPriority::High),
        status: Set(TicketStatus::Open),
        category: Set(Some("HVAC".to_string())),
        assigned_to: Set(None),
        created_by: Set(manager.id),
        location: Set(Some("Conference Room A".to_string())),
        created_at: Set(now),
        updated_at: Set(now),
        resolved_at: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    ticket::ActiveModel {
        title: Set("Broken light fixture in hallway".to_string()),
        description: Set(Some("Fluorescent light is flickering".to_string())),
        priority: Set(TicketPriority::Medium),
        status: Set(TicketStatus::InProgress),
        category: Set(Some("Electrical".to_string())),
        assigned_to: Set(Some(technician.id)),
        created_by: Set(manager.id),
        location: Set(Some("Main Hallway".to_string())),
        created_at: Set(now),
        updated_at: Set(now),
        resolved_at: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    report.tickets = 2;

    let assets = [
        (
            "AC-001",
            "Conference Room A Air Conditioner",
            "Central AC unit for conference room",
            "HVAC",
            ItemCondition::Fair,
            NaiveDate::from_ymd_opt(2020, 1, 15),
        ),
        (
            "PROJ-001",
            "Conference Room Projector",
            "HD projector for presentations",
            "Electronics",
            ItemCondition::Good,
            NaiveDate::from_ymd_opt(2022, 6, 10),
        ),
    ];
    for (tag, name, description, category, condition, purchased) in assets {
        asset::ActiveModel {
            asset_tag: Set(tag.to_string()),
            name: Set(name.to_string()),
            description: Set(Some(description.to_string())),
            category: Set(Some(category.to_string())),
            location: Set(Some("Conference Room A".to_string())),
            condition: Set(condition),
            purchase_date: Set(purchased),
            warranty_expiry: Set(None),
            assigned_to: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        report.assets += 1;
    }

    tool::ActiveModel {
        tool_name: Set("Cordless Drill".to_string()),
        tool_category: Set(Some("Power Tools".to_string())),
        serial_number: Set(Some("CD-001".to_string())),
        condition: Set(ItemCondition::Good),
        status: Set(ToolStatus::Available),
        location: Set(Some("Tool Storage".to_string())),
        checked_out_to: Set(None),
        checked_out_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    tool::ActiveModel {
        tool_name: Set("Multimeter".to_string()),
        tool_category: Set(Some("Electrical".to_string())),
        serial_number: Set(Some("MM-001".to_string())),
        condition: Set(ItemCondition::Good),
        status: Set(ToolStatus::InUse),
        location: Set(Some("With Technician".to_string())),
        checked_out_to: Set(Some(technician.id)),
        checked_out_at: Set(Some(now)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    report.tools = 2;

    let members = [
        ("EMP-001", "Sifiso Shezi", "Facilities", "Facilities Manager", "sifiso@facilitiespro.com", "+27-11-123-4567"),
        ("EMP-002", "John Doe", "Maintenance", "Maintenance Technician", "john@facilitiespro.com", "+27-11-123-4568"),
    ];
    for (employee_id, name, department, position, email, phone) in members {
        staff::ActiveModel {
            employee_id: Set(employee_id.to_string()),
            name: Set(name.to_string()),
            department: Set(Some(department.to_string())),
            position: Set(Some(position.to_string())),
            email: Set(Some(email.to_string())),
            phone: Set(Some(phone.to_string())),
            status: Set(StaffStatus::Active),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        report.staff += 1;
    }

    for entry in &PROVIDERS {
        let provider = service_provider::ActiveModel {
            name: Set(entry.name.to_string()),
            code: Set(entry.code.to_string()),
            tagline: Set(Some(entry.tagline.to_string())),
            description: Set(Some(entry.description.to_string())),
            icon: Set(Some(entry.icon.to_string())),
            contact_phone: Set(Some(entry.contact_phone.to_string())),
            contact_email: Set(Some(entry.contact_email.to_string())),
            operating_hours: Set(Some(entry.operating_hours.to_string())),
            status: Set(ProviderStatus::Active),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        for service in entry.services {
            provider_service::ActiveModel {
                provider_id: Set(provider.id),
                name: Set(service.to_string()),
                description: Set(Some(format!("{service} provided by {}", provider.name))),
                is_active: Set(true),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        for (order, (name, value, metric_type)) in (1..).zip(entry.metrics) {
            provider_metric::ActiveModel {
                provider_id: Set(provider.id),
                metric_name: Set(name.to_string()),
                metric_value: Set(value.to_string()),
                metric_type: Set(metric_type),
                display_order: Set(order),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        for ((activity_type, description), age) in entry.activities.into_iter().zip(ACTIVITY_AGE_HOURS) {
            provider_activity::ActiveModel {
                provider_id: Set(provider.id),
                activity_type: Set(activity_type.to_string()),
                description: Set(description.to_string()),
                activity_date: Set(now - Duration::hours(age)),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }
        report.providers += 1;
    }

    txn.commit().await?;
    Ok(report)
}

/// Empties every table, children before parents.
async fn clear<C>(db: &C) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    service_schedule::Entity::delete_many().exec(db).await?;
    provider_activity::Entity::delete_many().exec(db).await?;
    provider_metric::Entity::delete_many().exec(db).await?;
    provider_service::Entity::delete_many().exec(db).await?;
    service_provider::Entity::delete_many().exec(db).await?;
    tool::Entity::delete_many().exec(db).await?;
    ticket::Entity::delete_many().exec(db).await?;
    asset::Entity::delete_many().exec(db).await?;
    staff::Entity::delete_many().exec(db).await?;
    user::Entity::delete_many().exec(db).await?;
    Ok(())
}
