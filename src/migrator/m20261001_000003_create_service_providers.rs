use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceProviders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ServiceProviders::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ServiceProviders::Name).string_len(100).not_null())
                    .col(
                        ColumnDef::new(ServiceProviders::Code)
                            .string_len(20)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ServiceProviders::Tagline).string_len(200))
                    .col(ColumnDef::new(ServiceProviders::Description).text())
                    .col(ColumnDef::new(ServiceProviders::Icon).string_len(50))
                    .col(ColumnDef::new(ServiceProviders::ContactPhone).string_len(20))
                    .col(ColumnDef::new(ServiceProviders::ContactEmail).string_len(100))
                    .col(ColumnDef::new(ServiceProviders::OperatingHours).string_len(100))
                    .col(
                        ColumnDef::new(ServiceProviders::Status)
                            .string_len(20)
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(ServiceProviders::CreatedAt).date_time().not_null())
                    .col(ColumnDef::new(ServiceProviders::UpdatedAt).date_time().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProviderServices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProviderServices::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProviderServices::ProviderId).integer().not_null())
                    .col(ColumnDef::new(ProviderServices::Name).string_len(100).not_null())
                    .col(ColumnDef::new(ProviderServices::Description).text())
                    .col(
                        ColumnDef::new(ProviderServices::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(ProviderServices::CreatedAt).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_provider_services_provider")
                            .from(ProviderServices::Table, ProviderServices::ProviderId)
                            .to(ServiceProviders::Table, ServiceProviders::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProviderMetrics::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProviderMetrics::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProviderMetrics::ProviderId).integer().not_null())
                    .col(ColumnDef::new(ProviderMetrics::MetricName).string_len(100).not_null())
                    .col(ColumnDef::new(ProviderMetrics::MetricValue).string_len(50).not_null())
                    .col(
                        ColumnDef::new(ProviderMetrics::MetricType)
                            .string_len(20)
                            .not_null()
                            .default("text"),
                    )
                    .col(
                        ColumnDef::new(ProviderMetrics::DisplayOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ProviderMetrics::UpdatedAt).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_provider_metrics_provider")
                            .from(ProviderMetrics::Table, ProviderMetrics::ProviderId)
                            .to(ServiceProviders::Table, ServiceProviders::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProviderActivities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProviderActivities::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProviderActivities::ProviderId).integer().not_null())
                    .col(
                        ColumnDef::new(ProviderActivities::ActivityType)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProviderActivities::Description)
                            .string_len(200)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProviderActivities::ActivityDate)
                            .date_time()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ProviderActivities::CreatedAt).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_provider_activities_provider")
                            .from(ProviderActivities::Table, ProviderActivities::ProviderId)
                            .to(ServiceProviders::Table, ServiceProviders::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ServiceSchedules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ServiceSchedules::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ServiceSchedules::ProviderId).integer().not_null())
                    .col(ColumnDef::new(ServiceSchedules::ServiceId).integer().not_null())
                    .col(
                        ColumnDef::new(ServiceSchedules::ScheduledDate)
                            .date_time()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ServiceSchedules::ScheduledTime).time().not_null())
                    .col(ColumnDef::new(ServiceSchedules::SpecialRequirements).text())
                    .col(
                        ColumnDef::new(ServiceSchedules::Status)
                            .string_len(20)
                            .not_null()
                            .default("scheduled"),
                    )
                    .col(ColumnDef::new(ServiceSchedules::RequestedBy).integer())
                    .col(ColumnDef::new(ServiceSchedules::CreatedAt).date_time().not_null())
                    .col(ColumnDef::new(ServiceSchedules::UpdatedAt).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_schedules_provider")
                            .from(ServiceSchedules::Table, ServiceSchedules::ProviderId)
                            .to(ServiceProviders::Table, ServiceProviders::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_schedules_service")
                            .from(ServiceSchedules::Table, ServiceSchedules::ServiceId)
                            .to(ProviderServices::Table, ProviderServices::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Child lookups always go through the owning provider
        manager
            .create_index(
                Index::create()
                    .name("idx_provider_services_provider_id")
                    .table(ProviderServices::Table)
                    .col(ProviderServices::ProviderId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_provider_metrics_provider_id")
                    .table(ProviderMetrics::Table)
                    .col(ProviderMetrics::ProviderId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_provider_activities_provider_id")
                    .table(ProviderActivities::Table)
                    .col(ProviderActivities::ProviderId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_service_schedules_provider_id")
                    .table(ServiceSchedules::Table)
                    .col(ServiceSchedules::ProviderId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ServiceSchedules::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProviderActivities::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProviderMetrics::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProviderServices::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ServiceProviders::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ServiceProviders {
    Table,
    Id,
    Name,
    Code,
    Tagline,
    Description,
    Icon,
    ContactPhone,
    ContactEmail,
    OperatingHours,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ProviderServices {
    Table,
    Id,
    ProviderId,
    Name,
    Description,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ProviderMetrics {
    Table,
    Id,
    ProviderId,
    MetricName,
    MetricValue,
    MetricType,
    DisplayOrder,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ProviderActivities {
    Table,
    Id,
    ProviderId,
    ActivityType,
    Description,
    ActivityDate,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ServiceSchedules {
    Table,
    Id,
    ProviderId,
    ServiceId,
    ScheduledDate,
    ScheduledTime,
    SpecialRequirements,
    Status,
    RequestedBy,
    CreatedAt,
    UpdatedAt,
}
