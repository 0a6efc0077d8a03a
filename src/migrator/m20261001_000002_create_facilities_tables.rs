use sea_orm_migration::prelude::*;

/// Tickets, assets, tools and staff. User references are plain integer
/// columns: deleting a user leaves the rows that point at it untouched.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create Tickets Table
        manager
            .create_table(
                Table::create()
                    .table(Tickets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tickets::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tickets::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Tickets::Description).text())
                    .col(
                        ColumnDef::new(Tickets::Priority)
                            .string_len(20)
                            .not_null()
                            .default("medium"),
                    )
                    .col(
                        ColumnDef::new(Tickets::Status)
                            .string_len(20)
                            .not_null()
                            .default("open"),
                    )
                    .col(ColumnDef::new(Tickets::Category).string_len(50))
                    .col(ColumnDef::new(Tickets::AssignedTo).integer())
                    .col(ColumnDef::new(Tickets::CreatedBy).integer().not_null())
                    .col(ColumnDef::new(Tickets::Location).string_len(100))
                    .col(ColumnDef::new(Tickets::CreatedAt).date_time().not_null())
                    .col(ColumnDef::new(Tickets::UpdatedAt).date_time().not_null())
                    .col(ColumnDef::new(Tickets::ResolvedAt).date_time())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tickets_status")
                    .table(Tickets::Table)
                    .col(Tickets::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tickets_assigned_to")
                    .table(Tickets::Table)
                    .col(Tickets::AssignedTo)
                    .to_owned(),
            )
            .await?;

        // Create Assets Table
        manager
            .create_table(
                Table::create()
                    .table(Assets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Assets::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Assets::AssetTag)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Assets::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Assets::Description).text())
                    .col(ColumnDef::new(Assets::Category).string_len(50))
                    .col(ColumnDef::new(Assets::Location).string_len(100))
                    .col(
                        ColumnDef::new(Assets::Condition)
                            .string_len(20)
                            .not_null()
                            .default("good"),
                    )
                    .col(ColumnDef::new(Assets::PurchaseDate).date())
                    .col(ColumnDef::new(Assets::WarrantyExpiry).date())
                    .col(ColumnDef::new(Assets::AssignedTo).integer())
                    .col(ColumnDef::new(Assets::CreatedAt).date_time().not_null())
                    .col(ColumnDef::new(Assets::UpdatedAt).date_time().not_null())
                    .to_owned(),
            )
            .await?;

        // Create Tools Table
        manager
            .create_table(
                Table::create()
                    .table(Tools::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tools::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tools::ToolName).string_len(200).not_null())
                    .col(ColumnDef::new(Tools::ToolCategory).string_len(50))
                    .col(ColumnDef::new(Tools::SerialNumber).string_len(100).unique_key())
                    .col(
                        ColumnDef::new(Tools::Condition)
                            .string_len(20)
                            .not_null()
                            .default("good"),
                    )
                    .col(
                        ColumnDef::new(Tools::Status)
                            .string_len(20)
                            .not_null()
                            .default("available"),
                    )
                    .col(ColumnDef::new(Tools::Location).string_len(100))
                    .col(ColumnDef::new(Tools::CheckedOutTo).integer())
                    .col(ColumnDef::new(Tools::CheckedOutAt).date_time())
                    .col(ColumnDef::new(Tools::CreatedAt).date_time().not_null())
                    .col(ColumnDef::new(Tools::UpdatedAt).date_time().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tools_status")
                    .table(Tools::Table)
                    .col(Tools::Status)
                    .to_owned(),
            )
            .await?;

        // Create Staff Table
        manager
            .create_table(
                Table::create()
                    .table(Staff::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Staff::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Staff::EmployeeId)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Staff::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Staff::Department).string_len(100))
                    .col(ColumnDef::new(Staff::Position).string_len(100))
                    .col(ColumnDef::new(Staff::Email).string_len(120))
                    .col(ColumnDef::new(Staff::Phone).string_len(20))
                    .col(
                        ColumnDef::new(Staff::Status)
                            .string_len(20)
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(Staff::CreatedAt).date_time().not_null())
                    .col(ColumnDef::new(Staff::UpdatedAt).date_time().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Staff::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tools::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Assets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tickets::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Tickets {
    Table,
    Id,
    Title,
    Description,
    Priority,
    Status,
    Category,
    AssignedTo,
    CreatedBy,
    Location,
    CreatedAt,
    UpdatedAt,
    ResolvedAt,
}

#[derive(DeriveIden)]
enum Assets {
    Table,
    Id,
    AssetTag,
    Name,
    Description,
    Category,
    Location,
    Condition,
    PurchaseDate,
    WarrantyExpiry,
    AssignedTo,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Tools {
    Table,
    Id,
    ToolName,
    ToolCategory,
    SerialNumber,
    Condition,
    Status,
    Location,
    CheckedOutTo,
    CheckedOutAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Staff {
    Table,
    Id,
    EmployeeId,
    Name,
    Department,
    Position,
    Email,
    Phone,
    Status,
    CreatedAt,
    UpdatedAt,
}
