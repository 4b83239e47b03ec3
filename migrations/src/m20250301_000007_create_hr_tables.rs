use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250301_000007_create_hr_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Employees::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Employees::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Employees::TenantId).uuid().not_null())
                    .col(
                        ColumnDef::new(Employees::FirstName)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Employees::LastName)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Employees::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(Employees::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Vacations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Vacations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Vacations::TenantId).uuid().not_null())
                    .col(ColumnDef::new(Vacations::EmployeeId).uuid().not_null())
                    .col(
                        ColumnDef::new(Vacations::VacationType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Vacations::StartDate).date().not_null())
                    .col(ColumnDef::new(Vacations::EndDate).date().not_null())
                    .col(ColumnDef::new(Vacations::Days).integer().not_null())
                    .col(
                        ColumnDef::new(Vacations::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Vacations::Reason).text().null())
                    .col(ColumnDef::new(Vacations::RejectionReason).text().null())
                    .col(ColumnDef::new(Vacations::ApprovedBy).uuid().null())
                    .col(ColumnDef::new(Vacations::ApprovedAt).timestamp().null())
                    .col(ColumnDef::new(Vacations::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_vacations_tenant_employee_status")
                    .table(Vacations::Table)
                    .col(Vacations::TenantId)
                    .col(Vacations::EmployeeId)
                    .col(Vacations::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vacations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Employees::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Employees {
    Table,
    Id,
    TenantId,
    FirstName,
    LastName,
    Status,
    CreatedAt,
}

#[derive(Iden)]
enum Vacations {
    Table,
    Id,
    TenantId,
    EmployeeId,
    VacationType,
    StartDate,
    EndDate,
    Days,
    Status,
    Reason,
    RejectionReason,
    ApprovedBy,
    ApprovedAt,
    CreatedAt,
}
