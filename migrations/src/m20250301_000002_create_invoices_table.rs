use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250301_000002_create_invoices_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Invoices::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Invoices::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Invoices::TenantId).uuid().not_null())
                    .col(
                        ColumnDef::new(Invoices::InvoiceNumber)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Invoices::CustomerId).uuid().not_null())
                    .col(
                        ColumnDef::new(Invoices::Status)
                            .string_len(16)
                            .not_null()
                            .default("draft"),
                    )
                    .col(
                        ColumnDef::new(Invoices::Subtotal)
                            .decimal()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Invoices::Tax).decimal().not_null())
                    .col(
                        ColumnDef::new(Invoices::Total)
                            .decimal()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Invoices::DueDate).timestamp().not_null())
                    .col(ColumnDef::new(Invoices::PaidDate).timestamp().null())
                    .col(ColumnDef::new(Invoices::Notes).text().null())
                    .col(ColumnDef::new(Invoices::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Invoices::UpdatedAt).timestamp().null())
                    .to_owned(),
            )
            .await?;

        // Numbering correctness leans on this index: concurrent creations for
        // the same tenant and day must collide here, not silently duplicate.
        manager
            .create_index(
                Index::create()
                    .name("uq_invoices_tenant_number")
                    .table(Invoices::Table)
                    .col(Invoices::TenantId)
                    .col(Invoices::InvoiceNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_invoices_tenant_status_due")
                    .table(Invoices::Table)
                    .col(Invoices::TenantId)
                    .col(Invoices::Status)
                    .col(Invoices::DueDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Invoices::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Invoices {
    Table,
    Id,
    TenantId,
    InvoiceNumber,
    CustomerId,
    Status,
    Subtotal,
    Tax,
    Total,
    DueDate,
    PaidDate,
    Notes,
    CreatedAt,
    UpdatedAt,
}
