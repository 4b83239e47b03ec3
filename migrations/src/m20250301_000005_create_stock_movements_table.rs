use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250301_000005_create_stock_movements_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StockMovements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StockMovements::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(StockMovements::TenantId).uuid().not_null())
                    .col(ColumnDef::new(StockMovements::ProductId).uuid().not_null())
                    .col(ColumnDef::new(StockMovements::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(StockMovements::MovementType)
                            .string_len(8)
                            .not_null(),
                    )
                    .col(ColumnDef::new(StockMovements::Quantity).integer().not_null())
                    .col(ColumnDef::new(StockMovements::Reason).string_len(255).null())
                    .col(
                        ColumnDef::new(StockMovements::Reference)
                            .string_len(255)
                            .null(),
                    )
                    .col(ColumnDef::new(StockMovements::Notes).text().null())
                    .col(
                        ColumnDef::new(StockMovements::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_stock_movements_tenant_product")
                    .table(StockMovements::Table)
                    .col(StockMovements::TenantId)
                    .col(StockMovements::ProductId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StockMovements::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum StockMovements {
    Table,
    Id,
    TenantId,
    ProductId,
    UserId,
    MovementType,
    Quantity,
    Reason,
    Reference,
    Notes,
    CreatedAt,
}
