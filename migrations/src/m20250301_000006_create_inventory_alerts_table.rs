use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250301_000006_create_inventory_alerts_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(InventoryAlerts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InventoryAlerts::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(InventoryAlerts::TenantId).uuid().not_null())
                    .col(ColumnDef::new(InventoryAlerts::ProductId).uuid().not_null())
                    .col(
                        ColumnDef::new(InventoryAlerts::AlertType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryAlerts::Message)
                            .string_len(512)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryAlerts::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(InventoryAlerts::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_inventory_alerts_tenant_active")
                    .table(InventoryAlerts::Table)
                    .col(InventoryAlerts::TenantId)
                    .col(InventoryAlerts::IsActive)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InventoryAlerts::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum InventoryAlerts {
    Table,
    Id,
    TenantId,
    ProductId,
    AlertType,
    Message,
    IsActive,
    CreatedAt,
}
