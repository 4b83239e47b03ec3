use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250301_000003_create_suppliers_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Suppliers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Suppliers::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Suppliers::TenantId).uuid().not_null())
                    .col(ColumnDef::new(Suppliers::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Suppliers::ContactName)
                            .string_len(255)
                            .null(),
                    )
                    .col(ColumnDef::new(Suppliers::Email).string_len(255).null())
                    .col(ColumnDef::new(Suppliers::Phone).string_len(64).null())
                    .col(ColumnDef::new(Suppliers::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Suppliers::UpdatedAt).timestamp().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_suppliers_tenant_name")
                    .table(Suppliers::Table)
                    .col(Suppliers::TenantId)
                    .col(Suppliers::Name)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Suppliers::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Suppliers {
    Table,
    Id,
    TenantId,
    Name,
    ContactName,
    Email,
    Phone,
    CreatedAt,
    UpdatedAt,
}
