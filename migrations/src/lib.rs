pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_customers_table;
mod m20250301_000002_create_invoices_table;
mod m20250301_000003_create_suppliers_table;
mod m20250301_000004_create_products_table;
mod m20250301_000005_create_stock_movements_table;
mod m20250301_000006_create_inventory_alerts_table;
mod m20250301_000007_create_hr_tables;
mod m20250301_000008_create_order_reference_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_customers_table::Migration),
            Box::new(m20250301_000002_create_invoices_table::Migration),
            Box::new(m20250301_000003_create_suppliers_table::Migration),
            Box::new(m20250301_000004_create_products_table::Migration),
            Box::new(m20250301_000005_create_stock_movements_table::Migration),
            Box::new(m20250301_000006_create_inventory_alerts_table::Migration),
            Box::new(m20250301_000007_create_hr_tables::Migration),
            Box::new(m20250301_000008_create_order_reference_tables::Migration),
        ]
    }
}
