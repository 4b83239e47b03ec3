//! Shared harness for integration tests: a throwaway SQLite database with
//! the full schema applied, plus seed helpers for the entities services
//! only read.

use chrono::Utc;
use migrations::Migrator;
use opsledger::{
    entities::{customer, employee, order_item, product, purchase_order},
    events::{process_events, Event, EventSender},
    services::AppServices,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc;
use uuid::Uuid;

pub struct TestApp {
    pub db: Arc<DatabaseConnection>,
    pub services: AppServices,
    // Dropped last so the database file outlives every connection.
    _tmp: TempDir,
}

pub async fn spawn_app() -> TestApp {
    let tmp = tempfile::tempdir().unwrap();
    let db_path = tmp.path().join("opsledger-test.sqlite");
    let url = format!("sqlite://{}?mode=rwc", db_path.display());

    let db = Database::connect(&url).await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    let (tx, rx) = mpsc::channel::<Event>(64);
    tokio::spawn(process_events(rx));

    let db = Arc::new(db);
    let services = AppServices::new(db.clone(), EventSender::new(tx));

    TestApp {
        db,
        services,
        _tmp: tmp,
    }
}

#[allow(dead_code)]
pub async fn seed_customer(db: &DatabaseConnection, tenant_id: Uuid, active: bool) -> Uuid {
    let id = Uuid::new_v4();
    customer::ActiveModel {
        id: Set(id),
        tenant_id: Set(tenant_id),
        name: Set("Acme GmbH".to_string()),
        email: Set(Some("billing@acme.test".to_string())),
        phone: Set(None),
        is_active: Set(active),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .unwrap();
    id
}

#[allow(dead_code)]
pub async fn seed_employee(db: &DatabaseConnection, tenant_id: Uuid, status: &str) -> Uuid {
    let id = Uuid::new_v4();
    employee::ActiveModel {
        id: Set(id),
        tenant_id: Set(tenant_id),
        first_name: Set("Jo".to_string()),
        last_name: Set("Meyer".to_string()),
        status: Set(status.to_string()),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .unwrap();
    id
}

#[allow(dead_code)]
pub async fn seed_product(
    db: &DatabaseConnection,
    tenant_id: Uuid,
    stock: i32,
    min_stock: i32,
) -> Uuid {
    seed_product_with_price(db, tenant_id, stock, min_stock, dec!(9.90)).await
}

#[allow(dead_code)]
pub async fn seed_product_with_price(
    db: &DatabaseConnection,
    tenant_id: Uuid,
    stock: i32,
    min_stock: i32,
    price: Decimal,
) -> Uuid {
    let id = Uuid::new_v4();
    product::ActiveModel {
        id: Set(id),
        tenant_id: Set(tenant_id),
        name: Set(format!("Widget {}", &id.to_string()[..8])),
        description: Set(None),
        sku: Set(None),
        barcode: Set(None),
        price: Set(price),
        cost: Set(None),
        stock: Set(stock),
        min_stock: Set(min_stock),
        unit: Set(Some("pcs".to_string())),
        is_active: Set(true),
        supplier_id: Set(None),
        created_at: Set(Utc::now()),
        updated_at: Set(None),
    }
    .insert(db)
    .await
    .unwrap();
    id
}

#[allow(dead_code)]
pub async fn seed_order_item(db: &DatabaseConnection, tenant_id: Uuid, product_id: Uuid) {
    order_item::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(tenant_id),
        order_id: Set(Uuid::new_v4()),
        product_id: Set(product_id),
        quantity: Set(2),
        unit_price: Set(dec!(9.90)),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .unwrap();
}

#[allow(dead_code)]
pub async fn seed_purchase_order(db: &DatabaseConnection, tenant_id: Uuid, supplier_id: Uuid) {
    purchase_order::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(tenant_id),
        supplier_id: Set(supplier_id),
        status: Set("open".to_string()),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .unwrap();
}
