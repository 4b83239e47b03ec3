pub mod inventory;
pub mod invoices;
pub mod products;
pub mod suppliers;
pub mod vacations;

use crate::events::EventSender;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// One shared handle per service, all over the same connection pool.
#[derive(Clone)]
pub struct AppServices {
    pub invoices: Arc<invoices::InvoiceService>,
    pub inventory: Arc<inventory::InventoryService>,
    pub products: Arc<products::ProductService>,
    pub suppliers: Arc<suppliers::SupplierService>,
    pub vacations: Arc<vacations::VacationService>,
}

impl AppServices {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self {
            invoices: Arc::new(invoices::InvoiceService::new(
                db.clone(),
                event_sender.clone(),
            )),
            inventory: Arc::new(inventory::InventoryService::new(
                db.clone(),
                event_sender.clone(),
            )),
            products: Arc::new(products::ProductService::new(
                db.clone(),
                event_sender.clone(),
            )),
            suppliers: Arc::new(suppliers::SupplierService::new(
                db.clone(),
                event_sender.clone(),
            )),
            vacations: Arc::new(vacations::VacationService::new(db, event_sender)),
        }
    }
}
