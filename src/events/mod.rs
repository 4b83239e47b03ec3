use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Domain events emitted after a mutation commits. Consumers are
/// observability-only; no invariant depends on delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Invoice events
    InvoiceCreated {
        invoice_id: Uuid,
        tenant_id: Uuid,
        invoice_number: String,
    },
    InvoiceStatusChanged {
        invoice_id: Uuid,
        tenant_id: Uuid,
        old_status: String,
        new_status: String,
    },
    PaymentRecorded {
        invoice_id: Uuid,
        tenant_id: Uuid,
        amount: Decimal,
        paid_in_full: bool,
    },
    InvoiceCancelled {
        invoice_id: Uuid,
        tenant_id: Uuid,
    },

    // Inventory events
    StockMovementApplied {
        movement_id: Uuid,
        tenant_id: Uuid,
        product_id: Uuid,
        movement_type: String,
        quantity: i32,
        new_stock: i32,
    },
    InventoryAlertRaised {
        alert_id: Uuid,
        tenant_id: Uuid,
        product_id: Uuid,
        alert_type: String,
    },
    ProductCreated {
        product_id: Uuid,
        tenant_id: Uuid,
    },
    ProductDeleted {
        product_id: Uuid,
        tenant_id: Uuid,
    },
    SupplierCreated {
        supplier_id: Uuid,
        tenant_id: Uuid,
    },
    SupplierDeleted {
        supplier_id: Uuid,
        tenant_id: Uuid,
    },

    // HR events
    VacationRequested {
        vacation_id: Uuid,
        tenant_id: Uuid,
        employee_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
    VacationApproved {
        vacation_id: Uuid,
        tenant_id: Uuid,
    },
    VacationRejected {
        vacation_id: Uuid,
        tenant_id: Uuid,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when the channel is gone.
    /// Used after a transaction commits: the mutation already happened, so a
    /// dropped consumer must not surface as an operation error.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Dropping domain event: {}", e);
        }
    }
}

/// Consumes events off the channel and logs them as JSON payloads. Runs
/// until every sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match serde_json::to_string(&event) {
            Ok(payload) => info!(%payload, "domain event"),
            Err(e) => warn!(?event, error = %e, "unserializable domain event"),
        }
    }

    info!("Event channel closed; stopping event processing loop");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_to_receiver() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);

        sender
            .send(Event::ProductCreated {
                product_id: Uuid::new_v4(),
                tenant_id: Uuid::new_v4(),
            })
            .await
            .unwrap();

        assert!(matches!(
            rx.recv().await,
            Some(Event::ProductCreated { .. })
        ));
    }

    #[test]
    fn events_serialize_for_structured_logs() {
        let event = Event::InvoiceCreated {
            invoice_id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            invoice_number: "INV-20260829-0001".to_string(),
        };

        let payload = serde_json::to_string(&event).unwrap();
        assert!(payload.contains("InvoiceCreated"));
        assert!(payload.contains("INV-20260829-0001"));
    }

    #[tokio::test]
    async fn send_or_log_swallows_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);

        // Must not panic or error out.
        sender
            .send_or_log(Event::SupplierDeleted {
                supplier_id: Uuid::new_v4(),
                tenant_id: Uuid::new_v4(),
            })
            .await;
    }
}
