use crate::{
    entities::{
        customer::{self, Entity as Customer},
        invoice::{self, Entity as Invoice, InvoiceStatus},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

const SEQUENCE_START: u32 = 1;
const SEQUENCE_WIDTH: usize = 4;

#[derive(Debug, Clone)]
pub struct CreateInvoiceInput {
    pub tenant_id: Uuid,
    pub customer_id: Uuid,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub due_date: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Invoice enriched with customer summary fields for caller display.
#[derive(Debug, Clone)]
pub struct InvoiceWithCustomer {
    pub invoice: invoice::Model,
    pub customer_name: String,
    pub customer_email: Option<String>,
}

/// Typed list filter; each criterion is optional and translated to the query
/// builder at the edge.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    pub status: Option<InvoiceStatus>,
    pub customer_id: Option<Uuid>,
}

/// Service owning invoice creation, status transitions, and payment
/// application. Invoice numbers are allocated inside the insert transaction;
/// the `(tenant_id, invoice_number)` unique index is what makes concurrent
/// allocation safe, and a collision surfaces as `Conflict` for the caller to
/// retry the whole creation once.
#[derive(Clone)]
pub struct InvoiceService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl InvoiceService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Creates an invoice in `draft` for an active customer of the tenant.
    /// The caller-supplied total is trusted; it is validated against payment
    /// amounts later but never recomputed from `subtotal + tax`.
    #[instrument(skip(self, input), fields(tenant_id = %input.tenant_id))]
    pub async fn create_invoice(
        &self,
        input: CreateInvoiceInput,
    ) -> Result<InvoiceWithCustomer, ServiceError> {
        if input.subtotal < Decimal::ZERO || input.tax < Decimal::ZERO || input.total < Decimal::ZERO
        {
            return Err(ServiceError::ValidationError(
                "subtotal, tax and total must be non-negative".to_string(),
            ));
        }

        let cust = Customer::find_by_id(input.customer_id)
            .filter(customer::Column::TenantId.eq(input.tenant_id))
            .filter(customer::Column::IsActive.eq(true))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Active customer {} not found", input.customer_id))
            })?;

        let created = self
            .db
            .transaction::<_, invoice::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let invoice_number = next_invoice_number(txn, input.tenant_id).await?;

                    let model = invoice::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        tenant_id: Set(input.tenant_id),
                        invoice_number: Set(invoice_number),
                        customer_id: Set(input.customer_id),
                        status: Set(InvoiceStatus::Draft.as_str().to_string()),
                        subtotal: Set(input.subtotal),
                        tax: Set(input.tax),
                        total: Set(input.total),
                        due_date: Set(input.due_date),
                        paid_date: Set(None),
                        notes: Set(input.notes),
                        created_at: Set(Utc::now()),
                        updated_at: Set(None),
                    };

                    model.insert(txn).await.map_err(|e| {
                        if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                            ServiceError::Conflict(
                                "invoice number already allocated, retry the creation".to_string(),
                            )
                        } else {
                            ServiceError::DatabaseError(e)
                        }
                    })
                })
            })
            .await
            .map_err(ServiceError::from)?;

        self.event_sender
            .send_or_log(Event::InvoiceCreated {
                invoice_id: created.id,
                tenant_id: created.tenant_id,
                invoice_number: created.invoice_number.clone(),
            })
            .await;

        info!(invoice_number = %created.invoice_number, "created invoice");
        Ok(InvoiceWithCustomer {
            invoice: created,
            customer_name: cust.name,
            customer_email: cust.email,
        })
    }

    /// Moves an invoice along the lifecycle table. Entering `paid` stamps
    /// `paid_date` if it is not already set.
    #[instrument(skip(self, notes))]
    pub async fn update_invoice_status(
        &self,
        id: Uuid,
        tenant_id: Uuid,
        new_status: InvoiceStatus,
        notes: Option<String>,
    ) -> Result<invoice::Model, ServiceError> {
        let inv = self.get_invoice(id, tenant_id).await?;
        let current = parse_status(&inv)?;

        if !current.can_transition_to(new_status) {
            return Err(ServiceError::invalid_transition(current, new_status));
        }

        let paid_date = inv.paid_date;
        let merged_notes = append_note(inv.notes.clone(), notes.as_deref());

        let mut active: invoice::ActiveModel = inv.into();
        active.status = Set(new_status.as_str().to_string());
        if new_status == InvoiceStatus::Paid && paid_date.is_none() {
            active.paid_date = Set(Some(Utc::now()));
        }
        active.notes = Set(merged_notes);
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::InvoiceStatusChanged {
                invoice_id: id,
                tenant_id,
                old_status: current.as_str().to_string(),
                new_status: new_status.as_str().to_string(),
            })
            .await;

        info!(%id, from = %current, to = %new_status, "invoice status changed");
        Ok(updated)
    }

    /// Records a payment against an invoice. A payment covering the full
    /// total marks the invoice paid; a partial payment is only noted, never
    /// tracked as a running balance.
    #[instrument(skip(self, notes))]
    pub async fn record_payment(
        &self,
        id: Uuid,
        tenant_id: Uuid,
        amount: Decimal,
        payment_date: DateTime<Utc>,
        notes: Option<String>,
    ) -> Result<invoice::Model, ServiceError> {
        if amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "payment amount must be positive".to_string(),
            ));
        }

        let inv = self.get_invoice(id, tenant_id).await?;
        let current = parse_status(&inv)?;

        if current == InvoiceStatus::Cancelled {
            return Err(ServiceError::InvalidOperation(format!(
                "invoice {} is cancelled and cannot accept payments",
                inv.invoice_number
            )));
        }
        if amount > inv.total {
            return Err(ServiceError::PaymentExceedsTotal {
                amount,
                total: inv.total,
            });
        }

        let paid_in_full = amount >= inv.total;
        let note = match &notes {
            Some(n) => format!("Payment of {} received on {}: {}", amount, payment_date, n),
            None => format!("Payment of {} received on {}", amount, payment_date),
        };
        let merged_notes = append_note(inv.notes.clone(), Some(&note));

        let mut active: invoice::ActiveModel = inv.into();
        if paid_in_full {
            active.status = Set(InvoiceStatus::Paid.as_str().to_string());
            active.paid_date = Set(Some(payment_date));
        }
        active.notes = Set(merged_notes);
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::PaymentRecorded {
                invoice_id: id,
                tenant_id,
                amount,
                paid_in_full,
            })
            .await;

        info!(%id, %amount, paid_in_full, "payment recorded");
        Ok(updated)
    }

    /// Cancels a non-terminal invoice, appending the reason to its notes.
    #[instrument(skip(self, reason))]
    pub async fn cancel_invoice(
        &self,
        id: Uuid,
        tenant_id: Uuid,
        reason: Option<String>,
    ) -> Result<invoice::Model, ServiceError> {
        let inv = self.get_invoice(id, tenant_id).await?;
        let current = parse_status(&inv)?;

        if current.is_terminal() {
            return Err(ServiceError::invalid_transition(
                current,
                InvoiceStatus::Cancelled,
            ));
        }

        let note = reason.map(|r| format!("Cancelled: {}", r));
        let merged_notes = append_note(inv.notes.clone(), note.as_deref());

        let mut active: invoice::ActiveModel = inv.into();
        active.status = Set(InvoiceStatus::Cancelled.as_str().to_string());
        active.notes = Set(merged_notes);
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::InvoiceCancelled {
                invoice_id: id,
                tenant_id,
            })
            .await;

        Ok(updated)
    }

    /// Invoices that are `sent` and past due. Invoices already flipped to
    /// `overdue` are not re-selected; the flip itself is an external
    /// scheduled action going through `update_invoice_status`.
    #[instrument(skip(self))]
    pub async fn get_overdue_invoices(
        &self,
        tenant_id: Uuid,
        limit: u64,
    ) -> Result<Vec<invoice::Model>, ServiceError> {
        let invoices = Invoice::find()
            .filter(invoice::Column::TenantId.eq(tenant_id))
            .filter(invoice::Column::Status.eq(InvoiceStatus::Sent.as_str()))
            .filter(invoice::Column::DueDate.lt(Utc::now()))
            .order_by_asc(invoice::Column::DueDate)
            .limit(limit)
            .all(&*self.db)
            .await?;

        Ok(invoices)
    }

    pub async fn get_invoice(
        &self,
        id: Uuid,
        tenant_id: Uuid,
    ) -> Result<invoice::Model, ServiceError> {
        Invoice::find_by_id(id)
            .filter(invoice::Column::TenantId.eq(tenant_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Invoice {} not found", id)))
    }

    /// Lists invoices for a tenant with pagination, newest first.
    #[instrument(skip(self, filter))]
    pub async fn list_invoices(
        &self,
        tenant_id: Uuid,
        filter: InvoiceFilter,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<invoice::Model>, u64), ServiceError> {
        let mut query = Invoice::find().filter(invoice::Column::TenantId.eq(tenant_id));

        if let Some(status) = filter.status {
            query = query.filter(invoice::Column::Status.eq(status.as_str()));
        }
        if let Some(customer_id) = filter.customer_id {
            query = query.filter(invoice::Column::CustomerId.eq(customer_id));
        }

        let paginator = query
            .order_by_desc(invoice::Column::CreatedAt)
            .paginate(&*self.db, limit.max(1));
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((items, total))
    }
}

/// Allocates the next `INV-YYYYMMDD-NNNN` for the tenant, one greater than
/// the highest sequence already stored for today. Sequences are compared
/// numerically, so days with more than 9999 invoices keep counting (the
/// number merely grows past four digits). Runs inside the insert
/// transaction; the read alone is not what makes this safe, the unique index
/// on `(tenant_id, invoice_number)` is.
async fn next_invoice_number(
    txn: &DatabaseTransaction,
    tenant_id: Uuid,
) -> Result<String, ServiceError> {
    let prefix = format!("INV-{}-", Utc::now().format("%Y%m%d"));

    let todays: Vec<String> = Invoice::find()
        .select_only()
        .column(invoice::Column::InvoiceNumber)
        .filter(invoice::Column::TenantId.eq(tenant_id))
        .filter(invoice::Column::InvoiceNumber.starts_with(&prefix))
        .into_tuple()
        .all(txn)
        .await?;

    let seq = match max_sequence(todays.iter().map(String::as_str)) {
        Some(max) => max.saturating_add(1),
        None => SEQUENCE_START,
    };

    Ok(format!("{}{:0width$}", prefix, seq, width = SEQUENCE_WIDTH))
}

/// Highest sequence among the given invoice numbers, compared as numbers
/// rather than strings. Malformed rows are skipped.
fn max_sequence<'a>(numbers: impl Iterator<Item = &'a str>) -> Option<u32> {
    numbers.filter_map(parse_sequence).max()
}

fn parse_sequence(invoice_number: &str) -> Option<u32> {
    invoice_number.rsplit('-').next()?.parse().ok()
}

fn parse_status(inv: &invoice::Model) -> Result<InvoiceStatus, ServiceError> {
    inv.status().ok_or_else(|| {
        ServiceError::InternalError(format!("invoice {} has unknown status {}", inv.id, inv.status))
    })
}

/// Appends a timestamped note, preserving the existing audit trail.
fn append_note(existing: Option<String>, note: Option<&str>) -> Option<String> {
    let note = match note {
        Some(n) if !n.is_empty() => n,
        _ => return existing,
    };
    let stamped = format!("[{}] {}", Utc::now().format("%Y-%m-%d %H:%M:%S"), note);
    match existing {
        Some(prev) if !prev.is_empty() => Some(format!("{}\n{}", prev, stamped)),
        _ => Some(stamped),
    }
}
