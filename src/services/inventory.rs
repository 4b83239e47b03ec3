use crate::{
    entities::{
        inventory_alert::{self, AlertType, Entity as InventoryAlert},
        product::{self, Entity as Product},
        stock_movement::{self, Entity as StockMovement, MovementType},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ApplyMovementInput {
    pub tenant_id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub movement_type: MovementType,
    pub quantity: i32,
    pub reason: Option<String>,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

/// Result of a stock mutation: the ledger row, the product as updated, and
/// the alert raised by the threshold check, if any.
#[derive(Debug, Clone)]
pub struct MovementOutcome {
    pub movement: stock_movement::Model,
    pub product: product::Model,
    pub alert: Option<inventory_alert::Model>,
}

/// Stock mutation engine. Every movement runs as one transaction: the
/// conditional stock update, the append-only ledger insert, and the
/// threshold alert commit together or not at all.
#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl InventoryService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Applies a signed stock movement to a product.
    ///
    /// The stock change is a conditional in-database update
    /// (`stock = stock - ? ... AND stock >= ?` for outbound movements), so
    /// the sufficiency check and the write cannot be interleaved by a
    /// concurrent writer. Zero rows affected means the check failed.
    #[instrument(skip(self, input), fields(tenant_id = %input.tenant_id, product_id = %input.product_id))]
    pub async fn apply_movement(
        &self,
        input: ApplyMovementInput,
    ) -> Result<MovementOutcome, ServiceError> {
        if input.quantity <= 0 {
            return Err(ServiceError::ValidationError(
                "movement quantity must be positive".to_string(),
            ));
        }

        let outcome = self
            .db
            .transaction::<_, MovementOutcome, ServiceError>(move |txn| {
                Box::pin(async move { apply_movement_in_txn(txn, input).await })
            })
            .await
            .map_err(ServiceError::from)?;

        self.event_sender
            .send_or_log(Event::StockMovementApplied {
                movement_id: outcome.movement.id,
                tenant_id: outcome.movement.tenant_id,
                product_id: outcome.movement.product_id,
                movement_type: outcome.movement.movement_type.clone(),
                quantity: outcome.movement.quantity,
                new_stock: outcome.product.stock,
            })
            .await;

        if let Some(alert) = &outcome.alert {
            self.event_sender
                .send_or_log(Event::InventoryAlertRaised {
                    alert_id: alert.id,
                    tenant_id: alert.tenant_id,
                    product_id: alert.product_id,
                    alert_type: alert.alert_type.clone(),
                })
                .await;
        }

        info!(
            movement = %outcome.movement.movement_type,
            quantity = outcome.movement.quantity,
            new_stock = outcome.product.stock,
            alert = outcome.alert.is_some(),
            "stock movement applied"
        );
        Ok(outcome)
    }

    pub async fn get_product_stock(
        &self,
        product_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<i32, ServiceError> {
        let prod = Product::find_by_id(product_id)
            .filter(product::Column::TenantId.eq(tenant_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;
        Ok(prod.stock)
    }

    /// Reads the ledger for a product, newest first.
    #[instrument(skip(self))]
    pub async fn list_movements(
        &self,
        product_id: Uuid,
        tenant_id: Uuid,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<stock_movement::Model>, u64), ServiceError> {
        let paginator = StockMovement::find()
            .filter(stock_movement::Column::TenantId.eq(tenant_id))
            .filter(stock_movement::Column::ProductId.eq(product_id))
            .order_by_desc(stock_movement::Column::CreatedAt)
            .paginate(&*self.db, limit.max(1));

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    pub async fn list_active_alerts(
        &self,
        tenant_id: Uuid,
    ) -> Result<Vec<inventory_alert::Model>, ServiceError> {
        let alerts = InventoryAlert::find()
            .filter(inventory_alert::Column::TenantId.eq(tenant_id))
            .filter(inventory_alert::Column::IsActive.eq(true))
            .order_by_desc(inventory_alert::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(alerts)
    }

    /// Marks an alert as handled. Alert rows are never deleted; the ledger
    /// of low-stock events stays intact.
    #[instrument(skip(self))]
    pub async fn acknowledge_alert(
        &self,
        id: Uuid,
        tenant_id: Uuid,
    ) -> Result<inventory_alert::Model, ServiceError> {
        let alert = InventoryAlert::find_by_id(id)
            .filter(inventory_alert::Column::TenantId.eq(tenant_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Alert {} not found", id)))?;

        let mut active: inventory_alert::ActiveModel = alert.into();
        active.is_active = Set(false);
        let updated = active.update(&*self.db).await?;
        Ok(updated)
    }
}

async fn apply_movement_in_txn(
    txn: &DatabaseTransaction,
    input: ApplyMovementInput,
) -> Result<MovementOutcome, ServiceError> {
    let prod = Product::find_by_id(input.product_id)
        .filter(product::Column::TenantId.eq(input.tenant_id))
        .one(txn)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("Product {} not found", input.product_id))
        })?;

    // Conditional atomic update: the WHERE clause carries the sufficiency
    // check for outbound movements.
    let update = match input.movement_type {
        MovementType::In => Product::update_many()
            .col_expr(
                product::Column::Stock,
                Expr::col(product::Column::Stock).add(input.quantity),
            )
            .filter(product::Column::Id.eq(input.product_id))
            .filter(product::Column::TenantId.eq(input.tenant_id)),
        MovementType::Out => Product::update_many()
            .col_expr(
                product::Column::Stock,
                Expr::col(product::Column::Stock).sub(input.quantity),
            )
            .filter(product::Column::Id.eq(input.product_id))
            .filter(product::Column::TenantId.eq(input.tenant_id))
            .filter(product::Column::Stock.gte(input.quantity)),
    };

    let result = update.exec(txn).await?;
    if result.rows_affected == 0 {
        return Err(ServiceError::InsufficientStock {
            available: prod.stock,
            requested: input.quantity,
        });
    }

    let movement = stock_movement::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(input.tenant_id),
        product_id: Set(input.product_id),
        user_id: Set(input.user_id),
        movement_type: Set(input.movement_type.as_str().to_string()),
        quantity: Set(input.quantity),
        reason: Set(input.reason),
        reference: Set(input.reference),
        notes: Set(input.notes),
        created_at: Set(Utc::now()),
    }
    .insert(txn)
    .await?;

    // Re-read inside the transaction for the post-movement stock level.
    let updated_prod = Product::find_by_id(input.product_id)
        .filter(product::Column::TenantId.eq(input.tenant_id))
        .one(txn)
        .await?
        .ok_or_else(|| {
            ServiceError::InternalError(format!(
                "product {} vanished mid-transaction",
                input.product_id
            ))
        })?;

    // Threshold check. One alert per qualifying movement, no dedup: repeated
    // alerts are the audit trail of each low-stock event.
    let alert = if updated_prod.stock <= updated_prod.min_stock {
        let alert_type = AlertType::for_stock_level(updated_prod.stock);
        let message = match alert_type {
            AlertType::OutOfStock => format!("{} is out of stock", updated_prod.name),
            AlertType::LowStock => format!(
                "{} is low on stock: {} remaining (minimum {})",
                updated_prod.name, updated_prod.stock, updated_prod.min_stock
            ),
        };

        let alert = inventory_alert::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(input.tenant_id),
            product_id: Set(input.product_id),
            alert_type: Set(alert_type.as_str().to_string()),
            message: Set(message),
            is_active: Set(true),
            created_at: Set(Utc::now()),
        }
        .insert(txn)
        .await?;
        Some(alert)
    } else {
        None
    };

    Ok(MovementOutcome {
        movement,
        product: updated_prod,
        alert,
    })
}
