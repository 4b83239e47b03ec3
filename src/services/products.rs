use crate::{
    entities::{
        order_item::{self, Entity as OrderItem},
        product::{self, Entity as Product},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct CreateProductInput {
    pub tenant_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub price: Decimal,
    pub cost: Option<Decimal>,
    pub stock: i32,
    pub min_stock: i32,
    pub unit: Option<String>,
    pub supplier_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub price: Option<Decimal>,
    pub cost: Option<Decimal>,
    pub min_stock: Option<i32>,
    pub unit: Option<String>,
    pub is_active: Option<bool>,
    pub supplier_id: Option<Uuid>,
}

/// Product catalog service. Stock itself is never written here; all stock
/// changes go through the inventory service's movement transaction.
#[derive(Clone)]
pub struct ProductService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl ProductService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input), fields(tenant_id = %input.tenant_id))]
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<product::Model, ServiceError> {
        if input.name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "product name must not be empty".to_string(),
            ));
        }
        if input.stock < 0 {
            return Err(ServiceError::ValidationError(
                "initial stock must not be negative".to_string(),
            ));
        }

        if let Some(sku) = &input.sku {
            self.ensure_unique_sku(input.tenant_id, sku, None).await?;
        }
        if let Some(barcode) = &input.barcode {
            self.ensure_unique_barcode(input.tenant_id, barcode, None)
                .await?;
        }

        let created = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(input.tenant_id),
            name: Set(input.name),
            description: Set(input.description),
            sku: Set(input.sku),
            barcode: Set(input.barcode),
            price: Set(input.price),
            cost: Set(input.cost),
            stock: Set(input.stock),
            min_stock: Set(input.min_stock),
            unit: Set(input.unit),
            is_active: Set(true),
            supplier_id: Set(input.supplier_id),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(&*self.db)
        .await?;

        self.event_sender
            .send_or_log(Event::ProductCreated {
                product_id: created.id,
                tenant_id: created.tenant_id,
            })
            .await;

        info!(product_id = %created.id, "created product");
        Ok(created)
    }

    /// Updates a product. Uniqueness is re-checked only for identifier
    /// fields actually being changed, excluding the product's own row.
    #[instrument(skip(self, input))]
    pub async fn update_product(
        &self,
        id: Uuid,
        tenant_id: Uuid,
        input: UpdateProductInput,
    ) -> Result<product::Model, ServiceError> {
        let prod = self.get_product(id, tenant_id).await?;

        if let Some(sku) = &input.sku {
            if prod.sku.as_deref() != Some(sku.as_str()) {
                self.ensure_unique_sku(tenant_id, sku, Some(id)).await?;
            }
        }
        if let Some(barcode) = &input.barcode {
            if prod.barcode.as_deref() != Some(barcode.as_str()) {
                self.ensure_unique_barcode(tenant_id, barcode, Some(id))
                    .await?;
            }
        }

        let mut active: product::ActiveModel = prod.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(sku) = input.sku {
            active.sku = Set(Some(sku));
        }
        if let Some(barcode) = input.barcode {
            active.barcode = Set(Some(barcode));
        }
        if let Some(price) = input.price {
            active.price = Set(price);
        }
        if let Some(cost) = input.cost {
            active.cost = Set(Some(cost));
        }
        if let Some(min_stock) = input.min_stock {
            active.min_stock = Set(min_stock);
        }
        if let Some(unit) = input.unit {
            active.unit = Set(Some(unit));
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        if let Some(supplier_id) = input.supplier_id {
            active.supplier_id = Set(Some(supplier_id));
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(&*self.db).await?;
        info!(product_id = %id, "updated product");
        Ok(updated)
    }

    /// Deletes a product unless order lines still reference it. Deletion is
    /// blocked, never cascaded.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid, tenant_id: Uuid) -> Result<(), ServiceError> {
        let prod = self.get_product(id, tenant_id).await?;

        let references = OrderItem::find()
            .filter(order_item::Column::ProductId.eq(id))
            .count(&*self.db)
            .await?;
        if references > 0 {
            return Err(ServiceError::ReferentialBlock(format!(
                "product {} is referenced by {} order line(s)",
                prod.name, references
            )));
        }

        prod.delete(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::ProductDeleted {
                product_id: id,
                tenant_id,
            })
            .await;

        Ok(())
    }

    pub async fn get_product(
        &self,
        id: Uuid,
        tenant_id: Uuid,
    ) -> Result<product::Model, ServiceError> {
        Product::find_by_id(id)
            .filter(product::Column::TenantId.eq(tenant_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))
    }

    /// Lists products for a tenant. Inactive (soft-deleted) products are
    /// excluded unless asked for.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        tenant_id: Uuid,
        include_inactive: bool,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<product::Model>, u64), ServiceError> {
        let mut query = Product::find().filter(product::Column::TenantId.eq(tenant_id));
        if !include_inactive {
            query = query.filter(product::Column::IsActive.eq(true));
        }

        let paginator = query
            .order_by_asc(product::Column::Name)
            .paginate(&*self.db, limit.max(1));
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((items, total))
    }

    async fn ensure_unique_sku(
        &self,
        tenant_id: Uuid,
        sku: &str,
        exclude: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let mut query = Product::find()
            .filter(product::Column::TenantId.eq(tenant_id))
            .filter(product::Column::Sku.eq(sku));
        if let Some(id) = exclude {
            query = query.filter(product::Column::Id.ne(id));
        }

        if query.count(&*self.db).await? > 0 {
            return Err(ServiceError::Conflict(format!(
                "SKU {} is already in use",
                sku
            )));
        }
        Ok(())
    }

    async fn ensure_unique_barcode(
        &self,
        tenant_id: Uuid,
        barcode: &str,
        exclude: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let mut query = Product::find()
            .filter(product::Column::TenantId.eq(tenant_id))
            .filter(product::Column::Barcode.eq(barcode));
        if let Some(id) = exclude {
            query = query.filter(product::Column::Id.ne(id));
        }

        if query.count(&*self.db).await? > 0 {
            return Err(ServiceError::Conflict(format!(
                "barcode {} is already in use",
                barcode
            )));
        }
        Ok(())
    }
}
