use crate::{
    entities::{
        purchase_order::{self, Entity as PurchaseOrder},
        supplier::{self, Entity as Supplier},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct CreateSupplierInput {
    pub tenant_id: Uuid,
    pub name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateSupplierInput {
    pub name: Option<String>,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Supplier directory, parallel in shape to the product service: per-tenant
/// name uniqueness, deletion blocked by referencing purchase orders.
#[derive(Clone)]
pub struct SupplierService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl SupplierService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input), fields(tenant_id = %input.tenant_id))]
    pub async fn create_supplier(
        &self,
        input: CreateSupplierInput,
    ) -> Result<supplier::Model, ServiceError> {
        if input.name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "supplier name must not be empty".to_string(),
            ));
        }

        self.ensure_unique_name(input.tenant_id, &input.name, None)
            .await?;

        let created = supplier::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(input.tenant_id),
            name: Set(input.name),
            contact_name: Set(input.contact_name),
            email: Set(input.email),
            phone: Set(input.phone),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(&*self.db)
        .await?;

        self.event_sender
            .send_or_log(Event::SupplierCreated {
                supplier_id: created.id,
                tenant_id: created.tenant_id,
            })
            .await;

        info!(supplier_id = %created.id, "created supplier");
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update_supplier(
        &self,
        id: Uuid,
        tenant_id: Uuid,
        input: UpdateSupplierInput,
    ) -> Result<supplier::Model, ServiceError> {
        let sup = self.get_supplier(id, tenant_id).await?;

        if let Some(name) = &input.name {
            if *name != sup.name {
                self.ensure_unique_name(tenant_id, name, Some(id)).await?;
            }
        }

        let mut active: supplier::ActiveModel = sup.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(contact_name) = input.contact_name {
            active.contact_name = Set(Some(contact_name));
        }
        if let Some(email) = input.email {
            active.email = Set(Some(email));
        }
        if let Some(phone) = input.phone {
            active.phone = Set(Some(phone));
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(&*self.db).await?;
        Ok(updated)
    }

    /// Deletes a supplier unless purchase orders still reference it.
    #[instrument(skip(self))]
    pub async fn delete_supplier(&self, id: Uuid, tenant_id: Uuid) -> Result<(), ServiceError> {
        let sup = self.get_supplier(id, tenant_id).await?;

        let references = PurchaseOrder::find()
            .filter(purchase_order::Column::SupplierId.eq(id))
            .count(&*self.db)
            .await?;
        if references > 0 {
            return Err(ServiceError::ReferentialBlock(format!(
                "supplier {} is referenced by {} purchase order(s)",
                sup.name, references
            )));
        }

        sup.delete(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::SupplierDeleted {
                supplier_id: id,
                tenant_id,
            })
            .await;

        Ok(())
    }

    pub async fn get_supplier(
        &self,
        id: Uuid,
        tenant_id: Uuid,
    ) -> Result<supplier::Model, ServiceError> {
        Supplier::find_by_id(id)
            .filter(supplier::Column::TenantId.eq(tenant_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Supplier {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn list_suppliers(
        &self,
        tenant_id: Uuid,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<supplier::Model>, u64), ServiceError> {
        let paginator = Supplier::find()
            .filter(supplier::Column::TenantId.eq(tenant_id))
            .order_by_asc(supplier::Column::Name)
            .paginate(&*self.db, limit.max(1));

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    async fn ensure_unique_name(
        &self,
        tenant_id: Uuid,
        name: &str,
        exclude: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let mut query = Supplier::find()
            .filter(supplier::Column::TenantId.eq(tenant_id))
            .filter(supplier::Column::Name.eq(name));
        if let Some(id) = exclude {
            query = query.filter(supplier::Column::Id.ne(id));
        }

        if query.count(&*self.db).await? > 0 {
            return Err(ServiceError::Conflict(format!(
                "supplier name {} is already in use",
                name
            )));
        }
        Ok(())
    }
}
