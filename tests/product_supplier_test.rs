mod common;

use assert_matches::assert_matches;
use common::{seed_order_item, seed_purchase_order, spawn_app};
use opsledger::{
    errors::ServiceError,
    services::{
        products::{CreateProductInput, UpdateProductInput},
        suppliers::{CreateSupplierInput, UpdateSupplierInput},
    },
};
use rust_decimal_macros::dec;
use uuid::Uuid;

fn product_input(tenant_id: Uuid, name: &str, sku: Option<&str>) -> CreateProductInput {
    CreateProductInput {
        tenant_id,
        name: name.to_string(),
        description: None,
        sku: sku.map(str::to_string),
        barcode: None,
        price: dec!(24.50),
        cost: Some(dec!(11.00)),
        stock: 10,
        min_stock: 3,
        unit: Some("pcs".to_string()),
        supplier_id: None,
    }
}

fn supplier_input(tenant_id: Uuid, name: &str) -> CreateSupplierInput {
    CreateSupplierInput {
        tenant_id,
        name: name.to_string(),
        contact_name: None,
        email: None,
        phone: None,
    }
}

#[tokio::test]
async fn duplicate_sku_in_tenant_is_a_conflict() {
    let app = spawn_app().await;
    let tenant = Uuid::new_v4();

    app.services
        .products
        .create_product(product_input(tenant, "Bolt M6", Some("BOLT-M6")))
        .await
        .unwrap();

    let err = app
        .services
        .products
        .create_product(product_input(tenant, "Bolt M6 v2", Some("BOLT-M6")))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));

    // The same SKU in a different tenant is fine.
    app.services
        .products
        .create_product(product_input(Uuid::new_v4(), "Bolt M6", Some("BOLT-M6")))
        .await
        .unwrap();
}

#[tokio::test]
async fn duplicate_barcode_in_tenant_is_a_conflict() {
    let app = spawn_app().await;
    let tenant = Uuid::new_v4();

    let mut input = product_input(tenant, "Scanner food", None);
    input.barcode = Some("4006381333931".to_string());
    app.services.products.create_product(input).await.unwrap();

    let mut dup = product_input(tenant, "Other", None);
    dup.barcode = Some("4006381333931".to_string());
    let err = app
        .services
        .products
        .create_product(dup)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));
}

#[tokio::test]
async fn update_tolerates_own_identifiers() {
    let app = spawn_app().await;
    let tenant = Uuid::new_v4();
    let created = app
        .services
        .products
        .create_product(product_input(tenant, "Bolt M6", Some("BOLT-M6")))
        .await
        .unwrap();

    // Re-submitting the unchanged SKU must not count as a conflict.
    let updated = app
        .services
        .products
        .update_product(
            created.id,
            tenant,
            UpdateProductInput {
                sku: Some("BOLT-M6".to_string()),
                price: Some(dec!(25.00)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.price, dec!(25.00));

    // Taking another product's SKU is still rejected.
    app.services
        .products
        .create_product(product_input(tenant, "Bolt M8", Some("BOLT-M8")))
        .await
        .unwrap();
    let err = app
        .services
        .products
        .update_product(
            created.id,
            tenant,
            UpdateProductInput {
                sku: Some("BOLT-M8".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));
}

#[tokio::test]
async fn referenced_product_cannot_be_deleted() {
    let app = spawn_app().await;
    let tenant = Uuid::new_v4();
    let created = app
        .services
        .products
        .create_product(product_input(tenant, "Bolt M6", None))
        .await
        .unwrap();
    seed_order_item(&app.db, tenant, created.id).await;

    let err = app
        .services
        .products
        .delete_product(created.id, tenant)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ReferentialBlock(_));

    // Still there.
    app.services
        .products
        .get_product(created.id, tenant)
        .await
        .unwrap();
}

#[tokio::test]
async fn unreferenced_product_is_hard_deleted() {
    let app = spawn_app().await;
    let tenant = Uuid::new_v4();
    let created = app
        .services
        .products
        .create_product(product_input(tenant, "Bolt M6", None))
        .await
        .unwrap();

    app.services
        .products
        .delete_product(created.id, tenant)
        .await
        .unwrap();

    let err = app
        .services
        .products
        .get_product(created.id, tenant)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn listing_hides_inactive_products_by_default() {
    let app = spawn_app().await;
    let tenant = Uuid::new_v4();
    let keep = app
        .services
        .products
        .create_product(product_input(tenant, "Active one", None))
        .await
        .unwrap();
    let retired = app
        .services
        .products
        .create_product(product_input(tenant, "Retired one", None))
        .await
        .unwrap();
    app.services
        .products
        .update_product(
            retired.id,
            tenant,
            UpdateProductInput {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let (items, total) = app
        .services
        .products
        .list_products(tenant, false, 1, 20)
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(items[0].id, keep.id);

    let (_, total_all) = app
        .services
        .products
        .list_products(tenant, true, 1, 20)
        .await
        .unwrap();
    assert_eq!(total_all, 2);
}

#[tokio::test]
async fn empty_product_name_is_rejected() {
    let app = spawn_app().await;
    let err = app
        .services
        .products
        .create_product(product_input(Uuid::new_v4(), "   ", None))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn supplier_names_are_unique_per_tenant() {
    let app = spawn_app().await;
    let tenant = Uuid::new_v4();

    app.services
        .suppliers
        .create_supplier(supplier_input(tenant, "Steelworks AG"))
        .await
        .unwrap();

    let err = app
        .services
        .suppliers
        .create_supplier(supplier_input(tenant, "Steelworks AG"))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));

    // Same name under another tenant is allowed.
    app.services
        .suppliers
        .create_supplier(supplier_input(Uuid::new_v4(), "Steelworks AG"))
        .await
        .unwrap();
}

#[tokio::test]
async fn supplier_rename_checks_uniqueness_only_on_change() {
    let app = spawn_app().await;
    let tenant = Uuid::new_v4();
    let first = app
        .services
        .suppliers
        .create_supplier(supplier_input(tenant, "Steelworks AG"))
        .await
        .unwrap();
    app.services
        .suppliers
        .create_supplier(supplier_input(tenant, "Copper & Co"))
        .await
        .unwrap();

    // Unchanged name passes.
    app.services
        .suppliers
        .update_supplier(
            first.id,
            tenant,
            UpdateSupplierInput {
                name: Some("Steelworks AG".to_string()),
                email: Some("sales@steelworks.test".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // Renaming onto the other supplier does not.
    let err = app
        .services
        .suppliers
        .update_supplier(
            first.id,
            tenant,
            UpdateSupplierInput {
                name: Some("Copper & Co".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));
}

#[tokio::test]
async fn referenced_supplier_cannot_be_deleted() {
    let app = spawn_app().await;
    let tenant = Uuid::new_v4();
    let supplier = app
        .services
        .suppliers
        .create_supplier(supplier_input(tenant, "Steelworks AG"))
        .await
        .unwrap();
    seed_purchase_order(&app.db, tenant, supplier.id).await;

    let err = app
        .services
        .suppliers
        .delete_supplier(supplier.id, tenant)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ReferentialBlock(_));

    let unreferenced = app
        .services
        .suppliers
        .create_supplier(supplier_input(tenant, "Copper & Co"))
        .await
        .unwrap();
    app.services
        .suppliers
        .delete_supplier(unreferenced.id, tenant)
        .await
        .unwrap();

    let (items, total) = app
        .services
        .suppliers
        .list_suppliers(tenant, 1, 20)
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(items[0].id, supplier.id);
}
