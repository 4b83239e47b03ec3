mod common;

use assert_matches::assert_matches;
use common::{seed_product, spawn_app};
use opsledger::{
    entities::{inventory_alert::AlertType, stock_movement::MovementType},
    errors::ServiceError,
    services::inventory::ApplyMovementInput,
};
use uuid::Uuid;

fn movement(
    tenant_id: Uuid,
    product_id: Uuid,
    movement_type: MovementType,
    quantity: i32,
) -> ApplyMovementInput {
    ApplyMovementInput {
        tenant_id,
        product_id,
        user_id: Uuid::new_v4(),
        movement_type,
        quantity,
        reason: Some("adjustment".to_string()),
        reference: None,
        notes: None,
    }
}

#[tokio::test]
async fn outbound_movement_below_minimum_raises_low_stock() {
    let app = spawn_app().await;
    let tenant = Uuid::new_v4();
    let product = seed_product(&app.db, tenant, 10, 5).await;

    let outcome = app
        .services
        .inventory
        .apply_movement(movement(tenant, product, MovementType::Out, 6))
        .await
        .unwrap();

    assert_eq!(outcome.product.stock, 4);
    assert_eq!(outcome.movement.quantity, 6);
    assert_eq!(outcome.movement.movement_type, "out");

    let alert = outcome.alert.expect("threshold crossed, alert expected");
    assert_eq!(alert.alert_type, AlertType::LowStock.as_str());
    assert!(alert.is_active);
}

#[tokio::test]
async fn draining_stock_to_zero_raises_out_of_stock() {
    let app = spawn_app().await;
    let tenant = Uuid::new_v4();
    let product = seed_product(&app.db, tenant, 4, 5).await;

    let outcome = app
        .services
        .inventory
        .apply_movement(movement(tenant, product, MovementType::Out, 4))
        .await
        .unwrap();

    assert_eq!(outcome.product.stock, 0);
    let alert = outcome.alert.expect("empty shelf, alert expected");
    assert_eq!(alert.alert_type, AlertType::OutOfStock.as_str());
}

#[tokio::test]
async fn insufficient_stock_rolls_back_everything() {
    let app = spawn_app().await;
    let tenant = Uuid::new_v4();
    let product = seed_product(&app.db, tenant, 0, 5).await;

    let err = app
        .services
        .inventory
        .apply_movement(movement(tenant, product, MovementType::Out, 1))
        .await
        .unwrap_err();
    assert_matches!(
        err,
        ServiceError::InsufficientStock {
            available: 0,
            requested: 1
        }
    );

    // Nothing committed: stock unchanged, no ledger row.
    let stock = app
        .services
        .inventory
        .get_product_stock(product, tenant)
        .await
        .unwrap();
    assert_eq!(stock, 0);

    let (movements, total) = app
        .services
        .inventory
        .list_movements(product, tenant, 1, 20)
        .await
        .unwrap();
    assert!(movements.is_empty());
    assert_eq!(total, 0);
}

#[tokio::test]
async fn inbound_movement_adds_stock_without_alert() {
    let app = spawn_app().await;
    let tenant = Uuid::new_v4();
    let product = seed_product(&app.db, tenant, 2, 5).await;

    let outcome = app
        .services
        .inventory
        .apply_movement(movement(tenant, product, MovementType::In, 20))
        .await
        .unwrap();

    assert_eq!(outcome.product.stock, 22);
    assert!(outcome.alert.is_none());
}

#[tokio::test]
async fn no_alert_while_above_minimum() {
    let app = spawn_app().await;
    let tenant = Uuid::new_v4();
    let product = seed_product(&app.db, tenant, 10, 5).await;

    let outcome = app
        .services
        .inventory
        .apply_movement(movement(tenant, product, MovementType::Out, 4))
        .await
        .unwrap();

    assert_eq!(outcome.product.stock, 6);
    assert!(outcome.alert.is_none());
}

#[tokio::test]
async fn zero_or_negative_quantities_are_rejected() {
    let app = spawn_app().await;
    let tenant = Uuid::new_v4();
    let product = seed_product(&app.db, tenant, 10, 5).await;

    for qty in [0, -3] {
        let err = app
            .services
            .inventory
            .apply_movement(movement(tenant, product, MovementType::Out, qty))
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(_));
    }
}

#[tokio::test]
async fn unknown_product_or_wrong_tenant_is_not_found() {
    let app = spawn_app().await;
    let tenant = Uuid::new_v4();
    let product = seed_product(&app.db, tenant, 10, 5).await;

    let err = app
        .services
        .inventory
        .apply_movement(movement(tenant, Uuid::new_v4(), MovementType::In, 1))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    let err = app
        .services
        .inventory
        .apply_movement(movement(Uuid::new_v4(), product, MovementType::In, 1))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn alerts_are_acknowledged_not_deleted() {
    let app = spawn_app().await;
    let tenant = Uuid::new_v4();
    let product = seed_product(&app.db, tenant, 5, 5).await;

    let outcome = app
        .services
        .inventory
        .apply_movement(movement(tenant, product, MovementType::Out, 1))
        .await
        .unwrap();
    let alert = outcome.alert.unwrap();

    let active = app.services.inventory.list_active_alerts(tenant).await.unwrap();
    assert_eq!(active.len(), 1);

    let acked = app
        .services
        .inventory
        .acknowledge_alert(alert.id, tenant)
        .await
        .unwrap();
    assert!(!acked.is_active);

    let active = app.services.inventory.list_active_alerts(tenant).await.unwrap();
    assert!(active.is_empty());
}

#[tokio::test]
async fn movement_ledger_is_ordered_newest_first() {
    let app = spawn_app().await;
    let tenant = Uuid::new_v4();
    let product = seed_product(&app.db, tenant, 100, 5).await;

    app.services
        .inventory
        .apply_movement(movement(tenant, product, MovementType::Out, 10))
        .await
        .unwrap();
    app.services
        .inventory
        .apply_movement(movement(tenant, product, MovementType::In, 3))
        .await
        .unwrap();

    let (movements, total) = app
        .services
        .inventory
        .list_movements(product, tenant, 1, 20)
        .await
        .unwrap();
    assert_eq!(total, 2);
    assert_eq!(movements[0].movement_type, "in");
    assert_eq!(movements[1].movement_type, "out");

    let stock = app
        .services
        .inventory
        .get_product_stock(product, tenant)
        .await
        .unwrap();
    assert_eq!(stock, 93);
}
