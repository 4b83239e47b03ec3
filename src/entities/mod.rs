pub mod customer;
pub mod employee;
pub mod inventory_alert;
pub mod invoice;
pub mod order_item;
pub mod product;
pub mod purchase_order;
pub mod stock_movement;
pub mod supplier;
pub mod vacation;
