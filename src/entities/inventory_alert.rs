use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertType {
    LowStock,
    OutOfStock,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::LowStock => "low_stock",
            AlertType::OutOfStock => "out_of_stock",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low_stock" => Some(AlertType::LowStock),
            "out_of_stock" => Some(AlertType::OutOfStock),
            _ => None,
        }
    }

    /// Classification for a post-movement stock level that already passed the
    /// `stock <= min_stock` threshold check.
    pub fn for_stock_level(stock: i32) -> Self {
        if stock == 0 {
            AlertType::OutOfStock
        } else {
            AlertType::LowStock
        }
    }
}

/// Alert raised when a movement leaves a product at or below its minimum
/// stock. One row per qualifying movement; duplicates are an audit trail,
/// not a bug.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_alerts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub product_id: Uuid,
    pub alert_type: String,
    pub message: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, _insert: bool) -> Result<Self, DbErr> {
        let mut active_model = self;
        if let ActiveValue::NotSet = active_model.created_at {
            active_model.created_at = Set(Utc::now());
        }
        Ok(active_model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_type_tracks_remaining_stock() {
        assert_eq!(AlertType::for_stock_level(0), AlertType::OutOfStock);
        assert_eq!(AlertType::for_stock_level(1), AlertType::LowStock);
        assert_eq!(AlertType::for_stock_level(4), AlertType::LowStock);
    }
}
