// storefront/src/models/order_item.rs

use super::product::Product;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
  pub id: Uuid,
  pub order_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  /// Snapshot of the product price when the order was placed; never updated.
  pub price_at_purchase: Decimal,
  #[serde(default, rename = "store_products")]
  pub product: Option<Product>,
}

impl OrderItem {
  pub fn line_total(&self) -> Decimal {
    self.price_at_purchase * Decimal::from(self.quantity)
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewOrderItem {
  pub order_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub price_at_purchase: Decimal,
}
