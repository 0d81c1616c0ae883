// storefront/src/models/cart_item.rs

use super::product::Product;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A row of the `shopping_cart` table. `(user_id, product_id)` is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartRow {
  pub id: Uuid,
  pub user_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub added_at: DateTime<Utc>,
}

/// Upsert payload; an existing line for the same pair is overwritten.
#[derive(Debug, Clone, Serialize)]
pub struct NewCartRow {
  pub user_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
}

/// A cart row joined with its product, as the cart and checkout flows read it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
  #[serde(flatten)]
  pub row: CartRow,
  #[serde(rename = "store_products")]
  pub product: Product,
}

impl CartLine {
  pub fn line_total(&self) -> Decimal {
    self.product.price * Decimal::from(self.row.quantity)
  }

  // Uses the stock figure read when the cart was loaded; it can be stale.
  pub fn can_increment(&self) -> bool {
    self.row.quantity < self.product.stock_quantity
  }
}
