// storefront/src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
  Book,
  Notes,
  Stationary,
}

impl ProductCategory {
  pub fn as_str(&self) -> &'static str {
    match self {
      ProductCategory::Book => "book",
      ProductCategory::Notes => "notes",
      ProductCategory::Stationary => "stationary",
    }
  }
}

impl fmt::Display for ProductCategory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ProductCategory {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "book" => Ok(ProductCategory::Book),
      "notes" => Ok(ProductCategory::Notes),
      "stationary" => Ok(ProductCategory::Stationary),
      other => Err(format!("Unknown product category '{}'", other)),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
  Pending,
  Approved,
  Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
  pub id: Uuid,
  pub title: String,
  pub description: Option<String>,
  pub category: ProductCategory,
  pub price: Decimal,
  pub original_price: Option<Decimal>,
  pub image_url: Option<String>,
  pub stock_quantity: i32,
  pub is_available: bool,
  pub approval_status: ApprovalStatus,
  pub created_at: DateTime<Utc>,
}

impl Product {
  /// Only approved and available products are shown to end users.
  pub fn is_listed(&self) -> bool {
    self.approval_status == ApprovalStatus::Approved && self.is_available
  }

  pub fn in_stock(&self) -> bool {
    self.stock_quantity > 0
  }

  /// Whole-percent discount against `original_price`, when there is one.
  pub fn discount_percent(&self) -> Option<u32> {
    let original = self.original_price.filter(|o| *o > self.price && !o.is_zero())?;
    ((original - self.price) / original * Decimal::ONE_HUNDRED)
      .round()
      .to_u32()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn priced(price: i64, original: Option<i64>) -> Product {
    Product {
      id: Uuid::new_v4(),
      title: "Concepts of Physics".into(),
      description: None,
      category: ProductCategory::Book,
      price: Decimal::from(price),
      original_price: original.map(Decimal::from),
      image_url: None,
      stock_quantity: 5,
      is_available: true,
      approval_status: ApprovalStatus::Approved,
      created_at: Utc::now(),
    }
  }

  #[test]
  fn discount_percent_rounds_to_whole_percent() {
    assert_eq!(priced(450, Some(550)).discount_percent(), Some(18));
    assert_eq!(priced(150, Some(180)).discount_percent(), Some(17));
    assert_eq!(priced(50, Some(100)).discount_percent(), Some(50));
  }

  #[test]
  fn no_discount_without_a_higher_original_price() {
    assert_eq!(priced(450, None).discount_percent(), None);
    assert_eq!(priced(450, Some(450)).discount_percent(), None);
    assert_eq!(priced(450, Some(400)).discount_percent(), None);
  }
}
