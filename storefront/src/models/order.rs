// storefront/src/models/order.rs

use super::order_item::OrderItem;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Placed,
  Confirmed,
  Processing,
  Shipped,
  Delivered,
  Cancelled,
}

impl OrderStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      OrderStatus::Placed => "placed",
      OrderStatus::Confirmed => "confirmed",
      OrderStatus::Processing => "processing",
      OrderStatus::Shipped => "shipped",
      OrderStatus::Delivered => "delivered",
      OrderStatus::Cancelled => "cancelled",
    }
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
  Pending,
  Success,
  Failed,
}

impl PaymentStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      PaymentStatus::Pending => "pending",
      PaymentStatus::Success => "success",
      PaymentStatus::Failed => "failed",
    }
  }
}

/// Methods offered at checkout. The backend column is free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
  #[serde(rename = "COD")]
  Cod,
  #[serde(rename = "UPI")]
  Upi,
}

impl PaymentMethod {
  pub fn as_str(&self) -> &'static str {
    match self {
      PaymentMethod::Cod => "COD",
      PaymentMethod::Upi => "UPI",
    }
  }

  pub fn parse(value: &str) -> Option<Self> {
    match value {
      "COD" => Some(PaymentMethod::Cod),
      "UPI" => Some(PaymentMethod::Upi),
      _ => None,
    }
  }
}

static PINCODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{6}$").expect("pincode regex is valid"));

const MIN_PHONE_LEN: usize = 10;

/// First unmet shipping address condition; the message is shown verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AddressError {
  #[error("Please enter full name")]
  MissingFullName,
  #[error("Please enter valid phone number")]
  InvalidPhone,
  #[error("Please enter address")]
  MissingAddress,
  #[error("Please enter city")]
  MissingCity,
  #[error("Please enter state")]
  MissingState,
  #[error("Please enter valid 6-digit PIN code (only numbers)")]
  InvalidPincode,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
  pub full_name: String,
  pub phone: String,
  pub address: String,
  pub city: String,
  pub state: String,
  pub pincode: String,
}

impl ShippingAddress {
  /// Local checks only, in form order; reports the first failure.
  pub fn validate(&self) -> Result<(), AddressError> {
    if self.full_name.trim().is_empty() {
      return Err(AddressError::MissingFullName);
    }
    if self.phone.trim().is_empty() || self.phone.chars().count() < MIN_PHONE_LEN {
      return Err(AddressError::InvalidPhone);
    }
    if self.address.trim().is_empty() {
      return Err(AddressError::MissingAddress);
    }
    if self.city.trim().is_empty() {
      return Err(AddressError::MissingCity);
    }
    if self.state.trim().is_empty() {
      return Err(AddressError::MissingState);
    }
    if !PINCODE_RE.is_match(&self.pincode) {
      return Err(AddressError::InvalidPincode);
    }
    Ok(())
  }

  pub fn is_valid(&self) -> bool {
    self.validate().is_ok()
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
  pub id: Uuid,
  pub user_id: Uuid,
  pub order_number: String,
  /// Post-discount.
  pub total_amount: Decimal,
  pub status: OrderStatus,
  pub payment_status: PaymentStatus,
  pub payment_method: Option<String>,
  pub shipping_address: ShippingAddress,
  #[serde(default)]
  pub coupon_code: Option<String>,
  #[serde(default)]
  pub discount_amount: Decimal,
  pub created_at: DateTime<Utc>,
  #[serde(default, rename = "order_items")]
  pub items: Vec<OrderItem>,
}

impl Order {
  pub fn method(&self) -> Option<PaymentMethod> {
    self.payment_method.as_deref().and_then(PaymentMethod::parse)
  }

  /// Sum of `price_at_purchase * quantity` over the loaded items.
  pub fn items_subtotal(&self) -> Decimal {
    self.items.iter().map(OrderItem::line_total).sum()
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewOrder {
  pub user_id: Uuid,
  pub order_number: String,
  pub total_amount: Decimal,
  pub status: OrderStatus,
  pub payment_status: PaymentStatus,
  pub payment_method: String,
  pub shipping_address: ShippingAddress,
  pub coupon_code: Option<String>,
  pub discount_amount: Decimal,
}

/// Partial update of an order's status columns; `None` leaves a column as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrderUpdate {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub status: Option<OrderStatus>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub payment_status: Option<PaymentStatus>,
}
