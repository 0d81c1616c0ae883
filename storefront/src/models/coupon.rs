// storefront/src/models/coupon.rs

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
  Percentage,
  Flat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
  pub id: Uuid,
  /// Stored uppercase.
  pub code: String,
  pub discount_type: DiscountType,
  pub discount_value: Decimal,
  pub min_purchase_amount: Decimal,
  /// Caps percentage discounts only.
  pub max_discount_amount: Option<Decimal>,
  pub usage_limit: Option<i32>,
  pub used_count: i32,
  pub is_active: bool,
  pub expires_at: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
}

impl Coupon {
  /// The `validate_coupon` procedure: eligibility plus discount math.
  ///
  /// A coupon is valid when it is active, not expired, under its usage limit
  /// and `cart_total` reaches the minimum purchase. The discount never
  /// exceeds `max_discount_amount` for percentage coupons, nor the cart total.
  pub fn evaluate(&self, cart_total: Decimal, now: DateTime<Utc>) -> CouponValidation {
    if !self.is_active {
      return CouponValidation::rejected("Invalid coupon code");
    }
    if self.expires_at.map_or(false, |at| at <= now) {
      return CouponValidation::rejected("Coupon has expired");
    }
    if self.usage_limit.map_or(false, |limit| self.used_count >= limit) {
      return CouponValidation::rejected("Coupon usage limit reached");
    }
    if cart_total < self.min_purchase_amount {
      return CouponValidation::rejected(format!(
        "Minimum purchase of ₹{} required",
        self.min_purchase_amount.normalize()
      ));
    }

    let raw = match self.discount_type {
      DiscountType::Percentage => {
        let pct = cart_total * self.discount_value / Decimal::ONE_HUNDRED;
        match self.max_discount_amount {
          Some(cap) => pct.min(cap),
          None => pct,
        }
      }
      DiscountType::Flat => self.discount_value,
    };
    let discount = raw
      .min(cart_total)
      .max(Decimal::ZERO)
      .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    CouponValidation {
      valid: true,
      error: None,
      code: Some(self.code.clone()),
      discount_type: Some(self.discount_type),
      discount_value: Some(self.discount_value),
      discount_amount: Some(discount),
      final_total: Some(cart_total - discount),
      original_total: Some(cart_total),
    }
  }
}

/// Verdict returned by the `validate_coupon` procedure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouponValidation {
  pub valid: bool,
  #[serde(default)]
  pub error: Option<String>,
  #[serde(default)]
  pub code: Option<String>,
  #[serde(default)]
  pub discount_type: Option<DiscountType>,
  #[serde(default)]
  pub discount_value: Option<Decimal>,
  #[serde(default)]
  pub discount_amount: Option<Decimal>,
  #[serde(default)]
  pub final_total: Option<Decimal>,
  #[serde(default)]
  pub original_total: Option<Decimal>,
}

impl CouponValidation {
  pub fn rejected(reason: impl Into<String>) -> Self {
    Self {
      valid: false,
      error: Some(reason.into()),
      code: None,
      discount_type: None,
      discount_value: None,
      discount_amount: None,
      final_total: None,
      original_total: None,
    }
  }
}
