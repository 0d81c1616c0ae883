// storefront/src/services/coupon_service.rs

//! Thin client over the `validate_coupon` procedure. No eligibility or
//! discount math happens here.

use crate::errors::{AppError, Result};
use crate::state::AppState;
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

pub const VALIDATION_FAILED: &str = "Failed to validate coupon";
pub const NOT_APPLICABLE: &str = "This coupon cannot be applied";

/// A coupon accepted by the backend, held for the rest of the checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedCoupon {
  pub code: String,
  pub discount_amount: Decimal,
  pub final_total: Decimal,
  /// Cart total the verdict was computed for.
  pub validated_total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CouponVerdict {
  Applied(AppliedCoupon),
  Rejected { reason: String },
}

#[derive(Clone)]
pub struct CouponService {
  app_state: AppState,
}

impl CouponService {
  pub fn new(app_state: AppState) -> Self {
    Self { app_state }
  }

  /// Sends the uppercased code and the cart total to the backend. A failed
  /// call is reported as a rejection, not an error.
  #[instrument(skip(self), err(Display))]
  pub async fn validate(&self, code: &str, cart_total: Decimal) -> Result<CouponVerdict> {
    let normalized = code.trim().to_uppercase();
    if normalized.is_empty() {
      return Err(AppError::Validation("Please enter a coupon code".to_string()));
    }

    let validation = match self.app_state.gateway.validate_coupon(&normalized, cart_total).await {
      Ok(validation) => validation,
      Err(e) => {
        warn!(error = %e, "Coupon validation call failed.");
        return Ok(CouponVerdict::Rejected {
          reason: VALIDATION_FAILED.to_string(),
        });
      }
    };

    if !validation.valid {
      return Ok(CouponVerdict::Rejected {
        reason: validation.error.unwrap_or_else(|| NOT_APPLICABLE.to_string()),
      });
    }

    let discount_amount = validation.discount_amount.unwrap_or(Decimal::ZERO);
    let applied = AppliedCoupon {
      code: validation.code.unwrap_or(normalized),
      discount_amount,
      final_total: validation.final_total.unwrap_or(cart_total - discount_amount),
      validated_total: cart_total,
    };
    info!(code = %applied.code, discount = %applied.discount_amount, "Coupon applied.");
    Ok(CouponVerdict::Applied(applied))
  }
}
