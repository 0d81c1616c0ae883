// storefront/src/services/checkout_service.rs

//! The checkout session: a forward-only state machine
//! `CartLoading -> AddressEntry -> PlacingOrder -> OrderPlaced | OrderFailed`,
//! with coupons applied while in `AddressEntry`. A failed session is not
//! resumed; the caller starts a new one.

use crate::errors::{AppError, Result};
use crate::models::{CartLine, Order, PaymentMethod, ShippingAddress};
use crate::pipelines::checkout_pipeline::build_checkout_pipeline;
use crate::pipelines::contexts::CheckoutCtxData;
use crate::services::cart_service::cart_total;
use crate::services::coupon_service::{AppliedCoupon, CouponService, CouponVerdict};
use crate::state::AppState;
use hubflow::{ContextData, Pipeline, PipelineResult};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutPhase {
  CartLoading,
  AddressEntry,
  PlacingOrder,
  OrderPlaced,
  OrderFailed,
}

#[derive(Clone)]
pub struct CheckoutService {
  app_state: AppState,
  coupons: CouponService,
  pipeline: Arc<Pipeline<CheckoutCtxData, AppError>>,
}

impl CheckoutService {
  pub fn new(app_state: AppState) -> Self {
    Self {
      coupons: CouponService::new(app_state.clone()),
      app_state,
      pipeline: Arc::new(build_checkout_pipeline()),
    }
  }

  pub fn start(&self, user_id: Uuid) -> CheckoutSession {
    CheckoutSession {
      app_state: self.app_state.clone(),
      coupons: self.coupons.clone(),
      pipeline: self.pipeline.clone(),
      user_id,
      phase: CheckoutPhase::CartLoading,
      cart_lines: Vec::new(),
      applied_coupon: None,
      placed_order: None,
    }
  }
}

pub struct CheckoutSession {
  app_state: AppState,
  coupons: CouponService,
  pipeline: Arc<Pipeline<CheckoutCtxData, AppError>>,
  user_id: Uuid,
  phase: CheckoutPhase,
  cart_lines: Vec<CartLine>,
  // Session-local; never persisted.
  applied_coupon: Option<AppliedCoupon>,
  placed_order: Option<Order>,
}

impl CheckoutSession {
  pub fn phase(&self) -> CheckoutPhase {
    self.phase
  }

  fn expect_phase(&self, expected: CheckoutPhase, action: &str) -> Result<()> {
    if self.phase != expected {
      return Err(AppError::InvalidState(format!(
        "Cannot {} while checkout is in {:?}",
        action, self.phase
      )));
    }
    Ok(())
  }

  /// Loads the cart for display. An empty cart keeps the session in
  /// `CartLoading`.
  pub async fn load_cart(&mut self) -> Result<&[CartLine]> {
    self.expect_phase(CheckoutPhase::CartLoading, "load the cart")?;
    let lines = self.app_state.gateway.list_cart(self.user_id).await?;
    if lines.is_empty() {
      return Err(AppError::EmptyCart);
    }
    self.cart_lines = lines;
    self.phase = CheckoutPhase::AddressEntry;
    Ok(&self.cart_lines)
  }

  pub fn cart_lines(&self) -> &[CartLine] {
    &self.cart_lines
  }

  pub fn subtotal(&self) -> Decimal {
    cart_total(&self.cart_lines)
  }

  pub fn discount(&self) -> Decimal {
    self.applied_coupon.as_ref().map_or(Decimal::ZERO, |c| c.discount_amount)
  }

  pub fn final_total(&self) -> Decimal {
    (self.subtotal() - self.discount()).max(Decimal::ZERO)
  }

  pub fn applied_coupon(&self) -> Option<&AppliedCoupon> {
    self.applied_coupon.as_ref()
  }

  /// Validates `code` against the current subtotal. On success the discount
  /// is held until removed or the session ends; it is not re-validated if
  /// the cart changes afterwards.
  pub async fn apply_coupon(&mut self, code: &str) -> Result<CouponVerdict> {
    self.expect_phase(CheckoutPhase::AddressEntry, "apply a coupon")?;
    let verdict = self.coupons.validate(code, self.subtotal()).await?;
    if let CouponVerdict::Applied(applied) = &verdict {
      self.applied_coupon = Some(applied.clone());
    }
    Ok(verdict)
  }

  pub fn remove_coupon(&mut self) {
    if self.applied_coupon.take().is_some() {
      info!("Coupon removed from checkout.");
    }
  }

  /// Validates the address locally, then runs the order placement workflow.
  /// Address errors leave the session in `AddressEntry`; any workflow error
  /// moves it to `OrderFailed`.
  #[instrument(skip(self, address), fields(user_id = %self.user_id), err(Display))]
  pub async fn place_order(&mut self, address: ShippingAddress, payment_method: PaymentMethod) -> Result<Order> {
    self.expect_phase(CheckoutPhase::AddressEntry, "place an order")?;
    address.validate()?;

    self.phase = CheckoutPhase::PlacingOrder;
    let ctx = ContextData::new(CheckoutCtxData::new(
      self.app_state.clone(),
      self.user_id,
      address,
      payment_method,
      self.applied_coupon.clone(),
    ));

    let order = match self.pipeline.run(ctx.clone()).await {
      Ok(PipelineResult::Completed) => ctx.with(|c| c.order.clone()),
      Ok(PipelineResult::Stopped) => None,
      Err(e) => {
        error!(error = %e, "Order placement failed.");
        self.phase = CheckoutPhase::OrderFailed;
        return Err(e);
      }
    };

    match order {
      Some(order) => {
        info!(order_number = %order.order_number, total = %order.total_amount, "Order placed.");
        self.phase = CheckoutPhase::OrderPlaced;
        self.placed_order = Some(order.clone());
        Ok(order)
      }
      None => {
        self.phase = CheckoutPhase::OrderFailed;
        Err(AppError::Internal("Order placement finished without an order".into()))
      }
    }
  }

  pub fn placed_order(&self) -> Option<&Order> {
    self.placed_order.as_ref()
  }
}
