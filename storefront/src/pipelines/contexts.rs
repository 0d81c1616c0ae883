// storefront/src/pipelines/contexts.rs

//! Data structs the pipelines run over. Handlers receive them wrapped in
//! `hubflow::ContextData`; inputs are set by the calling service and each
//! step fills in what the next one needs.

use crate::models::{
  CartLine, CartRow, Order, OrderItem, OrderStatusHistory, PaymentMethod, Product, ShippingAddress,
};
use crate::services::coupon_service::AppliedCoupon;
use crate::services::payment_service::{ChargeOutcome, PaymentProvider};
use crate::state::AppState;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct AddToCartCtxData {
  pub app_state: AppState,
  /// `None` when nobody is signed in.
  pub user_id: Option<Uuid>,
  pub product_id: Uuid,
  pub quantity: i32,

  pub product: Option<Product>,
  pub cart_line: Option<CartRow>,
  pub cart_count: Option<usize>,
}

impl AddToCartCtxData {
  pub fn new(app_state: AppState, user_id: Option<Uuid>, product_id: Uuid, quantity: i32) -> Self {
    Self {
      app_state,
      user_id,
      product_id,
      quantity,
      product: None,
      cart_line: None,
      cart_count: None,
    }
  }
}

#[derive(Clone)]
pub struct CheckoutCtxData {
  pub app_state: AppState,
  pub user_id: Uuid,
  pub shipping_address: ShippingAddress,
  pub payment_method: PaymentMethod,
  pub applied_coupon: Option<AppliedCoupon>,

  /// Re-read right before commit; the session's copy is display only.
  pub cart_lines: Vec<CartLine>,
  pub subtotal: Decimal,
  pub discount_amount: Decimal,
  pub total_amount: Decimal,
  pub order_number: Option<String>,
  pub order: Option<Order>,
  pub items: Vec<OrderItem>,
  pub history_recorded: bool,
  pub cart_cleared: bool,
}

impl CheckoutCtxData {
  pub fn new(
    app_state: AppState,
    user_id: Uuid,
    shipping_address: ShippingAddress,
    payment_method: PaymentMethod,
    applied_coupon: Option<AppliedCoupon>,
  ) -> Self {
    Self {
      app_state,
      user_id,
      shipping_address,
      payment_method,
      applied_coupon,
      cart_lines: Vec::new(),
      subtotal: Decimal::ZERO,
      discount_amount: Decimal::ZERO,
      total_amount: Decimal::ZERO,
      order_number: None,
      order: None,
      items: Vec::new(),
      history_recorded: false,
      cart_cleared: false,
    }
  }
}

#[derive(Clone)]
pub struct PaymentCtxData {
  pub app_state: AppState,
  pub provider: Arc<dyn PaymentProvider>,
  pub order: Order,

  pub outcome: Option<ChargeOutcome>,
  pub updated_order: Option<Order>,
  pub history: Option<OrderStatusHistory>,
}

impl PaymentCtxData {
  pub fn new(app_state: AppState, provider: Arc<dyn PaymentProvider>, order: Order) -> Self {
    Self {
      app_state,
      provider,
      order,
      outcome: None,
      updated_order: None,
      history: None,
    }
  }
}
