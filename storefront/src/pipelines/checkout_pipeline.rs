// storefront/src/pipelines/checkout_pipeline.rs

//! Order placement: read cart, price it, commit order and items, then the
//! best-effort follow-ups. The backend gives the client no multi-statement
//! transaction, so the order insert carries a compensating delete that runs
//! if item insertion fails.

use crate::errors::AppError;
use crate::models::{NewOrder, NewOrderItem, NewStatusHistory, OrderStatus, PaymentStatus};
use crate::pipelines::contexts::CheckoutCtxData;
use hubflow::{ContextData, Pipeline, PipelineControl};
use rust_decimal::Decimal;
use tracing::{error, info, warn};

pub const PLACED_NOTE: &str = "Order placed successfully";

pub fn build_checkout_pipeline() -> Pipeline<CheckoutCtxData, AppError> {
  let mut p = Pipeline::<CheckoutCtxData, AppError>::new(&[
    ("load_cart", false),
    ("ensure_cart_not_empty", false),
    ("compute_totals", false),
    ("reserve_order_number", false),
    ("insert_order", false),
    ("insert_order_items", false),
    ("record_status_history", true),
    ("clear_cart", true),
  ]);

  p.on_root("load_cart", load_cart);
  p.on_root("ensure_cart_not_empty", ensure_cart_not_empty);
  p.on_root("compute_totals", compute_totals);
  p.on_root("reserve_order_number", reserve_order_number);
  p.on_root("insert_order", insert_order);
  p.compensate_with("insert_order", delete_order);
  p.on_root("insert_order_items", insert_order_items);
  p.on_root("record_status_history", record_status_history);
  p.on_root("clear_cart", clear_cart);
  p
}

async fn load_cart(ctx: ContextData<CheckoutCtxData>) -> Result<PipelineControl, AppError> {
  let (gateway, user_id) = ctx.with(|c| (c.app_state.gateway.clone(), c.user_id));
  let lines = gateway.list_cart(user_id).await?;
  info!(%user_id, lines = lines.len(), "Cart re-read for checkout.");
  ctx.write().cart_lines = lines;
  Ok(PipelineControl::Continue)
}

async fn ensure_cart_not_empty(ctx: ContextData<CheckoutCtxData>) -> Result<PipelineControl, AppError> {
  if ctx.with(|c| c.cart_lines.is_empty()) {
    return Err(AppError::EmptyCart);
  }
  Ok(PipelineControl::Continue)
}

async fn compute_totals(ctx: ContextData<CheckoutCtxData>) -> Result<PipelineControl, AppError> {
  let mut guard = ctx.write();
  let subtotal: Decimal = guard.cart_lines.iter().map(|line| line.line_total()).sum();

  // The coupon is not re-validated here. Its discount is clamped so the
  // order total cannot go negative when the cart shrank after validation.
  let discount = match &guard.applied_coupon {
    Some(coupon) => {
      if coupon.validated_total != subtotal {
        warn!(
          code = %coupon.code,
          validated_total = %coupon.validated_total,
          %subtotal,
          "Cart changed since the coupon was validated; applying the held discount."
        );
      }
      coupon.discount_amount.min(subtotal).max(Decimal::ZERO)
    }
    None => Decimal::ZERO,
  };

  guard.subtotal = subtotal;
  guard.discount_amount = discount;
  guard.total_amount = subtotal - discount;
  info!(%subtotal, %discount, total = %guard.total_amount, "Checkout totals computed.");
  Ok(PipelineControl::Continue)
}

async fn reserve_order_number(ctx: ContextData<CheckoutCtxData>) -> Result<PipelineControl, AppError> {
  let gateway = ctx.with(|c| c.app_state.gateway.clone());
  let order_number = gateway.generate_order_number().await?;
  ctx.write().order_number = Some(order_number);
  Ok(PipelineControl::Continue)
}

async fn insert_order(ctx: ContextData<CheckoutCtxData>) -> Result<PipelineControl, AppError> {
  let (gateway, new_order) = ctx.with(|c| {
    let new_order = c.order_number.clone().map(|order_number| NewOrder {
      user_id: c.user_id,
      order_number,
      total_amount: c.total_amount,
      status: OrderStatus::Placed,
      payment_status: PaymentStatus::Pending,
      payment_method: c.payment_method.as_str().to_string(),
      shipping_address: c.shipping_address.clone(),
      coupon_code: c.applied_coupon.as_ref().map(|coupon| coupon.code.clone()),
      discount_amount: c.discount_amount,
    });
    (c.app_state.gateway.clone(), new_order)
  });
  let new_order = new_order.ok_or_else(|| AppError::Internal("Order number was not reserved".into()))?;

  let order = gateway.insert_order(new_order).await?;
  info!(order_id = %order.id, order_number = %order.order_number, "Order row inserted.");
  ctx.write().order = Some(order);
  Ok(PipelineControl::Continue)
}

// Best effort: if this fails too, an order without items is left behind.
async fn delete_order(ctx: ContextData<CheckoutCtxData>) -> Result<(), AppError> {
  let (gateway, order) = ctx.with(|c| (c.app_state.gateway.clone(), c.order.clone()));
  let Some(order) = order else {
    return Ok(());
  };
  warn!(order_id = %order.id, order_number = %order.order_number, "Deleting order after failed item insert.");
  gateway.delete_order(order.id).await.map_err(|e| {
    error!(order_id = %order.id, error = %e, "Orphaned order could not be deleted.");
    AppError::from(e)
  })?;
  ctx.write().order = None;
  Ok(())
}

async fn insert_order_items(ctx: ContextData<CheckoutCtxData>) -> Result<PipelineControl, AppError> {
  let (gateway, items) = ctx.with(|c| {
    let items: Option<Vec<NewOrderItem>> = c.order.as_ref().map(|order| {
      c.cart_lines
        .iter()
        .map(|line| NewOrderItem {
          order_id: order.id,
          product_id: line.row.product_id,
          quantity: line.row.quantity,
          // Price snapshot; later product price changes do not touch it.
          price_at_purchase: line.product.price,
        })
        .collect()
    });
    (c.app_state.gateway.clone(), items)
  });
  let items = items.ok_or_else(|| AppError::Internal("Order row missing before item insert".into()))?;

  let inserted = gateway.insert_order_items(items).await?;
  info!(count = inserted.len(), "Order items inserted.");
  let mut guard = ctx.write();
  if let Some(order) = guard.order.as_mut() {
    order.items = inserted.clone();
  }
  guard.items = inserted;
  Ok(PipelineControl::Continue)
}

async fn record_status_history(ctx: ContextData<CheckoutCtxData>) -> Result<PipelineControl, AppError> {
  let (gateway, order_id) = ctx.with(|c| (c.app_state.gateway.clone(), c.order.as_ref().map(|o| o.id)));
  let Some(order_id) = order_id else {
    return Ok(PipelineControl::Continue);
  };
  gateway
    .append_status_history(NewStatusHistory::new(order_id, OrderStatus::Placed, PLACED_NOTE))
    .await?;
  ctx.write().history_recorded = true;
  Ok(PipelineControl::Continue)
}

async fn clear_cart(ctx: ContextData<CheckoutCtxData>) -> Result<PipelineControl, AppError> {
  let (gateway, user_id) = ctx.with(|c| (c.app_state.gateway.clone(), c.user_id));
  gateway.clear_cart(user_id).await?;
  ctx.write().cart_cleared = true;
  Ok(PipelineControl::Continue)
}
