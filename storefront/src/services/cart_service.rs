// storefront/src/services/cart_service.rs

use crate::busy::{BusyFlag, BusySet};
use crate::errors::{AppError, Result};
use crate::models::{CartLine, CartRow};
use crate::pipelines::cart_pipeline::build_add_to_cart_pipeline;
use crate::pipelines::contexts::AddToCartCtxData;
use crate::state::AppState;
use hubflow::{ContextData, Pipeline, PipelineResult};
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Sum of price times quantity over all lines.
pub fn cart_total(lines: &[CartLine]) -> Decimal {
  lines.iter().map(CartLine::line_total).sum()
}

/// Rupee display string, truncated (not rounded) to two decimals.
pub fn format_inr(amount: Decimal) -> String {
  format!("₹{:.2}", amount.round_dp_with_strategy(2, RoundingStrategy::ToZero))
}

#[derive(Debug, Clone)]
pub struct AddedToCart {
  pub line: CartRow,
  /// Fresh line count for the badge, when the refresh succeeded.
  pub cart_count: Option<usize>,
}

#[derive(Clone)]
pub struct CartService {
  app_state: AppState,
  add_pipeline: Arc<Pipeline<AddToCartCtxData, AppError>>,
  adding: Arc<BusySet<Uuid>>,
  updating: Arc<BusySet<Uuid>>,
  clearing: BusyFlag,
}

impl CartService {
  pub fn new(app_state: AppState) -> Self {
    Self {
      app_state,
      add_pipeline: Arc::new(build_add_to_cart_pipeline()),
      adding: Arc::new(BusySet::new("add_to_cart")),
      updating: Arc::new(BusySet::new("update_cart_line")),
      clearing: BusyFlag::new("clear_cart"),
    }
  }

  /// Upserts the `(user, product)` line. An existing line's quantity is
  /// replaced by `quantity`, not added to.
  #[instrument(skip(self), err(Display))]
  pub async fn add_to_cart(&self, user_id: Option<Uuid>, product_id: Uuid, quantity: i32) -> Result<AddedToCart> {
    let _busy = self.adding.try_begin(product_id)?;
    let ctx = ContextData::new(AddToCartCtxData::new(
      self.app_state.clone(),
      user_id,
      product_id,
      quantity,
    ));
    match self.add_pipeline.run(ctx.clone()).await? {
      PipelineResult::Completed => {}
      PipelineResult::Stopped => return Err(AppError::Internal("Add to cart halted unexpectedly".into())),
    }
    let (line, cart_count) = ctx.with(|c| (c.cart_line.clone(), c.cart_count));
    let line = line.ok_or_else(|| AppError::Internal("Cart line missing after add".into()))?;
    Ok(AddedToCart { line, cart_count })
  }

  pub async fn load(&self, user_id: Uuid) -> Result<Vec<CartLine>> {
    Ok(self.app_state.gateway.list_cart(user_id).await?)
  }

  pub async fn cart_count(&self, user_id: Uuid) -> Result<usize> {
    Ok(self.load(user_id).await?.len())
  }

  /// Overwrites a line's quantity and returns the reloaded cart. Quantities
  /// below one are refused before any remote call. Stock is not re-checked
  /// here; see `CartLine::can_increment`.
  #[instrument(skip(self), err(Display))]
  pub async fn update_quantity(&self, user_id: Uuid, cart_line_id: Uuid, new_quantity: i32) -> Result<Vec<CartLine>> {
    if new_quantity < 1 {
      return Err(AppError::Validation("Quantity must be at least 1".to_string()));
    }
    let _busy = self.updating.try_begin(cart_line_id)?;
    self
      .app_state
      .gateway
      .update_cart_quantity(cart_line_id, new_quantity)
      .await?;
    self.load(user_id).await
  }

  /// Deleting a line needs the user's confirmation; this returns the prompt
  /// and only deletes on `confirm`. Dropping it cancels.
  pub fn request_removal(&self, user_id: Uuid, line: &CartLine) -> PendingRemoval<'_> {
    PendingRemoval {
      service: self,
      user_id,
      cart_line_id: line.row.id,
      product_title: line.product.title.clone(),
    }
  }

  pub async fn clear(&self, user_id: Uuid) -> Result<()> {
    let _busy = self.clearing.try_begin()?;
    self.app_state.gateway.clear_cart(user_id).await?;
    info!(%user_id, "Cart cleared.");
    Ok(())
  }
}

#[must_use = "nothing is removed until `confirm` is called"]
pub struct PendingRemoval<'a> {
  service: &'a CartService,
  user_id: Uuid,
  cart_line_id: Uuid,
  product_title: String,
}

impl PendingRemoval<'_> {
  pub fn prompt(&self) -> String {
    format!("Remove {} from cart?", self.product_title)
  }

  /// Deletes the line and returns the reloaded cart.
  pub async fn confirm(self) -> Result<Vec<CartLine>> {
    let _busy = self.service.updating.try_begin(self.cart_line_id)?;
    self.service.app_state.gateway.delete_cart_line(self.cart_line_id).await?;
    info!(cart_line_id = %self.cart_line_id, "Cart line removed.");
    self.service.load(self.user_id).await
  }
}
