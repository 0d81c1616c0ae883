// storefront/src/pipelines/cart_pipeline.rs

use crate::errors::AppError;
use crate::models::NewCartRow;
use crate::pipelines::contexts::AddToCartCtxData;
use hubflow::{ContextData, Pipeline, PipelineControl};
use tracing::{info, warn};

pub fn build_add_to_cart_pipeline() -> Pipeline<AddToCartCtxData, AppError> {
  let mut p = Pipeline::<AddToCartCtxData, AppError>::new(&[
    ("require_login", false),
    ("validate_quantity", false),
    ("fetch_product", false),
    ("check_stock", false),
    ("upsert_cart_line", false),
    ("refresh_cart_count", true), // Badge only; the line is already saved.
  ]);

  p.on_root("require_login", require_login);
  p.on_root("validate_quantity", validate_quantity);
  p.on_root("fetch_product", fetch_product);
  p.on_root("check_stock", check_stock);
  p.on_root("upsert_cart_line", upsert_cart_line);
  p.on_root("refresh_cart_count", refresh_cart_count);
  p
}

// Anonymous callers get a login prompt instead of a queued action.
async fn require_login(ctx: ContextData<AddToCartCtxData>) -> Result<PipelineControl, AppError> {
  if ctx.with(|c| c.user_id).is_none() {
    info!("Add to cart requested without a signed-in user.");
    return Err(AppError::LoginRequired);
  }
  Ok(PipelineControl::Continue)
}

async fn validate_quantity(ctx: ContextData<AddToCartCtxData>) -> Result<PipelineControl, AppError> {
  let quantity = ctx.with(|c| c.quantity);
  if quantity < 1 {
    warn!(quantity, "Add to cart rejected: quantity must be positive.");
    return Err(AppError::Validation("Quantity must be at least 1".to_string()));
  }
  Ok(PipelineControl::Continue)
}

async fn fetch_product(ctx: ContextData<AddToCartCtxData>) -> Result<PipelineControl, AppError> {
  let (gateway, product_id) = ctx.with(|c| (c.app_state.gateway.clone(), c.product_id));
  let product = gateway.get_product(product_id).await?;
  if !product.is_listed() {
    warn!(%product_id, "Product is not listed for sale.");
    return Err(AppError::NotFound(format!("Product {} is not available", product_id)));
  }
  ctx.write().product = Some(product);
  Ok(PipelineControl::Continue)
}

async fn check_stock(ctx: ContextData<AddToCartCtxData>) -> Result<PipelineControl, AppError> {
  let (title, stock, quantity) = ctx.with(|c| {
    let product = c.product.as_ref();
    (
      product.map(|p| p.title.clone()).unwrap_or_default(),
      product.map_or(0, |p| p.stock_quantity),
      c.quantity,
    )
  });
  if stock <= 0 {
    return Err(AppError::OutOfStock { title });
  }
  if quantity > stock {
    return Err(AppError::Validation(format!("Only {} left in stock", stock)));
  }
  Ok(PipelineControl::Continue)
}

async fn upsert_cart_line(ctx: ContextData<AddToCartCtxData>) -> Result<PipelineControl, AppError> {
  let (gateway, new_row) = ctx.with(|c| {
    (
      c.app_state.gateway.clone(),
      c.user_id.map(|user_id| NewCartRow {
        user_id,
        product_id: c.product_id,
        quantity: c.quantity,
      }),
    )
  });
  let new_row = new_row.ok_or(AppError::LoginRequired)?;
  // Overwrites the quantity of an existing line for the same product.
  let row = gateway.upsert_cart_line(new_row).await?;
  info!(cart_line_id = %row.id, quantity = row.quantity, "Cart line saved.");
  ctx.write().cart_line = Some(row);
  Ok(PipelineControl::Continue)
}

async fn refresh_cart_count(ctx: ContextData<AddToCartCtxData>) -> Result<PipelineControl, AppError> {
  let (gateway, user_id) = ctx.with(|c| (c.app_state.gateway.clone(), c.user_id));
  let Some(user_id) = user_id else {
    return Ok(PipelineControl::Continue);
  };
  let count = gateway.list_cart(user_id).await?.len();
  ctx.write().cart_count = Some(count);
  Ok(PipelineControl::Continue)
}
