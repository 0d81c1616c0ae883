// storefront/src/services/catalog_service.rs

use crate::errors::{AppError, Result};
use crate::models::{Product, ProductCategory};
use crate::state::AppState;
use uuid::Uuid;

/// `"all"` (or blank) means no category filter.
pub fn parse_category_filter(filter: &str) -> Result<Option<ProductCategory>> {
  match filter.trim() {
    "" | "all" => Ok(None),
    other => other.parse::<ProductCategory>().map(Some).map_err(AppError::Validation),
  }
}

#[derive(Clone)]
pub struct CatalogService {
  app_state: AppState,
}

impl CatalogService {
  pub fn new(app_state: AppState) -> Self {
    Self { app_state }
  }

  /// Approved, available products, newest first.
  pub async fn list_products(&self, category_filter: &str) -> Result<Vec<Product>> {
    let category = parse_category_filter(category_filter)?;
    Ok(self.app_state.gateway.list_products(category).await?)
  }

  pub async fn product_details(&self, product_id: Uuid) -> Result<Product> {
    let product = self.app_state.gateway.get_product(product_id).await?;
    if !product.is_listed() {
      return Err(AppError::NotFound(format!("Product {} is not available", product_id)));
    }
    Ok(product)
  }
}
