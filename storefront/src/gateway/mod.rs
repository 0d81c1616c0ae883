// storefront/src/gateway/mod.rs

//! The remote data gateway: table-style CRUD and named procedures against
//! the store backend. All persistent state lives behind this trait.

pub mod memory;
pub mod rest;

use crate::models::{
  Batch, CartLine, CartRow, CouponValidation, Institute, LeaderboardEntry, NewCartRow, NewOrder, NewOrderItem,
  NewStatusHistory, Order, OrderItem, OrderStatusHistory, OrderUpdate, Product, ProductCategory, ProfileUpdate,
  StudyMaterial, UserProfile,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryGateway;
pub use rest::RestGateway;

#[derive(Debug, Error)]
pub enum GatewayError {
  #[error("Network error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("Backend returned {status}: {message}")]
  Api { status: u16, message: String },

  #[error("No rows found in '{0}'")]
  NotFound(String),

  #[error("Could not decode backend response: {0}")]
  Decode(String),

  #[error("Constraint violated: {0}")]
  Constraint(String),
}

impl GatewayError {
  /// The raw message for a user-facing alert.
  pub fn user_message(&self) -> String {
    match self {
      GatewayError::Api { message, .. } => message.clone(),
      GatewayError::Constraint(message) => message.clone(),
      other => other.to_string(),
    }
  }
}

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

#[async_trait]
pub trait StoreGateway: Send + Sync {
  // --- products ---
  /// Approved and available products, newest first.
  async fn list_products(&self, category: Option<ProductCategory>) -> GatewayResult<Vec<Product>>;
  async fn get_product(&self, product_id: Uuid) -> GatewayResult<Product>;

  // --- shopping cart ---
  /// The user's cart lines joined with their products, most recently added first.
  async fn list_cart(&self, user_id: Uuid) -> GatewayResult<Vec<CartLine>>;
  /// Inserts or overwrites the line for `(user_id, product_id)`.
  async fn upsert_cart_line(&self, line: NewCartRow) -> GatewayResult<CartRow>;
  async fn update_cart_quantity(&self, cart_line_id: Uuid, quantity: i32) -> GatewayResult<CartRow>;
  async fn delete_cart_line(&self, cart_line_id: Uuid) -> GatewayResult<()>;
  async fn clear_cart(&self, user_id: Uuid) -> GatewayResult<()>;

  // --- procedures ---
  /// `code` is sent as given; callers normalize it.
  async fn validate_coupon(&self, code: &str, cart_total: Decimal) -> GatewayResult<CouponValidation>;
  async fn generate_order_number(&self) -> GatewayResult<String>;

  // --- orders ---
  async fn insert_order(&self, order: NewOrder) -> GatewayResult<Order>;
  async fn insert_order_items(&self, items: Vec<NewOrderItem>) -> GatewayResult<Vec<OrderItem>>;
  async fn update_order(&self, order_id: Uuid, update: OrderUpdate) -> GatewayResult<Order>;
  async fn delete_order(&self, order_id: Uuid) -> GatewayResult<()>;
  /// The order with its items and their products.
  async fn get_order(&self, order_id: Uuid) -> GatewayResult<Order>;
  /// The user's orders with items, newest first.
  async fn list_orders(&self, user_id: Uuid) -> GatewayResult<Vec<Order>>;

  // --- status history ---
  async fn append_status_history(&self, entry: NewStatusHistory) -> GatewayResult<OrderStatusHistory>;
  /// Oldest first.
  async fn list_status_history(&self, order_id: Uuid) -> GatewayResult<Vec<OrderStatusHistory>>;

  // --- user profiles ---
  async fn get_profile(&self, user_id: Uuid) -> GatewayResult<UserProfile>;
  async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> GatewayResult<UserProfile>;
  /// Profiles ordered by `total_xp`, highest first.
  async fn leaderboard(&self, limit: usize) -> GatewayResult<Vec<LeaderboardEntry>>;

  // --- study content ---
  /// Active institutes ordered by name.
  async fn list_institutes(&self) -> GatewayResult<Vec<Institute>>;
  /// Active batches of one institute ordered by name.
  async fn list_batches(&self, institute_id: Uuid) -> GatewayResult<Vec<Batch>>;
  /// Newest first.
  async fn list_materials(&self, batch_id: Uuid) -> GatewayResult<Vec<StudyMaterial>>;
}
