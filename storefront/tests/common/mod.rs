// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use storefront::config::AppConfig;
use storefront::gateway::{GatewayError, GatewayResult, MemoryGateway, StoreGateway};
use storefront::models::{
  ApprovalStatus, Batch, CartLine, CartRow, Coupon, CouponValidation, DiscountType, Institute, LeaderboardEntry,
  NewCartRow, NewOrder, NewOrderItem, NewStatusHistory, Order, OrderItem, OrderStatusHistory, OrderUpdate, Product,
  ProductCategory, ProfileUpdate, ShippingAddress, StudyMaterial, UserProfile,
};
use storefront::state::AppState;
use tokio::sync::Notify;
use tracing::Level;
use uuid::Uuid;

/// Wraps a `MemoryGateway`, records every call by operation name and can be
/// told to fail or hold chosen operations.
pub struct RecordingGateway {
  pub inner: Arc<MemoryGateway>,
  failing: Mutex<HashSet<&'static str>>,
  held: Mutex<HashMap<&'static str, Arc<Notify>>>,
  calls: Mutex<Vec<&'static str>>,
}

impl RecordingGateway {
  pub fn new(inner: Arc<MemoryGateway>) -> Self {
    Self {
      inner,
      failing: Mutex::new(HashSet::new()),
      held: Mutex::new(HashMap::new()),
      calls: Mutex::new(Vec::new()),
    }
  }

  pub fn fail_on(&self, operation: &'static str) {
    self.failing.lock().insert(operation);
  }

  pub fn recover(&self, operation: &'static str) {
    self.failing.lock().remove(operation);
  }

  /// Calls to `operation` wait until the returned gate is notified.
  pub fn hold(&self, operation: &'static str) -> Arc<Notify> {
    let gate = Arc::new(Notify::new());
    self.held.lock().insert(operation, gate.clone());
    gate
  }

  pub fn calls(&self) -> Vec<&'static str> {
    self.calls.lock().clone()
  }

  pub fn call_count(&self, operation: &str) -> usize {
    self.calls.lock().iter().filter(|c| **c == operation).count()
  }

  async fn enter(&self, operation: &'static str) -> GatewayResult<()> {
    self.calls.lock().push(operation);
    let gate = self.held.lock().get(operation).cloned();
    if let Some(gate) = gate {
      gate.notified().await;
    }
    if self.failing.lock().contains(operation) {
      return Err(GatewayError::Api {
        status: 503,
        message: format!("{} unavailable", operation),
      });
    }
    Ok(())
  }
}

#[async_trait]
impl StoreGateway for RecordingGateway {
  async fn list_products(&self, category: Option<ProductCategory>) -> GatewayResult<Vec<Product>> {
    self.enter("list_products").await?;
    self.inner.list_products(category).await
  }

  async fn get_product(&self, product_id: Uuid) -> GatewayResult<Product> {
    self.enter("get_product").await?;
    self.inner.get_product(product_id).await
  }

  async fn list_cart(&self, user_id: Uuid) -> GatewayResult<Vec<CartLine>> {
    self.enter("list_cart").await?;
    self.inner.list_cart(user_id).await
  }

  async fn upsert_cart_line(&self, line: NewCartRow) -> GatewayResult<CartRow> {
    self.enter("upsert_cart_line").await?;
    self.inner.upsert_cart_line(line).await
  }

  async fn update_cart_quantity(&self, cart_line_id: Uuid, quantity: i32) -> GatewayResult<CartRow> {
    self.enter("update_cart_quantity").await?;
    self.inner.update_cart_quantity(cart_line_id, quantity).await
  }

  async fn delete_cart_line(&self, cart_line_id: Uuid) -> GatewayResult<()> {
    self.enter("delete_cart_line").await?;
    self.inner.delete_cart_line(cart_line_id).await
  }

  async fn clear_cart(&self, user_id: Uuid) -> GatewayResult<()> {
    self.enter("clear_cart").await?;
    self.inner.clear_cart(user_id).await
  }

  async fn validate_coupon(&self, code: &str, cart_total: Decimal) -> GatewayResult<CouponValidation> {
    self.enter("validate_coupon").await?;
    self.inner.validate_coupon(code, cart_total).await
  }

  async fn generate_order_number(&self) -> GatewayResult<String> {
    self.enter("generate_order_number").await?;
    self.inner.generate_order_number().await
  }

  async fn insert_order(&self, order: NewOrder) -> GatewayResult<Order> {
    self.enter("insert_order").await?;
    self.inner.insert_order(order).await
  }

  async fn insert_order_items(&self, items: Vec<NewOrderItem>) -> GatewayResult<Vec<OrderItem>> {
    self.enter("insert_order_items").await?;
    self.inner.insert_order_items(items).await
  }

  async fn update_order(&self, order_id: Uuid, update: OrderUpdate) -> GatewayResult<Order> {
    self.enter("update_order").await?;
    self.inner.update_order(order_id, update).await
  }

  async fn delete_order(&self, order_id: Uuid) -> GatewayResult<()> {
    self.enter("delete_order").await?;
    self.inner.delete_order(order_id).await
  }

  async fn get_order(&self, order_id: Uuid) -> GatewayResult<Order> {
    self.enter("get_order").await?;
    self.inner.get_order(order_id).await
  }

  async fn list_orders(&self, user_id: Uuid) -> GatewayResult<Vec<Order>> {
    self.enter("list_orders").await?;
    self.inner.list_orders(user_id).await
  }

  async fn append_status_history(&self, entry: NewStatusHistory) -> GatewayResult<OrderStatusHistory> {
    self.enter("append_status_history").await?;
    self.inner.append_status_history(entry).await
  }

  async fn list_status_history(&self, order_id: Uuid) -> GatewayResult<Vec<OrderStatusHistory>> {
    self.enter("list_status_history").await?;
    self.inner.list_status_history(order_id).await
  }

  async fn get_profile(&self, user_id: Uuid) -> GatewayResult<UserProfile> {
    self.enter("get_profile").await?;
    self.inner.get_profile(user_id).await
  }

  async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> GatewayResult<UserProfile> {
    self.enter("update_profile").await?;
    self.inner.update_profile(user_id, update).await
  }

  async fn leaderboard(&self, limit: usize) -> GatewayResult<Vec<LeaderboardEntry>> {
    self.enter("leaderboard").await?;
    self.inner.leaderboard(limit).await
  }

  async fn list_institutes(&self) -> GatewayResult<Vec<Institute>> {
    self.enter("list_institutes").await?;
    self.inner.list_institutes().await
  }

  async fn list_batches(&self, institute_id: Uuid) -> GatewayResult<Vec<Batch>> {
    self.enter("list_batches").await?;
    self.inner.list_batches(institute_id).await
  }

  async fn list_materials(&self, batch_id: Uuid) -> GatewayResult<Vec<StudyMaterial>> {
    self.enter("list_materials").await?;
    self.inner.list_materials(batch_id).await
  }
}

/// A store with one signed-in user and nothing else.
pub struct TestStore {
  pub memory: Arc<MemoryGateway>,
  pub gateway: Arc<RecordingGateway>,
  pub app_state: AppState,
  pub user_id: Uuid,
}

impl TestStore {
  pub fn new() -> Self {
    Self::with_config(test_config())
  }

  pub fn with_config(config: AppConfig) -> Self {
    let memory = Arc::new(MemoryGateway::new());
    let gateway = Arc::new(RecordingGateway::new(memory.clone()));
    let user_id = Uuid::new_v4();
    memory.seed_profile(profile(user_id, "student", 0));
    let app_state = AppState::new(gateway.clone(), config);
    Self {
      memory,
      gateway,
      app_state,
      user_id,
    }
  }

  /// Seeds an approved, available product and returns its id.
  pub fn add_product(&self, title: &str, price: i64, stock: i32) -> Uuid {
    let product = product(title, Decimal::from(price), stock);
    let id = product.id;
    self.memory.seed_product(product);
    id
  }
}

/// No processing delay, UPI always approved unless a test says otherwise.
pub fn test_config() -> AppConfig {
  AppConfig {
    payment_delay: Duration::ZERO,
    upi_success_rate: 1.0,
    ..AppConfig::default()
  }
}

pub fn product(title: &str, price: Decimal, stock: i32) -> Product {
  Product {
    id: Uuid::new_v4(),
    title: title.to_string(),
    description: None,
    category: ProductCategory::Book,
    price,
    original_price: None,
    image_url: None,
    stock_quantity: stock,
    is_available: true,
    approval_status: ApprovalStatus::Approved,
    created_at: Utc::now(),
  }
}

pub fn profile(user_id: Uuid, username: &str, total_xp: i64) -> UserProfile {
  UserProfile {
    id: user_id,
    username: Some(username.to_string()),
    email: format!("{}@example.com", username),
    total_xp,
    selected_institute_id: None,
    selected_batch_id: None,
    last_active_at: None,
  }
}

pub fn flat_coupon(code: &str, amount: i64, min_purchase: i64) -> Coupon {
  Coupon {
    id: Uuid::new_v4(),
    code: code.to_string(),
    discount_type: DiscountType::Flat,
    discount_value: Decimal::from(amount),
    min_purchase_amount: Decimal::from(min_purchase),
    max_discount_amount: None,
    usage_limit: None,
    used_count: 0,
    is_active: true,
    expires_at: None,
    created_at: Utc::now(),
  }
}

pub fn percentage_coupon(code: &str, percent: i64, cap: Option<i64>) -> Coupon {
  Coupon {
    discount_type: DiscountType::Percentage,
    discount_value: Decimal::from(percent),
    min_purchase_amount: Decimal::ZERO,
    max_discount_amount: cap.map(Decimal::from),
    ..flat_coupon(code, 0, 0)
  }
}

pub fn valid_address() -> ShippingAddress {
  ShippingAddress {
    full_name: "Asha Rao".into(),
    phone: "9876543210".into(),
    address: "12 MG Road".into(),
    city: "Bengaluru".into(),
    state: "Karnataka".into(),
    pincode: "560001".into(),
  }
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
