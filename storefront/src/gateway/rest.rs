// storefront/src/gateway/rest.rs

//! PostgREST-style client for the hosted store backend.
//!
//! Tables live under `/rest/v1/<table>` and procedures under
//! `/rest/v1/rpc/<name>`. Every request carries the project `apikey` and a
//! bearer token (the user's access token when signed in, else the api key).

use super::{GatewayError, GatewayResult, StoreGateway};
use crate::models::{
  Batch, CartLine, CartRow, CouponValidation, Institute, LeaderboardEntry, NewCartRow, NewOrder, NewOrderItem,
  NewStatusHistory, Order, OrderItem, OrderStatusHistory, OrderUpdate, Product, ProductCategory, ProfileUpdate,
  StudyMaterial, UserProfile,
};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

const ORDER_WITH_ITEMS: &str = "*,order_items(*,store_products(*))";

pub struct RestGateway {
  base_url: String,
  api_key: String,
  access_token: Option<String>,
  client: reqwest::Client,
}

impl RestGateway {
  pub fn new(base_url: &str, api_key: impl Into<String>, access_token: Option<String>) -> GatewayResult<Self> {
    // No request timeout: a stuck call keeps its caller waiting.
    let client = reqwest::Client::builder().build()?;
    Ok(Self {
      base_url: base_url.trim_end_matches('/').to_string(),
      api_key: api_key.into(),
      access_token,
      client,
    })
  }

  fn table_url(&self, table: &str) -> String {
    format!("{}/rest/v1/{}", self.base_url, table)
  }

  fn rpc_url(&self, procedure: &str) -> String {
    format!("{}/rest/v1/rpc/{}", self.base_url, procedure)
  }

  fn request(&self, method: Method, url: &str) -> RequestBuilder {
    let token = self.access_token.as_deref().unwrap_or(&self.api_key);
    self
      .client
      .request(method, url)
      .header("apikey", &self.api_key)
      .bearer_auth(token)
  }

  /// A write whose response body is the affected rows.
  fn write(&self, method: Method, url: &str) -> RequestBuilder {
    self.request(method, url).header("Prefer", "return=representation")
  }

  async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> GatewayResult<T> {
    let resp = req.send().await?;
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
      let message = error_message(status.as_u16(), &body);
      warn!(status = status.as_u16(), %message, "Store backend rejected request");
      return Err(GatewayError::Api {
        status: status.as_u16(),
        message,
      });
    }
    serde_json::from_str(&body).map_err(|e| GatewayError::Decode(e.to_string()))
  }

  async fn send_empty(&self, req: RequestBuilder) -> GatewayResult<()> {
    let resp = req.send().await?;
    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(GatewayError::Api {
        status: status.as_u16(),
        message: error_message(status.as_u16(), &body),
      });
    }
    Ok(())
  }

  /// Like `.single()`: the representation must contain exactly one row.
  async fn send_single<T: DeserializeOwned>(&self, req: RequestBuilder, table: &str) -> GatewayResult<T> {
    let mut rows: Vec<T> = self.send(req).await?;
    match rows.len() {
      1 => Ok(rows.remove(0)),
      0 => Err(GatewayError::NotFound(table.to_string())),
      n => Err(GatewayError::Decode(format!("expected one row from '{}', got {}", table, n))),
    }
  }
}

/// Pulls the `message` field out of a PostgREST error body, falling back to
/// the raw body and then to the status code.
fn error_message(status: u16, body: &str) -> String {
  if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
    if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
      return message.to_string();
    }
  }
  let trimmed = body.trim();
  if trimmed.is_empty() {
    format!("Request failed with status {}", status)
  } else {
    trimmed.to_string()
  }
}

fn eq(value: impl std::fmt::Display) -> String {
  format!("eq.{}", value)
}

#[async_trait]
impl StoreGateway for RestGateway {
  #[instrument(skip(self))]
  async fn list_products(&self, category: Option<ProductCategory>) -> GatewayResult<Vec<Product>> {
    let mut query = vec![
      ("select", "*".to_string()),
      ("approval_status", eq("approved")),
      ("is_available", eq(true)),
      ("order", "created_at.desc".to_string()),
    ];
    if let Some(category) = category {
      query.push(("category", eq(category)));
    }
    self
      .send(self.request(Method::GET, &self.table_url("store_products")).query(&query))
      .await
  }

  async fn get_product(&self, product_id: Uuid) -> GatewayResult<Product> {
    let req = self
      .request(Method::GET, &self.table_url("store_products"))
      .query(&[("select", "*".to_string()), ("id", eq(product_id))]);
    self.send_single(req, "store_products").await
  }

  async fn list_cart(&self, user_id: Uuid) -> GatewayResult<Vec<CartLine>> {
    let req = self.request(Method::GET, &self.table_url("shopping_cart")).query(&[
      ("select", "*,store_products(*)".to_string()),
      ("user_id", eq(user_id)),
      ("order", "added_at.desc".to_string()),
    ]);
    self.send(req).await
  }

  #[instrument(skip(self), fields(user_id = %line.user_id, product_id = %line.product_id))]
  async fn upsert_cart_line(&self, line: NewCartRow) -> GatewayResult<CartRow> {
    let req = self
      .request(Method::POST, &self.table_url("shopping_cart"))
      .header("Prefer", "return=representation,resolution=merge-duplicates")
      .query(&[("on_conflict", "user_id,product_id")])
      .json(&line);
    self.send_single(req, "shopping_cart").await
  }

  async fn update_cart_quantity(&self, cart_line_id: Uuid, quantity: i32) -> GatewayResult<CartRow> {
    let req = self
      .write(Method::PATCH, &self.table_url("shopping_cart"))
      .query(&[("id", eq(cart_line_id))])
      .json(&json!({ "quantity": quantity }));
    self.send_single(req, "shopping_cart").await
  }

  async fn delete_cart_line(&self, cart_line_id: Uuid) -> GatewayResult<()> {
    let req = self
      .request(Method::DELETE, &self.table_url("shopping_cart"))
      .query(&[("id", eq(cart_line_id))]);
    self.send_empty(req).await
  }

  async fn clear_cart(&self, user_id: Uuid) -> GatewayResult<()> {
    let req = self
      .request(Method::DELETE, &self.table_url("shopping_cart"))
      .query(&[("user_id", eq(user_id))]);
    self.send_empty(req).await
  }

  #[instrument(skip(self))]
  async fn validate_coupon(&self, code: &str, cart_total: Decimal) -> GatewayResult<CouponValidation> {
    let req = self
      .request(Method::POST, &self.rpc_url("validate_coupon"))
      .json(&json!({ "p_code": code, "p_cart_total": cart_total }));
    self.send(req).await
  }

  async fn generate_order_number(&self) -> GatewayResult<String> {
    let order_number: String = self
      .send(self.request(Method::POST, &self.rpc_url("generate_order_number")).json(&json!({})))
      .await?;
    debug!(%order_number, "Order number issued");
    Ok(order_number)
  }

  #[instrument(skip_all, fields(order_number = %order.order_number))]
  async fn insert_order(&self, order: NewOrder) -> GatewayResult<Order> {
    let req = self.write(Method::POST, &self.table_url("orders")).json(&order);
    self.send_single(req, "orders").await
  }

  async fn insert_order_items(&self, items: Vec<NewOrderItem>) -> GatewayResult<Vec<OrderItem>> {
    let req = self.write(Method::POST, &self.table_url("order_items")).json(&items);
    self.send(req).await
  }

  async fn update_order(&self, order_id: Uuid, update: OrderUpdate) -> GatewayResult<Order> {
    let req = self
      .write(Method::PATCH, &self.table_url("orders"))
      .query(&[("id", eq(order_id))])
      .json(&update);
    self.send_single(req, "orders").await
  }

  async fn delete_order(&self, order_id: Uuid) -> GatewayResult<()> {
    let req = self
      .request(Method::DELETE, &self.table_url("orders"))
      .query(&[("id", eq(order_id))]);
    self.send_empty(req).await
  }

  async fn get_order(&self, order_id: Uuid) -> GatewayResult<Order> {
    let req = self
      .request(Method::GET, &self.table_url("orders"))
      .query(&[("select", ORDER_WITH_ITEMS.to_string()), ("id", eq(order_id))]);
    self.send_single(req, "orders").await
  }

  async fn list_orders(&self, user_id: Uuid) -> GatewayResult<Vec<Order>> {
    let req = self.request(Method::GET, &self.table_url("orders")).query(&[
      ("select", ORDER_WITH_ITEMS.to_string()),
      ("user_id", eq(user_id)),
      ("order", "created_at.desc".to_string()),
    ]);
    self.send(req).await
  }

  async fn append_status_history(&self, entry: NewStatusHistory) -> GatewayResult<OrderStatusHistory> {
    let req = self
      .write(Method::POST, &self.table_url("order_status_history"))
      .json(&entry);
    self.send_single(req, "order_status_history").await
  }

  async fn list_status_history(&self, order_id: Uuid) -> GatewayResult<Vec<OrderStatusHistory>> {
    let req = self
      .request(Method::GET, &self.table_url("order_status_history"))
      .query(&[
        ("select", "*".to_string()),
        ("order_id", eq(order_id)),
        ("order", "created_at.asc".to_string()),
      ]);
    self.send(req).await
  }

  async fn get_profile(&self, user_id: Uuid) -> GatewayResult<UserProfile> {
    let req = self
      .request(Method::GET, &self.table_url("user_profiles"))
      .query(&[("select", "*".to_string()), ("id", eq(user_id))]);
    self.send_single(req, "user_profiles").await
  }

  async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> GatewayResult<UserProfile> {
    let req = self
      .write(Method::PATCH, &self.table_url("user_profiles"))
      .query(&[("id", eq(user_id))])
      .json(&update);
    self.send_single(req, "user_profiles").await
  }

  async fn leaderboard(&self, limit: usize) -> GatewayResult<Vec<LeaderboardEntry>> {
    let req = self.request(Method::GET, &self.table_url("user_profiles")).query(&[
      ("select", "id,username,email,total_xp".to_string()),
      ("order", "total_xp.desc".to_string()),
      ("limit", limit.to_string()),
    ]);
    self.send(req).await
  }

  async fn list_institutes(&self) -> GatewayResult<Vec<Institute>> {
    let req = self.request(Method::GET, &self.table_url("institutes")).query(&[
      ("select", "*".to_string()),
      ("is_active", eq(true)),
      ("order", "name.asc".to_string()),
    ]);
    self.send(req).await
  }

  async fn list_batches(&self, institute_id: Uuid) -> GatewayResult<Vec<Batch>> {
    let req = self.request(Method::GET, &self.table_url("batches")).query(&[
      ("select", "*".to_string()),
      ("institute_id", eq(institute_id)),
      ("is_active", eq(true)),
      ("order", "name.asc".to_string()),
    ]);
    self.send(req).await
  }

  #[instrument(skip(self))]
  async fn list_materials(&self, batch_id: Uuid) -> GatewayResult<Vec<StudyMaterial>> {
    let req = self.request(Method::GET, &self.table_url("study_materials")).query(&[
      ("select", "*".to_string()),
      ("batch_id", eq(batch_id)),
      ("order", "created_at.desc".to_string()),
    ]);
    self.send(req).await
  }
}
