// storefront/src/gateway/memory.rs

//! In-process store backend. It carries the server-side rules that live in
//! the remote procedures (coupon eligibility, order numbering) so a session
//! can run offline and tests can exercise full flows.

use super::{GatewayError, GatewayResult, StoreGateway};
use crate::models::{
  ApprovalStatus, Batch, CartLine, CartRow, Coupon, CouponValidation, DiscountType, Institute, LeaderboardEntry,
  NewCartRow, NewOrder, NewOrderItem, NewStatusHistory, Order, OrderItem, OrderStatusHistory, OrderUpdate, Product,
  ProductCategory, ProfileUpdate, StudyMaterial, UserProfile,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::{debug, instrument};
use uuid::Uuid;

#[derive(Default)]
struct Tables {
  products: Vec<Product>,
  cart: Vec<CartRow>,
  coupons: Vec<Coupon>,
  orders: Vec<Order>,
  order_items: Vec<OrderItem>,
  history: Vec<OrderStatusHistory>,
  profiles: Vec<UserProfile>,
  institutes: Vec<Institute>,
  batches: Vec<Batch>,
  materials: Vec<StudyMaterial>,
  order_seq: u32,
}

impl Tables {
  fn product(&self, product_id: Uuid) -> GatewayResult<&Product> {
    self
      .products
      .iter()
      .find(|p| p.id == product_id)
      .ok_or_else(|| GatewayError::NotFound("store_products".into()))
  }

  fn order_with_items(&self, order: &Order) -> Order {
    let mut order = order.clone();
    order.items = self
      .order_items
      .iter()
      .filter(|item| item.order_id == order.id)
      .map(|item| {
        let mut item = item.clone();
        item.product = self.products.iter().find(|p| p.id == item.product_id).cloned();
        item
      })
      .collect();
    order
  }
}

#[derive(Default)]
pub struct MemoryGateway {
  tables: Mutex<Tables>,
}

impl MemoryGateway {
  pub fn new() -> Self {
    Self::default()
  }

  /// A small catalog, two coupons, a profile for `user_id` and one institute
  /// with two batches.
  pub fn with_demo_data(user_id: Uuid) -> Self {
    let gateway = Self::new();
    let now = Utc::now();
    let demo_products = [
      ("Concepts of Physics Vol. 1", ProductCategory::Book, 450, Some(550), 12),
      ("Organic Chemistry Handwritten Notes", ProductCategory::Notes, 199, None, 40),
      ("Geometry Box Pro", ProductCategory::Stationary, 150, Some(180), 25),
      ("Previous Year Papers Bundle", ProductCategory::Book, 300, None, 0),
    ];
    for (offset, (title, category, price, original, stock)) in demo_products.into_iter().enumerate() {
      gateway.seed_product(Product {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: None,
        category,
        price: Decimal::from(price),
        original_price: original.map(Decimal::from),
        image_url: None,
        stock_quantity: stock,
        is_available: true,
        approval_status: ApprovalStatus::Approved,
        created_at: now - Duration::days(offset as i64),
      });
    }
    gateway.seed_coupon(Coupon {
      id: Uuid::new_v4(),
      code: "SAVE20".into(),
      discount_type: DiscountType::Percentage,
      discount_value: Decimal::from(20),
      min_purchase_amount: Decimal::ZERO,
      max_discount_amount: Some(Decimal::from(100)),
      usage_limit: None,
      used_count: 0,
      is_active: true,
      expires_at: None,
      created_at: now,
    });
    gateway.seed_coupon(Coupon {
      id: Uuid::new_v4(),
      code: "FLAT50".into(),
      discount_type: DiscountType::Flat,
      discount_value: Decimal::from(50),
      min_purchase_amount: Decimal::from(200),
      max_discount_amount: None,
      usage_limit: Some(100),
      used_count: 0,
      is_active: true,
      expires_at: None,
      created_at: now,
    });
    gateway.seed_profile(UserProfile {
      id: user_id,
      username: Some("demo_student".into()),
      email: "demo@materialhub.app".into(),
      total_xp: 0,
      selected_institute_id: None,
      selected_batch_id: None,
      last_active_at: None,
    });
    let institute_id = Uuid::new_v4();
    gateway.seed_institute(Institute {
      id: institute_id,
      name: "Allen Career Institute".into(),
      description: None,
      is_active: true,
    });
    for (name, class_level, exam_type) in [("JEE Nurture", "11", "JEE"), ("NEET Leader", "12", "NEET")] {
      let batch_id = Uuid::new_v4();
      gateway.seed_batch(Batch {
        id: batch_id,
        institute_id,
        name: name.into(),
        class_level: class_level.into(),
        exam_type: exam_type.into(),
        description: None,
        is_active: true,
      });
      gateway.seed_material(StudyMaterial {
        id: Uuid::new_v4(),
        title: format!("{} Orientation Sheet", name),
        description: None,
        file_url: format!("https://example.com/materials/{}.pdf", batch_id),
        file_type: "pdf".into(),
        subject: None,
        chapter: None,
        batch_id: Some(batch_id),
        created_at: now,
      });
    }
    gateway
  }

  pub fn seed_product(&self, product: Product) {
    self.tables.lock().products.push(product);
  }

  /// Codes are stored uppercase.
  pub fn seed_coupon(&self, mut coupon: Coupon) {
    coupon.code = coupon.code.to_uppercase();
    self.tables.lock().coupons.push(coupon);
  }

  pub fn seed_profile(&self, profile: UserProfile) {
    let mut tables = self.tables.lock();
    tables.profiles.retain(|p| p.id != profile.id);
    tables.profiles.push(profile);
  }

  pub fn seed_institute(&self, institute: Institute) {
    self.tables.lock().institutes.push(institute);
  }

  pub fn seed_batch(&self, batch: Batch) {
    self.tables.lock().batches.push(batch);
  }

  pub fn seed_material(&self, material: StudyMaterial) {
    self.tables.lock().materials.push(material);
  }

  /// Overwrites a product's current price; placed orders keep their snapshot.
  pub fn set_product_price(&self, product_id: Uuid, price: Decimal) -> GatewayResult<()> {
    let mut tables = self.tables.lock();
    let product = tables
      .products
      .iter_mut()
      .find(|p| p.id == product_id)
      .ok_or_else(|| GatewayError::NotFound("store_products".into()))?;
    product.price = price;
    Ok(())
  }

  /// Changes stock behind any cart lines already loaded by a client.
  pub fn set_product_stock(&self, product_id: Uuid, stock_quantity: i32) -> GatewayResult<()> {
    let mut tables = self.tables.lock();
    let product = tables
      .products
      .iter_mut()
      .find(|p| p.id == product_id)
      .ok_or_else(|| GatewayError::NotFound("store_products".into()))?;
    product.stock_quantity = stock_quantity;
    Ok(())
  }

  pub fn coupon_used_count(&self, code: &str) -> Option<i32> {
    let code = code.to_uppercase();
    self.tables.lock().coupons.iter().find(|c| c.code == code).map(|c| c.used_count)
  }

  pub fn order_count(&self) -> usize {
    self.tables.lock().orders.len()
  }
}

#[async_trait]
impl StoreGateway for MemoryGateway {
  async fn list_products(&self, category: Option<ProductCategory>) -> GatewayResult<Vec<Product>> {
    let tables = self.tables.lock();
    let mut products: Vec<Product> = tables
      .products
      .iter()
      .filter(|p| p.is_listed() && category.map_or(true, |c| p.category == c))
      .cloned()
      .collect();
    products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(products)
  }

  async fn get_product(&self, product_id: Uuid) -> GatewayResult<Product> {
    self.tables.lock().product(product_id).cloned()
  }

  async fn list_cart(&self, user_id: Uuid) -> GatewayResult<Vec<CartLine>> {
    let tables = self.tables.lock();
    tables
      .cart
      .iter()
      .rev()
      .filter(|row| row.user_id == user_id)
      .map(|row| {
        Ok(CartLine {
          row: row.clone(),
          product: tables.product(row.product_id)?.clone(),
        })
      })
      .collect()
  }

  #[instrument(level = "debug", skip(self), fields(user_id = %line.user_id, product_id = %line.product_id))]
  async fn upsert_cart_line(&self, line: NewCartRow) -> GatewayResult<CartRow> {
    let mut tables = self.tables.lock();
    if let Some(existing) = tables
      .cart
      .iter_mut()
      .find(|row| row.user_id == line.user_id && row.product_id == line.product_id)
    {
      existing.quantity = line.quantity;
      debug!(cart_line_id = %existing.id, quantity = line.quantity, "Cart line overwritten");
      return Ok(existing.clone());
    }
    let row = CartRow {
      id: Uuid::new_v4(),
      user_id: line.user_id,
      product_id: line.product_id,
      quantity: line.quantity,
      added_at: Utc::now(),
    };
    tables.cart.push(row.clone());
    Ok(row)
  }

  async fn update_cart_quantity(&self, cart_line_id: Uuid, quantity: i32) -> GatewayResult<CartRow> {
    let mut tables = self.tables.lock();
    let row = tables
      .cart
      .iter_mut()
      .find(|row| row.id == cart_line_id)
      .ok_or_else(|| GatewayError::NotFound("shopping_cart".into()))?;
    row.quantity = quantity;
    Ok(row.clone())
  }

  async fn delete_cart_line(&self, cart_line_id: Uuid) -> GatewayResult<()> {
    self.tables.lock().cart.retain(|row| row.id != cart_line_id);
    Ok(())
  }

  async fn clear_cart(&self, user_id: Uuid) -> GatewayResult<()> {
    self.tables.lock().cart.retain(|row| row.user_id != user_id);
    Ok(())
  }

  async fn validate_coupon(&self, code: &str, cart_total: Decimal) -> GatewayResult<CouponValidation> {
    let tables = self.tables.lock();
    let verdict = match tables.coupons.iter().find(|c| c.code == code.to_uppercase()) {
      Some(coupon) => coupon.evaluate(cart_total, Utc::now()),
      None => CouponValidation::rejected("Invalid coupon code"),
    };
    Ok(verdict)
  }

  async fn generate_order_number(&self) -> GatewayResult<String> {
    let mut tables = self.tables.lock();
    tables.order_seq += 1;
    Ok(format!("ORD{}-{:04}", Utc::now().format("%Y%m%d"), tables.order_seq))
  }

  #[instrument(level = "debug", skip_all, fields(order_number = %order.order_number))]
  async fn insert_order(&self, order: NewOrder) -> GatewayResult<Order> {
    let mut tables = self.tables.lock();
    if tables.orders.iter().any(|o| o.order_number == order.order_number) {
      return Err(GatewayError::Constraint(format!(
        "duplicate key value violates unique constraint \"orders_order_number_key\" ({})",
        order.order_number
      )));
    }
    let created = Order {
      id: Uuid::new_v4(),
      user_id: order.user_id,
      order_number: order.order_number,
      total_amount: order.total_amount,
      status: order.status,
      payment_status: order.payment_status,
      payment_method: Some(order.payment_method),
      shipping_address: order.shipping_address,
      coupon_code: order.coupon_code,
      discount_amount: order.discount_amount,
      created_at: Utc::now(),
      items: Vec::new(),
    };
    tables.orders.push(created.clone());
    if let Some(code) = created.coupon_code.as_deref() {
      let code = code.to_uppercase();
      if let Some(coupon) = tables.coupons.iter_mut().find(|c| c.code == code) {
        coupon.used_count += 1;
        debug!(code = %coupon.code, used_count = coupon.used_count, "Coupon redeemed");
      }
    }
    Ok(created)
  }

  async fn insert_order_items(&self, items: Vec<NewOrderItem>) -> GatewayResult<Vec<OrderItem>> {
    let mut tables = self.tables.lock();
    // All or nothing, like a single multi-row INSERT.
    if let Some(orphan) = items.iter().find(|i| !tables.orders.iter().any(|o| o.id == i.order_id)) {
      return Err(GatewayError::Constraint(format!(
        "insert on table \"order_items\" violates foreign key constraint (order {})",
        orphan.order_id
      )));
    }
    let created: Vec<OrderItem> = items
      .into_iter()
      .map(|item| OrderItem {
        id: Uuid::new_v4(),
        order_id: item.order_id,
        product_id: item.product_id,
        quantity: item.quantity,
        price_at_purchase: item.price_at_purchase,
        product: None,
      })
      .collect();
    tables.order_items.extend(created.iter().cloned());
    Ok(created)
  }

  async fn update_order(&self, order_id: Uuid, update: OrderUpdate) -> GatewayResult<Order> {
    let mut tables = self.tables.lock();
    let order = tables
      .orders
      .iter_mut()
      .find(|o| o.id == order_id)
      .ok_or_else(|| GatewayError::NotFound("orders".into()))?;
    if let Some(status) = update.status {
      order.status = status;
    }
    if let Some(payment_status) = update.payment_status {
      order.payment_status = payment_status;
    }
    Ok(order.clone())
  }

  async fn delete_order(&self, order_id: Uuid) -> GatewayResult<()> {
    let mut tables = self.tables.lock();
    tables.orders.retain(|o| o.id != order_id);
    tables.order_items.retain(|i| i.order_id != order_id);
    tables.history.retain(|h| h.order_id != order_id);
    Ok(())
  }

  async fn get_order(&self, order_id: Uuid) -> GatewayResult<Order> {
    let tables = self.tables.lock();
    let order = tables
      .orders
      .iter()
      .find(|o| o.id == order_id)
      .ok_or_else(|| GatewayError::NotFound("orders".into()))?;
    Ok(tables.order_with_items(order))
  }

  async fn list_orders(&self, user_id: Uuid) -> GatewayResult<Vec<Order>> {
    let tables = self.tables.lock();
    Ok(
      tables
        .orders
        .iter()
        .rev()
        .filter(|o| o.user_id == user_id)
        .map(|o| tables.order_with_items(o))
        .collect(),
    )
  }

  async fn append_status_history(&self, entry: NewStatusHistory) -> GatewayResult<OrderStatusHistory> {
    let mut tables = self.tables.lock();
    if !tables.orders.iter().any(|o| o.id == entry.order_id) {
      return Err(GatewayError::Constraint(format!(
        "insert on table \"order_status_history\" violates foreign key constraint (order {})",
        entry.order_id
      )));
    }
    let row = OrderStatusHistory {
      id: Uuid::new_v4(),
      order_id: entry.order_id,
      status: entry.status,
      notes: entry.notes,
      created_at: Utc::now(),
    };
    tables.history.push(row.clone());
    Ok(row)
  }

  async fn list_status_history(&self, order_id: Uuid) -> GatewayResult<Vec<OrderStatusHistory>> {
    let tables = self.tables.lock();
    Ok(tables.history.iter().filter(|h| h.order_id == order_id).cloned().collect())
  }

  async fn get_profile(&self, user_id: Uuid) -> GatewayResult<UserProfile> {
    self
      .tables
      .lock()
      .profiles
      .iter()
      .find(|p| p.id == user_id)
      .cloned()
      .ok_or_else(|| GatewayError::NotFound("user_profiles".into()))
  }

  async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> GatewayResult<UserProfile> {
    let mut tables = self.tables.lock();
    let profile = tables
      .profiles
      .iter_mut()
      .find(|p| p.id == user_id)
      .ok_or_else(|| GatewayError::NotFound("user_profiles".into()))?;
    update.apply_to(profile);
    Ok(profile.clone())
  }

  async fn leaderboard(&self, limit: usize) -> GatewayResult<Vec<LeaderboardEntry>> {
    let tables = self.tables.lock();
    let mut entries: Vec<LeaderboardEntry> = tables
      .profiles
      .iter()
      .map(|p| LeaderboardEntry {
        id: p.id,
        username: p.username.clone(),
        email: p.email.clone(),
        total_xp: p.total_xp,
      })
      .collect();
    entries.sort_by(|a, b| b.total_xp.cmp(&a.total_xp));
    entries.truncate(limit);
    Ok(entries)
  }

  async fn list_institutes(&self) -> GatewayResult<Vec<Institute>> {
    let tables = self.tables.lock();
    let mut institutes: Vec<Institute> = tables.institutes.iter().filter(|i| i.is_active).cloned().collect();
    institutes.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(institutes)
  }

  async fn list_batches(&self, institute_id: Uuid) -> GatewayResult<Vec<Batch>> {
    let tables = self.tables.lock();
    let mut batches: Vec<Batch> = tables
      .batches
      .iter()
      .filter(|b| b.institute_id == institute_id && b.is_active)
      .cloned()
      .collect();
    batches.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(batches)
  }

  async fn list_materials(&self, batch_id: Uuid) -> GatewayResult<Vec<StudyMaterial>> {
    let tables = self.tables.lock();
    let mut materials: Vec<StudyMaterial> = tables
      .materials
      .iter()
      .filter(|m| m.batch_id == Some(batch_id))
      .cloned()
      .collect();
    materials.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(materials)
  }
}
