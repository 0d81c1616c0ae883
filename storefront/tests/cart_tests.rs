// tests/cart_tests.rs
mod common;

use common::*;
use rust_decimal::Decimal;
use serial_test::serial;
use storefront::errors::AppError;
use storefront::services::cart_service::cart_total;
use storefront::services::CartService;

#[tokio::test]
#[serial]
async fn test_adding_same_product_twice_overwrites_quantity() {
  setup_tracing();
  let store = TestStore::new();
  let product_id = store.add_product("Physics Notes", 120, 10);
  let carts = CartService::new(store.app_state.clone());

  carts.add_to_cart(Some(store.user_id), product_id, 2).await.unwrap();
  let added = carts.add_to_cart(Some(store.user_id), product_id, 3).await.unwrap();

  let lines = carts.load(store.user_id).await.unwrap();
  assert_eq!(lines.len(), 1);
  assert_eq!(lines[0].row.quantity, 3);
  assert_eq!(added.line.quantity, 3);
  assert_eq!(added.cart_count, Some(1));
}

#[tokio::test]
#[serial]
async fn test_quantity_below_one_is_rejected_without_remote_call() {
  setup_tracing();
  let store = TestStore::new();
  let product_id = store.add_product("Graph Paper", 40, 10);
  let carts = CartService::new(store.app_state.clone());
  let added = carts.add_to_cart(Some(store.user_id), product_id, 2).await.unwrap();

  let err = carts.update_quantity(store.user_id, added.line.id, 0).await.unwrap_err();

  assert!(matches!(err, AppError::Validation(_)));
  assert_eq!(store.gateway.call_count("update_cart_quantity"), 0);
  let lines = carts.load(store.user_id).await.unwrap();
  assert_eq!(lines[0].row.quantity, 2);
}

#[tokio::test]
#[serial]
async fn test_update_quantity_returns_reloaded_cart() {
  setup_tracing();
  let store = TestStore::new();
  let product_id = store.add_product("Graph Paper", 40, 10);
  let carts = CartService::new(store.app_state.clone());
  let added = carts.add_to_cart(Some(store.user_id), product_id, 1).await.unwrap();

  let lines = carts.update_quantity(store.user_id, added.line.id, 4).await.unwrap();

  assert_eq!(lines[0].row.quantity, 4);
  assert_eq!(cart_total(&lines), Decimal::from(160));
}

#[tokio::test]
#[serial]
async fn test_anonymous_add_requires_login_and_touches_nothing() {
  setup_tracing();
  let store = TestStore::new();
  let product_id = store.add_product("Physics Notes", 120, 10);
  let carts = CartService::new(store.app_state.clone());

  let err = carts.add_to_cart(None, product_id, 1).await.unwrap_err();

  assert!(matches!(err, AppError::LoginRequired));
  assert_eq!(err.alert().title, "Login Required");
  assert!(store.gateway.calls().is_empty());
}

#[tokio::test]
#[serial]
async fn test_out_of_stock_product_cannot_be_added() {
  setup_tracing();
  let store = TestStore::new();
  let product_id = store.add_product("Sold Out Bundle", 300, 0);
  let carts = CartService::new(store.app_state.clone());

  let err = carts.add_to_cart(Some(store.user_id), product_id, 1).await.unwrap_err();

  match &err {
    AppError::OutOfStock { title } => assert_eq!(title, "Sold Out Bundle"),
    other => panic!("expected OutOfStock, got {:?}", other),
  }
  assert_eq!(err.alert().message, "This item is currently unavailable");
  assert_eq!(store.gateway.call_count("upsert_cart_line"), 0);
}

#[tokio::test]
#[serial]
async fn test_cart_count_refresh_failure_still_saves_line() {
  setup_tracing();
  let store = TestStore::new();
  let product_id = store.add_product("Physics Notes", 120, 10);
  let carts = CartService::new(store.app_state.clone());
  store.gateway.fail_on("list_cart");

  let added = carts.add_to_cart(Some(store.user_id), product_id, 1).await.unwrap();

  assert_eq!(added.cart_count, None);
  assert_eq!(added.line.quantity, 1);
}

#[tokio::test]
#[serial]
async fn test_removal_only_happens_on_confirm() {
  setup_tracing();
  let store = TestStore::new();
  let first = store.add_product("Physics Notes", 120, 10);
  let second = store.add_product("Chemistry Notes", 90, 10);
  let carts = CartService::new(store.app_state.clone());
  carts.add_to_cart(Some(store.user_id), first, 1).await.unwrap();
  carts.add_to_cart(Some(store.user_id), second, 1).await.unwrap();
  let lines = carts.load(store.user_id).await.unwrap();
  let target = lines.iter().find(|l| l.row.product_id == first).unwrap();

  let cancelled = carts.request_removal(store.user_id, target);
  assert_eq!(cancelled.prompt(), "Remove Physics Notes from cart?");
  drop(cancelled);
  assert_eq!(carts.cart_count(store.user_id).await.unwrap(), 2);

  let remaining = carts.request_removal(store.user_id, target).confirm().await.unwrap();
  assert_eq!(remaining.len(), 1);
  assert_eq!(remaining[0].row.product_id, second);
}

#[tokio::test]
#[serial]
async fn test_clear_empties_the_cart() {
  setup_tracing();
  let store = TestStore::new();
  let product_id = store.add_product("Physics Notes", 120, 10);
  let carts = CartService::new(store.app_state.clone());
  carts.add_to_cart(Some(store.user_id), product_id, 1).await.unwrap();

  carts.clear(store.user_id).await.unwrap();

  assert_eq!(carts.cart_count(store.user_id).await.unwrap(), 0);
}

#[tokio::test]
#[serial]
async fn test_increment_is_limited_by_stock_read_at_load() {
  setup_tracing();
  let store = TestStore::new();
  let product_id = store.add_product("Geometry Box", 150, 3);
  let carts = CartService::new(store.app_state.clone());
  carts.add_to_cart(Some(store.user_id), product_id, 2).await.unwrap();
  let loaded = carts.load(store.user_id).await.unwrap();
  assert!(loaded[0].can_increment());

  store.memory.set_product_stock(product_id, 2).unwrap();
  assert!(loaded[0].can_increment());

  let reloaded = carts.load(store.user_id).await.unwrap();
  assert!(!reloaded[0].can_increment());

  let full = carts.update_quantity(store.user_id, reloaded[0].row.id, 2).await.unwrap();
  assert_eq!(full[0].row.quantity, full[0].product.stock_quantity);
  assert!(!full[0].can_increment());
}

#[tokio::test]
#[serial]
async fn test_second_add_for_same_product_is_busy_while_first_in_flight() {
  setup_tracing();
  let store = TestStore::new();
  let product_id = store.add_product("Physics Notes", 120, 10);
  let carts = CartService::new(store.app_state.clone());
  let gate = store.gateway.hold("get_product");

  let first = tokio::spawn({
    let carts = carts.clone();
    let user_id = store.user_id;
    async move { carts.add_to_cart(Some(user_id), product_id, 1).await }
  });
  while store.gateway.call_count("get_product") == 0 {
    tokio::task::yield_now().await;
  }

  let err = carts.add_to_cart(Some(store.user_id), product_id, 2).await.unwrap_err();
  assert!(matches!(err, AppError::Busy(_)));
  assert_eq!(store.gateway.call_count("get_product"), 1);

  gate.notify_one();
  let added = first.await.unwrap().unwrap();
  assert_eq!(added.line.quantity, 1);
}

#[tokio::test]
#[serial]
async fn test_failed_add_releases_the_product_for_retry() {
  setup_tracing();
  let store = TestStore::new();
  let product_id = store.add_product("Physics Notes", 120, 10);
  let carts = CartService::new(store.app_state.clone());
  store.gateway.fail_on("upsert_cart_line");

  let err = carts.add_to_cart(Some(store.user_id), product_id, 1).await.unwrap_err();
  assert!(matches!(err, AppError::Remote(_)));

  store.gateway.recover("upsert_cart_line");
  let added = carts.add_to_cart(Some(store.user_id), product_id, 1).await.unwrap();
  assert_eq!(added.line.quantity, 1);
  assert_eq!(carts.cart_count(store.user_id).await.unwrap(), 1);
}
