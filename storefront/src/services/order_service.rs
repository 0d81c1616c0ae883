// storefront/src/services/order_service.rs

use crate::errors::{AppError, Result};
use crate::models::{Order, OrderStatusHistory};
use crate::state::AppState;
use crate::tracking::TrackingView;
use tracing::instrument;
use uuid::Uuid;

/// An order, its full status history and the milestone projection.
#[derive(Debug, Clone)]
pub struct OrderTracking {
  pub order: Order,
  pub history: Vec<OrderStatusHistory>,
  pub view: TrackingView,
}

#[derive(Clone)]
pub struct OrderService {
  app_state: AppState,
}

impl OrderService {
  pub fn new(app_state: AppState) -> Self {
    Self { app_state }
  }

  /// The user's orders, newest first.
  pub async fn list_orders(&self, user_id: Uuid) -> Result<Vec<Order>> {
    Ok(self.app_state.gateway.list_orders(user_id).await?)
  }

  pub async fn order_details(&self, user_id: Uuid, order_id: Uuid) -> Result<Order> {
    let order = self.app_state.gateway.get_order(order_id).await?;
    if order.user_id != user_id {
      return Err(AppError::NotFound(format!("Order {} not found", order_id)));
    }
    Ok(order)
  }

  /// Another user's order reads as not found, same as `order_details`.
  #[instrument(skip(self), err(Display))]
  pub async fn tracking(&self, user_id: Uuid, order_id: Uuid) -> Result<OrderTracking> {
    let gateway = &self.app_state.gateway;
    let (order, history) = futures_util::try_join!(
      gateway.get_order(order_id),
      gateway.list_status_history(order_id)
    )?;
    if order.user_id != user_id {
      return Err(AppError::NotFound(format!("Order {} not found", order_id)));
    }
    let view = TrackingView::project(order.status, &history);
    Ok(OrderTracking { order, history, view })
  }
}
