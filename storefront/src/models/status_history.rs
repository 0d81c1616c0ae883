// storefront/src/models/status_history.rs

use super::order::OrderStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Append-only log row; never updated or deleted by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusHistory {
  pub id: Uuid,
  pub order_id: Uuid,
  pub status: OrderStatus,
  pub notes: Option<String>,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewStatusHistory {
  pub order_id: Uuid,
  pub status: OrderStatus,
  pub notes: Option<String>,
}

impl NewStatusHistory {
  pub fn new(order_id: Uuid, status: OrderStatus, notes: impl Into<String>) -> Self {
    Self {
      order_id,
      status,
      notes: Some(notes.into()),
    }
  }
}
