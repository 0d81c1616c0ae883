// storefront/src/tracking.rs

//! Read-only projection of an order's status and history onto the five
//! delivery milestones.

use crate::models::{OrderStatus, OrderStatusHistory};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Milestone {
  pub status: OrderStatus,
  pub label: &'static str,
}

pub const MILESTONES: [Milestone; 5] = [
  Milestone { status: OrderStatus::Placed, label: "Order Placed" },
  Milestone { status: OrderStatus::Confirmed, label: "Confirmed" },
  Milestone { status: OrderStatus::Processing, label: "Processing" },
  Milestone { status: OrderStatus::Shipped, label: "Shipped" },
  Milestone { status: OrderStatus::Delivered, label: "Delivered" },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MilestoneView {
  pub status: OrderStatus,
  pub label: &'static str,
  pub completed: bool,
  pub current: bool,
  /// `None` for a completed milestone with no matching history row.
  pub reached_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrackingView {
  /// No stepper is shown for cancelled orders.
  Cancelled,
  Progress { current_index: usize, steps: Vec<MilestoneView> },
}

impl TrackingView {
  pub fn project(status: OrderStatus, history: &[OrderStatusHistory]) -> Self {
    if status == OrderStatus::Cancelled {
      return TrackingView::Cancelled;
    }
    let current_index = MILESTONES.iter().position(|m| m.status == status).unwrap_or(0);

    let steps = MILESTONES
      .iter()
      .enumerate()
      .map(|(idx, milestone)| {
        let completed = idx <= current_index;
        let reached_at = if completed {
          history.iter().find(|h| h.status == milestone.status).map(|h| h.created_at)
        } else {
          None
        };
        MilestoneView {
          status: milestone.status,
          label: milestone.label,
          completed,
          current: idx == current_index,
          reached_at,
        }
      })
      .collect();

    TrackingView::Progress { current_index, steps }
  }

  pub fn current(&self) -> Option<&MilestoneView> {
    match self {
      TrackingView::Cancelled => None,
      TrackingView::Progress { current_index, steps } => steps.get(*current_index),
    }
  }
}
