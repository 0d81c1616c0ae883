// storefront/src/pipelines/payment_pipeline.rs

//! One payment attempt against a placed order: processing delay, charge,
//! write the resulting statuses, append one history row.

use crate::errors::AppError;
use crate::models::{NewStatusHistory, OrderStatus, OrderUpdate, PaymentStatus};
use crate::pipelines::contexts::PaymentCtxData;
use crate::services::payment_service::ChargeOutcome;
use hubflow::{ContextData, Pipeline, PipelineControl};
use tracing::{info, warn};

pub fn build_payment_pipeline() -> Pipeline<PaymentCtxData, AppError> {
  let mut p = Pipeline::<PaymentCtxData, AppError>::new(&[
    ("simulate_processing", false),
    ("charge", false),
    ("write_order_status", false),
    ("append_status_history", true),
  ]);

  p.on_root("simulate_processing", simulate_processing);
  p.on_root("charge", charge);
  p.on_root("write_order_status", write_order_status);
  p.on_root("append_status_history", append_status_history);
  p
}

/// Order columns and history note for a charge outcome.
pub fn resolution(outcome: &ChargeOutcome) -> (OrderUpdate, &'static str) {
  match outcome {
    ChargeOutcome::Approved { payment_status } => {
      let note = match payment_status {
        PaymentStatus::Pending => "Payment pending (COD)",
        _ => "Payment successful",
      };
      (
        OrderUpdate {
          status: Some(OrderStatus::Confirmed),
          payment_status: Some(*payment_status),
        },
        note,
      )
    }
    ChargeOutcome::Declined { .. } => (
      OrderUpdate {
        status: Some(OrderStatus::Cancelled),
        payment_status: Some(PaymentStatus::Failed),
      },
      "Payment failed",
    ),
  }
}

// Purely visual; not a settlement wait.
async fn simulate_processing(ctx: ContextData<PaymentCtxData>) -> Result<PipelineControl, AppError> {
  let delay = ctx.with(|c| c.app_state.config.payment_delay);
  tokio::time::sleep(delay).await;
  Ok(PipelineControl::Continue)
}

async fn charge(ctx: ContextData<PaymentCtxData>) -> Result<PipelineControl, AppError> {
  let (provider, order) = ctx.with(|c| (c.provider.clone(), c.order.clone()));
  let outcome = provider.charge(&order).await?;
  match &outcome {
    ChargeOutcome::Approved { payment_status } => {
      info!(order_number = %order.order_number, payment_status = payment_status.as_str(), "Charge approved.")
    }
    ChargeOutcome::Declined { reason } => {
      warn!(order_number = %order.order_number, %reason, "Charge declined.")
    }
  }
  ctx.write().outcome = Some(outcome);
  Ok(PipelineControl::Continue)
}

async fn write_order_status(ctx: ContextData<PaymentCtxData>) -> Result<PipelineControl, AppError> {
  let (gateway, order_id, outcome) = ctx.with(|c| (c.app_state.gateway.clone(), c.order.id, c.outcome.clone()));
  let outcome = outcome.ok_or_else(|| AppError::Internal("No charge outcome to record".into()))?;
  let (update, _) = resolution(&outcome);
  let updated = gateway.update_order(order_id, update).await?;
  ctx.write().updated_order = Some(updated);
  Ok(PipelineControl::Continue)
}

async fn append_status_history(ctx: ContextData<PaymentCtxData>) -> Result<PipelineControl, AppError> {
  let (gateway, updated, outcome) = ctx.with(|c| (c.app_state.gateway.clone(), c.updated_order.clone(), c.outcome.clone()));
  let (Some(updated), Some(outcome)) = (updated, outcome) else {
    return Ok(PipelineControl::Continue);
  };
  let (_, note) = resolution(&outcome);
  let row = gateway
    .append_status_history(NewStatusHistory::new(updated.id, updated.status, note))
    .await?;
  ctx.write().history = Some(row);
  Ok(PipelineControl::Continue)
}
