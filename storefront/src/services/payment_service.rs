// storefront/src/services/payment_service.rs

//! Payment for a placed order. Providers sit behind `PaymentProvider`; the
//! shipped ones are simulations (cash on delivery, a random UPI outcome).

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::models::{Order, OrderStatus, PaymentMethod, PaymentStatus};
use crate::pipelines::contexts::PaymentCtxData;
use crate::pipelines::payment_pipeline::build_payment_pipeline;
use crate::state::AppState;
use async_trait::async_trait;
use hubflow::{ContextData, Pipeline, PipelineResult};
use rand::Rng;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargeOutcome {
  /// `payment_status` is what the order records: `Pending` for cash not yet
  /// collected, `Success` for a settled charge.
  Approved { payment_status: PaymentStatus },
  Declined { reason: String },
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
  fn method(&self) -> PaymentMethod;

  /// An `Err` means the charge could not be attempted; a refused charge is
  /// `Ok(ChargeOutcome::Declined)`.
  async fn charge(&self, order: &Order) -> Result<ChargeOutcome>;
}

/// Always approved; cash is collected at delivery.
#[derive(Debug, Clone, Copy, Default)]
pub struct CashOnDelivery;

#[async_trait]
impl PaymentProvider for CashOnDelivery {
  fn method(&self) -> PaymentMethod {
    PaymentMethod::Cod
  }

  async fn charge(&self, _order: &Order) -> Result<ChargeOutcome> {
    Ok(ChargeOutcome::Approved {
      payment_status: PaymentStatus::Pending,
    })
  }
}

/// Approves with probability `success_rate`, drawn fresh on every charge.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedUpi {
  success_rate: f64,
}

impl SimulatedUpi {
  pub fn new(success_rate: f64) -> Result<Self> {
    if !(0.0..=1.0).contains(&success_rate) {
      return Err(AppError::Config(format!(
        "UPI success rate must be between 0 and 1, got {}",
        success_rate
      )));
    }
    Ok(Self { success_rate })
  }
}

#[async_trait]
impl PaymentProvider for SimulatedUpi {
  fn method(&self) -> PaymentMethod {
    PaymentMethod::Upi
  }

  async fn charge(&self, order: &Order) -> Result<ChargeOutcome> {
    let approved = rand::thread_rng().gen_bool(self.success_rate);
    info!(order_number = %order.order_number, approved, "Simulated UPI charge.");
    if approved {
      Ok(ChargeOutcome::Approved {
        payment_status: PaymentStatus::Success,
      })
    } else {
      Ok(ChargeOutcome::Declined {
        reason: "UPI transaction was declined".to_string(),
      })
    }
  }
}

/// One provider per checkout payment method.
#[derive(Clone)]
pub struct PaymentProviders {
  cod: Arc<dyn PaymentProvider>,
  upi: Arc<dyn PaymentProvider>,
}

impl PaymentProviders {
  pub fn new(cod: Arc<dyn PaymentProvider>, upi: Arc<dyn PaymentProvider>) -> Self {
    Self { cod, upi }
  }

  pub fn simulated(config: &AppConfig) -> Result<Self> {
    Ok(Self::new(
      Arc::new(CashOnDelivery),
      Arc::new(SimulatedUpi::new(config.upi_success_rate)?),
    ))
  }

  pub fn for_method(&self, method: PaymentMethod) -> Arc<dyn PaymentProvider> {
    match method {
      PaymentMethod::Cod => self.cod.clone(),
      PaymentMethod::Upi => self.upi.clone(),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentPhase {
  Pending,
  Processing,
  Success,
  Failed,
}

#[derive(Clone)]
pub struct PaymentService {
  app_state: AppState,
  providers: PaymentProviders,
  pipeline: Arc<Pipeline<PaymentCtxData, AppError>>,
}

impl PaymentService {
  pub fn new(app_state: AppState, providers: PaymentProviders) -> Self {
    Self {
      app_state,
      providers,
      pipeline: Arc::new(build_payment_pipeline()),
    }
  }

  /// Loads the order and picks the provider for its payment method. A paid
  /// order, or one already confirmed past payment, cannot be paid again.
  #[instrument(skip(self), err(Display))]
  pub async fn open_session(&self, order_id: Uuid) -> Result<PaymentSession> {
    let order = self.app_state.gateway.get_order(order_id).await?;
    let method = order.method().ok_or_else(|| {
      AppError::InvalidState(format!(
        "Order {} has unsupported payment method {:?}",
        order.order_number, order.payment_method
      ))
    })?;
    let settled = order.payment_status == PaymentStatus::Success
      || matches!(
        order.status,
        OrderStatus::Confirmed | OrderStatus::Processing | OrderStatus::Shipped | OrderStatus::Delivered
      );
    if settled {
      return Err(AppError::InvalidState(format!(
        "Order {} has already been paid for",
        order.order_number
      )));
    }
    Ok(PaymentSession {
      app_state: self.app_state.clone(),
      pipeline: self.pipeline.clone(),
      provider: self.providers.for_method(method),
      order,
      phase: PaymentPhase::Pending,
      last_outcome: None,
    })
  }
}

/// Payment state for one order: `Pending -> Processing -> Success | Failed`,
/// and `Failed -> Pending` through `retry`. Retrying reuses the same order.
pub struct PaymentSession {
  app_state: AppState,
  pipeline: Arc<Pipeline<PaymentCtxData, AppError>>,
  provider: Arc<dyn PaymentProvider>,
  order: Order,
  phase: PaymentPhase,
  last_outcome: Option<ChargeOutcome>,
}

impl std::fmt::Debug for PaymentSession {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("PaymentSession")
      .field("order", &self.order)
      .field("phase", &self.phase)
      .field("last_outcome", &self.last_outcome)
      .finish_non_exhaustive()
  }
}

impl PaymentSession {
  pub fn phase(&self) -> PaymentPhase {
    self.phase
  }

  pub fn order(&self) -> &Order {
    &self.order
  }

  pub fn last_outcome(&self) -> Option<&ChargeOutcome> {
    self.last_outcome.as_ref()
  }

  #[instrument(skip(self), fields(order_number = %self.order.order_number), err(Display))]
  pub async fn process(&mut self) -> Result<PaymentPhase> {
    if self.phase != PaymentPhase::Pending {
      return Err(AppError::InvalidState(format!(
        "Payment can only start from pending, current phase is {:?}",
        self.phase
      )));
    }
    self.phase = PaymentPhase::Processing;

    let ctx = ContextData::new(PaymentCtxData::new(
      self.app_state.clone(),
      self.provider.clone(),
      self.order.clone(),
    ));
    let run = self.pipeline.run(ctx.clone()).await;

    let (outcome, updated) = ctx.with(|c| (c.outcome.clone(), c.updated_order.clone()));
    match (run, outcome, updated) {
      (Ok(PipelineResult::Completed), Some(outcome), Some(updated)) => {
        self.phase = match outcome {
          ChargeOutcome::Approved { .. } => PaymentPhase::Success,
          ChargeOutcome::Declined { .. } => PaymentPhase::Failed,
        };
        self.order = updated;
        self.last_outcome = Some(outcome);
        info!(phase = ?self.phase, status = %self.order.status, "Payment resolved.");
        Ok(self.phase)
      }
      (Err(e), _, _) => {
        warn!(error = %e, "Payment processing failed.");
        self.phase = PaymentPhase::Failed;
        Err(AppError::Payment(e.to_string()))
      }
      _ => {
        self.phase = PaymentPhase::Failed;
        Err(AppError::Payment("Payment did not resolve".to_string()))
      }
    }
  }

  /// `Failed -> Pending`. The next `process` draws a fresh outcome.
  pub fn retry(&mut self) -> Result<()> {
    if self.phase != PaymentPhase::Failed {
      return Err(AppError::InvalidState(format!(
        "Retry is only possible after a failed payment, current phase is {:?}",
        self.phase
      )));
    }
    self.phase = PaymentPhase::Pending;
    self.last_outcome = None;
    Ok(())
  }
}
