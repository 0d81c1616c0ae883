// storefront/src/errors.rs

use crate::gateway::GatewayError;
use crate::models::order::AddressError;
use hubflow::FlowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Invalid Address: {0}")]
  Address(#[from] AddressError),

  #[error("Please login to add items to cart")]
  LoginRequired,

  #[error("{title} is currently unavailable")]
  OutOfStock { title: String },

  #[error("Cart is empty")]
  EmptyCart,

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Another '{0}' request is still in flight")]
  Busy(&'static str),

  #[error("Invalid State: {0}")]
  InvalidState(String),

  #[error("Payment Processing Error: {0}")]
  Payment(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Remote Call Error: {0}")]
  Remote(#[from] GatewayError),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Error: {0}")]
  Internal(String),
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    let err = match err.downcast::<AppError>() {
      Ok(app_err) => return app_err,
      Err(err) => err,
    };
    match err.downcast::<GatewayError>() {
      Ok(gateway_err) => AppError::Remote(gateway_err),
      Err(err) => AppError::Internal(err.to_string()),
    }
  }
}

/// What the user sees when an action fails: a short title and a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
  pub title: &'static str,
  pub message: String,
}

impl AppError {
  /// Maps the error onto a user-facing alert. Remote failures are surfaced
  /// with their raw message.
  pub fn alert(&self) -> Alert {
    tracing::error!(application_error = %self, "Surfacing error to user");
    let (title, message) = match self {
      AppError::Validation(m) => ("Error", m.clone()),
      AppError::Address(e) => ("Error", e.to_string()),
      AppError::LoginRequired => ("Login Required", self.to_string()),
      AppError::OutOfStock { .. } => ("Out of Stock", "This item is currently unavailable".to_string()),
      AppError::EmptyCart => ("Error", self.to_string()),
      AppError::NotFound(m) => ("Not Found", m.clone()),
      AppError::Busy(_) => ("Please Wait", "This action is already in progress".to_string()),
      AppError::InvalidState(m) => ("Error", m.clone()),
      AppError::Payment(_) => ("Payment Failed", "Payment processing failed. Please try again.".to_string()),
      AppError::Config(m) => ("Configuration Error", m.clone()),
      AppError::Remote(e) => ("Error", e.user_message()),
      AppError::Workflow { source } => {
        tracing::error!(flow_error_source = ?source, "Workflow error details");
        ("Error", source.to_string())
      }
      AppError::Internal(m) => ("Error", m.clone()),
    };
    Alert { title, message }
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
