// storefront/src/state.rs
use crate::config::AppConfig;
use crate::gateway::StoreGateway;
use std::sync::Arc;

/// Handles shared by every service; passed in explicitly, never global.
#[derive(Clone)]
pub struct AppState {
  pub gateway: Arc<dyn StoreGateway>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  pub fn new(gateway: Arc<dyn StoreGateway>, config: AppConfig) -> Self {
    Self {
      gateway,
      config: Arc::new(config),
    }
  }
}
