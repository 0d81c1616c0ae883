// storefront/src/main.rs

//! Headless session: wires the configured backend into the services, prints
//! the catalog and cart for the signed-in user, then keeps the profile
//! refresher and XP tracker running until Ctrl-C.

use std::sync::Arc;
use storefront::config::{AppConfig, Backend};
use storefront::errors::Result as AppResult;
use storefront::gateway::{MemoryGateway, RestGateway, StoreGateway};
use storefront::preferences::{JsonFileStore, ThemePreference};
use storefront::services::cart_service::{cart_total, format_inr};
use storefront::services::{CartService, CatalogService, ProfileService, StudyService};
use storefront::state::AppState;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use uuid::Uuid;

#[tokio::main]
async fn main() -> AppResult<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting storefront session...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => cfg,
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(e);
    }
  };

  let user_id = app_config.user_id;
  let gateway: Arc<dyn StoreGateway> = match &app_config.backend {
    Backend::Remote {
      url,
      api_key,
      access_token,
    } => {
      tracing::info!(%url, "Using remote store backend.");
      Arc::new(RestGateway::new(url, api_key.clone(), access_token.clone())?)
    }
    Backend::Memory if app_config.seed_demo_data => {
      let demo_user = user_id.unwrap_or_else(Uuid::new_v4);
      tracing::info!(%demo_user, "Using in-memory backend with demo data.");
      Arc::new(MemoryGateway::with_demo_data(demo_user))
    }
    Backend::Memory => {
      tracing::info!("Using empty in-memory backend.");
      Arc::new(MemoryGateway::new())
    }
  };

  let theme = ThemePreference::load(JsonFileStore::new(app_config.preferences_path.clone())).await;
  tracing::info!(theme = theme.mode().as_str(), "Theme preference loaded.");

  let app_state = AppState::new(gateway, app_config);
  let catalog = CatalogService::new(app_state.clone());
  let products = catalog.list_products("all").await?;
  tracing::info!(count = products.len(), "Catalog loaded.");
  for product in &products {
    tracing::info!(
      title = %product.title,
      category = %product.category,
      price = %format_inr(product.price),
      stock = product.stock_quantity,
      "Product."
    );
  }

  let Some(user_id) = user_id else {
    tracing::info!("No signed-in user; catalog only.");
    return Ok(());
  };

  let carts = CartService::new(app_state.clone());
  let lines = carts.load(user_id).await?;
  tracing::info!(
    lines = lines.len(),
    total = %format_inr(cart_total(&lines)),
    "Cart summary."
  );

  let materials = StudyService::new(app_state.clone()).materials_for_user(user_id).await?;
  tracing::info!(count = materials.len(), "Library loaded.");

  let profiles = ProfileService::new(app_state.clone());
  let config = app_state.config.clone();
  let refresher = profiles.spawn_refresher(user_id, config.profile_refresh_interval);
  let mut xp = profiles.xp_tracker(user_id, config.xp_interval, config.xp_per_interval);
  xp.start();

  let mut updates = refresher.subscribe();
  loop {
    tokio::select! {
      changed = updates.changed() => {
        if changed.is_err() {
          break;
        }
        if let Some(profile) = updates.borrow_and_update().clone() {
          tracing::info!(total_xp = profile.total_xp, "Profile refreshed.");
        }
      }
      _ = tokio::signal::ctrl_c() => {
        tracing::info!("Interrupted, ending session.");
        break;
      }
    }
  }

  xp.stop();
  tracing::info!(awarded_xp = xp.awarded(), "Session ended.");
  Ok(())
}
