// storefront/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

/// Where persistent state lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
  /// Hosted PostgREST-style backend.
  Remote {
    url: String,
    api_key: String,
    access_token: Option<String>,
  },
  /// In-process reference backend.
  Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub backend: Backend,
  /// The signed-in user, if any.
  pub user_id: Option<Uuid>,

  /// Visual processing delay before a payment resolves.
  pub payment_delay: Duration,
  /// Probability in `[0, 1]` that a simulated UPI charge is approved.
  pub upi_success_rate: f64,

  pub profile_refresh_interval: Duration,
  pub xp_interval: Duration,
  pub xp_per_interval: i64,

  pub preferences_path: PathBuf,
  pub seed_demo_data: bool,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      backend: Backend::Memory,
      user_id: None,
      payment_delay: Duration::from_millis(3000),
      upi_success_rate: 0.9,
      profile_refresh_interval: Duration::from_secs(30),
      xp_interval: Duration::from_secs(120),
      xp_per_interval: 1,
      preferences_path: PathBuf::from("material_hub_preferences.json"),
      seed_demo_data: false,
    }
  }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match lookup(name) {
    Some(raw) => raw
      .trim()
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", name, raw, e))),
    None => Ok(default),
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| env::var(name).ok().filter(|v| !v.is_empty()))
  }

  /// Builds the config from any variable source; unset variables take defaults.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let defaults = Self::default();

    let backend = match lookup("STORE_API_URL") {
      Some(url) => {
        let api_key = lookup("STORE_API_KEY")
          .ok_or_else(|| AppError::Config("STORE_API_KEY is required when STORE_API_URL is set".into()))?;
        Backend::Remote {
          url,
          api_key,
          access_token: lookup("STORE_ACCESS_TOKEN"),
        }
      }
      None => Backend::Memory,
    };

    let user_id = match lookup("STORE_USER_ID") {
      Some(raw) => Some(
        Uuid::parse_str(raw.trim()).map_err(|e| AppError::Config(format!("Invalid STORE_USER_ID: {}", e)))?,
      ),
      None => None,
    };

    let upi_success_rate: f64 = parse_var(&lookup, "UPI_SUCCESS_RATE", defaults.upi_success_rate)?;
    if !(0.0..=1.0).contains(&upi_success_rate) {
      return Err(AppError::Config(format!(
        "UPI_SUCCESS_RATE must be between 0 and 1, got {}",
        upi_success_rate
      )));
    }

    let xp_interval_secs: u64 = parse_var(&lookup, "XP_INTERVAL_SECS", defaults.xp_interval.as_secs())?;
    let refresh_secs: u64 = parse_var(
      &lookup,
      "PROFILE_REFRESH_SECS",
      defaults.profile_refresh_interval.as_secs(),
    )?;
    if xp_interval_secs == 0 || refresh_secs == 0 {
      return Err(AppError::Config("Timer intervals must be at least one second".into()));
    }

    let config = Self {
      backend,
      user_id,
      payment_delay: Duration::from_millis(parse_var(&lookup, "PAYMENT_DELAY_MS", defaults.payment_delay.as_millis() as u64)?),
      upi_success_rate,
      profile_refresh_interval: Duration::from_secs(refresh_secs),
      xp_interval: Duration::from_secs(xp_interval_secs),
      xp_per_interval: parse_var(&lookup, "XP_PER_INTERVAL", defaults.xp_per_interval)?,
      preferences_path: lookup("PREFERENCES_PATH")
        .map(PathBuf::from)
        .unwrap_or(defaults.preferences_path),
      seed_demo_data: parse_var(&lookup, "SEED_DEMO_DATA", defaults.seed_demo_data)?,
    };

    tracing::info!(
      remote = matches!(config.backend, Backend::Remote { .. }),
      signed_in = config.user_id.is_some(),
      "Application configuration loaded successfully."
    );
    Ok(config)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |name| map.get(name).cloned()
  }

  #[test]
  fn empty_environment_gives_memory_backend_and_defaults() {
    let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(config.backend, Backend::Memory);
    assert_eq!(config.payment_delay, Duration::from_millis(3000));
    assert_eq!(config.profile_refresh_interval, Duration::from_secs(30));
    assert_eq!(config.xp_interval, Duration::from_secs(120));
    assert_eq!(config.xp_per_interval, 1);
    assert!((config.upi_success_rate - 0.9).abs() < f64::EPSILON);
    assert!(config.user_id.is_none());
    assert!(!config.seed_demo_data);
  }

  #[test]
  fn remote_backend_requires_api_key() {
    let err = AppConfig::from_lookup(lookup_from(&[("STORE_API_URL", "https://x.example.co")])).unwrap_err();
    assert!(matches!(err, AppError::Config(_)));

    let config = AppConfig::from_lookup(lookup_from(&[
      ("STORE_API_URL", "https://x.example.co"),
      ("STORE_API_KEY", "anon-key"),
    ]))
    .unwrap();
    assert_eq!(
      config.backend,
      Backend::Remote {
        url: "https://x.example.co".into(),
        api_key: "anon-key".into(),
        access_token: None,
      }
    );
  }

  #[test]
  fn invalid_values_are_config_errors() {
    for (name, value) in [
      ("UPI_SUCCESS_RATE", "1.5"),
      ("PAYMENT_DELAY_MS", "soon"),
      ("STORE_USER_ID", "not-a-uuid"),
      ("XP_INTERVAL_SECS", "0"),
      ("SEED_DEMO_DATA", "yes"),
    ] {
      let result = AppConfig::from_lookup(lookup_from(&[(name, value)]));
      assert!(matches!(result, Err(AppError::Config(_))), "{} = {}", name, value);
    }
  }
}
