// storefront/src/preferences.rs

//! Small persisted client preferences. Currently only the theme mode.

use crate::errors::{AppError, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::warn;

pub const THEME_KEY: &str = "@material_hub_theme";

/// String key-value storage for client-local settings.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
  async fn get(&self, key: &str) -> Result<Option<String>>;
  async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// All keys in one flat JSON object on disk. A missing file reads as empty.
pub struct JsonFileStore {
  path: PathBuf,
  // Serializes read-modify-write cycles on `set`.
  write_lock: tokio::sync::Mutex<()>,
}

impl JsonFileStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self {
      path: path.into(),
      write_lock: tokio::sync::Mutex::new(()),
    }
  }

  async fn load(&self) -> Result<HashMap<String, String>> {
    match tokio::fs::read(&self.path).await {
      Ok(bytes) => serde_json::from_slice(&bytes)
        .map_err(|e| AppError::Internal(format!("Corrupt preferences file {}: {}", self.path.display(), e))),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
      Err(e) => Err(AppError::Internal(format!(
        "Failed to read preferences file {}: {}",
        self.path.display(),
        e
      ))),
    }
  }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
  async fn get(&self, key: &str) -> Result<Option<String>> {
    Ok(self.load().await?.remove(key))
  }

  async fn set(&self, key: &str, value: &str) -> Result<()> {
    let _guard = self.write_lock.lock().await;
    let mut entries = self.load().await.unwrap_or_else(|e| {
      warn!(error = %e, "Discarding unreadable preferences.");
      HashMap::new()
    });
    entries.insert(key.to_string(), value.to_string());
    let bytes = serde_json::to_vec_pretty(&entries).map_err(|e| AppError::Internal(e.to_string()))?;
    tokio::fs::write(&self.path, bytes)
      .await
      .map_err(|e| AppError::Internal(format!("Failed to write preferences file {}: {}", self.path.display(), e)))
  }
}

#[derive(Default)]
pub struct MemoryStore {
  entries: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl KeyValueStore for MemoryStore {
  async fn get(&self, key: &str) -> Result<Option<String>> {
    Ok(self.entries.lock().get(key).cloned())
  }

  async fn set(&self, key: &str, value: &str) -> Result<()> {
    self.entries.lock().insert(key.to_string(), value.to_string());
    Ok(())
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ThemeMode {
  #[default]
  Light,
  Dark,
}

impl ThemeMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      ThemeMode::Light => "light",
      ThemeMode::Dark => "dark",
    }
  }

  pub fn parse(value: &str) -> Option<Self> {
    match value {
      "light" => Some(ThemeMode::Light),
      "dark" => Some(ThemeMode::Dark),
      _ => None,
    }
  }

  pub fn toggled(self) -> Self {
    match self {
      ThemeMode::Light => ThemeMode::Dark,
      ThemeMode::Dark => ThemeMode::Light,
    }
  }
}

pub struct ThemePreference<S: KeyValueStore> {
  store: S,
  mode: ThemeMode,
}

impl<S: KeyValueStore> ThemePreference<S> {
  /// Reads the stored mode. Anything missing, unknown or unreadable falls
  /// back to light.
  pub async fn load(store: S) -> Self {
    let mode = match store.get(THEME_KEY).await {
      Ok(Some(value)) => ThemeMode::parse(&value).unwrap_or_default(),
      Ok(None) => ThemeMode::default(),
      Err(e) => {
        warn!(error = %e, "Could not read theme preference, using light.");
        ThemeMode::default()
      }
    };
    Self { store, mode }
  }

  pub fn mode(&self) -> ThemeMode {
    self.mode
  }

  pub fn is_dark(&self) -> bool {
    self.mode == ThemeMode::Dark
  }

  pub async fn set(&mut self, mode: ThemeMode) -> Result<()> {
    self.store.set(THEME_KEY, mode.as_str()).await?;
    self.mode = mode;
    Ok(())
  }

  pub async fn toggle(&mut self) -> Result<ThemeMode> {
    let next = self.mode.toggled();
    self.set(next).await?;
    Ok(next)
  }
}
