// storefront/src/busy.rs

//! In-flight flags for user actions. A flag is raised before the remote call
//! and lowered when the guard drops, on success and failure alike.

use crate::errors::{AppError, Result};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct BusyFlag {
  action: &'static str,
  busy: Arc<AtomicBool>,
}

impl BusyFlag {
  pub fn new(action: &'static str) -> Self {
    Self {
      action,
      busy: Arc::new(AtomicBool::new(false)),
    }
  }

  /// Raises the flag, or fails with `AppError::Busy` if it is already up.
  pub fn try_begin(&self) -> Result<BusyGuard> {
    if self.busy.swap(true, Ordering::AcqRel) {
      return Err(AppError::Busy(self.action));
    }
    Ok(BusyGuard {
      busy: Arc::clone(&self.busy),
    })
  }

  pub fn is_busy(&self) -> bool {
    self.busy.load(Ordering::Acquire)
  }
}

#[must_use = "the flag is lowered as soon as the guard is dropped"]
pub struct BusyGuard {
  busy: Arc<AtomicBool>,
}

impl Drop for BusyGuard {
  fn drop(&mut self) {
    self.busy.store(false, Ordering::Release);
  }
}

/// Per-key flags, e.g. one per cart line so updating one line does not
/// block another.
#[derive(Debug)]
pub struct BusySet<K: Eq + Hash + Clone> {
  action: &'static str,
  keys: Arc<Mutex<HashSet<K>>>,
}

impl<K: Eq + Hash + Clone> BusySet<K> {
  pub fn new(action: &'static str) -> Self {
    Self {
      action,
      keys: Arc::new(Mutex::new(HashSet::new())),
    }
  }

  pub fn try_begin(&self, key: K) -> Result<BusyKeyGuard<K>> {
    if !self.keys.lock().insert(key.clone()) {
      return Err(AppError::Busy(self.action));
    }
    Ok(BusyKeyGuard {
      key,
      keys: Arc::clone(&self.keys),
    })
  }

  pub fn is_busy(&self, key: &K) -> bool {
    self.keys.lock().contains(key)
  }
}

#[must_use = "the key is released as soon as the guard is dropped"]
pub struct BusyKeyGuard<K: Eq + Hash + Clone> {
  key: K,
  keys: Arc<Mutex<HashSet<K>>>,
}

impl<K: Eq + Hash + Clone> Drop for BusyKeyGuard<K> {
  fn drop(&mut self) {
    self.keys.lock().remove(&self.key);
  }
}
