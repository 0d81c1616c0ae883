// storefront/src/services/profile_service.rs

//! Profile reads and writes, the leaderboard, and the two background loops
//! that run while a session is active: the periodic profile refresher and
//! the XP tracker.

use crate::errors::{AppError, Result};
use crate::models::{LeaderboardEntry, ProfileUpdate, UserProfile};
use crate::state::AppState;
use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

pub const DEFAULT_LEADERBOARD_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntry {
  /// 1-based.
  pub rank: usize,
  pub entry: LeaderboardEntry,
}

#[derive(Clone)]
pub struct ProfileService {
  app_state: AppState,
}

impl ProfileService {
  pub fn new(app_state: AppState) -> Self {
    Self { app_state }
  }

  pub async fn get_profile(&self, user_id: Uuid) -> Result<UserProfile> {
    Ok(self.app_state.gateway.get_profile(user_id).await?)
  }

  /// Adds `amount` XP and stamps `last_active_at`. This is a
  /// read-modify-write; concurrent awards for the same user can lose one.
  #[instrument(skip(self), err(Display))]
  pub async fn award_xp(&self, user_id: Uuid, amount: i64) -> Result<UserProfile> {
    if amount < 0 {
      return Err(AppError::Validation("XP awards cannot be negative".to_string()));
    }
    let gateway = &self.app_state.gateway;
    let current = gateway.get_profile(user_id).await?;
    let update = ProfileUpdate {
      total_xp: Some(current.total_xp + amount),
      last_active_at: Some(Utc::now()),
      ..Default::default()
    };
    let updated = gateway.update_profile(user_id, update).await?;
    debug!(total_xp = updated.total_xp, "XP awarded.");
    Ok(updated)
  }

  pub async fn leaderboard(&self, limit: usize) -> Result<Vec<RankedEntry>> {
    let entries = self.app_state.gateway.leaderboard(limit).await?;
    Ok(
      entries
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| RankedEntry { rank: idx + 1, entry })
        .collect(),
    )
  }

  /// The user's position within the top `limit`, if they made it.
  pub async fn user_rank(&self, user_id: Uuid, limit: usize) -> Result<Option<usize>> {
    let board = self.leaderboard(limit).await?;
    Ok(board.iter().find(|r| r.entry.id == user_id).map(|r| r.rank))
  }

  /// Selecting an institute clears any previously selected batch.
  pub async fn select_institute(&self, user_id: Uuid, institute_id: Option<Uuid>) -> Result<UserProfile> {
    let update = ProfileUpdate {
      selected_institute_id: Some(institute_id),
      selected_batch_id: Some(None),
      ..Default::default()
    };
    Ok(self.app_state.gateway.update_profile(user_id, update).await?)
  }

  pub async fn select_batch(&self, user_id: Uuid, batch_id: Option<Uuid>) -> Result<UserProfile> {
    let current = self.app_state.gateway.get_profile(user_id).await?;
    if batch_id.is_some() && current.selected_institute_id.is_none() {
      return Err(AppError::InvalidState("Select an institute before choosing a batch".to_string()));
    }
    let update = ProfileUpdate {
      selected_batch_id: Some(batch_id),
      ..Default::default()
    };
    Ok(self.app_state.gateway.update_profile(user_id, update).await?)
  }

  /// Fetches the profile immediately and then every `period`, publishing
  /// each successful read. Failed reads are logged and the last good
  /// profile stays published.
  pub fn spawn_refresher(&self, user_id: Uuid, period: Duration) -> ProfileRefresher {
    let (tx, rx) = watch::channel(None);
    let service = self.clone();
    let task = tokio::spawn(async move {
      let mut ticker = interval(period);
      ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
      loop {
        ticker.tick().await;
        match service.get_profile(user_id).await {
          Ok(profile) => {
            if tx.send(Some(profile)).is_err() {
              break;
            }
          }
          Err(e) => warn!(%user_id, error = %e, "Profile refresh failed."),
        }
      }
    });
    ProfileRefresher { rx, task }
  }

  /// A stopped XP tracker for `user_id`; call `start` to begin awarding.
  pub fn xp_tracker(&self, user_id: Uuid, period: Duration, amount: i64) -> XpTracker {
    XpTracker {
      service: self.clone(),
      user_id,
      period,
      amount,
      awarded: Arc::new(AtomicI64::new(0)),
      task: None,
    }
  }
}

/// Handle to the background profile refresh. Dropping it cancels the loop.
pub struct ProfileRefresher {
  rx: watch::Receiver<Option<UserProfile>>,
  task: JoinHandle<()>,
}

impl ProfileRefresher {
  pub fn latest(&self) -> Option<UserProfile> {
    self.rx.borrow().clone()
  }

  pub fn subscribe(&self) -> watch::Receiver<Option<UserProfile>> {
    self.rx.clone()
  }
}

impl Drop for ProfileRefresher {
  fn drop(&mut self) {
    self.task.abort();
  }
}

/// Awards XP on a fixed period while active. The first award lands one
/// full period after `start`.
pub struct XpTracker {
  service: ProfileService,
  user_id: Uuid,
  period: Duration,
  amount: i64,
  awarded: Arc<AtomicI64>,
  task: Option<JoinHandle<()>>,
}

impl XpTracker {
  pub fn is_running(&self) -> bool {
    self.task.is_some()
  }

  /// XP successfully awarded by this tracker so far.
  pub fn awarded(&self) -> i64 {
    self.awarded.load(Ordering::SeqCst)
  }

  pub fn start(&mut self) {
    if self.task.is_some() {
      return;
    }
    let service = self.service.clone();
    let (user_id, period, amount) = (self.user_id, self.period, self.amount);
    let awarded = self.awarded.clone();
    info!(%user_id, period_secs = period.as_secs(), "XP tracking started.");
    self.task = Some(tokio::spawn(async move {
      let mut ticker = interval_at(Instant::now() + period, period);
      ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
      loop {
        ticker.tick().await;
        match service.award_xp(user_id, amount).await {
          Ok(_) => {
            awarded.fetch_add(amount, Ordering::SeqCst);
          }
          Err(e) => warn!(%user_id, error = %e, "XP award failed."),
        }
      }
    }));
  }

  pub fn stop(&mut self) {
    if let Some(task) = self.task.take() {
      task.abort();
      info!(user_id = %self.user_id, "XP tracking stopped.");
    }
  }

  /// Mirrors the app moving between foreground and background.
  pub fn set_active(&mut self, active: bool) {
    if active {
      self.start();
    } else {
      self.stop();
    }
  }
}

impl Drop for XpTracker {
  fn drop(&mut self) {
    self.stop();
  }
}
