// storefront/src/models/user_profile.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
  pub id: Uuid,
  pub username: Option<String>,
  pub email: String,
  #[serde(default)]
  pub total_xp: i64,
  pub selected_institute_id: Option<Uuid>,
  pub selected_batch_id: Option<Uuid>,
  pub last_active_at: Option<DateTime<Utc>>,
}

/// Partial profile update. The double `Option` on the selection columns lets
/// a caller clear a column (`Some(None)`) as well as leave it alone (`None`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileUpdate {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub total_xp: Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub last_active_at: Option<DateTime<Utc>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub selected_institute_id: Option<Option<Uuid>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub selected_batch_id: Option<Option<Uuid>>,
}

impl ProfileUpdate {
  pub fn apply_to(&self, profile: &mut UserProfile) {
    if let Some(xp) = self.total_xp {
      profile.total_xp = xp;
    }
    if let Some(at) = self.last_active_at {
      profile.last_active_at = Some(at);
    }
    if let Some(institute) = self.selected_institute_id {
      profile.selected_institute_id = institute;
    }
    if let Some(batch) = self.selected_batch_id {
      profile.selected_batch_id = batch;
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
  pub id: Uuid,
  pub username: Option<String>,
  pub email: String,
  pub total_xp: i64,
}
