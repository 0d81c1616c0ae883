// storefront/src/models/study.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Institute {
  pub id: Uuid,
  pub name: String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default = "active_by_default")]
  pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
  pub id: Uuid,
  pub institute_id: Uuid,
  pub name: String,
  pub class_level: String,
  pub exam_type: String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default = "active_by_default")]
  pub is_active: bool,
}

/// A downloadable file attached to a batch. Materials without a batch are
/// not shown to students.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyMaterial {
  pub id: Uuid,
  pub title: String,
  #[serde(default)]
  pub description: Option<String>,
  pub file_url: String,
  pub file_type: String,
  #[serde(default)]
  pub subject: Option<String>,
  #[serde(default)]
  pub chapter: Option<String>,
  pub batch_id: Option<Uuid>,
  pub created_at: DateTime<Utc>,
}

fn active_by_default() -> bool {
  true
}
