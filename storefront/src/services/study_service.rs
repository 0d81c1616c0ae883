// storefront/src/services/study_service.rs

use crate::errors::Result;
use crate::models::{Batch, Institute, StudyMaterial};
use crate::state::AppState;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Institutes, their batches and the materials published to a batch.
#[derive(Clone)]
pub struct StudyService {
  app_state: AppState,
}

impl StudyService {
  pub fn new(app_state: AppState) -> Self {
    Self { app_state }
  }

  pub async fn list_institutes(&self) -> Result<Vec<Institute>> {
    Ok(self.app_state.gateway.list_institutes().await?)
  }

  pub async fn list_batches(&self, institute_id: Uuid) -> Result<Vec<Batch>> {
    Ok(self.app_state.gateway.list_batches(institute_id).await?)
  }

  pub async fn materials_for_batch(&self, batch_id: Uuid) -> Result<Vec<StudyMaterial>> {
    Ok(self.app_state.gateway.list_materials(batch_id).await?)
  }

  /// Materials of the user's selected batch. Empty until a batch is chosen.
  #[instrument(skip(self), err(Display))]
  pub async fn materials_for_user(&self, user_id: Uuid) -> Result<Vec<StudyMaterial>> {
    let profile = self.app_state.gateway.get_profile(user_id).await?;
    match profile.selected_batch_id {
      Some(batch_id) => self.materials_for_batch(batch_id).await,
      None => {
        debug!("No batch selected, library is empty.");
        Ok(Vec::new())
      }
    }
  }
}
