use std::sync::Arc;

use core_types::{Note, NoteEdit, NoteId, PersistenceGateway};
use thiserror::Error;
use tracing::{debug, warn};

pub mod ordering;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to save note collection: {0:#}")]
    Save(anyhow::Error),
    #[error("failed to load note collection: {0:#}")]
    Load(anyhow::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    Replaced(usize),
    KeptCurrent,
}

/// Canonical in-memory note collection backed by a persistence gateway.
///
/// Mutations never touch `notes` directly: each one computes a new collection,
/// saves it wholesale and then adopts whatever the gateway reads back.
pub struct NoteStore {
    gateway: Arc<dyn PersistenceGateway>,
    notes: Vec<Note>,
}

impl NoteStore {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self {
            gateway,
            notes: Vec::new(),
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    pub fn contains(&self, id: NoteId) -> bool {
        self.get(id).is_some()
    }

    pub async fn reload(&mut self) -> StoreResult<ReloadOutcome> {
        let loaded = match self.gateway.load().await {
            Ok(loaded) => loaded,
            Err(err) => {
                warn!(error = %format!("{err:#}"), "note collection load failed; keeping current state");
                return Err(StoreError::Load(err));
            }
        };

        let Some(notes) = loaded else {
            if self.notes.is_empty() {
                debug!("no stored note collection");
            } else {
                warn!(
                    count = self.notes.len(),
                    "stored note collection absent or malformed; keeping current state"
                );
            }
            return Ok(ReloadOutcome::KeptCurrent);
        };

        let notes = if ordering::is_partitioned(&notes) {
            notes
        } else {
            warn!("stored note collection breaks pin ordering; normalizing");
            ordering::normalize(notes)
        };
        let count = notes.len();
        self.notes = notes;
        debug!(count, "note collection reloaded");
        Ok(ReloadOutcome::Replaced(count))
    }

    pub async fn create(&mut self, note: Note) -> StoreResult<MutationOutcome> {
        let id = note.id;
        let next = ordering::insert_created(&self.notes, note);
        self.commit(next).await?;
        debug!(id, "note created");
        Ok(MutationOutcome::Applied)
    }

    pub async fn edit(&mut self, id: NoteId, edit: &NoteEdit) -> StoreResult<MutationOutcome> {
        let next = ordering::apply_edit(&self.notes, id, edit);
        self.apply(id, "edit", next).await
    }

    pub async fn delete(&mut self, id: NoteId) -> StoreResult<MutationOutcome> {
        let next = ordering::remove(&self.notes, id);
        self.apply(id, "delete", next).await
    }

    pub async fn toggle_pin(&mut self, id: NoteId) -> StoreResult<MutationOutcome> {
        let next = ordering::toggle_pin(&self.notes, id);
        self.apply(id, "toggle_pin", next).await
    }

    async fn apply(
        &mut self,
        id: NoteId,
        action: &'static str,
        next: Option<Vec<Note>>,
    ) -> StoreResult<MutationOutcome> {
        let Some(next) = next else {
            debug!(id, action, "note not found; nothing to do");
            return Ok(MutationOutcome::NotFound);
        };
        self.commit(next).await?;
        debug!(id, action, "note mutation applied");
        Ok(MutationOutcome::Applied)
    }

    async fn commit(&mut self, next: Vec<Note>) -> StoreResult<()> {
        debug_assert!(ordering::is_partitioned(&next));
        if let Err(err) = self.gateway.save(&next).await {
            warn!(error = %format!("{err:#}"), "note collection save failed");
            return Err(StoreError::Save(err));
        }
        self.reload().await?;
        Ok(())
    }
}
