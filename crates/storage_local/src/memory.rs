use anyhow::Result;
use async_trait::async_trait;
use core_types::{Note, PersistenceGateway, decode_notes, encode_notes};
use parking_lot::Mutex;
use tracing::warn;

/// Process-local gateway. The collection is kept encoded so a round trip
/// goes through the same codec as the persistent backends.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    blob: Mutex<Option<String>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored blob verbatim, valid or not.
    pub fn seed_raw(&self, raw: impl Into<String>) {
        *self.blob.lock() = Some(raw.into());
    }

    pub fn raw(&self) -> Option<String> {
        self.blob.lock().clone()
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn load(&self) -> Result<Option<Vec<Note>>> {
        let Some(raw) = self.raw() else {
            return Ok(None);
        };
        let notes = decode_notes(&raw);
        if notes.is_none() {
            warn!("in-memory note blob is not a valid collection");
        }
        Ok(notes)
    }

    async fn save(&self, notes: &[Note]) -> Result<()> {
        let raw = encode_notes(notes)?;
        *self.blob.lock() = Some(raw);
        Ok(())
    }
}
