use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use core_types::{NOTES_KEY, Note, PersistenceGateway, decode_notes, encode_notes};
use tokio::fs;
use tracing::warn;

/// Stores the collection blob as `<dir>/notes.json`.
#[derive(Debug, Clone)]
pub struct JsonFileGateway {
    path: PathBuf,
}

impl JsonFileGateway {
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join(format!("{NOTES_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PersistenceGateway for JsonFileGateway {
    async fn load(&self) -> Result<Option<Vec<Note>>> {
        let exists = fs::try_exists(&self.path)
            .await
            .with_context(|| format!("failed to stat {}", self.path.display()))?;
        if !exists {
            return Ok(None);
        }
        let raw = fs::read(&self.path)
            .await
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let notes = std::str::from_utf8(&raw).ok().and_then(decode_notes);
        if notes.is_none() {
            warn!(path = %self.path.display(), "note file is not a valid collection");
        }
        Ok(notes)
    }

    async fn save(&self, notes: &[Note]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let text = encode_notes(notes).context("failed to serialize notes")?;
        fs::write(&self.path, text)
            .await
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }
}
