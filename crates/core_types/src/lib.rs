use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type NoteId = i64;

/// Key under which the whole collection is stored as a single blob.
pub const NOTES_KEY: &str = "notes";

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Hash)]
pub struct Note {
    pub id: NoteId,
    #[serde(default)]
    pub text: String,
    /// Space separated tag tokens, kept verbatim as stored.
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub pinned: bool,
}

impl Note {
    pub fn blank(id: NoteId) -> Self {
        Self {
            id,
            text: String::new(),
            tags: String::new(),
            pinned: false,
        }
    }

    pub fn new(id: NoteId, text: impl Into<String>, tags: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            tags: tags.into(),
            pinned: false,
        }
    }

    pub fn tag_list(&self) -> Vec<&str> {
        self.tags.split_whitespace().collect()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.split_whitespace().any(|t| t == tag)
    }
}

/// Field replacements applied by an edit. `None` keeps the current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct NoteEdit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

impl NoteEdit {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            tags: None,
        }
    }

    pub fn tags(tags: impl Into<String>) -> Self {
        Self {
            text: None,
            tags: Some(tags.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.tags.is_none()
    }

    pub fn apply_to(&self, note: &mut Note) {
        if let Some(text) = &self.text {
            note.text = text.clone();
        }
        if let Some(tags) = &self.tags {
            note.tags = tags.clone();
        }
    }
}

/// User supplied content for a note that has no id yet.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct NoteDraft {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub tags: String,
}

impl NoteDraft {
    pub fn new(text: impl Into<String>, tags: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tags: tags.into(),
        }
    }

    pub fn into_note(self, id: NoteId) -> Note {
        Note::new(id, self.text, self.tags)
    }
}

/// Async key-value port holding the complete note collection.
///
/// `load` yields `Ok(None)` both on first run and when the stored payload is
/// not a valid collection. `Err` is reserved for backend I/O failures.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    async fn load(&self) -> Result<Option<Vec<Note>>>;
    async fn save(&self, notes: &[Note]) -> Result<()>;
}

pub fn encode_notes(notes: &[Note]) -> Result<String> {
    Ok(serde_json::to_string(notes)?)
}

/// Decode a stored blob. Anything other than a JSON array of notes is treated
/// as absent.
pub fn decode_notes(raw: &str) -> Option<Vec<Note>> {
    let value: Value = serde_json::from_str(raw).ok()?;
    if !value.is_array() {
        return None;
    }
    serde_json::from_value(value).ok()
}
