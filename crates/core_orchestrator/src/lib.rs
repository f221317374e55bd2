use std::sync::Arc;

use chrono::Utc;
use core_search::{Matcher, MatcherKind, TagCount, TagFacets};
use core_store::{MutationOutcome, NoteStore, ReloadOutcome, StoreResult};
use core_types::{Note, NoteDraft, NoteEdit, NoteId, PersistenceGateway};
use tracing::{debug, info, warn};

/// Issues note ids from the wall clock, never reusing one already taken.
#[derive(Debug, Default)]
pub struct IdClock {
    last: NoteId,
}

impl IdClock {
    pub fn next(&mut self, notes: &[Note]) -> NoteId {
        self.next_at(Utc::now().timestamp_millis(), notes)
    }

    pub fn next_at(&mut self, now_ms: NoteId, notes: &[Note]) -> NoteId {
        let taken = notes.iter().map(|note| note.id).max().unwrap_or(NoteId::MIN);
        let floor = self.last.max(taken);
        let id = if now_ms > floor {
            now_ms
        } else {
            floor.checked_add(1).unwrap_or_else(|| highest_free_id(notes))
        };
        self.last = id;
        id
    }
}

/// Largest id not present in `notes`, used once `NoteId::MAX` is taken.
fn highest_free_id(notes: &[Note]) -> NoteId {
    let mut taken: Vec<NoteId> = notes.iter().map(|note| note.id).collect();
    taken.sort_unstable_by(|a, b| b.cmp(a));
    taken.dedup();
    let mut candidate = NoteId::MAX;
    for id in taken {
        if id < candidate {
            break;
        }
        candidate -= 1;
    }
    warn!(id = candidate, "id clock exhausted, reusing a free id below the maximum");
    candidate
}

/// One user's command session: the note store plus the ephemeral search and
/// tag filter state used to compute the visible list.
pub struct Session {
    store: NoteStore,
    facets: TagFacets,
    matcher: Matcher,
    clock: IdClock,
}

impl Session {
    pub async fn start(gateway: Arc<dyn PersistenceGateway>) -> StoreResult<Self> {
        let mut store = NoteStore::new(gateway);
        store.reload().await?;
        info!(count = store.notes().len(), "note session started");
        Ok(Self {
            store,
            facets: TagFacets::new(),
            matcher: Matcher::match_all(),
            clock: IdClock::default(),
        })
    }

    pub fn notes(&self) -> &[Note] {
        self.store.notes()
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.store.get(id)
    }

    pub async fn create(&mut self, draft: NoteDraft) -> StoreResult<NoteId> {
        let id = self.clock.next(self.store.notes());
        self.store.create(draft.into_note(id)).await?;
        Ok(id)
    }

    pub async fn create_blank(&mut self) -> StoreResult<NoteId> {
        self.create(NoteDraft::default()).await
    }

    pub async fn edit(&mut self, id: NoteId, edit: NoteEdit) -> StoreResult<MutationOutcome> {
        self.store.edit(id, &edit).await
    }

    pub async fn delete(&mut self, id: NoteId) -> StoreResult<MutationOutcome> {
        self.store.delete(id).await
    }

    pub async fn toggle_pin(&mut self, id: NoteId) -> StoreResult<MutationOutcome> {
        self.store.toggle_pin(id).await
    }

    /// Re-read the stored collection, e.g. after another writer touched it.
    pub async fn refresh(&mut self) -> StoreResult<ReloadOutcome> {
        self.store.reload().await
    }

    pub fn set_search(&mut self, pattern: impl Into<String>) -> MatcherKind {
        self.matcher = Matcher::compile(pattern);
        let kind = self.matcher.kind();
        debug!(pattern = self.matcher.pattern(), ?kind, "search updated");
        kind
    }

    pub fn search_pattern(&self) -> &str {
        self.matcher.pattern()
    }

    pub fn add_tag_filter(&mut self, tag: impl Into<String>) -> bool {
        self.facets.add(tag)
    }

    pub fn remove_tag_filter(&mut self, tag: &str) -> bool {
        self.facets.remove(tag)
    }

    pub fn clear_tag_filters(&mut self) {
        self.facets.clear();
    }

    pub fn active_tags(&self) -> Vec<&str> {
        self.facets.iter().collect()
    }

    pub fn visible(&self) -> Vec<&Note> {
        core_search::visible(self.store.notes(), &self.matcher, &self.facets)
    }

    pub fn tag_summary(&self) -> Vec<TagCount> {
        core_search::tag_summary(self.store.notes())
    }
}
