use core_types::Note;
use indexmap::IndexSet;

/// Active tag filter. Newest tag first, no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFacets {
    tags: IndexSet<String>,
}

impl TagFacets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `tag` at the front unless it is already active or blank.
    /// Returns whether the set changed.
    pub fn add(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if tag.trim().is_empty() || self.tags.contains(&tag) {
            return false;
        }
        self.tags.shift_insert(0, tag)
    }

    pub fn remove(&mut self, tag: &str) -> bool {
        self.tags.shift_remove(tag)
    }

    pub fn clear(&mut self) {
        self.tags.clear();
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// OR semantics: any shared tag admits the note; an empty set admits all.
    pub fn admits(&self, note: &Note) -> bool {
        self.is_empty() || note.tag_list().into_iter().any(|tag| self.contains(tag))
    }
}
