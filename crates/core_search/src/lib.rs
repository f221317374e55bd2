use core_types::Note;
use indexmap::IndexMap;

mod facets;
mod matcher;

pub use facets::TagFacets;
pub use matcher::{Matcher, MatcherKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Notes passing both the text test and the tag test, in collection order.
pub fn visible<'a>(notes: &'a [Note], matcher: &Matcher, facets: &TagFacets) -> Vec<&'a Note> {
    notes
        .iter()
        .filter(|note| matcher.is_match(&note.text) && facets.admits(note))
        .collect()
}

/// Every distinct tag with the number of notes carrying it, first-seen order.
pub fn tag_summary(notes: &[Note]) -> Vec<TagCount> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for note in notes {
        let mut seen: Vec<&str> = Vec::new();
        for tag in note.tag_list() {
            if seen.contains(&tag) {
                continue;
            }
            seen.push(tag);
            *counts.entry(tag).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|(tag, count)| TagCount {
            tag: tag.to_string(),
            count,
        })
        .collect()
}
