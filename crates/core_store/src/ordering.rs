//! Pure transforms over an ordered note collection.
//!
//! Every collection produced here keeps pinned notes as a contiguous prefix.
//! The boundary between the pinned and unpinned partitions is never stored;
//! it is recomputed as the first index whose note is not pinned.

use core_types::{Note, NoteEdit, NoteId};

pub fn partition_boundary(notes: &[Note]) -> usize {
    notes
        .iter()
        .position(|note| !note.pinned)
        .unwrap_or(notes.len())
}

pub fn is_partitioned(notes: &[Note]) -> bool {
    let boundary = partition_boundary(notes);
    notes[boundary..].iter().all(|note| !note.pinned)
}

/// Stable partition: pinned notes first, relative order kept on both sides.
pub fn normalize(notes: Vec<Note>) -> Vec<Note> {
    let (mut pinned, unpinned): (Vec<Note>, Vec<Note>) =
        notes.into_iter().partition(|note| note.pinned);
    pinned.extend(unpinned);
    pinned
}

/// Insert a new note at the head of the unpinned partition. A note already
/// carrying the same id is replaced.
pub fn insert_created(notes: &[Note], mut note: Note) -> Vec<Note> {
    note.pinned = false;
    let mut next: Vec<Note> = notes
        .iter()
        .filter(|existing| existing.id != note.id)
        .cloned()
        .collect();
    let at = partition_boundary(&next);
    next.insert(at, note);
    next
}

/// Apply `edit` and move the note to the start of its partition.
pub fn apply_edit(notes: &[Note], id: NoteId, edit: &NoteEdit) -> Option<Vec<Note>> {
    let (mut rest, mut note) = take(notes, id)?;
    edit.apply_to(&mut note);
    place_at_partition_start(&mut rest, note);
    Some(rest)
}

pub fn remove(notes: &[Note], id: NoteId) -> Option<Vec<Note>> {
    take(notes, id).map(|(rest, _)| rest)
}

/// Flip `pinned`. A newly pinned note goes to index 0, a newly unpinned note
/// goes directly after the last remaining pinned note.
pub fn toggle_pin(notes: &[Note], id: NoteId) -> Option<Vec<Note>> {
    let (mut rest, mut note) = take(notes, id)?;
    note.pinned = !note.pinned;
    place_at_partition_start(&mut rest, note);
    Some(rest)
}

fn take(notes: &[Note], id: NoteId) -> Option<(Vec<Note>, Note)> {
    let index = notes.iter().position(|note| note.id == id)?;
    let mut rest = notes.to_vec();
    let note = rest.remove(index);
    Some((rest, note))
}

fn place_at_partition_start(rest: &mut Vec<Note>, note: Note) {
    let at = if note.pinned {
        0
    } else {
        partition_boundary(rest)
    };
    rest.insert(at, note);
}
