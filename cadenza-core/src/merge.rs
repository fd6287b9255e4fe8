//! Layered update merging.
//!
//! Folds a series' update entries, sorted by author time, onto one raw
//! occurrence slot. Each fold step produces a new occurrence value, so a
//! later entry sees the cumulative effect of every earlier matching entry;
//! on conflicting fields the later entry wins (last-write-wins per field).

use crate::identity::IdentityDirectory;
use crate::occurrence::Occurrence;
use crate::series::{Series, UpdateEntry};
use crate::shift;

/// Update entries sorted by `updated_at` ascending. The sort is stable, so
/// ties keep append order.
pub fn sorted_updates(series: &Series) -> Vec<&UpdateEntry> {
    let mut entries: Vec<&UpdateEntry> = series.updates.iter().collect();
    entries.sort_by_key(|entry| entry.updated_at);
    entries
}

/// Apply every entry whose scope matches the occurrence's index, in sort
/// order, starting from the raw slot.
pub fn merge_occurrence(
    mut occurrence: Occurrence,
    entries: &[&UpdateEntry],
    directory: &IdentityDirectory,
) -> Occurrence {
    for entry in entries {
        if entry.scope.applies_to(entry.index, occurrence.index) {
            occurrence = apply_entry(occurrence, entry, directory);
        }
    }
    occurrence
}

fn apply_entry(
    mut occurrence: Occurrence,
    entry: &UpdateEntry,
    directory: &IdentityDirectory,
) -> Occurrence {
    let data = &entry.data;

    if let Some(title) = &data.title {
        occurrence.title = title.clone();
    }
    if let Some(description) = &data.description {
        occurrence.description = description.clone();
    }

    if data.new_participants.is_some() || data.participants_to_remove.is_some() {
        occurrence.participants = rebuild_participants(
            &occurrence.participants,
            data.new_participants.as_deref(),
            data.participants_to_remove.as_deref(),
            directory,
        );
    }

    // Time shifts are relative to the entry's own recorded baseline, not to
    // the occurrence currently being merged.
    if let Some(new_start) = data.new_start_time {
        occurrence.start_time = shift::propagate(entry.start_time, new_start, occurrence.start_time);
    }
    if let Some(new_end) = data.new_end_time {
        occurrence.end_time = shift::propagate(entry.end_time, new_end, occurrence.end_time);
    }

    occurrence
}

/// Recompute a participant list: drop removals, then add resolvable new
/// participants, deduplicated by email. Emails the directory cannot resolve
/// are dropped silently.
fn rebuild_participants(
    current: &[String],
    additions: Option<&[String]>,
    removals: Option<&[String]>,
    directory: &IdentityDirectory,
) -> Vec<String> {
    let mut participants: Vec<String> = current
        .iter()
        .filter(|email| !removals.is_some_and(|r| r.iter().any(|removed| removed == *email)))
        .cloned()
        .collect();

    for email in additions.unwrap_or_default() {
        if directory.by_email(email).is_some() && !participants.contains(email) {
            participants.push(email.clone());
        }
    }

    participants
}
