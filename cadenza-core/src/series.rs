//! Series definition and update-entry types.
//!
//! A series is the stored document: the times of occurrence index 0, a
//! recurrence cadence, and an append-only list of update entries. Everything
//! else (the concrete occurrences) is derived from it on every read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed recurrence cadence of a series.
///
/// Each recurring cadence maps to a fixed day step; this is deliberately not
/// an RRULE grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recurrence {
    None,
    Daily,
    Weekly,
    Monthly,
}

impl Recurrence {
    /// Calendar-day step between consecutive occurrences.
    ///
    /// `None` does not recur, so it has no step.
    pub fn step_days(self) -> Option<u64> {
        match self {
            Recurrence::None => None,
            Recurrence::Daily => Some(1),
            Recurrence::Weekly => Some(7),
            Recurrence::Monthly => Some(30),
        }
    }
}

/// Precedence scope of an update entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateScope {
    /// Applies only to the occurrence the update was issued against.
    ThisEvent,
    /// Applies to the issued occurrence and every later one.
    ThisAndFollowing,
    /// Applies to every occurrence, including earlier ones.
    AllEvents,
}

impl UpdateScope {
    /// Whether an entry issued at `entry_index` applies to `occurrence_index`.
    pub fn applies_to(self, entry_index: u32, occurrence_index: u32) -> bool {
        match self {
            UpdateScope::ThisEvent => occurrence_index == entry_index,
            UpdateScope::ThisAndFollowing => occurrence_index >= entry_index,
            UpdateScope::AllEvents => true,
        }
    }
}

/// Patch payload of an update entry. Every field is optional; absent fields
/// leave the occurrence untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateData {
    pub title: Option<String>,
    pub description: Option<String>,
    pub new_start_time: Option<DateTime<Utc>>,
    pub new_end_time: Option<DateTime<Utc>>,
    /// Participant emails to add.
    pub new_participants: Option<Vec<String>>,
    /// Participant emails to remove.
    pub participants_to_remove: Option<Vec<String>>,
}

/// An immutable patch record, created once per update request and appended
/// to the series. Entries are never mutated or removed; merge order comes
/// from `updated_at`, not append order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEntry {
    /// Occurrence index the update was issued against.
    pub index: u32,
    /// Merge-order key. Ties keep append order (stable sort).
    pub updated_at: DateTime<Utc>,
    pub scope: UpdateScope,
    /// Raw (unpatched) start of the occurrence at `index`, recorded when the
    /// patch was authored. Baseline for time-shift deltas.
    pub start_time: DateTime<Utc>,
    /// Raw end of the occurrence at `index` at authoring time.
    pub end_time: DateTime<Utc>,
    pub data: UpdateData,
}

/// A recurring event series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Start of occurrence index 0. Invariant: `end_time > start_time`.
    pub start_time: DateTime<Utc>,
    /// End of occurrence index 0.
    pub end_time: DateTime<Utc>,
    pub recurrence: Recurrence,
    /// Identity id of the creator.
    pub created_by: Uuid,
    /// Participant identity ids, unique by identity.
    pub participants: Vec<Uuid>,
    /// Append-only update entries.
    pub updates: Vec<UpdateEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
