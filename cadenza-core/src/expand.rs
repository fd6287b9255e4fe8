//! Lazy expansion of a series into materialized occurrences.
//!
//! Expansion interleaves the generator and the merge engine: each raw slot
//! is merged before the horizon test, because a patch can move an occurrence
//! past the horizon (truncating the sequence there) or before an earlier
//! slot (which does not reorder anything; output is always by index).

use chrono::{DateTime, Utc};

use crate::error::{CadenzaError, CadenzaResult};
use crate::generate::raw_slot;
use crate::identity::IdentityDirectory;
use crate::merge;
use crate::occurrence::Occurrence;
use crate::series::{Recurrence, Series, UpdateEntry};

/// Lazy, finite sequence of materialized occurrences from index 0 up to the
/// horizon. Restartable: building a new iterator over the same inputs yields
/// the identical sequence.
pub struct Occurrences<'a> {
    series: &'a Series,
    entries: Vec<&'a UpdateEntry>,
    directory: &'a IdentityDirectory,
    created_by: String,
    seed_participants: Vec<String>,
    horizon: DateTime<Utc>,
    next_index: u32,
    done: bool,
}

impl<'a> Occurrences<'a> {
    /// Start expanding `series` up to `horizon` (exclusive on merged start).
    ///
    /// `created_by` and `seed_participants` are the creator email and the
    /// resolved participant emails of occurrence index 0. A horizon before
    /// the series start is rejected here, before any iteration, so a
    /// malformed horizon can never spin the loop.
    pub fn new(
        series: &'a Series,
        directory: &'a IdentityDirectory,
        created_by: String,
        seed_participants: Vec<String>,
        horizon: DateTime<Utc>,
    ) -> CadenzaResult<Self> {
        if horizon < series.start_time {
            return Err(CadenzaError::InvalidRecurrence(format!(
                "horizon {horizon} precedes the series start {}",
                series.start_time
            )));
        }
        Ok(Occurrences {
            series,
            entries: merge::sorted_updates(series),
            directory,
            created_by,
            seed_participants,
            horizon,
            next_index: 0,
            done: false,
        })
    }

    fn raw_occurrence(&self, index: u32) -> CadenzaResult<Occurrence> {
        let (start_time, end_time) = raw_slot(self.series, index)?;
        Ok(Occurrence {
            index,
            title: self.series.title.clone(),
            description: self.series.description.clone(),
            created_by: self.created_by.clone(),
            participants: self.seed_participants.clone(),
            start_time,
            end_time,
        })
    }
}

impl Iterator for Occurrences<'_> {
    type Item = Occurrence;

    fn next(&mut self) -> Option<Occurrence> {
        if self.done {
            return None;
        }
        let index = self.next_index;

        // A non-recurring series has exactly one occurrence
        if index > 0 && self.series.recurrence == Recurrence::None {
            self.done = true;
            return None;
        }

        // Slot arithmetic only fails at the representable date range; treat
        // that as the end of the sequence
        let raw = match self.raw_occurrence(index) {
            Ok(raw) => raw,
            Err(_) => {
                self.done = true;
                return None;
            }
        };

        let merged = merge::merge_occurrence(raw, &self.entries, self.directory);
        if merged.start_time > self.horizon {
            self.done = true;
            return None;
        }

        self.next_index += 1;
        Some(merged)
    }
}
