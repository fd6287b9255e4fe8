//! Materialized occurrences.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One concrete occurrence of a series, identified by its 0-based index.
///
/// Occurrences are ephemeral: computed on every read from the series
/// definition plus its update entries, never persisted. Identity fields are
/// already resolved to emails for output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    pub index: u32,
    pub title: String,
    pub description: String,
    /// Creator email.
    pub created_by: String,
    /// Participant emails, deduplicated. Order is not significant.
    pub participants: Vec<String>,
    /// Final start after all applicable update entries.
    pub start_time: DateTime<Utc>,
    /// Final end after all applicable update entries.
    pub end_time: DateTime<Utc>,
}
