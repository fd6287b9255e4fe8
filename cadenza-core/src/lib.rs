//! Core engine for the cadenza ecosystem.
//!
//! This crate holds everything needed to turn a stored event series into
//! concrete occurrences:
//! - `series` / `occurrence` — the data model (series definition, immutable
//!   update entries, materialized occurrences)
//! - `generate` / `expand` — raw slot arithmetic and lazy expansion up to a
//!   horizon
//! - `merge` / `shift` — layered update merging and calendar-aware time
//!   shift propagation
//! - `store` / `service` — collaborator contracts and the orchestration
//!   layer on top of them

pub mod error;
pub mod expand;
pub mod generate;
pub mod identity;
pub mod merge;
pub mod occurrence;
pub mod series;
pub mod service;
pub mod shift;
pub mod store;

// Re-export the common types at crate root for convenience
pub use error::{CadenzaError, CadenzaResult};
pub use expand::Occurrences;
pub use identity::{Identity, IdentityDirectory, Role};
pub use occurrence::Occurrence;
pub use series::{Recurrence, Series, UpdateData, UpdateEntry, UpdateScope};
pub use service::{EventService, NewSeries, SeriesOccurrences, ServiceConfig, UpdatePatch};
pub use store::{IdentityStore, SeriesStore};
