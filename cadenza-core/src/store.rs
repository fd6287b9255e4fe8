//! Collaborator contracts for persistence and identity lookup.
//!
//! The engine never talks to storage directly; it consumes these traits.
//! Implementations own their atomicity guarantees — two concurrent update
//! appends against the same series are two independent appends, ordered
//! later by the `updated_at` sort in the merge engine.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::CadenzaResult;
use crate::identity::Identity;
use crate::series::{Series, UpdateEntry};

/// Storage for series documents.
#[async_trait]
pub trait SeriesStore: Send + Sync {
    /// Fetch one series by id.
    async fn find(&self, id: Uuid) -> CadenzaResult<Option<Series>>;

    /// All series created by the given identity.
    async fn find_by_creator(&self, creator: Uuid) -> CadenzaResult<Vec<Series>>;

    /// Store a newly created series.
    async fn insert(&self, series: Series) -> CadenzaResult<()>;

    /// Append an update entry to a series. `NotFound` if the id is absent.
    async fn append_update(&self, id: Uuid, entry: UpdateEntry) -> CadenzaResult<()>;

    /// Delete a series. `NotFound` if the id is absent.
    async fn delete(&self, id: Uuid) -> CadenzaResult<()>;
}

/// Lookup of identity records.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Resolve emails to identity records; unresolvable emails are omitted.
    async fn resolve_by_emails(&self, emails: &[String]) -> CadenzaResult<Vec<Identity>>;

    /// Resolve a single identity by id.
    async fn resolve_by_id(&self, id: Uuid) -> CadenzaResult<Option<Identity>>;
}
