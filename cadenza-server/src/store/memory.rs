//! In-memory store implementations.
//!
//! Backing maps live behind a `tokio::sync::RwLock`, so concurrent reads
//! are cheap and every mutation is atomic with respect to readers. The
//! engine only ever works on cloned snapshots.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use cadenza_core::{
    CadenzaError, CadenzaResult, Identity, IdentityStore, Role, Series, SeriesStore, UpdateEntry,
};

/// In-memory series storage.
#[derive(Debug, Default)]
pub struct MemorySeriesStore {
    docs: RwLock<HashMap<Uuid, Series>>,
}

impl MemorySeriesStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SeriesStore for MemorySeriesStore {
    async fn find(&self, id: Uuid) -> CadenzaResult<Option<Series>> {
        Ok(self.docs.read().await.get(&id).cloned())
    }

    async fn find_by_creator(&self, creator: Uuid) -> CadenzaResult<Vec<Series>> {
        let docs = self.docs.read().await;
        let mut found: Vec<Series> = docs
            .values()
            .filter(|series| series.created_by == creator)
            .cloned()
            .collect();
        // HashMap order is arbitrary; keep listings stable
        found.sort_by_key(|series| series.created_at);
        Ok(found)
    }

    async fn insert(&self, series: Series) -> CadenzaResult<()> {
        self.docs.write().await.insert(series.id, series);
        Ok(())
    }

    async fn append_update(&self, id: Uuid, entry: UpdateEntry) -> CadenzaResult<()> {
        let mut docs = self.docs.write().await;
        let series = docs
            .get_mut(&id)
            .ok_or_else(|| CadenzaError::NotFound(format!("series {id}")))?;
        series.updated_at = entry.updated_at;
        series.updates.push(entry);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> CadenzaResult<()> {
        self.docs
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| CadenzaError::NotFound(format!("series {id}")))
    }
}

/// A stored user: the resolvable identity plus login credentials.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub identity: Identity,
    pub pass_hash: String,
}

/// In-memory identity storage.
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    users: RwLock<HashMap<Uuid, StoredUser>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user. Emails are unique.
    pub async fn create_user(
        &self,
        email: &str,
        pass_hash: String,
        role: Role,
    ) -> CadenzaResult<Uuid> {
        let mut users = self.users.write().await;
        if users.values().any(|user| user.identity.email == email) {
            return Err(CadenzaError::Validation(format!(
                "email {email} is already registered"
            )));
        }

        let id = Uuid::new_v4();
        users.insert(
            id,
            StoredUser {
                identity: Identity {
                    id,
                    email: email.to_string(),
                    role,
                },
                pass_hash,
            },
        );
        Ok(id)
    }

    /// Stored user for a login attempt.
    pub async fn find_by_email(&self, email: &str) -> Option<StoredUser> {
        let users = self.users.read().await;
        users
            .values()
            .find(|user| user.identity.email == email)
            .cloned()
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn resolve_by_emails(&self, emails: &[String]) -> CadenzaResult<Vec<Identity>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .filter(|user| emails.contains(&user.identity.email))
            .map(|user| user.identity.clone())
            .collect())
    }

    async fn resolve_by_id(&self, id: Uuid) -> CadenzaResult<Option<Identity>> {
        let users = self.users.read().await;
        Ok(users.get(&id).map(|user| user.identity.clone()))
    }
}
