//! Orchestration layer over the stores and the expansion engine.
//!
//! `EventService` is the surface the transport layer talks to: it loads
//! snapshots from the collaborator stores, runs the pure generation/merge
//! engine over them, and enforces the creator-or-admin rule for mutations.
//! All logging happens here; the engine itself has no side effects.

use std::sync::Arc;

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CadenzaError, CadenzaResult};
use crate::expand::Occurrences;
use crate::generate::raw_slot;
use crate::identity::{IdentityDirectory, Role};
use crate::occurrence::Occurrence;
use crate::series::{Recurrence, Series, UpdateData, UpdateEntry, UpdateScope};
use crate::store::{IdentityStore, SeriesStore};

/// Behavior switches for the service.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// Whether the creator is implicitly a participant of every occurrence.
    pub creator_joins_occurrences: bool,
}

/// Input for creating a series.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSeries {
    pub title: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Participant emails; unresolvable ones are dropped.
    pub participants: Vec<String>,
    pub recurrence: Recurrence,
}

/// Input for updating one or more occurrences of a series.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePatch {
    pub scope: UpdateScope,
    pub data: UpdateData,
}

/// Expanded occurrences of one series.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesOccurrences {
    pub series_id: Uuid,
    pub occurrences: Vec<Occurrence>,
}

/// The service consumed by the transport layer.
pub struct EventService {
    series: Arc<dyn SeriesStore>,
    identities: Arc<dyn IdentityStore>,
    config: ServiceConfig,
}

impl EventService {
    pub fn new(
        series: Arc<dyn SeriesStore>,
        identities: Arc<dyn IdentityStore>,
        config: ServiceConfig,
    ) -> Self {
        EventService {
            series,
            identities,
            config,
        }
    }

    /// Create a series with the caller as creator. Returns the new id.
    pub async fn create_series(&self, creator: Uuid, def: NewSeries) -> CadenzaResult<Uuid> {
        if def.title.trim().is_empty() {
            return Err(CadenzaError::Validation("title must not be empty".to_string()));
        }
        if def.description.trim().is_empty() {
            return Err(CadenzaError::Validation(
                "description must not be empty".to_string(),
            ));
        }
        if def.end_time <= def.start_time {
            return Err(CadenzaError::Validation(
                "end time must be after start time".to_string(),
            ));
        }

        let resolved = self.identities.resolve_by_emails(&def.participants).await?;
        let mut participants: Vec<Uuid> = Vec::with_capacity(resolved.len());
        for identity in resolved {
            if !participants.contains(&identity.id) {
                participants.push(identity.id);
            }
        }

        let now = Utc::now();
        let series = Series {
            id: Uuid::new_v4(),
            title: def.title,
            description: def.description,
            start_time: floor_to_minute(def.start_time),
            end_time: floor_to_minute(def.end_time),
            recurrence: def.recurrence,
            created_by: creator,
            participants,
            updates: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        let series_id = series.id;

        self.series.insert(series).await?;
        tracing::info!(%series_id, %creator, "series created");
        Ok(series_id)
    }

    /// Expand every series created by `creator` up to `horizon`.
    pub async fn list_occurrences(
        &self,
        creator: Uuid,
        horizon: DateTime<Utc>,
    ) -> CadenzaResult<Vec<SeriesOccurrences>> {
        let all = self.series.find_by_creator(creator).await?;
        let mut results = Vec::with_capacity(all.len());
        for series in &all {
            let occurrences = self.occurrences_for(series, horizon).await?;
            results.push(SeriesOccurrences {
                series_id: series.id,
                occurrences,
            });
        }
        Ok(results)
    }

    /// The stored series document, without expansion.
    pub async fn get_raw_series(&self, series_id: Uuid) -> CadenzaResult<Series> {
        self.series
            .find(series_id)
            .await?
            .ok_or_else(|| CadenzaError::NotFound(format!("series {series_id}")))
    }

    /// Append an update entry against occurrence `index`.
    ///
    /// Only the creator or an admin may update. The entry records the raw
    /// occurrence times at `index` as the baseline for time-shift deltas.
    pub async fn apply_update(
        &self,
        requester: Uuid,
        series_id: Uuid,
        index: u32,
        patch: UpdatePatch,
    ) -> CadenzaResult<()> {
        let series = self.get_raw_series(series_id).await?;
        self.authorize_mutation(requester, &series, "update").await?;

        if patch.data.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(CadenzaError::Validation("title must not be empty".to_string()));
        }
        if patch
            .data
            .description
            .as_deref()
            .is_some_and(|d| d.trim().is_empty())
        {
            return Err(CadenzaError::Validation(
                "description must not be empty".to_string(),
            ));
        }

        let (start_time, end_time) = raw_slot(&series, index)?;
        let entry = UpdateEntry {
            index,
            updated_at: Utc::now(),
            scope: patch.scope,
            start_time,
            end_time,
            data: patch.data,
        };

        self.series.append_update(series_id, entry).await?;
        tracing::info!(%series_id, index, "update entry appended");
        Ok(())
    }

    /// Delete a series. Only the creator or an admin may delete.
    pub async fn delete_series(&self, requester: Uuid, series_id: Uuid) -> CadenzaResult<()> {
        let series = self.get_raw_series(series_id).await?;
        self.authorize_mutation(requester, &series, "delete").await?;

        self.series.delete(series_id).await?;
        tracing::info!(%series_id, "series deleted");
        Ok(())
    }

    async fn authorize_mutation(
        &self,
        requester: Uuid,
        series: &Series,
        action: &str,
    ) -> CadenzaResult<()> {
        let identity = self
            .identities
            .resolve_by_id(requester)
            .await?
            .ok_or_else(|| CadenzaError::NotFound(format!("identity {requester}")))?;

        if identity.role != Role::Admin && series.created_by != requester {
            return Err(CadenzaError::Unauthorized(format!(
                "only the creator or an admin may {action} a series"
            )));
        }
        Ok(())
    }

    async fn occurrences_for(
        &self,
        series: &Series,
        horizon: DateTime<Utc>,
    ) -> CadenzaResult<Vec<Occurrence>> {
        // A series that starts after the horizon has nothing to show yet.
        // One far-future series must not turn the whole listing into an
        // error, so only direct expansion rejects such a horizon.
        if horizon < series.start_time {
            return Ok(Vec::new());
        }

        let directory = self.directory_for(series).await?;

        let created_by = directory
            .email_of(series.created_by)
            .ok_or_else(|| CadenzaError::NotFound(format!("identity {}", series.created_by)))?
            .to_string();

        let mut seed_participants: Vec<String> = series
            .participants
            .iter()
            .filter_map(|id| directory.email_of(*id))
            .map(str::to_string)
            .collect();
        if self.config.creator_joins_occurrences && !seed_participants.contains(&created_by) {
            seed_participants.push(created_by.clone());
        }

        let occurrences =
            Occurrences::new(series, &directory, created_by, seed_participants, horizon)?;
        Ok(occurrences.collect())
    }

    /// One identity snapshot per call: the creator, the stored participants,
    /// and every email any update entry may add.
    async fn directory_for(&self, series: &Series) -> CadenzaResult<IdentityDirectory> {
        let mut identities = Vec::new();

        let mut ids = vec![series.created_by];
        ids.extend(series.participants.iter().copied());
        for id in ids {
            if let Some(identity) = self.identities.resolve_by_id(id).await? {
                identities.push(identity);
            }
        }

        let mut emails: Vec<String> = Vec::new();
        for entry in &series.updates {
            for email in entry.data.new_participants.as_deref().unwrap_or_default() {
                if !emails.contains(email) {
                    emails.push(email.clone());
                }
            }
        }
        identities.extend(self.identities.resolve_by_emails(&emails).await?);

        Ok(IdentityDirectory::new(identities))
    }
}

/// Series times are stored at whole-minute precision.
fn floor_to_minute(t: DateTime<Utc>) -> DateTime<Utc> {
    t.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Identity;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct TestSeriesStore {
        docs: Mutex<HashMap<Uuid, Series>>,
    }

    #[async_trait]
    impl SeriesStore for TestSeriesStore {
        async fn find(&self, id: Uuid) -> CadenzaResult<Option<Series>> {
            Ok(self.docs.lock().expect("lock").get(&id).cloned())
        }

        async fn find_by_creator(&self, creator: Uuid) -> CadenzaResult<Vec<Series>> {
            let docs = self.docs.lock().expect("lock");
            let mut found: Vec<Series> = docs
                .values()
                .filter(|s| s.created_by == creator)
                .cloned()
                .collect();
            found.sort_by_key(|s| s.created_at);
            Ok(found)
        }

        async fn insert(&self, series: Series) -> CadenzaResult<()> {
            self.docs.lock().expect("lock").insert(series.id, series);
            Ok(())
        }

        async fn append_update(&self, id: Uuid, entry: UpdateEntry) -> CadenzaResult<()> {
            let mut docs = self.docs.lock().expect("lock");
            let series = docs
                .get_mut(&id)
                .ok_or_else(|| CadenzaError::NotFound(format!("series {id}")))?;
            series.updates.push(entry);
            series.updated_at = Utc::now();
            Ok(())
        }

        async fn delete(&self, id: Uuid) -> CadenzaResult<()> {
            self.docs
                .lock()
                .expect("lock")
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| CadenzaError::NotFound(format!("series {id}")))
        }
    }

    #[derive(Default)]
    struct TestIdentityStore {
        users: Mutex<Vec<Identity>>,
    }

    impl TestIdentityStore {
        fn with_user(self, id: Uuid, email: &str, role: Role) -> Self {
            self.users.lock().expect("lock").push(Identity {
                id,
                email: email.to_string(),
                role,
            });
            self
        }
    }

    #[async_trait]
    impl IdentityStore for TestIdentityStore {
        async fn resolve_by_emails(&self, emails: &[String]) -> CadenzaResult<Vec<Identity>> {
            let users = self.users.lock().expect("lock");
            Ok(users
                .iter()
                .filter(|u| emails.contains(&u.email))
                .cloned()
                .collect())
        }

        async fn resolve_by_id(&self, id: Uuid) -> CadenzaResult<Option<Identity>> {
            let users = self.users.lock().expect("lock");
            Ok(users.iter().find(|u| u.id == id).cloned())
        }
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    struct Fixture {
        service: EventService,
        creator: Uuid,
        admin: Uuid,
        stranger: Uuid,
    }

    fn fixture(config: ServiceConfig) -> Fixture {
        let creator = Uuid::new_v4();
        let admin = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let identities = TestIdentityStore::default()
            .with_user(creator, "owner@example.com", Role::User)
            .with_user(admin, "admin@example.com", Role::Admin)
            .with_user(stranger, "stranger@example.com", Role::User)
            .with_user(Uuid::new_v4(), "alice@example.com", Role::User)
            .with_user(Uuid::new_v4(), "bob@example.com", Role::User);
        let service = EventService::new(
            Arc::new(TestSeriesStore::default()),
            Arc::new(identities),
            config,
        );
        Fixture {
            service,
            creator,
            admin,
            stranger,
        }
    }

    fn weekly_definition() -> NewSeries {
        NewSeries {
            title: "Sync".to_string(),
            description: "Weekly sync".to_string(),
            start_time: utc(2024, 1, 1, 10, 0),
            end_time: utc(2024, 1, 1, 11, 0),
            participants: vec!["alice@example.com".to_string()],
            recurrence: Recurrence::Weekly,
        }
    }

    #[tokio::test]
    async fn create_rejects_empty_fields_and_inverted_times() {
        let f = fixture(ServiceConfig::default());

        let mut def = weekly_definition();
        def.title = "  ".to_string();
        assert!(matches!(
            f.service.create_series(f.creator, def).await,
            Err(CadenzaError::Validation(_))
        ));

        let mut def = weekly_definition();
        def.end_time = def.start_time;
        assert!(matches!(
            f.service.create_series(f.creator, def).await,
            Err(CadenzaError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn create_drops_unresolvable_participants_and_floors_seconds() {
        let f = fixture(ServiceConfig::default());
        let mut def = weekly_definition();
        def.participants.push("ghost@example.com".to_string());
        def.start_time = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 42).unwrap();

        let id = f.service.create_series(f.creator, def).await.unwrap();
        let stored = f.service.get_raw_series(id).await.unwrap();

        assert_eq!(stored.participants.len(), 1);
        assert_eq!(stored.start_time, utc(2024, 1, 1, 10, 0));
    }

    #[tokio::test]
    async fn update_requires_creator_or_admin() {
        let f = fixture(ServiceConfig::default());
        let id = f
            .service
            .create_series(f.creator, weekly_definition())
            .await
            .unwrap();

        let patch = UpdatePatch {
            scope: UpdateScope::ThisEvent,
            data: UpdateData {
                title: Some("Renamed".to_string()),
                ..UpdateData::default()
            },
        };

        assert!(matches!(
            f.service.apply_update(f.stranger, id, 0, patch.clone()).await,
            Err(CadenzaError::Unauthorized(_))
        ));
        f.service.apply_update(f.admin, id, 0, patch.clone()).await.unwrap();
        f.service.apply_update(f.creator, id, 0, patch).await.unwrap();

        let stored = f.service.get_raw_series(id).await.unwrap();
        assert_eq!(stored.updates.len(), 2);
    }

    #[tokio::test]
    async fn update_records_raw_baseline_of_its_index() {
        let f = fixture(ServiceConfig::default());
        let id = f
            .service
            .create_series(f.creator, weekly_definition())
            .await
            .unwrap();

        let patch = UpdatePatch {
            scope: UpdateScope::ThisAndFollowing,
            data: UpdateData {
                new_start_time: Some(utc(2024, 1, 15, 12, 0)),
                ..UpdateData::default()
            },
        };
        f.service.apply_update(f.creator, id, 2, patch).await.unwrap();

        let stored = f.service.get_raw_series(id).await.unwrap();
        let entry = &stored.updates[0];
        assert_eq!(entry.index, 2);
        // Two weekly steps after Jan 1
        assert_eq!(entry.start_time, utc(2024, 1, 15, 10, 0));
        assert_eq!(entry.end_time, utc(2024, 1, 15, 11, 0));
    }

    #[tokio::test]
    async fn update_beyond_index_zero_fails_for_non_recurring() {
        let f = fixture(ServiceConfig::default());
        let mut def = weekly_definition();
        def.recurrence = Recurrence::None;
        let id = f.service.create_series(f.creator, def).await.unwrap();

        let patch = UpdatePatch {
            scope: UpdateScope::ThisEvent,
            data: UpdateData {
                title: Some("Renamed".to_string()),
                ..UpdateData::default()
            },
        };
        assert!(matches!(
            f.service.apply_update(f.creator, id, 1, patch).await,
            Err(CadenzaError::InvalidRecurrence(_))
        ));
    }

    #[tokio::test]
    async fn list_resolves_emails_and_applies_updates() {
        let f = fixture(ServiceConfig::default());
        let id = f
            .service
            .create_series(f.creator, weekly_definition())
            .await
            .unwrap();

        let patch = UpdatePatch {
            scope: UpdateScope::ThisAndFollowing,
            data: UpdateData {
                new_participants: Some(vec!["bob@example.com".to_string()]),
                ..UpdateData::default()
            },
        };
        f.service.apply_update(f.creator, id, 1, patch).await.unwrap();

        let listed = f
            .service
            .list_occurrences(f.creator, utc(2024, 1, 22, 0, 0))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        // Index 3 (Jan 22 10:00) is past the Jan 22 00:00 horizon
        let occurrences = &listed[0].occurrences;
        assert_eq!(occurrences.len(), 3);

        assert_eq!(occurrences[0].created_by, "owner@example.com");
        assert_eq!(occurrences[0].participants, vec!["alice@example.com"]);
        assert_eq!(
            occurrences[1].participants,
            vec!["alice@example.com", "bob@example.com"]
        );
    }

    #[tokio::test]
    async fn listing_skips_series_starting_after_horizon() {
        let f = fixture(ServiceConfig::default());
        let near = f
            .service
            .create_series(f.creator, weekly_definition())
            .await
            .unwrap();

        let mut far_def = weekly_definition();
        far_def.title = "Offsite".to_string();
        far_def.start_time = utc(2025, 6, 1, 10, 0);
        far_def.end_time = utc(2025, 6, 1, 11, 0);
        let far = f.service.create_series(f.creator, far_def).await.unwrap();

        // The far-future series expands to nothing; the near one still lists
        let listed = f
            .service
            .list_occurrences(f.creator, utc(2024, 2, 1, 0, 0))
            .await
            .unwrap();
        assert_eq!(listed.len(), 2);

        let near_listed = listed.iter().find(|s| s.series_id == near).unwrap();
        assert!(!near_listed.occurrences.is_empty());
        let far_listed = listed.iter().find(|s| s.series_id == far).unwrap();
        assert!(far_listed.occurrences.is_empty());
    }

    #[tokio::test]
    async fn creator_participation_is_a_config_choice() {
        let with = fixture(ServiceConfig {
            creator_joins_occurrences: true,
        });
        let id = with
            .service
            .create_series(with.creator, weekly_definition())
            .await
            .unwrap();
        let listed = with
            .service
            .list_occurrences(with.creator, utc(2024, 1, 1, 12, 0))
            .await
            .unwrap();
        assert!(listed[0].occurrences[0]
            .participants
            .contains(&"owner@example.com".to_string()));

        let without = fixture(ServiceConfig::default());
        let id2 = without
            .service
            .create_series(without.creator, weekly_definition())
            .await
            .unwrap();
        let listed = without
            .service
            .list_occurrences(without.creator, utc(2024, 1, 1, 12, 0))
            .await
            .unwrap();
        assert!(!listed[0].occurrences[0]
            .participants
            .contains(&"owner@example.com".to_string()));

        assert_ne!(id, id2);
    }

    #[tokio::test]
    async fn delete_enforces_authorization_and_removes() {
        let f = fixture(ServiceConfig::default());
        let id = f
            .service
            .create_series(f.creator, weekly_definition())
            .await
            .unwrap();

        assert!(matches!(
            f.service.delete_series(f.stranger, id).await,
            Err(CadenzaError::Unauthorized(_))
        ));
        f.service.delete_series(f.creator, id).await.unwrap();
        assert!(matches!(
            f.service.get_raw_series(id).await,
            Err(CadenzaError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn missing_series_is_not_found() {
        let f = fixture(ServiceConfig::default());
        assert!(matches!(
            f.service.get_raw_series(Uuid::new_v4()).await,
            Err(CadenzaError::NotFound(_))
        ));
    }
}
