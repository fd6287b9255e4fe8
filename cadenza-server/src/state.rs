use std::sync::Arc;

use cadenza_core::{EventService, ServiceConfig};

use crate::config::ServerConfig;
use crate::store::memory::{MemoryIdentityStore, MemorySeriesStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<EventService>,
    /// Kept alongside the service for the signup/login endpoints, which
    /// need more than the core `IdentityStore` contract.
    pub identities: Arc<MemoryIdentityStore>,
    pub admin_pass: Option<String>,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        let series = Arc::new(MemorySeriesStore::new());
        let identities = Arc::new(MemoryIdentityStore::new());
        let service = Arc::new(EventService::new(
            series,
            identities.clone(),
            ServiceConfig {
                creator_joins_occurrences: config.creator_joins,
            },
        ));

        AppState {
            service,
            identities,
            admin_pass: config.admin_pass.clone(),
        }
    }
}
