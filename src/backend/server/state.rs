/**
 * Application State Management
 *
 * `AppState` is the state container shared by every handler. All services
 * sit behind `Arc`, so cloning the state per request is cheap.
 *
 * # State Extraction
 *
 * `FromRef` implementations let a handler extract only the part it needs,
 * e.g. `State(store): State<Arc<dyn StateStore>>` for the status endpoint.
 */

use crate::backend::store::StateStore;
use crate::backend::sync::{Initializer, SyncService};
use axum::extract::FromRef;
use std::sync::Arc;

/// Application state
///
/// # Fields
///
/// * `sync` - Sync service running ticks against the store
/// * `initializer` - First-time setup
/// * `cron_secret` - Bearer secret guarding `/api/sync` and `/api/init`
#[derive(Clone)]
pub struct AppState {
    pub sync: Arc<SyncService>,
    pub initializer: Arc<Initializer>,
    pub cron_secret: Option<Arc<str>>,
}

impl AppState {
    pub fn new(sync: Arc<SyncService>, initializer: Arc<Initializer>) -> Self {
        Self {
            sync,
            initializer,
            cron_secret: None,
        }
    }

    /// Require `Authorization: Bearer <secret>` on guarded routes
    pub fn with_cron_secret(mut self, secret: Option<String>) -> Self {
        self.cron_secret = secret.filter(|s| !s.is_empty()).map(Arc::from);
        self
    }

    pub fn store(&self) -> Arc<dyn StateStore> {
        self.sync.store().clone()
    }
}

impl FromRef<AppState> for Arc<SyncService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.sync.clone()
    }
}

impl FromRef<AppState> for Arc<Initializer> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.initializer.clone()
    }
}

impl FromRef<AppState> for Arc<dyn StateStore> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.store()
    }
}
