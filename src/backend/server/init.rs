/**
 * Server Initialization
 *
 * Wires settings into running services:
 *
 * 1. Open the state store (`DATABASE_URL`, or the default SQLite file)
 * 2. Build the Spotify source (saving its tokens in the store) and the
 *    profile gateway sink
 * 3. Assemble the sync service, the initializer and the app state
 * 4. Create the router
 *
 * The scheduler is started by the binary, since tests build apps without it.
 */

use crate::backend::clients::{
    GatewayProfileSink, ProfileSink, SinkError, SourceError, SpotifyClient, TrackSource,
};
use crate::backend::routes::router::create_router;
use crate::backend::server::config::Settings;
use crate::backend::server::state::AppState;
use crate::backend::store::{MemoryStore, SqliteStore, StateStore, StoreError};
use crate::backend::sync::{Initializer, SyncController, SyncService};
use crate::shared::ConfigError;
use axum::Router;
use std::sync::Arc;
use thiserror::Error;

/// Startup failures
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to open state store: {0}")]
    Store(#[from] StoreError),

    #[error("failed to create track source: {0}")]
    Source(#[from] SourceError),

    #[error("failed to create profile sink: {0}")]
    Sink(#[from] SinkError),
}

/// Open the store named by `database_url`
///
/// `memory` selects the process-local store; `None` the default SQLite file.
pub async fn open_store(database_url: Option<&str>) -> Result<Arc<dyn StateStore>, StoreError> {
    match database_url {
        Some("memory") => {
            tracing::warn!("Using in-memory state store, state is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        Some(url) => {
            tracing::info!("Connecting to state store at {}", url);
            Ok(Arc::new(SqliteStore::connect(url).await?))
        }
        None => {
            let path = SqliteStore::default_path();
            tracing::info!("Opening state store at {}", path.display());
            Ok(Arc::new(SqliteStore::open(&path).await?))
        }
    }
}

/// Assemble the app state from collaborators
pub fn build_state(
    settings: &Settings,
    store: Arc<dyn StateStore>,
    source: Arc<dyn TrackSource>,
    sink: Arc<dyn ProfileSink>,
) -> AppState {
    let controller = SyncController::new(source.clone(), sink.clone(), settings.sync.clone());
    let sync = Arc::new(SyncService::new(store.clone(), controller));
    let initializer = Arc::new(Initializer::new(source, sink, store));
    AppState::new(sync, initializer).with_cron_secret(settings.cron_secret.clone())
}

/// Build the app state with the real Spotify and gateway clients
pub async fn load_state(settings: &Settings) -> Result<AppState, StartupError> {
    let store = open_store(settings.database_url.as_deref()).await?;
    let source = Arc::new(SpotifyClient::new(settings.spotify.clone())?.with_store(store.clone()));
    let sink = Arc::new(GatewayProfileSink::new(settings.gateway.clone())?);
    Ok(build_state(settings, store, source, sink))
}

/// Create and configure the Axum application
pub fn create_app(app_state: AppState) -> Router<()> {
    tracing::info!(
        "Router configured (cron secret {})",
        if app_state.cron_secret.is_some() { "required" } else { "not set" }
    );
    create_router(app_state)
}
