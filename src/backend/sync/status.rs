//! Read-only status view over the store.

use crate::backend::store::{
    load_errors, load_state, load_tokens, load_track, StateStore, StoreError,
};
use crate::shared::status::STATUS_ERROR_COUNT;
use crate::shared::{StatusReport, SyncState};
use chrono::{DateTime, Utc};

/// Healthy when no error is recorded and no backoff window is open
pub fn is_healthy(state: &SyncState, now: DateTime<Utc>) -> bool {
    state.last_error.is_none() && !state.in_backoff(now)
}

/// Build the status report at `now`
pub async fn status(store: &dyn StateStore, now: DateTime<Utc>) -> Result<StatusReport, StoreError> {
    let (state, _) = load_state(store).await?;
    let track = load_track(store).await?;
    let errors = load_errors(store).await?;
    let tokens = load_tokens(store).await?;

    Ok(StatusReport {
        healthy: is_healthy(&state, now),
        backoff_remaining_seconds: state.backoff_remaining(now),
        last_sync_ago_seconds: state.last_sync_at.map(|at| (now - at).num_seconds()),
        last_update_ago_seconds: state.last_update_at.map(|at| (now - at).num_seconds()),
        track,
        errors: errors.latest(STATUS_ERROR_COUNT).to_vec(),
        spotify_token: tokens.map(|t| t.status(now)),
        state,
        timestamp: now,
    })
}
