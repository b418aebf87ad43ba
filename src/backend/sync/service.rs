/**
 * Sync Service
 *
 * Runs the controller against the persisted state:
 *
 * 1. Load the `state` record with its version. A storage failure aborts the
 *    tick and nothing is written.
 * 2. Run the controller.
 * 3. Persist the new state conditionally on the version read in step 1,
 *    unless the controller skipped the tick. Losing that race to another
 *    tick turns the outcome into `SKIPPED_BACKOFF`; the winner's state stays.
 * 4. Record the track snapshot and append to the error log. These are
 *    dashboard records, so their failures are logged and not returned.
 */
use crate::backend::store::{
    self, load_errors, load_state, save_state_if_version, StateStore, StoreError, ERRORS_KEY,
    TRACK_KEY,
};
use crate::backend::sync::controller::{SyncController, TickReport};
use crate::shared::{ErrorEntry, SyncState, TickOutcome, TrackSnapshot};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Controller plus the store it persists into
pub struct SyncService {
    store: Arc<dyn StateStore>,
    controller: SyncController,
}

impl SyncService {
    pub fn new(store: Arc<dyn StateStore>, controller: SyncController) -> Self {
        Self { store, controller }
    }

    pub fn store(&self) -> &Arc<dyn StateStore> {
        &self.store
    }

    pub fn controller(&self) -> &SyncController {
        &self.controller
    }

    /// Run one tick at `now`
    pub async fn tick(&self, now: DateTime<Utc>) -> Result<TickReport, StoreError> {
        let span = tracing::info_span!("tick", id = %Uuid::new_v4());
        self.tick_inner(now).instrument(span).await
    }

    async fn tick_inner(&self, now: DateTime<Utc>) -> Result<TickReport, StoreError> {
        let (state, version) = load_state(self.store.as_ref()).await?;
        let mut report = self.controller.run_tick(&state, now).await;

        if report.outcome != TickOutcome::SkippedBackoff {
            match save_state_if_version(self.store.as_ref(), &report.state, version).await {
                Ok(_) => {}
                Err(e) if e.is_conflict() => {
                    tracing::warn!("{}; another tick won, discarding this one", e);
                    report = lost_race(report, state);
                }
                Err(e) => return Err(e),
            }
        }

        self.record_aux(&report, now).await;
        tracing::info!("Tick finished: {} ({})", report.outcome, report.message);
        Ok(report)
    }

    async fn record_aux(&self, report: &TickReport, now: DateTime<Utc>) {
        if let Some(track) = &report.fetched {
            let snapshot = TrackSnapshot::new(track.clone(), now);
            if let Err(e) = store::save(self.store.as_ref(), TRACK_KEY, &snapshot).await {
                tracing::warn!("Failed to save track snapshot: {}", e);
            }
        }
        if let Some(entry) = &report.error {
            if let Err(e) = self.append_error(entry.clone()).await {
                tracing::warn!("Failed to append to error log: {}", e);
            }
        }
    }

    async fn append_error(&self, entry: ErrorEntry) -> Result<(), StoreError> {
        let mut log = load_errors(self.store.as_ref()).await?;
        log.push(entry);
        store::save(self.store.as_ref(), ERRORS_KEY, &log).await?;
        Ok(())
    }
}

fn lost_race(report: TickReport, state: SyncState) -> TickReport {
    TickReport {
        state,
        outcome: TickOutcome::SkippedBackoff,
        message: "Concurrent tick already updated the state".to_string(),
        ..report
    }
}
