/**
 * Initializer
 *
 * First-time setup, also usable to start over:
 *
 * 1. Capture the profile name the account shows now, so the `restore` idle
 *    policy has something to put back. If that name is the one the service
 *    last mirrored, the previously captured original is kept instead; with
 *    no previous original the step fails.
 * 2. Check that the track source accepts its credentials.
 * 3. Write a fresh state record carrying the captured name. This write is
 *    unconditional and replaces whatever state existed.
 *
 * A failing step is recorded and the remaining steps still run. The state is
 * only written when step 1 succeeded.
 */
use crate::backend::clients::{ProfileSink, TrackSource};
use crate::backend::store::{self, load_state, StateStore, StoreError, STATE_KEY};
use crate::shared::SyncState;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Outcome of an initialization run
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InitReport {
    pub success: bool,
    pub steps: Vec<String>,
    pub errors: Vec<String>,
}

pub struct Initializer {
    source: Arc<dyn TrackSource>,
    sink: Arc<dyn ProfileSink>,
    store: Arc<dyn StateStore>,
}

impl Initializer {
    pub fn new(
        source: Arc<dyn TrackSource>,
        sink: Arc<dyn ProfileSink>,
        store: Arc<dyn StateStore>,
    ) -> Self {
        Self {
            source,
            sink,
            store,
        }
    }

    pub async fn initialize(&self) -> InitReport {
        let mut report = InitReport::default();

        let original = match self.sink.profile_name().await {
            Ok(name) => self.unmirrored(name, &mut report).await,
            Err(e) => {
                report.errors.push(format!("Failed to read profile name: {}", e));
                None
            }
        };

        match self.source.current_track().await {
            Ok(_) => report.steps.push("Spotify credentials verified".to_string()),
            Err(e) => report.errors.push(format!("Spotify check failed: {}", e)),
        }

        if let Some(name) = original {
            match self.reset_state(name).await {
                Ok(version) => report
                    .steps
                    .push(format!("State initialized (version {})", version)),
                Err(e) => report.errors.push(format!("Failed to save state: {}", e)),
            }
        }

        report.success = report.errors.is_empty();
        if report.success {
            tracing::info!("Initialization complete: {:?}", report.steps);
        } else {
            tracing::warn!("Initialization finished with errors: {:?}", report.errors);
        }
        report
    }

    /// `name` unless it is the name this service last wrote
    async fn unmirrored(&self, name: String, report: &mut InitReport) -> Option<String> {
        let previous = match load_state(self.store.as_ref()).await {
            Ok((state, _)) => state,
            Err(e) => {
                tracing::warn!("Failed to read previous state, capturing as is: {}", e);
                SyncState::default()
            }
        };
        if previous.last_applied_name.as_deref() != Some(name.as_str()) {
            report.steps.push(format!("Original name captured: {:?}", name));
            return Some(name);
        }
        match previous.original_name {
            Some(original) => {
                tracing::warn!("Profile shows the mirrored name {:?}, keeping {:?}", name, original);
                report.steps.push(format!(
                    "Profile shows the mirrored name {:?}, kept original name {:?}",
                    name, original
                ));
                Some(original)
            }
            None => {
                report.errors.push(format!(
                    "Profile shows the mirrored name {:?} and no original name is known; \
                     set the name back and run init again",
                    name
                ));
                None
            }
        }
    }

    async fn reset_state(&self, original_name: String) -> Result<u64, StoreError> {
        let state = SyncState::initialized(original_name);
        store::save(self.store.as_ref(), STATE_KEY, &state).await
    }
}
