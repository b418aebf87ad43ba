//! Sync Controller
//!
//! One tick of the update-or-backoff state machine:
//!
//! 1. An open backoff window skips the tick without touching the state.
//! 2. The track source is asked what is playing. A transient failure opens a
//!    fixed `transient` window; a fatal one is recorded as `FAILED_FATAL`.
//!    While no original profile name is known, the sink is asked for the
//!    current one before anything is written. A name equal to the last
//!    mirrored one is not taken as the original.
//! 3. The candidate name is rendered from the track (or the idle policy) and
//!    truncated. A candidate equal to the applied name is `UNCHANGED`, and so
//!    is one that arrives inside the configured update throttle.
//! 4. Otherwise the profile sink writes it. Success resets the backoff;
//!    rate limits and transient write failures back off exponentially;
//!    rejected credentials are `FAILED_FATAL`.
//!
//! The controller never touches storage. It takes the state by reference and
//! returns the next state in a [`TickReport`], which the sync service persists.

use crate::backend::clients::{ProfileSink, SinkError, SourceError, TrackSource};
use crate::backend::sync::backoff::BackoffPolicy;
use crate::shared::{
    truncate, ErrorEntry, IdlePolicy, SyncConfig, SyncState, TickOutcome, Track,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

pub const SOURCE_CONTEXT: &str = "track_source";
pub const SINK_CONTEXT: &str = "profile_update";
pub const ORIGINAL_NAME_CONTEXT: &str = "original_name";

/// Result of one tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// State to persist
    pub state: SyncState,
    pub outcome: TickOutcome,
    /// Human readable summary
    pub message: String,
    /// `Some` when the track source answered, holding what was playing
    pub fetched: Option<Option<Track>>,
    /// The failure this tick recorded, if any
    pub error: Option<ErrorEntry>,
}

impl TickReport {
    fn new(state: SyncState, outcome: TickOutcome, message: impl Into<String>) -> Self {
        Self {
            state,
            outcome,
            message: message.into(),
            fetched: None,
            error: None,
        }
    }

    fn fetched(mut self, track: Option<Track>) -> Self {
        self.fetched = Some(track);
        self
    }

    fn failed(mut self, now: DateTime<Utc>, error: String, context: &str) -> Self {
        self.error = Some(ErrorEntry {
            timestamp: now,
            error,
            context: context.to_string(),
        });
        self
    }
}

/// Update-or-backoff controller
pub struct SyncController {
    source: Arc<dyn TrackSource>,
    sink: Arc<dyn ProfileSink>,
    config: SyncConfig,
    backoff: BackoffPolicy,
}

impl SyncController {
    pub fn new(
        source: Arc<dyn TrackSource>,
        sink: Arc<dyn ProfileSink>,
        config: SyncConfig,
    ) -> Self {
        let backoff = BackoffPolicy::from_config(&config);
        Self {
            source,
            sink,
            config,
            backoff,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Render and truncate the profile name for a playing track
    pub fn candidate_for(&self, track: &Track) -> String {
        self.fit(&self.config.template.render(track))
    }

    /// Profile name to show when nothing is playing, `None` if there is nothing to write
    pub fn idle_candidate(&self, state: &SyncState) -> Option<String> {
        match &self.config.idle {
            IdlePolicy::Restore => state.original_name.as_deref().map(|name| self.fit(name)),
            IdlePolicy::Clear => Some(String::new()),
            IdlePolicy::Text(text) => Some(self.fit(text)),
        }
    }

    fn fit(&self, value: &str) -> String {
        truncate(
            value,
            self.config.truncate_length,
            self.config.truncate_ellipsis,
        )
    }

    /// Run one tick against `state` at `now`
    pub async fn run_tick(&self, state: &SyncState, now: DateTime<Utc>) -> TickReport {
        if state.in_backoff(now) {
            let remaining = state.backoff_remaining(now);
            debug!("In backoff for another {}s, skipping tick", remaining);
            return TickReport::new(
                state.clone(),
                TickOutcome::SkippedBackoff,
                format!("In backoff, {}s remaining", remaining),
            );
        }

        let mut next = state.clone();
        next.last_sync_at = Some(now);

        let fetched = match timeout(self.config.request_timeout, self.source.current_track()).await
        {
            Ok(Ok(track)) => track,
            Ok(Err(SourceError::Fatal(reason))) => {
                let error = SourceError::Fatal(reason).to_string();
                return self.give_up(next, now, error, SOURCE_CONTEXT);
            }
            Ok(Err(SourceError::Transient(reason))) => {
                let error = SourceError::Transient(reason).to_string();
                return self.retry_later(next, now, error, SOURCE_CONTEXT);
            }
            Err(_) => {
                let error = SourceError::Transient(format!(
                    "track source timed out after {}s",
                    self.config.request_timeout.as_secs()
                ))
                .to_string();
                return self.retry_later(next, now, error, SOURCE_CONTEXT);
            }
        };

        if next.original_name.is_none() {
            if let Err(e) = self.capture_original(&mut next).await {
                let error = format!("failed to read the current profile name: {}", e);
                let report = match e {
                    SinkError::Fatal(_) => self.give_up(next, now, error, ORIGINAL_NAME_CONTEXT),
                    _ => self.retry_later(next, now, error, ORIGINAL_NAME_CONTEXT),
                };
                return report.fetched(fetched);
            }
        }

        let candidate = match &fetched {
            Some(track) => Some(self.candidate_for(track)),
            None => self.idle_candidate(&next),
        };
        let Some(candidate) = candidate else {
            debug!("Nothing playing and no original name to restore");
            return TickReport::new(next, TickOutcome::Unchanged, "Nothing playing")
                .fetched(fetched);
        };

        if state.is_applied(&candidate) {
            debug!("Profile already shows {:?}", candidate);
            return TickReport::new(next, TickOutcome::Unchanged, "Name unchanged")
                .fetched(fetched);
        }

        if let Some(wait) = self.throttle_remaining(state, fetched.as_ref(), now) {
            debug!("Update throttled for another {}s", wait);
            return TickReport::new(
                next,
                TickOutcome::Unchanged,
                format!("Throttled, next update in {}s", wait),
            )
            .fetched(fetched);
        }

        let write = timeout(
            self.config.request_timeout,
            self.sink.set_profile_name(&candidate),
        )
        .await
        .unwrap_or_else(|_| {
            Err(SinkError::Transient(format!(
                "timed out after {}s",
                self.config.request_timeout.as_secs()
            )))
        });

        match write {
            Ok(()) => {
                info!("Profile name updated to {:?}", candidate);
                next.last_track_id = fetched.as_ref().map(|t| t.id.clone());
                next.last_applied_name = Some(candidate.clone());
                next.backoff_level = 0;
                next.backoff_until = None;
                next.last_error = None;
                next.update_count += 1;
                next.last_update_at = Some(now);
                TickReport::new(
                    next,
                    TickOutcome::Updated,
                    format!("Updated to: {}", candidate),
                )
                .fetched(fetched)
            }
            Err(SinkError::Fatal(reason)) => {
                let error = SinkError::Fatal(reason).to_string();
                warn!("Profile update failed permanently: {}", error);
                next.last_error = Some(error.clone());
                TickReport::new(next, TickOutcome::FailedFatal, error.clone())
                    .fetched(fetched)
                    .failed(now, error, SINK_CONTEXT)
            }
            Err(retriable) => {
                if let SinkError::RateLimited {
                    retry_after: Some(hint),
                } = &retriable
                {
                    info!("Profile sink asked to wait {}s", hint);
                }
                let error = retriable.to_string();
                next.backoff_level = next.backoff_level.saturating_add(1);
                let delay = self.backoff.delay_for(next.backoff_level);
                next.backoff_until = Some(self.backoff.until(now, next.backoff_level));
                next.last_error = Some(error.clone());
                warn!(
                    "{}; backing off {}s (level {})",
                    error, delay, next.backoff_level
                );
                TickReport::new(
                    next,
                    TickOutcome::BackoffEntered,
                    format!("Backing off for {}s: {}", delay, error),
                )
                .fetched(fetched)
                .failed(now, error, SINK_CONTEXT)
            }
        }
    }

    /// Read the profile name shown now into `original_name`
    async fn capture_original(&self, next: &mut SyncState) -> Result<(), SinkError> {
        let name = timeout(self.config.request_timeout, self.sink.profile_name())
            .await
            .unwrap_or_else(|_| {
                Err(SinkError::Transient(format!(
                    "timed out after {}s",
                    self.config.request_timeout.as_secs()
                )))
            })?;
        if next.last_applied_name.as_deref() == Some(name.as_str()) {
            warn!(
                "Profile shows the mirrored name {:?}, not keeping it as the original",
                name
            );
            return Ok(());
        }
        info!("Captured original profile name {:?}", name);
        next.original_name = Some(name);
        Ok(())
    }

    /// Seconds left before another write is allowed, `None` when not throttled
    fn throttle_remaining(
        &self,
        state: &SyncState,
        fetched: Option<&Track>,
        now: DateTime<Utc>,
    ) -> Option<i64> {
        let last = state.last_update_at?;
        let same_track = fetched.map(|t| t.id.as_str()) == state.last_track_id.as_deref();
        let interval = if same_track {
            self.config.min_update_interval_secs
        } else {
            self.config.track_change_interval_secs
        };
        if interval == 0 {
            return None;
        }
        let interval = i64::try_from(interval).unwrap_or(i64::MAX);
        let elapsed = (now - last).num_seconds();
        (elapsed < interval).then(|| interval.saturating_sub(elapsed))
    }

    /// Failed read: fixed `transient` window, `backoff_level` untouched
    fn retry_later(
        &self,
        mut next: SyncState,
        now: DateTime<Utc>,
        error: String,
        context: &str,
    ) -> TickReport {
        warn!("{}; retrying in {}s", error, self.backoff.transient_secs);
        next.last_error = Some(error.clone());
        next.backoff_until = Some(self.backoff.transient_until(now));
        TickReport::new(
            next,
            TickOutcome::BackoffEntered,
            format!("Retrying in {}s: {}", self.backoff.transient_secs, error),
        )
        .failed(now, error, context)
    }

    fn give_up(&self, mut next: SyncState, now: DateTime<Utc>, error: String, context: &str) -> TickReport {
        warn!("{}", error);
        next.last_error = Some(error.clone());
        TickReport::new(next, TickOutcome::FailedFatal, error.clone()).failed(now, error, context)
    }
}
