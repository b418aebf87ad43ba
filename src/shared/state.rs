//! Sync State
//!
//! The single persisted record the sync controller reads at the start of a
//! tick and writes back at the end. Every field is optional on the wire so an
//! older or partially written record still decodes.
//!
//! # Invariants
//!
//! - `backoff_level` is 0 after any successful profile update.
//! - `last_applied_name` only changes after the profile sink confirmed a write.
//! - `backoff_until`, when set by a write failure, equals
//!   `now + min(max_delay, base_delay * 2^(backoff_level - 1))`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Persisted controller state
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SyncState {
    /// Last value successfully written to the profile
    pub last_applied_name: Option<String>,
    /// Track id seen when `last_applied_name` was written
    pub last_track_id: Option<String>,
    /// Profile updates are suppressed until this instant
    pub backoff_until: Option<DateTime<Utc>>,
    /// Consecutive write failures
    pub backoff_level: u32,
    /// Most recent failure description
    pub last_error: Option<String>,
    /// Time of the last executed tick
    pub last_sync_at: Option<DateTime<Utc>>,
    /// Profile name captured at initialization
    pub original_name: Option<String>,
    /// Successful profile writes since initialization
    pub update_count: u64,
    /// Time of the last successful profile write
    pub last_update_at: Option<DateTime<Utc>>,
}

impl SyncState {
    /// Fresh state for an account whose current profile name is `original_name`
    pub fn initialized(original_name: impl Into<String>) -> Self {
        Self {
            original_name: Some(original_name.into()),
            ..Self::default()
        }
    }

    /// Whether a backoff window is still open at `now`
    pub fn in_backoff(&self, now: DateTime<Utc>) -> bool {
        self.backoff_until.is_some_and(|until| until > now)
    }

    /// Seconds left in the backoff window, 0 when none is open
    pub fn backoff_remaining(&self, now: DateTime<Utc>) -> u64 {
        match self.backoff_until {
            Some(until) if until > now => (until - now).num_seconds().max(0) as u64,
            _ => 0,
        }
    }

    /// Whether `candidate` is what the profile already shows
    pub fn is_applied(&self, candidate: &str) -> bool {
        self.last_applied_name.as_deref() == Some(candidate)
    }
}

/// Result of one tick
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TickOutcome {
    /// The profile now shows the new candidate
    Updated,
    /// The candidate equals the applied name; nothing was written
    Unchanged,
    /// A backoff window is open (or another writer won the race); nothing ran
    SkippedBackoff,
    /// A failure opened a new backoff window
    BackoffEntered,
    /// A non-retriable failure was recorded
    FailedFatal,
}

impl TickOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Updated => "UPDATED",
            Self::Unchanged => "UNCHANGED",
            Self::SkippedBackoff => "SKIPPED_BACKOFF",
            Self::BackoffEntered => "BACKOFF_ENTERED",
            Self::FailedFatal => "FAILED_FATAL",
        }
    }
}

impl fmt::Display for TickOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
