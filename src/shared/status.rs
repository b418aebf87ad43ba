/**
 * Status Records
 *
 * Read-only records shown on the dashboard: the last fetched track, the
 * recent error log and the combined status report. None of these feed back
 * into the sync decision.
 */
use crate::shared::state::SyncState;
use crate::shared::token::TokenStatus;
use crate::shared::track::Track;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Entries kept in the error log
pub const ERROR_LOG_CAPACITY: usize = 10;
/// Entries returned by the status report
pub const STATUS_ERROR_COUNT: usize = 5;

/// The last track fetch, stored under the `track` key
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackSnapshot {
    pub is_playing: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub track: Option<Track>,
    pub fetched_at: DateTime<Utc>,
}

impl TrackSnapshot {
    pub fn new(track: Option<Track>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            is_playing: track.is_some(),
            track,
            fetched_at,
        }
    }
}

/// One error log entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorEntry {
    pub timestamp: DateTime<Utc>,
    pub error: String,
    pub context: String,
}

/// Newest-first error log, stored under the `errors` key
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ErrorLog(Vec<ErrorEntry>);

impl ErrorLog {
    /// Prepend an entry, dropping the oldest past capacity
    pub fn push(&mut self, entry: ErrorEntry) {
        self.0.insert(0, entry);
        self.0.truncate(ERROR_LOG_CAPACITY);
    }

    pub fn latest(&self, count: usize) -> &[ErrorEntry] {
        &self.0[..count.min(self.0.len())]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Status view served to the dashboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusReport {
    pub state: SyncState,
    pub healthy: bool,
    pub backoff_remaining_seconds: u64,
    pub last_sync_ago_seconds: Option<i64>,
    pub last_update_ago_seconds: Option<i64>,
    pub track: Option<TrackSnapshot>,
    pub errors: Vec<ErrorEntry>,
    /// `None` until the first token refresh has been stored
    #[serde(default)]
    pub spotify_token: Option<TokenStatus>,
    pub timestamp: DateTime<Utc>,
}
