/**
 * Handler Response Types
 *
 * JSON bodies returned by the API that are not already shared records.
 */

use crate::shared::{SyncState, TickOutcome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response body for GET /
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub timestamp: DateTime<Utc>,
}

/// Response body for /api/sync
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncResponse {
    pub outcome: TickOutcome,
    pub message: String,
    pub state: SyncState,
    pub timestamp: DateTime<Utc>,
}
