/**
 * Sync Handler
 *
 * GET or POST /api/sync runs one tick. External cron services call this
 * endpoint when the in-process scheduler is disabled.
 *
 * # Example Response
 *
 * ```json
 * {
 *   "outcome": "UPDATED",
 *   "message": "Updated to: | Taylor Swift - Anti-Hero",
 *   "state": { "last_applied_name": "| Taylor Swift - Anti-Hero", "backoff_level": 0 },
 *   "timestamp": "2024-05-01T12:00:00Z"
 * }
 * ```
 */

use crate::backend::error::BackendError;
use crate::backend::handlers::types::SyncResponse;
use crate::backend::sync::SyncService;
use axum::{extract::State, response::Json};
use chrono::Utc;
use std::sync::Arc;

/// Run one tick
///
/// # Errors
///
/// * `401 Unauthorized` - From the cron secret middleware
/// * `503 Service Unavailable` - If the state store failed; nothing was persisted
pub async fn run_sync(
    State(service): State<Arc<SyncService>>,
) -> Result<Json<SyncResponse>, BackendError> {
    let now = Utc::now();
    let report = service.tick(now).await?;
    Ok(Json(SyncResponse {
        outcome: report.outcome,
        message: report.message,
        state: report.state,
        timestamp: now,
    }))
}
