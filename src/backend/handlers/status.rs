/**
 * Status Handler
 *
 * GET /api/status returns the persisted sync state with derived health,
 * the last fetched track and the newest error log entries. Read-only and
 * not guarded by the cron secret.
 */

use crate::backend::error::BackendError;
use crate::backend::store::StateStore;
use crate::backend::sync;
use crate::shared::StatusReport;
use axum::{extract::State, response::Json};
use chrono::Utc;
use std::sync::Arc;

/// Status handler
///
/// # Errors
///
/// * `503 Service Unavailable` - If the state store cannot be read
pub async fn get_status(
    State(store): State<Arc<dyn StateStore>>,
) -> Result<Json<StatusReport>, BackendError> {
    let report = sync::status(store.as_ref(), Utc::now()).await?;
    Ok(Json(report))
}
