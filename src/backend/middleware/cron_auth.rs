/**
 * Cron Secret Middleware
 *
 * Guards the endpoints that trigger work (`/api/sync`, `/api/init`). When a
 * cron secret is configured, requests must carry
 * `Authorization: Bearer <secret>`; anything else is rejected with 401.
 * Without a configured secret every request passes.
 */

use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

/// Whether `headers` satisfy the configured secret
pub fn is_authorized(headers: &HeaderMap, secret: Option<&str>) -> bool {
    let Some(secret) = secret else {
        return true;
    };
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .is_some_and(|token| token == secret)
}

/// Cron secret middleware
///
/// Returns 401 Unauthorized if the bearer token is missing or wrong
pub async fn cron_auth_middleware(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    if !is_authorized(request.headers(), app_state.cron_secret.as_deref()) {
        tracing::warn!("Rejected {} {}: bad cron secret", request.method(), request.uri().path());
        return Err(BackendError::unauthorized());
    }
    Ok(next.run(request).await)
}
