/**
 * Router Configuration
 *
 * Assembles the liveness route, the API routes and the request tracing
 * layer into a single router.
 */

use crate::backend::handlers::health;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;
use axum::{http::StatusCode, routing::get, Router};
use tower_http::trace::TraceLayer;

/// Create the Axum router with all routes configured
///
/// - `GET /` - Liveness
/// - `/api/*` - See `api_routes`
///
/// Unknown paths return 404.
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new().route("/", get(health));
    let router = configure_api_routes(router, &app_state);

    router
        .fallback(|| async { (StatusCode::NOT_FOUND, "404 Not Found") })
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
