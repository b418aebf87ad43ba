/**
 * API Routes
 *
 * - `GET /api/status` - Status report (open)
 * - `GET|POST /api/sync` - Run one tick (cron secret)
 * - `GET|POST /api/init` - Initialize state (cron secret)
 */

use crate::backend::handlers::{get_status, run_init, run_sync};
use crate::backend::middleware::cron_auth_middleware;
use crate::backend::server::state::AppState;
use axum::{middleware, routing::get, Router};

pub fn configure_api_routes(router: Router<AppState>, app_state: &AppState) -> Router<AppState> {
    let guarded: Router<AppState> = Router::new()
        .route("/api/sync", get(run_sync).post(run_sync))
        .route("/api/init", get(run_init).post(run_init))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            cron_auth_middleware,
        ));

    router
        .route("/api/status", get(get_status))
        .merge(guarded)
}
