use crate::backend::sync::{InitReport, Initializer};
use axum::{extract::State, http::StatusCode, response::Json};
use std::sync::Arc;

/// GET or POST /api/init - 200 when every step succeeded, 500 otherwise
pub async fn run_init(
    State(initializer): State<Arc<Initializer>>,
) -> (StatusCode, Json<InitReport>) {
    let report = initializer.initialize().await;
    let status = if report.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(report))
}
