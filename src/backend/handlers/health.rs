use crate::backend::handlers::types::HealthResponse;
use axum::response::Json;
use chrono::Utc;

/// GET / - liveness check
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        timestamp: Utc::now(),
    })
}
