//! HTTP API tests

use crate::common::*;
use axum::http::{header, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::Value;
use std::sync::Arc;
use tracksync::backend::clients::SinkError;
use tracksync::backend::handlers::{HealthResponse, SyncResponse};
use tracksync::backend::server::create_app;
use tracksync::backend::store::{load_state, save_state_if_version, MemoryStore};
use tracksync::backend::sync::InitReport;
use tracksync::shared::{StatusReport, SyncState, TickOutcome};

fn server(state: tracksync::backend::server::AppState) -> TestServer {
    assert_ok!(TestServer::new(create_app(state)))
}

fn bearer(secret: &'static str) -> HeaderValue {
    assert_ok!(HeaderValue::from_str(&format!("Bearer {}", secret)))
}

#[tokio::test]
async fn test_health() {
    let (state, _, _) = default_app_state(None);
    let response = server(state).get("/").await;

    response.assert_status_ok();
    let body: HealthResponse = response.json();
    assert_eq!(body.status, "ok");
    assert_eq!(body.service, "tracksync");
}

#[tokio::test]
async fn test_unknown_path_is_404() {
    let (state, _, _) = default_app_state(None);
    server(state).get("/nope").await.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sync_updates_profile() {
    let (state, store, sink) = default_app_state(None);
    let server = server(state);

    let response = server.post("/api/sync").await;

    response.assert_status_ok();
    let body: SyncResponse = response.json();
    assert_eq!(body.outcome, TickOutcome::Updated);
    assert_eq!(
        body.state.last_applied_name.as_deref(),
        Some("| Taylor Swift - Anti-Hero")
    );
    assert_eq!(sink.written(), vec!["| Taylor Swift - Anti-Hero".to_string()]);
    let (stored, _) = assert_ok!(load_state(store.as_ref()).await);
    assert_eq!(stored, body.state);

    let again: SyncResponse = server.get("/api/sync").await.json();
    assert_eq!(again.outcome, TickOutcome::Unchanged);
}

#[tokio::test]
async fn test_sync_requires_cron_secret() {
    let (state, _, sink) = default_app_state(Some("s3cret"));
    let server = server(state);

    let response = server.post("/api/sync").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["status"], 401);
    assert_eq!(body["error"], "Unauthorized");

    server
        .post("/api/sync")
        .add_header(header::AUTHORIZATION, bearer("wrong"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    assert!(sink.written().is_empty());

    server
        .post("/api/sync")
        .add_header(header::AUTHORIZATION, bearer("s3cret"))
        .await
        .assert_status_ok();
    assert_eq!(sink.written().len(), 1);
}

#[tokio::test]
async fn test_status_is_not_guarded() {
    let (state, _, _) = default_app_state(Some("s3cret"));
    let response = server(state).get("/api/status").await;

    response.assert_status_ok();
    let report: StatusReport = response.json();
    assert!(report.healthy);
    assert_eq!(report.state, SyncState::default());
}

#[tokio::test]
async fn test_status_after_rate_limit() {
    let store = Arc::new(MemoryStore::new());
    let sink = RecordingSink::scripted(
        "Smith",
        vec![Err(SinkError::RateLimited { retry_after: Some(42) })],
    );
    let state = app_state(
        store.clone(),
        ScriptedSource::playing(anti_hero()),
        sink,
        None,
    );
    let server = server(state);

    let sync: SyncResponse = server.post("/api/sync").await.json();
    assert_eq!(sync.outcome, TickOutcome::BackoffEntered);

    let report: StatusReport = server.get("/api/status").await.json();
    assert!(!report.healthy);
    assert_eq!(report.state.backoff_level, 1);
    assert!(report.backoff_remaining_seconds > 50);
    assert_eq!(report.errors.len(), 1);
    assert_contains!(report.errors[0].error, "42s");
    assert!(report.track.unwrap().is_playing);

    let skipped: SyncResponse = server.post("/api/sync").await.json();
    assert_eq!(skipped.outcome, TickOutcome::SkippedBackoff);
}

#[tokio::test]
async fn test_storage_failure_is_503() {
    let state = app_state(
        Arc::new(BrokenStore),
        ScriptedSource::playing(anti_hero()),
        RecordingSink::new("Smith"),
        None,
    );
    let server = server(state);

    let response = server.post("/api/sync").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["status"], 503);

    server
        .get("/api/status")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_init_captures_original_name() {
    let (state, store, _) = default_app_state(Some("s3cret"));
    let previous = SyncState {
        backoff_level: 4,
        ..SyncState::default()
    };
    assert_ok!(save_state_if_version(store.as_ref(), &previous, None).await);
    let server = server(state);

    let response = server
        .post("/api/init")
        .add_header(header::AUTHORIZATION, bearer("s3cret"))
        .await;

    response.assert_status_ok();
    let report: InitReport = response.json();
    assert!(report.success);
    let (stored, _) = assert_ok!(load_state(store.as_ref()).await);
    assert_eq!(stored, SyncState::initialized("Smith"));
}

#[tokio::test]
async fn test_init_failure_is_500() {
    let state = app_state(
        Arc::new(MemoryStore::new()),
        ScriptedSource::idle(),
        RecordingSink::unreadable(SinkError::Fatal("session revoked".to_string())),
        None,
    );

    let response = server(state).get("/api/init").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let report: InitReport = response.json();
    assert!(!report.success);
    assert_contains!(report.errors[0], "session revoked");
}
