//! SQLite store tests on real database files

use crate::common::*;
use serde_json::json;
use std::sync::Arc;
use tracksync::backend::store::{
    load_errors, load_state, load_track, save_state_if_version, SqliteStore, StateStore,
    StoreError,
};
use tracksync::backend::clients::SinkError;
use tracksync::shared::{SyncConfig, SyncState, TickOutcome};

#[tokio::test]
async fn test_state_survives_reopen() {
    let dir = assert_ok!(tempfile::tempdir());
    let path = dir.path().join("nested").join("state.db");

    {
        let store = assert_ok!(SqliteStore::open(&path).await);
        let state = SyncState::initialized("Smith");
        assert_ok!(save_state_if_version(&store, &state, None).await);
    }

    let store = assert_ok!(SqliteStore::open(&path).await);
    let (state, version) = assert_ok!(load_state(&store).await);
    assert_eq!(state.original_name.as_deref(), Some("Smith"));
    assert_eq!(version, Some(1));
}

#[tokio::test]
async fn test_two_handles_conflict() {
    let dir = assert_ok!(tempfile::tempdir());
    let path = dir.path().join("state.db");
    let first = assert_ok!(SqliteStore::open(&path).await);
    let second = assert_ok!(SqliteStore::open(&path).await);

    let v1 = assert_ok!(first.put_if_version("state", json!({"n": 1}), None).await);
    assert_ok!(second.put_if_version("state", json!({"n": 2}), Some(v1)).await);

    assert_err!(
        first.put_if_version("state", json!({"n": 3}), Some(v1)).await,
        StoreError::Conflict { .. }
    );
    let stored = assert_ok!(first.get("state").await).unwrap();
    assert_eq!(stored.value, json!({"n": 2}));
}

#[tokio::test]
async fn test_sync_service_on_sqlite() {
    let dir = assert_ok!(tempfile::tempdir());
    let store = Arc::new(assert_ok!(SqliteStore::open(&dir.path().join("state.db")).await));
    let sink = RecordingSink::scripted(
        "Smith",
        vec![Ok(()), Err(SinkError::Transient("connection reset".to_string()))],
    );
    let source = ScriptedSource::new(vec![
        Ok(Some(anti_hero())),
        Ok(Some(anti_hero())),
        Ok(Some(tracksync::shared::Track::new(
            "t2",
            "Cruel Summer",
            vec!["Taylor Swift".to_string()],
        ))),
    ]);
    let service = sync_service(store.clone(), source, sink.clone(), SyncConfig::default());
    let now = chrono::Utc::now();

    let outcomes = vec![
        assert_ok!(service.tick(now).await).outcome,
        assert_ok!(service.tick(now).await).outcome,
        assert_ok!(service.tick(now).await).outcome,
    ];

    assert_eq!(
        outcomes,
        vec![TickOutcome::Updated, TickOutcome::Unchanged, TickOutcome::BackoffEntered]
    );
    let (state, version) = assert_ok!(load_state(store.as_ref()).await);
    assert_eq!(version, Some(3));
    assert_eq!(state.last_applied_name.as_deref(), Some("| Taylor Swift - Anti-Hero"));
    assert_eq!(state.backoff_level, 1);
    assert_backoff_secs!(state, now, 60);
    assert_eq!(assert_ok!(load_errors(store.as_ref()).await).len(), 1);
    let track = assert_ok!(load_track(store.as_ref()).await).unwrap();
    assert_eq!(track.track.unwrap().title, "Cruel Summer");
}
