//! Fake collaborators
//!
//! Scripted stand-ins for the Spotify source, the profile gateway and the
//! state store, plus builders wiring them into services and app state.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tracksync::backend::clients::{ProfileSink, SinkError, SourceError, TrackSource};
use tracksync::backend::server::AppState;
use tracksync::backend::store::{MemoryStore, StateStore, StoreError, Versioned};
use tracksync::backend::sync::{Initializer, SyncController, SyncService};
use tracksync::shared::{SharedError, SyncConfig, Track};

pub fn anti_hero() -> Track {
    Track::new("6dODwocEuGzHAavXqTbwHv", "Anti-Hero", vec!["Taylor Swift".to_string()])
        .with_album("Midnights")
}

/// Track source answering from a script; repeats the last answer when exhausted
pub struct ScriptedSource {
    script: Mutex<VecDeque<Result<Option<Track>, SourceError>>>,
    last: Mutex<Result<Option<Track>, SourceError>>,
    calls: Mutex<usize>,
}

impl ScriptedSource {
    pub fn new(script: Vec<Result<Option<Track>, SourceError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(Ok(None)),
            calls: Mutex::new(0),
        })
    }

    pub fn playing(track: Track) -> Arc<Self> {
        Self::new(vec![Ok(Some(track))])
    }

    pub fn idle() -> Arc<Self> {
        Self::new(vec![])
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl TrackSource for ScriptedSource {
    async fn current_track(&self) -> Result<Option<Track>, SourceError> {
        *self.calls.lock().unwrap() += 1;
        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            *last = next;
        }
        last.clone()
    }
}

/// Profile sink recording every write; answers writes from a script, then `Ok`
pub struct RecordingSink {
    name: Result<String, SinkError>,
    script: Mutex<VecDeque<Result<(), SinkError>>>,
    written: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new(name: &str) -> Arc<Self> {
        Self::scripted(name, vec![])
    }

    pub fn scripted(name: &str, script: Vec<Result<(), SinkError>>) -> Arc<Self> {
        Arc::new(Self {
            name: Ok(name.to_string()),
            script: Mutex::new(script.into()),
            written: Mutex::default(),
        })
    }

    pub fn unreadable(error: SinkError) -> Arc<Self> {
        Arc::new(Self {
            name: Err(error),
            script: Mutex::default(),
            written: Mutex::default(),
        })
    }

    pub fn written(&self) -> Vec<String> {
        self.written.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProfileSink for RecordingSink {
    async fn profile_name(&self) -> Result<String, SinkError> {
        self.name.clone()
    }

    async fn set_profile_name(&self, value: &str) -> Result<(), SinkError> {
        self.written.lock().unwrap().push(value.to_string());
        self.script.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}

/// Store whose every operation fails
pub struct BrokenStore;

#[async_trait]
impl StateStore for BrokenStore {
    async fn get(&self, _key: &str) -> Result<Option<Versioned<Value>>, StoreError> {
        Err(StoreError::Decode(SharedError::serialization("disk on fire")))
    }

    async fn put(&self, _key: &str, _value: Value) -> Result<u64, StoreError> {
        Err(StoreError::Decode(SharedError::serialization("disk on fire")))
    }

    async fn put_if_version(
        &self,
        _key: &str,
        _value: Value,
        _expected: Option<u64>,
    ) -> Result<u64, StoreError> {
        Err(StoreError::Decode(SharedError::serialization("disk on fire")))
    }
}

pub fn sync_service(
    store: Arc<dyn StateStore>,
    source: Arc<dyn TrackSource>,
    sink: Arc<dyn ProfileSink>,
    config: SyncConfig,
) -> SyncService {
    SyncService::new(store, SyncController::new(source, sink, config))
}

/// App state over the given collaborators
pub fn app_state(
    store: Arc<dyn StateStore>,
    source: Arc<dyn TrackSource>,
    sink: Arc<dyn ProfileSink>,
    cron_secret: Option<&str>,
) -> AppState {
    let sync = Arc::new(sync_service(
        store.clone(),
        source.clone(),
        sink.clone(),
        SyncConfig::default(),
    ));
    let initializer = Arc::new(Initializer::new(source, sink, store));
    AppState::new(sync, initializer).with_cron_secret(cron_secret.map(str::to_string))
}

/// App state with an in-memory store, playing Anti-Hero
pub fn default_app_state(cron_secret: Option<&str>) -> (AppState, Arc<MemoryStore>, Arc<RecordingSink>) {
    let store = Arc::new(MemoryStore::new());
    let sink = RecordingSink::new("Smith");
    let state = app_state(
        store.clone(),
        ScriptedSource::playing(anti_hero()),
        sink.clone(),
        cron_secret,
    );
    (state, store, sink)
}
