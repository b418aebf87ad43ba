//! State Store
//!
//! Versioned key-value persistence for the service's JSON records.
//!
//! Every key carries a version that increases by one on each write. Readers
//! get the version together with the value and can make their write
//! conditional on it with [`StateStore::put_if_version`]; a concurrent writer
//! in between turns the write into [`StoreError::Conflict`] instead of a lost
//! update.
//!
//! # Keys
//!
//! - `state`  - [`SyncState`], written once per tick
//! - `track`  - [`TrackSnapshot`], the last track fetch
//! - `errors` - [`ErrorLog`], newest-first failures
//! - `tokens` - [`SpotifyTokens`], the last refreshed Spotify tokens
//!
//! # Backends
//!
//! - **`memory`** - process-local map, for tests and throwaway runs
//! - **`sqlite`** - `sqlx` SQLite file, the default for the server

use crate::shared::{ErrorLog, SharedError, SpotifyTokens, SyncState, TrackSnapshot};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// In-memory store
pub mod memory;

/// SQLite store
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub const STATE_KEY: &str = "state";
pub const TRACK_KEY: &str = "track";
pub const ERRORS_KEY: &str = "errors";
pub const TOKENS_KEY: &str = "tokens";

/// A stored value with the version it was read at
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub value: T,
    pub version: u64,
}

/// Storage failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("stored record is invalid: {0}")]
    Decode(#[from] SharedError),

    #[error("write conflict on '{key}': expected version {expected:?}, found {found:?}")]
    Conflict {
        key: String,
        expected: Option<u64>,
        found: Option<u64>,
    },
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Versioned JSON key-value store
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Read a key
    async fn get(&self, key: &str) -> Result<Option<Versioned<Value>>, StoreError>;

    /// Write a key unconditionally, returning the new version
    async fn put(&self, key: &str, value: Value) -> Result<u64, StoreError>;

    /// Write a key only if its version is still `expected` (`None`: key must
    /// not exist yet), returning the new version
    async fn put_if_version(
        &self,
        key: &str,
        value: Value,
        expected: Option<u64>,
    ) -> Result<u64, StoreError>;
}

/// Read and decode a key
pub async fn load<T: DeserializeOwned>(
    store: &dyn StateStore,
    key: &str,
) -> Result<Option<Versioned<T>>, StoreError> {
    match store.get(key).await? {
        Some(Versioned { value, version }) => {
            let value = serde_json::from_value(value).map_err(SharedError::from)?;
            Ok(Some(Versioned { value, version }))
        }
        None => Ok(None),
    }
}

/// Encode and write a key unconditionally
pub async fn save<T: Serialize>(
    store: &dyn StateStore,
    key: &str,
    value: &T,
) -> Result<u64, StoreError> {
    let json = serde_json::to_value(value).map_err(SharedError::from)?;
    store.put(key, json).await
}

/// The sync state with its version; a missing record reads as default with no version
pub async fn load_state(
    store: &dyn StateStore,
) -> Result<(SyncState, Option<u64>), StoreError> {
    Ok(match load::<SyncState>(store, STATE_KEY).await? {
        Some(Versioned { value, version }) => (value, Some(version)),
        None => (SyncState::default(), None),
    })
}

/// Write the sync state conditionally on the version it was read at
pub async fn save_state_if_version(
    store: &dyn StateStore,
    state: &SyncState,
    expected: Option<u64>,
) -> Result<u64, StoreError> {
    let json = serde_json::to_value(state).map_err(SharedError::from)?;
    store.put_if_version(STATE_KEY, json, expected).await
}

pub async fn load_track(store: &dyn StateStore) -> Result<Option<TrackSnapshot>, StoreError> {
    Ok(load::<TrackSnapshot>(store, TRACK_KEY).await?.map(|v| v.value))
}

pub async fn load_errors(store: &dyn StateStore) -> Result<ErrorLog, StoreError> {
    Ok(load::<ErrorLog>(store, ERRORS_KEY)
        .await?
        .map(|v| v.value)
        .unwrap_or_default())
}

pub async fn load_tokens(store: &dyn StateStore) -> Result<Option<SpotifyTokens>, StoreError> {
    Ok(load::<SpotifyTokens>(store, TOKENS_KEY).await?.map(|v| v.value))
}
