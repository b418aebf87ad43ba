use crate::backend::store::{StateStore, StoreError, Versioned};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Versioned<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Versioned<Value>>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Value) -> Result<u64, StoreError> {
        let mut entries = self.entries.write().await;
        let version = entries.get(key).map(|e| e.version + 1).unwrap_or(1);
        entries.insert(key.to_string(), Versioned { value, version });
        Ok(version)
    }

    async fn put_if_version(
        &self,
        key: &str,
        value: Value,
        expected: Option<u64>,
    ) -> Result<u64, StoreError> {
        let mut entries = self.entries.write().await;
        let found = entries.get(key).map(|e| e.version);
        if found != expected {
            return Err(StoreError::Conflict {
                key: key.to_string(),
                expected,
                found,
            });
        }
        let version = found.map(|v| v + 1).unwrap_or(1);
        entries.insert(key.to_string(), Versioned { value, version });
        Ok(version)
    }
}
