/**
 * SQLite State Store
 *
 * Persists records in a single `kv` table:
 *
 * ```sql
 * kv(key TEXT PRIMARY KEY, value TEXT, version INTEGER, updated_at TEXT)
 * ```
 *
 * Conditional writes are a single `UPDATE ... WHERE version = ?` (or an
 * `INSERT ... ON CONFLICT DO NOTHING` for a key that must not exist), so the
 * version check and the write cannot interleave with another connection.
 */
use crate::backend::store::{StateStore, StoreError, Versioned};
use crate::shared::SharedError;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    version INTEGER NOT NULL,
    updated_at TEXT NOT NULL
)";

/// SQLite-backed store
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open or create the database behind `database_url`
    ///
    /// Uses WAL mode so the status endpoint can read while a tick writes.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePool::connect(database_url).await?;
        sqlx::query("PRAGMA journal_mode=WAL").execute(&pool).await?;
        sqlx::query("PRAGMA synchronous=NORMAL").execute(&pool).await?;
        Self::with_pool(pool).await
    }

    /// Open or create a database file, creating its directory if needed
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
        }
        Self::connect(&format!("sqlite:{}?mode=rwc", path.display())).await
    }

    /// Private in-memory database, one connection so every query sees it
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::query(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }

    /// Platform data directory path for the database file
    pub fn default_path() -> PathBuf {
        let mut path = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
        path.push("tracksync");
        path.push("state.db");
        path
    }

    async fn current_version(&self, key: &str) -> Result<Option<u64>, StoreError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT version FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(v,)| v as u64))
    }
}

fn encode(value: &Value) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|e| SharedError::from(e).into())
}

#[async_trait]
impl StateStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<Versioned<Value>>, StoreError> {
        let row: Option<(String, i64)> = sqlx::query_as("SELECT value, version FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some((text, version)) => {
                let value = serde_json::from_str(&text).map_err(SharedError::from)?;
                Ok(Some(Versioned {
                    value,
                    version: version as u64,
                }))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: Value) -> Result<u64, StoreError> {
        let (version,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO kv (key, value, version, updated_at)
            VALUES (?, ?, 1, ?)
            ON CONFLICT (key) DO UPDATE SET
                value = excluded.value,
                version = kv.version + 1,
                updated_at = excluded.updated_at
            RETURNING version
            "#,
        )
        .bind(key)
        .bind(encode(&value)?)
        .bind(Utc::now().to_rfc3339())
        .fetch_one(&self.pool)
        .await?;
        Ok(version as u64)
    }

    async fn put_if_version(
        &self,
        key: &str,
        value: Value,
        expected: Option<u64>,
    ) -> Result<u64, StoreError> {
        let text = encode(&value)?;
        let now = Utc::now().to_rfc3339();
        let written: Option<(i64,)> = match expected {
            Some(expected) => {
                sqlx::query_as(
                    r#"
                    UPDATE kv SET value = ?, version = version + 1, updated_at = ?
                    WHERE key = ? AND version = ?
                    RETURNING version
                    "#,
                )
                .bind(&text)
                .bind(&now)
                .bind(key)
                .bind(expected as i64)
                .fetch_optional(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    r#"
                    INSERT INTO kv (key, value, version, updated_at)
                    VALUES (?, ?, 1, ?)
                    ON CONFLICT (key) DO NOTHING
                    RETURNING version
                    "#,
                )
                .bind(key)
                .bind(&text)
                .bind(&now)
                .fetch_optional(&self.pool)
                .await?
            }
        };

        match written {
            Some((version,)) => Ok(version as u64),
            None => Err(StoreError::Conflict {
                key: key.to_string(),
                expected,
                found: self.current_version(key).await?,
            }),
        }
    }
}
