//! SQLite cache backend.
//!
//! This module initializes the SQLite connection pool with:
//! - WAL mode enabled so several processes can share one cache file
//! - Automatic database file creation
//!
//! and stores entries in a single `link_cache` table with an absolute
//! millisecond expiry timestamp. Expired rows are deleted on every write.

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::{error, info};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use super::{CacheBackend, CacheWrite};
use crate::error_handling::CacheError;

/// Initializes and returns a connection pool for the cache file.
///
/// Creates the database file if it doesn't exist and enables WAL mode
/// for better concurrent access.
pub async fn init_cache_pool(db_path: &Path) -> Result<Arc<SqlitePool>, CacheError> {
    let db_path_str = db_path.to_string_lossy().to_string();
    match OpenOptions::new()
        .read(true)
        .write(true)
        .create_new(true)
        .open(&db_path_str)
    {
        Ok(_) => info!("Cache database file created successfully."),
        Err(ref e) if e.kind() == ErrorKind::AlreadyExists => {
            info!("Cache database file already exists.")
        }
        Err(e) => {
            error!("Failed to create cache database file: {e}");
            return Err(CacheError::FileCreationError(e.to_string()));
        }
    }

    let pool = SqlitePool::connect(&format!("sqlite:{}", db_path_str))
        .await
        .map_err(|e| {
            error!("Failed to connect to cache database: {e}");
            CacheError::SqlError(e)
        })?;

    sqlx::query("PRAGMA journal_mode=WAL")
        .execute(&pool)
        .await
        .map_err(|e| {
            error!("Failed to set WAL mode: {e}");
            CacheError::SqlError(e)
        })?;

    Ok(Arc::new(pool))
}

/// [`CacheBackend`] stored in SQLite.
#[derive(Debug, Clone)]
pub struct SqliteCache {
    pool: Arc<SqlitePool>,
}

impl SqliteCache {
    /// Opens (creating if needed) the cache file at `path`.
    pub async fn open(path: &Path) -> Result<Self, CacheError> {
        let pool = init_cache_pool(path).await?;
        Self::from_pool(pool).await
    }

    /// Wraps an existing pool, creating the cache table if missing.
    pub async fn from_pool(pool: Arc<SqlitePool>) -> Result<Self, CacheError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS link_cache (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                expires_at INTEGER NOT NULL
            )",
        )
        .execute(&*pool)
        .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_link_cache_expires_at ON link_cache (expires_at)")
            .execute(&*pool)
            .await?;
        Ok(Self { pool })
    }

    /// Deletes expired rows, returning how many were removed.
    pub async fn purge_expired(&self) -> Result<u64, CacheError> {
        let result = sqlx::query("DELETE FROM link_cache WHERE expires_at <= ?")
            .bind(Utc::now().timestamp_millis())
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl CacheBackend for SqliteCache {
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, CacheError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut query =
            QueryBuilder::<Sqlite>::new("SELECT key, value FROM link_cache WHERE expires_at > ");
        query.push_bind(Utc::now().timestamp_millis());
        query.push(" AND key IN (");
        let mut separated = query.separated(", ");
        for key in keys {
            separated.push_bind(key.as_str());
        }
        separated.push_unseparated(")");

        let rows = query.build().fetch_all(&*self.pool).await?;
        let mut found = std::collections::HashMap::with_capacity(rows.len());
        for row in rows {
            let key: String = row.try_get("key")?;
            let value: String = row.try_get("value")?;
            found.insert(key, value);
        }

        Ok(keys.iter().map(|key| found.get(key).cloned()).collect())
    }

    async fn set_many(&self, writes: &[CacheWrite]) -> Result<(), CacheError> {
        if writes.is_empty() {
            return Ok(());
        }

        let now = Utc::now().timestamp_millis();
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM link_cache WHERE expires_at <= ?")
            .bind(now)
            .execute(&mut *tx)
            .await?;
        for write in writes {
            let ttl_ms = i64::try_from(write.ttl.as_millis()).unwrap_or(i64::MAX);
            sqlx::query(
                "INSERT INTO link_cache (key, value, expires_at) VALUES (?, ?, ?)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    expires_at = excluded.expires_at",
            )
            .bind(&write.key)
            .bind(&write.value)
            .bind(now.saturating_add(ttl_ms))
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
