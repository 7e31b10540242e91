//! SQLite-backed key-value store.

use crate::error::StoreError;
use crate::kv::KeyValueStore;
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::SqliteConnection;

use super::Database;

impl Database {
    async fn upsert(conn: &mut SqliteConnection, key: &str, value: &Value) -> Result<()> {
        let encoded = serde_json::to_string(value)?;
        let now = chrono::Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(&encoded)
        .bind(now)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            Error::Store(StoreError::QueryFailed(format!(
                "Failed to write key '{}': {}",
                key, e
            )))
        })?;

        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for Database {
    async fn read(&self, key: &str) -> Result<Option<Value>> {
        let raw: Option<String> = sqlx::query_scalar(
            r#"
            SELECT value FROM kv_store WHERE key = ?
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            Error::Store(StoreError::QueryFailed(format!(
                "Failed to read key '{}': {}",
                key, e
            )))
        })?;

        raw.map(|text| {
            serde_json::from_str(&text).map_err(|e| {
                Error::Store(StoreError::CorruptValue {
                    key: key.to_string(),
                    reason: e.to_string(),
                })
            })
        })
        .transpose()
    }

    async fn write(&self, key: &str, value: Value) -> Result<()> {
        let mut conn = self.pool.acquire().await.map_err(|e| {
            Error::Store(StoreError::ConnectionFailed(format!(
                "Failed to acquire connection: {}",
                e
            )))
        })?;
        Self::upsert(&mut *conn, key, &value).await
    }

    async fn write_batch(&self, entries: Vec<(String, Value)>) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            Error::Store(StoreError::QueryFailed(format!(
                "Failed to begin transaction: {}",
                e
            )))
        })?;

        for (key, value) in &entries {
            Self::upsert(&mut *tx, key, value).await?;
        }

        tx.commit().await.map_err(|e| {
            Error::Store(StoreError::QueryFailed(format!(
                "Failed to commit batch write: {}",
                e
            )))
        })?;

        Ok(())
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}
