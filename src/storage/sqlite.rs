use crate::models::UrlRecord;
use crate::storage::{Storage, StorageError, StorageResult};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Arc;

pub struct SqliteStorage {
    pool: Arc<SqlitePool>,
}

impl SqliteStorage {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS urls (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                short_code TEXT NOT NULL UNIQUE,
                url TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                access_count INTEGER NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_short_code ON urls(short_code)")
            .execute(self.pool.as_ref())
            .await?;

        // Codes that belonged to deleted records; never handed out again
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS retired_codes (
                short_code TEXT PRIMARY KEY,
                retired_at TEXT NOT NULL
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }

    async fn create_with_code(&self, short_code: &str, url: &str) -> StorageResult<UrlRecord> {
        let now = Utc::now();

        let record = sqlx::query_as::<_, UrlRecord>(
            r#"
            INSERT INTO urls (short_code, url, created_at, updated_at, access_count)
            SELECT ?, ?, ?, ?, 0
            WHERE NOT EXISTS (SELECT 1 FROM retired_codes WHERE short_code = ?)
            ON CONFLICT(short_code) DO NOTHING
            RETURNING id, url, short_code, created_at, updated_at, access_count
            "#,
        )
        .bind(short_code)
        .bind(url)
        .bind(now)
        .bind(now)
        .bind(short_code)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(|e| StorageError::Other(e.into()))?;

        record.ok_or(StorageError::Conflict)
    }

    async fn get(&self, short_code: &str) -> Result<Option<UrlRecord>> {
        let record = sqlx::query_as::<_, UrlRecord>(
            r#"
            SELECT id, url, short_code, created_at, updated_at, access_count
            FROM urls
            WHERE short_code = ?
            "#,
        )
        .bind(short_code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(record)
    }

    async fn update_url(&self, short_code: &str, url: &str) -> Result<Option<UrlRecord>> {
        let record = sqlx::query_as::<_, UrlRecord>(
            r#"
            UPDATE urls
            SET url = ?, updated_at = ?
            WHERE short_code = ?
            RETURNING id, url, short_code, created_at, updated_at, access_count
            "#,
        )
        .bind(url)
        .bind(Utc::now())
        .bind(short_code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(record)
    }

    async fn increment_access(&self, short_code: &str) -> Result<Option<UrlRecord>> {
        let record = sqlx::query_as::<_, UrlRecord>(
            r#"
            UPDATE urls
            SET access_count = access_count + 1, updated_at = ?
            WHERE short_code = ?
            RETURNING id, url, short_code, created_at, updated_at, access_count
            "#,
        )
        .bind(Utc::now())
        .bind(short_code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(record)
    }

    async fn delete(&self, short_code: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM urls WHERE short_code = ?")
            .bind(short_code)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO retired_codes (short_code, retired_at)
            VALUES (?, ?)
            ON CONFLICT(short_code) DO NOTHING
            "#,
        )
        .bind(short_code)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(true)
    }
}
