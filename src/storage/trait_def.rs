use crate::models::UrlRecord;
use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("short code already exists")]
    Conflict,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait Storage: Send + Sync {
    /// Initialize the storage (create tables, indexes)
    async fn init(&self) -> Result<()>;

    /// Close the underlying connection pool
    async fn close(&self);

    /// Insert a record under `short_code`.
    ///
    /// Fails with [`StorageError::Conflict`] if the code is in use or has
    /// been retired by an earlier delete.
    async fn create_with_code(&self, short_code: &str, url: &str) -> StorageResult<UrlRecord>;

    /// Get a record by short code
    async fn get(&self, short_code: &str) -> Result<Option<UrlRecord>>;

    /// Replace the target URL and refresh `updated_at`
    async fn update_url(&self, short_code: &str, url: &str) -> Result<Option<UrlRecord>>;

    /// Atomically add one to `access_count` and refresh `updated_at`
    async fn increment_access(&self, short_code: &str) -> Result<Option<UrlRecord>>;

    /// Remove a record and retire its code. Returns whether a record existed.
    async fn delete(&self, short_code: &str) -> Result<bool>;
}
