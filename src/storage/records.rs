use crate::models::UrlRecord;
use crate::short_code::ShortCodeGenerator;
use crate::storage::{Storage, StorageError, StorageResult};
use anyhow::Result;
use std::sync::Arc;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Record lifecycle on top of a [`Storage`] backend.
///
/// Owns short code allocation: a fresh code is drawn for every attempt and
/// collisions are retried until `max_attempts` is spent.
#[derive(Clone)]
pub struct RecordStore {
    storage: Arc<dyn Storage>,
    generator: ShortCodeGenerator,
    max_attempts: u32,
}

impl RecordStore {
    pub fn new(storage: Arc<dyn Storage>, generator: ShortCodeGenerator, max_attempts: u32) -> Self {
        Self {
            storage,
            generator,
            max_attempts: max_attempts.max(1),
        }
    }

    pub async fn create(&self, url: &str) -> StorageResult<UrlRecord> {
        for attempt in 1..=self.max_attempts {
            let code = self.generator.generate();
            match self.storage.create_with_code(&code, url).await {
                Ok(record) => return Ok(record),
                Err(StorageError::Conflict) => {
                    tracing::debug!(short_code = %code, attempt, "short code collision, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        tracing::warn!(
            attempts = self.max_attempts,
            "gave up allocating a unique short code"
        );
        Err(StorageError::Conflict)
    }

    pub async fn find_by_code(&self, short_code: &str) -> Result<Option<UrlRecord>> {
        self.storage.get(short_code).await
    }

    pub async fn update_url(&self, short_code: &str, url: &str) -> Result<Option<UrlRecord>> {
        self.storage.update_url(short_code, url).await
    }

    pub async fn increment_access(&self, short_code: &str) -> Result<Option<UrlRecord>> {
        self.storage.increment_access(short_code).await
    }

    pub async fn delete(&self, short_code: &str) -> Result<bool> {
        self.storage.delete(short_code).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Backend that reports a conflict for the first `conflicts` inserts
    struct ScriptedStorage {
        conflicts: u32,
        calls: AtomicU32,
        seen_codes: Mutex<Vec<String>>,
        fail: bool,
    }

    impl ScriptedStorage {
        fn new(conflicts: u32) -> Self {
            Self {
                conflicts,
                calls: AtomicU32::new(0),
                seen_codes: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new(0)
            }
        }
    }

    #[async_trait]
    impl Storage for ScriptedStorage {
        async fn init(&self) -> Result<()> {
            Ok(())
        }

        async fn close(&self) {}

        async fn create_with_code(&self, short_code: &str, url: &str) -> StorageResult<UrlRecord> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.seen_codes.lock().unwrap().push(short_code.to_string());

            if self.fail {
                return Err(StorageError::Other(anyhow::anyhow!("disk on fire")));
            }
            if call <= self.conflicts {
                return Err(StorageError::Conflict);
            }

            let now = Utc::now();
            Ok(UrlRecord {
                id: call as i64,
                url: url.to_string(),
                short_code: short_code.to_string(),
                created_at: now,
                updated_at: now,
                access_count: 0,
            })
        }

        async fn get(&self, _short_code: &str) -> Result<Option<UrlRecord>> {
            Ok(None)
        }

        async fn update_url(&self, _short_code: &str, _url: &str) -> Result<Option<UrlRecord>> {
            Ok(None)
        }

        async fn increment_access(&self, _short_code: &str) -> Result<Option<UrlRecord>> {
            Ok(None)
        }

        async fn delete(&self, _short_code: &str) -> Result<bool> {
            Ok(false)
        }
    }

    fn store_with(backend: Arc<ScriptedStorage>, max_attempts: u32) -> RecordStore {
        RecordStore::new(backend, ShortCodeGenerator::default(), max_attempts)
    }

    #[tokio::test]
    async fn test_create_retries_after_collision() {
        let backend = Arc::new(ScriptedStorage::new(3));
        let store = store_with(Arc::clone(&backend), 10);

        let record = store.create("https://example.com").await.unwrap();

        assert_eq!(backend.calls.load(Ordering::SeqCst), 4);
        assert_eq!(record.short_code.len(), 6);
        assert_eq!(record.access_count, 0);
        let seen = backend.seen_codes.lock().unwrap();
        assert_eq!(seen.last().unwrap(), &record.short_code);
    }

    #[tokio::test]
    async fn test_create_gives_up_after_max_attempts() {
        let backend = Arc::new(ScriptedStorage::new(u32::MAX));
        let store = store_with(Arc::clone(&backend), 5);

        let err = store.create("https://example.com").await.unwrap_err();

        assert!(matches!(err, StorageError::Conflict));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_create_does_not_retry_backend_failures() {
        let backend = Arc::new(ScriptedStorage::failing());
        let store = store_with(Arc::clone(&backend), 10);

        let err = store.create("https://example.com").await.unwrap_err();

        assert!(matches!(err, StorageError::Other(_)));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_tries_once() {
        let backend = Arc::new(ScriptedStorage::new(0));
        let store = store_with(Arc::clone(&backend), 0);

        assert!(store.create("https://example.com").await.is_ok());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }
}
