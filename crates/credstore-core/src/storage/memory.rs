//! In-memory storage backend

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::debug;

use super::{check_quota, KeyValueStorage, DEFAULT_QUOTA_BYTES};
use crate::error::Result;

/// In-memory storage backend
///
/// Holds entries for the lifetime of the value. Useful for tests and for
/// embedding the store where persistence is handled elsewhere.
pub struct MemoryStorage {
    entries: RwLock<BTreeMap<String, String>>,
    quota_bytes: usize,
}

impl MemoryStorage {
    /// Create an empty store with the default quota
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            quota_bytes: DEFAULT_QUOTA_BYTES,
        }
    }

    /// Set the storage quota
    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().await;

        check_quota(&entries, key, value, self.quota_bytes)?;
        entries.insert(key.to_string(), value.to_string());

        debug!("Stored key: {}", key);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "Memory Storage"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    #[tokio::test]
    async fn test_set_and_get() {
        let storage = MemoryStorage::new();

        assert_eq!(storage.get("k").await.unwrap(), None);

        storage.set("k", "v").await.unwrap();
        storage.set("k", "w").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap(), Some("w".to_string()));
    }

    #[tokio::test]
    async fn test_quota() {
        let storage = MemoryStorage::new().with_quota(4);

        storage.set("k", "abc").await.unwrap();
        let err = storage.set("k", "abcd").await.unwrap_err();

        assert!(matches!(err, StoreError::QuotaExceeded { size: 5, limit: 4 }));
        assert_eq!(storage.get("k").await.unwrap(), Some("abc".to_string()));
    }
}
