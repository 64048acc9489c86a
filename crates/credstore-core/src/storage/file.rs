//! File storage backend
//!
//! Stores every key in a single plain JSON document in the user's data directory.
//! The document is re-read on every access and rewritten atomically on every
//! change, so nothing is cached between operations.

use async_trait::async_trait;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

use super::{check_quota, KeyValueStorage, DEFAULT_QUOTA_BYTES};
use crate::error::{Result, StoreError};

/// Current on-disk document version
const FILE_VERSION: u32 = 1;

/// Name of the storage document inside the storage directory
const STORE_FILE: &str = "store.json";

/// File storage backend
pub struct FileStorage {
    /// Directory for storage files
    storage_dir: PathBuf,
    /// Maximum total size of stored keys and values
    quota_bytes: usize,
}

/// File format for persistent storage
#[derive(Debug, Default, Serialize, Deserialize)]
struct StorageFile {
    version: u32,
    entries: BTreeMap<String, String>,
}

impl FileStorage {
    /// Create with a custom storage directory
    pub fn with_dir(storage_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&storage_dir)?;

        debug!("File storage initialized at: {:?}", storage_dir);

        Ok(Self {
            storage_dir,
            quota_bytes: DEFAULT_QUOTA_BYTES,
        })
    }

    /// Set the storage quota
    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    /// Get the default storage directory
    pub fn default_storage_dir() -> Result<PathBuf> {
        ProjectDirs::from("dev", "credstore", "credstore")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| StoreError::StorageError("Could not determine data directory".to_string()))
    }

    /// Get the path to the storage file
    fn storage_file_path(&self) -> PathBuf {
        self.storage_dir.join(STORE_FILE)
    }

    /// Read the storage document from disk
    async fn read_file(&self) -> Result<StorageFile> {
        let path = self.storage_file_path();

        if !path.exists() {
            debug!("No existing storage file found");
            return Ok(StorageFile {
                version: FILE_VERSION,
                entries: BTreeMap::new(),
            });
        }

        let contents = tokio::fs::read_to_string(&path).await?;
        serde_json::from_str(&contents).map_err(|e| {
            StoreError::StorageError(format!("Corrupt storage file {:?}: {}", path, e))
        })
    }

    /// Write the storage document to disk
    async fn write_file(&self, file: &StorageFile) -> Result<()> {
        let contents = serde_json::to_string_pretty(file)?;
        let path = self.storage_file_path();

        // Write atomically using a temp file
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents).await?;
        tokio::fs::rename(&temp_path, &path).await?;

        debug!("Saved {} entries to storage", file.entries.len());
        Ok(())
    }
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let file = self.read_file().await?;

        match file.entries.get(key) {
            Some(value) => {
                debug!("Retrieved key: {}", key);
                Ok(Some(value.clone()))
            }
            None => {
                debug!("Key not found: {}", key);
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut file = self.read_file().await?;

        check_quota(&file.entries, key, value, self.quota_bytes)?;

        file.version = FILE_VERSION;
        file.entries.insert(key.to_string(), value.to_string());
        self.write_file(&file).await?;

        debug!("Stored key: {}", key);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "File Storage"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_storage() -> (FileStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::with_dir(temp_dir.path().to_path_buf()).unwrap();
        (storage, temp_dir)
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let (storage, _dir) = test_storage();

        storage.set("test-key", "test-value").await.unwrap();

        let retrieved = storage.get("test-key").await.unwrap();
        assert_eq!(retrieved, Some("test-value".to_string()));
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let (storage, _dir) = test_storage();

        let retrieved = storage.get("nonexistent").await.unwrap();
        assert_eq!(retrieved, None);
    }

    #[tokio::test]
    async fn test_persistence() {
        let temp_dir = TempDir::new().unwrap();

        {
            let storage = FileStorage::with_dir(temp_dir.path().to_path_buf()).unwrap();
            storage.set("persistent-key", "persistent-value").await.unwrap();
        }

        {
            let storage = FileStorage::with_dir(temp_dir.path().to_path_buf()).unwrap();
            let retrieved = storage.get("persistent-key").await.unwrap();
            assert_eq!(retrieved, Some("persistent-value".to_string()));
        }
    }

    #[tokio::test]
    async fn test_quota_rejection_keeps_previous_value() {
        let (storage, _dir) = test_storage();
        let storage = storage.with_quota(16);

        storage.set("k", "small").await.unwrap();

        let err = storage.set("k", &"x".repeat(64)).await.unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { limit: 16, .. }));

        assert_eq!(storage.get("k").await.unwrap(), Some("small".to_string()));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let (storage, dir) = test_storage();
        std::fs::write(dir.path().join(STORE_FILE), "{not json").unwrap();

        let err = storage.get("k").await.unwrap_err();
        assert!(matches!(err, StoreError::StorageError(_)));
    }
}
