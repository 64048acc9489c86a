//! Storage trait definitions

use crate::error::Result;
use async_trait::async_trait;

/// Trait for key-value persistence backends
///
/// Values are whole strings; a `set` replaces the previous value for the key
/// or fails without touching it.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Retrieve the value stored under `key`
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Get a human-readable name for this storage backend
    fn backend_name(&self) -> &'static str;
}
