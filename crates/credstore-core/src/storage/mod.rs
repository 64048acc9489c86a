//! Storage backends for credential persistence
//!
//! This module provides two storage backends:
//! 1. JSON file in the user's data directory
//! 2. In-memory map (tests and embedding)
//!
//! Both enforce a byte quota over all stored keys and values, the way browser
//! local storage does.

mod traits;
mod file;
mod memory;

use std::collections::BTreeMap;

pub use traits::KeyValueStorage;
pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::{Result, StoreError};

/// Default quota, matching the usual local-storage allowance
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Check that writing `value` under `key` keeps `entries` within `limit`
pub(crate) fn check_quota(
    entries: &BTreeMap<String, String>,
    key: &str,
    value: &str,
    limit: usize,
) -> Result<()> {
    let size: usize = entries
        .iter()
        .filter(|(k, _)| k.as_str() != key)
        .map(|(k, v)| k.len() + v.len())
        .sum::<usize>()
        + key.len()
        + value.len();

    if size > limit {
        return Err(StoreError::QuotaExceeded { size, limit });
    }
    Ok(())
}
