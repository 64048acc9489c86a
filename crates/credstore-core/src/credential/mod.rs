//! Credential records and the store that manages them

mod manager;
mod types;

pub use manager::{CredentialStore, DEFAULT_STORAGE_KEY};
pub use types::*;
