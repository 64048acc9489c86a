//! Error types for credstore-core

use thiserror::Error;

/// Result type alias for credential store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Credential store error types
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Index {index} is out of range (collection has {len} credentials)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Credential not found: {0}")]
    CredentialNotFound(String),

    #[error("Error parsing file. Please ensure it is valid JSON or CSV: {0}")]
    ImportParse(String),

    #[error("Invalid file format. Expected an array of credentials: {0}")]
    InvalidFormat(String),

    #[error("Storage quota exceeded: {size} bytes requested, limit is {limit} bytes")]
    QuotaExceeded { size: usize, limit: usize },

    #[error("Invalid credential: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl StoreError {
    /// Whether this error came from rejected import content
    pub fn is_import_rejection(&self) -> bool {
        matches!(self, Self::ImportParse(_) | Self::InvalidFormat(_))
    }
}
