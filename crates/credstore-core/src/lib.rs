//! # credstore-core
//!
//! Local credential list management:
//! - Ordered name/description/API key/endpoint records in one storage slot
//! - JSON and CSV import, pretty JSON export
//! - Masked display with explicit reveal and copy-out
//!
//! Credentials are stored and exported as plain text. Masking is a display
//! convenience, not a security control.

pub mod credential;
pub mod error;
pub mod export;
pub mod import;
pub mod settings;
pub mod storage;
pub mod view;

pub use credential::{Credential, CredentialInput, CredentialStore, EditRequest};
pub use error::{Result, StoreError};
pub use export::ExportFile;
pub use settings::{Settings, SettingsManager};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use view::{CopyField, CredentialView, MaskedField};
