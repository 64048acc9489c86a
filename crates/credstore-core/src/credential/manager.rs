//! Credential store for CRUD, import and export
//!
//! The whole collection lives under one storage key as a JSON array. Every
//! operation reads the slot fresh and every mutation writes the full
//! collection back; nothing is cached between calls.

use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::types::{Credential, CredentialInput, EditRequest};
use crate::error::{Result, StoreError};
use crate::export::{render_export, ExportFile, EXPORT_FILE_NAME, EXPORT_MIME_TYPE};
use crate::import::{parse_import, record_from_value};
use crate::settings::Settings;
use crate::storage::KeyValueStorage;

/// Default storage key for the credential collection
pub const DEFAULT_STORAGE_KEY: &str = "credentials";

/// Credential store
pub struct CredentialStore {
    /// Storage backend
    storage: Arc<dyn KeyValueStorage>,
    /// Key of the slot holding the collection
    storage_key: String,
    /// Suggested name for exported files
    export_file_name: String,
}

impl CredentialStore {
    /// Create a credential store with default settings
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            storage,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            export_file_name: EXPORT_FILE_NAME.to_string(),
        }
    }

    /// Create a credential store using the configured key and export name
    pub fn with_settings(storage: Arc<dyn KeyValueStorage>, settings: &Settings) -> Self {
        Self {
            storage,
            storage_key: settings.storage_key.clone(),
            export_file_name: settings.export_file_name.clone(),
        }
    }

    /// Key of the slot holding the collection
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Name of the storage backend in use
    pub fn backend_name(&self) -> &'static str {
        self.storage.backend_name()
    }

    /// Load the collection
    ///
    /// A missing slot is an empty collection. So is a slot that does not hold
    /// a JSON array; that case is logged and otherwise ignored. Records stored
    /// without an id get one, and the slot is rewritten so it sticks, unless
    /// some stored elements were unreadable; those are never dropped by a read.
    pub async fn load(&self) -> Result<Vec<Credential>> {
        let raw = match self.storage.get(&self.storage_key).await? {
            Some(raw) => raw,
            None => return Ok(Vec::new()),
        };

        let decoded = match decode_slot(&raw) {
            Some(decoded) => decoded,
            None => {
                warn!(
                    "Stored data under '{}' is not a credential list, treating as empty",
                    self.storage_key
                );
                return Ok(Vec::new());
            }
        };

        if decoded.assigned_ids && decoded.skipped == 0 {
            debug!("Assigning ids to stored credentials");
            if let Err(e) = self.save(&decoded.credentials).await {
                warn!("Could not persist assigned credential ids: {}", e);
            }
        } else if decoded.assigned_ids {
            warn!(
                "Not persisting assigned ids: {} stored elements could not be read",
                decoded.skipped
            );
        }

        Ok(decoded.credentials)
    }

    /// List all credentials in order
    pub async fn list(&self) -> Result<Vec<Credential>> {
        self.load().await
    }

    /// Overwrite the stored collection
    pub async fn save(&self, credentials: &[Credential]) -> Result<()> {
        let data = serde_json::to_string(credentials)?;
        self.storage.set(&self.storage_key, &data).await?;

        debug!("Saved {} credentials", credentials.len());
        Ok(())
    }

    /// Get the credential at `index`
    pub async fn get(&self, index: usize) -> Result<Credential> {
        let credentials = self.load().await?;
        check_index(index, credentials.len())?;
        Ok(credentials[index].clone())
    }

    /// Get a credential by id
    pub async fn find(&self, id: Uuid) -> Result<Option<Credential>> {
        let credentials = self.load().await?;
        Ok(credentials.into_iter().find(|c| c.id == id))
    }

    /// Current position of the credential with `id`
    pub async fn position(&self, id: Uuid) -> Result<Option<usize>> {
        let credentials = self.load().await?;
        Ok(credentials.iter().position(|c| c.id == id))
    }

    /// Append a new credential
    pub async fn add(&self, input: CredentialInput) -> Result<Credential> {
        input.validate()?;

        let mut credentials = self.load().await?;
        let credential = Credential::new(input);
        credentials.push(credential.clone());
        self.save(&credentials).await?;

        info!("Added credential: {}", credential.name);
        Ok(credential)
    }

    /// Replace the credential at `index`, keeping its id
    pub async fn update(&self, index: usize, input: CredentialInput) -> Result<Credential> {
        input.validate()?;

        let mut credentials = self.load().await?;
        let updated = replace_at(&mut credentials, index, input)?;
        self.save(&credentials).await?;

        info!("Updated credential {}: {}", index, updated.name);
        Ok(updated)
    }

    /// Replace the credential with `id`, wherever it currently is
    pub async fn update_by_id(&self, id: Uuid, input: CredentialInput) -> Result<Credential> {
        input.validate()?;

        let mut credentials = self.load().await?;
        let index = index_of(&credentials, id)?;
        let updated = replace_at(&mut credentials, index, input)?;
        self.save(&credentials).await?;

        info!("Updated credential {}: {}", id, updated.name);
        Ok(updated)
    }

    /// Remove the credential at `index`; later credentials move up by one
    pub async fn delete(&self, index: usize) -> Result<Credential> {
        let mut credentials = self.load().await?;
        check_index(index, credentials.len())?;
        let removed = credentials.remove(index);
        self.save(&credentials).await?;

        info!("Deleted credential {}: {}", index, removed.name);
        Ok(removed)
    }

    /// Remove the credential with `id`
    pub async fn delete_by_id(&self, id: Uuid) -> Result<Credential> {
        let mut credentials = self.load().await?;
        let index = index_of(&credentials, id)?;
        let removed = credentials.remove(index);
        self.save(&credentials).await?;

        info!("Deleted credential {}: {}", id, removed.name);
        Ok(removed)
    }

    /// Apply a submitted credential form
    pub async fn submit(&self, request: EditRequest, input: CredentialInput) -> Result<Credential> {
        match request {
            EditRequest::Create => self.add(input).await,
            EditRequest::UpdateAt(index) => self.update(index, input).await,
        }
    }

    /// Replace the whole collection with the content of an import file
    ///
    /// Nothing is written unless the content parses.
    pub async fn import_from(&self, raw: &str) -> Result<Vec<Credential>> {
        let imported = parse_import(raw)?;
        self.save(&imported).await?;

        info!("Imported {} credentials", imported.len());
        Ok(imported)
    }

    /// Export the collection as pretty-printed JSON
    pub async fn export_all(&self) -> Result<ExportFile> {
        let credentials = self.load().await?;
        let contents = render_export(&credentials)?;

        debug!("Exported {} credentials", credentials.len());
        Ok(ExportFile {
            file_name: self.export_file_name.clone(),
            mime_type: EXPORT_MIME_TYPE,
            contents,
        })
    }

    /// Export the collection to a file or directory
    pub async fn export_to(&self, path: &Path) -> Result<PathBuf> {
        let export = self.export_all().await?;
        let written = export.write_to(path).await?;

        info!("Exported credentials to {:?}", written);
        Ok(written)
    }
}

/// Stored slot contents after decoding
struct DecodedSlot {
    credentials: Vec<Credential>,
    /// Some record had no id and was given one
    assigned_ids: bool,
    /// Elements that were not objects
    skipped: usize,
}

/// Decode the stored slot
///
/// Returns `None` when the slot is not a JSON array. Elements that are not
/// objects are skipped and counted.
fn decode_slot(raw: &str) -> Option<DecodedSlot> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let items = value.as_array()?;

    let mut decoded = DecodedSlot {
        credentials: Vec::with_capacity(items.len()),
        assigned_ids: false,
        skipped: 0,
    };

    for (position, item) in items.iter().enumerate() {
        match record_from_value(position, item) {
            Ok((Some(id), input)) => decoded.credentials.push(Credential::with_id(id, input)),
            Ok((None, input)) => {
                decoded.assigned_ids = true;
                decoded.credentials.push(Credential::new(input));
            }
            Err(e) => {
                decoded.skipped += 1;
                warn!("Skipping stored credential: {}", e);
            }
        }
    }

    Some(decoded)
}

fn check_index(index: usize, len: usize) -> Result<()> {
    if index >= len {
        return Err(StoreError::IndexOutOfRange { index, len });
    }
    Ok(())
}

fn index_of(credentials: &[Credential], id: Uuid) -> Result<usize> {
    credentials
        .iter()
        .position(|c| c.id == id)
        .ok_or_else(|| StoreError::CredentialNotFound(id.to_string()))
}

fn replace_at(
    credentials: &mut [Credential],
    index: usize,
    input: CredentialInput,
) -> Result<Credential> {
    check_index(index, credentials.len())?;
    let updated = Credential::with_id(credentials[index].id, input);
    credentials[index] = updated.clone();
    Ok(updated)
}
