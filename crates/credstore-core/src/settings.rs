//! Application settings management
//!
//! Stores configuration in a plain JSON file next to the credential store.
//! Missing keys fall back to their defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::credential::DEFAULT_STORAGE_KEY;
use crate::error::{Result, StoreError};
use crate::export::EXPORT_FILE_NAME;
use crate::storage::DEFAULT_QUOTA_BYTES;

/// Settings file name inside the storage directory
const SETTINGS_FILE: &str = "settings.json";

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Settings file version
    pub version: u32,
    /// Storage key holding the credential collection
    pub storage_key: String,
    /// Maximum bytes the storage backend accepts
    pub quota_bytes: usize,
    /// Suggested file name for exports
    pub export_file_name: String,
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self {
            version: 1,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            quota_bytes: DEFAULT_QUOTA_BYTES,
            export_file_name: EXPORT_FILE_NAME.to_string(),
        }
    }
}

impl Settings {
    /// Reject values that would make every save or export fail
    pub fn validate(&self) -> Result<()> {
        if self.storage_key.trim().is_empty() {
            return Err(StoreError::Validation("storage key must not be empty".to_string()));
        }
        if self.export_file_name.trim().is_empty() {
            return Err(StoreError::Validation("export file name must not be empty".to_string()));
        }
        if self.quota_bytes == 0 {
            return Err(StoreError::Validation("quota must be greater than zero".to_string()));
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

/// Settings manager
pub struct SettingsManager {
    settings_file: PathBuf,
    settings: Settings,
}

impl SettingsManager {
    /// Load settings from `storage_dir`, using defaults when unreadable
    pub fn new(storage_dir: &Path) -> Self {
        let settings_file = storage_dir.join(SETTINGS_FILE);
        let settings = Self::load_from_file(&settings_file).unwrap_or_else(|e| {
            warn!("Ignoring unreadable settings file {:?}: {}", settings_file, e);
            Settings::new()
        });

        Self {
            settings_file,
            settings,
        }
    }

    /// Load settings from file
    fn load_from_file(path: &Path) -> Result<Settings> {
        if !path.exists() {
            debug!("No settings file found, using defaults");
            return Ok(Settings::new());
        }

        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&contents)?;
        settings.validate()?;
        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Save settings to file
    pub async fn save(&self) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self.settings)?;

        // Write atomically using temp file
        let temp_path = self.settings_file.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents).await?;
        tokio::fs::rename(&temp_path, &self.settings_file).await?;

        debug!("Saved settings to {:?}", self.settings_file);
        Ok(())
    }

    /// Path of the settings file
    pub fn path(&self) -> &Path {
        &self.settings_file
    }

    /// Get current settings
    pub fn get(&self) -> &Settings {
        &self.settings
    }

    /// Get mutable settings
    pub fn get_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Update settings and save
    pub async fn update(&mut self, settings: Settings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        self.save().await
    }

    /// Reset settings to defaults and delete settings file
    pub async fn reset(&mut self) -> Result<()> {
        self.settings = Settings::default();

        if self.settings_file.exists() {
            tokio::fs::remove_file(&self.settings_file)
                .await
                .map_err(|e| StoreError::StorageError(e.to_string()))?;
        }

        Ok(())
    }
}
