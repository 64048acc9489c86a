//! Credential type definitions

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, StoreError};

/// A stored credential record
///
/// `id` is assigned when the record enters the store and stays with it across
/// reloads, so callers can address a record without relying on its position.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// Stable identifier
    pub id: Uuid,

    /// Display label
    pub name: String,

    /// Free-text description (empty when absent)
    #[serde(default)]
    pub description: String,

    /// Secret API key, stored as plain text
    pub api_key: String,

    /// Endpoint the key is used against (typically a URL, not validated)
    pub endpoint: String,
}

impl Credential {
    /// Create a credential with a freshly generated id
    pub fn new(input: CredentialInput) -> Self {
        Self::with_id(Uuid::new_v4(), input)
    }

    /// Create a credential keeping an existing id
    pub fn with_id(id: Uuid, input: CredentialInput) -> Self {
        Self {
            id,
            name: input.name,
            description: input.description,
            api_key: input.api_key,
            endpoint: input.endpoint,
        }
    }

    /// The user-editable fields of this credential
    pub fn to_input(&self) -> CredentialInput {
        CredentialInput {
            name: self.name.clone(),
            description: self.description.clone(),
            api_key: self.api_key.clone(),
            endpoint: self.endpoint.clone(),
        }
    }

    /// The `"<apiKey> <endpoint>"` pair offered by "Copy Pair"
    pub fn key_endpoint_pair(&self) -> String {
        format!("{} {}", self.api_key, self.endpoint)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("description", &self.description)
            .field("api_key", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Field values entered for a new or edited credential
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialInput {
    pub name: String,
    pub description: String,
    pub api_key: String,
    pub endpoint: String,
}

impl CredentialInput {
    /// Create input with the required name and key
    pub fn new(name: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Set the description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the endpoint
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Check the fields a form submission must provide
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(StoreError::Validation("name must not be empty".to_string()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for CredentialInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialInput")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("api_key", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// What a submitted credential form should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditRequest {
    /// Append a new credential
    Create,
    /// Replace the credential at this position
    UpdateAt(usize),
}
