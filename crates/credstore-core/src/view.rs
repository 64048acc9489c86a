//! Masked display of credentials
//!
//! Masking only hides values on screen. The raw value is always one reveal or
//! copy away; nothing here protects the secret.

use std::fmt;
use std::str::FromStr;

use crate::credential::Credential;

/// Placeholder shown in place of a masked value
pub const MASK: &str = "••••••••";

/// Shown when a credential has no description
pub const NO_DESCRIPTION: &str = "N/A";

/// Fields that are masked until revealed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskedField {
    ApiKey,
    Endpoint,
}

/// Values that can be copied out of a credential
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyField {
    ApiKey,
    Endpoint,
    /// `"<apiKey> <endpoint>"`
    Pair,
}

impl FromStr for CopyField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "key" | "apikey" | "api-key" => Ok(Self::ApiKey),
            "endpoint" => Ok(Self::Endpoint),
            "pair" => Ok(Self::Pair),
            other => Err(format!(
                "unknown field '{}', expected key, endpoint or pair",
                other
            )),
        }
    }
}

/// Raw text for a copy action
pub fn copy_text(credential: &Credential, field: CopyField) -> String {
    match field {
        CopyField::ApiKey => credential.api_key.clone(),
        CopyField::Endpoint => credential.endpoint.clone(),
        CopyField::Pair => credential.key_endpoint_pair(),
    }
}

/// Display state of one listed credential
#[derive(Debug, Clone)]
pub struct CredentialView<'a> {
    index: usize,
    credential: &'a Credential,
    key_revealed: bool,
    endpoint_revealed: bool,
}

impl<'a> CredentialView<'a> {
    /// A fully masked view of the credential at `index`
    pub fn new(index: usize, credential: &'a Credential) -> Self {
        Self {
            index,
            credential,
            key_revealed: false,
            endpoint_revealed: false,
        }
    }

    /// Reveal one masked field
    pub fn reveal(mut self, field: MaskedField) -> Self {
        match field {
            MaskedField::ApiKey => self.key_revealed = true,
            MaskedField::Endpoint => self.endpoint_revealed = true,
        }
        self
    }

    /// Reveal every masked field
    pub fn reveal_all(self) -> Self {
        self.reveal(MaskedField::ApiKey).reveal(MaskedField::Endpoint)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.credential.name
    }

    pub fn description(&self) -> &str {
        if self.credential.description.is_empty() {
            NO_DESCRIPTION
        } else {
            &self.credential.description
        }
    }

    /// The API key, or [`MASK`] while hidden
    pub fn api_key(&self) -> &str {
        if self.key_revealed {
            &self.credential.api_key
        } else {
            MASK
        }
    }

    /// The endpoint, or [`MASK`] while hidden
    pub fn endpoint(&self) -> &str {
        if self.endpoint_revealed {
            &self.credential.endpoint
        } else {
            MASK
        }
    }
}

impl fmt::Display for CredentialView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}] {}", self.index, self.name())?;
        writeln!(f, "    Id:          {}", self.credential.id)?;
        writeln!(f, "    Description: {}", self.description())?;
        writeln!(f, "    API Key:     {}", self.api_key())?;
        write!(f, "    Endpoint:    {}", self.endpoint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::CredentialInput;

    fn credential() -> Credential {
        Credential::new(
            CredentialInput::new("OpenAI", "sk-abc").endpoint("https://api.openai.com/v1"),
        )
    }

    #[test]
    fn test_masked_by_default() {
        let cred = credential();
        let view = CredentialView::new(0, &cred);

        assert_eq!(view.api_key(), MASK);
        assert_eq!(view.endpoint(), MASK);
        assert_eq!(view.description(), NO_DESCRIPTION);

        let rendered = view.to_string();
        assert!(!rendered.contains("sk-abc"));
        assert!(rendered.starts_with("[0] OpenAI"));
    }

    #[test]
    fn test_reveal_single_field() {
        let cred = credential();
        let view = CredentialView::new(3, &cred).reveal(MaskedField::ApiKey);

        assert_eq!(view.api_key(), "sk-abc");
        assert_eq!(view.endpoint(), MASK);
        assert_eq!(view.index(), 3);
    }

    #[test]
    fn test_reveal_all() {
        let cred = credential();
        let view = CredentialView::new(0, &cred).reveal_all();

        assert_eq!(view.api_key(), "sk-abc");
        assert_eq!(view.endpoint(), "https://api.openai.com/v1");
    }

    #[test]
    fn test_copy_text() {
        let cred = credential();

        assert_eq!(copy_text(&cred, CopyField::ApiKey), "sk-abc");
        assert_eq!(copy_text(&cred, CopyField::Endpoint), "https://api.openai.com/v1");
        assert_eq!(
            copy_text(&cred, CopyField::Pair),
            "sk-abc https://api.openai.com/v1"
        );
    }

    #[test]
    fn test_copy_field_from_str() {
        assert_eq!("key".parse::<CopyField>().unwrap(), CopyField::ApiKey);
        assert_eq!("API-KEY".parse::<CopyField>().unwrap(), CopyField::ApiKey);
        assert_eq!("pair".parse::<CopyField>().unwrap(), CopyField::Pair);
        assert!("password".parse::<CopyField>().is_err());
    }
}
