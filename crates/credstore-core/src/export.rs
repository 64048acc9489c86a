//! JSON export of the credential collection

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::credential::Credential;
use crate::error::Result;

/// Default download name for exports
pub const EXPORT_FILE_NAME: &str = "credentials.json";

/// Content type of exported files
pub const EXPORT_MIME_TYPE: &str = "application/json";

/// Exported record, in the field order of the export format
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportRecord<'a> {
    name: &'a str,
    description: &'a str,
    api_key: &'a str,
    endpoint: &'a str,
}

impl<'a> From<&'a Credential> for ExportRecord<'a> {
    fn from(credential: &'a Credential) -> Self {
        Self {
            name: &credential.name,
            description: &credential.description,
            api_key: &credential.api_key,
            endpoint: &credential.endpoint,
        }
    }
}

/// Downloadable export content
#[derive(Debug, Clone)]
pub struct ExportFile {
    /// Suggested file name
    pub file_name: String,
    /// Content type
    pub mime_type: &'static str,
    /// Pretty-printed JSON text
    pub contents: String,
}

impl ExportFile {
    /// Raw bytes of the export
    pub fn as_bytes(&self) -> &[u8] {
        self.contents.as_bytes()
    }

    /// Write the export to `path`
    ///
    /// If `path` is an existing directory the suggested file name is used
    /// inside it. Returns the path that was written.
    pub async fn write_to(&self, path: &Path) -> Result<PathBuf> {
        let target = if path.is_dir() {
            path.join(&self.file_name)
        } else {
            path.to_path_buf()
        };

        // Write atomically using a temp file
        let temp_path = target.with_extension("tmp");
        tokio::fs::write(&temp_path, self.as_bytes()).await?;
        tokio::fs::rename(&temp_path, &target).await?;

        debug!("Wrote export to {:?}", target);
        Ok(target)
    }
}

/// Render credentials as a pretty-printed JSON array
///
/// Ids are internal to the store and are not exported.
pub fn render_export(credentials: &[Credential]) -> Result<String> {
    let records: Vec<ExportRecord<'_>> = credentials.iter().map(ExportRecord::from).collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::CredentialInput;
    use crate::import::parse_import;
    use tempfile::TempDir;

    fn sample() -> Vec<Credential> {
        vec![Credential::new(CredentialInput::new("a", "k").endpoint("e"))]
    }

    #[test]
    fn test_render_layout() {
        let json = render_export(&sample()).unwrap();

        let expected = "[\n  {\n    \"name\": \"a\",\n    \"description\": \"\",\n    \"apiKey\": \"k\",\n    \"endpoint\": \"e\"\n  }\n]";
        assert_eq!(json, expected);
    }

    #[test]
    fn test_render_parses_back() {
        let credentials = sample();
        let json = render_export(&credentials).unwrap();

        let reparsed = parse_import(&json).unwrap();
        assert_eq!(reparsed.len(), 1);
        assert_eq!(reparsed[0].to_input(), credentials[0].to_input());
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_export(&[]).unwrap(), "[]");
    }

    #[tokio::test]
    async fn test_write_to_directory_uses_file_name() {
        let temp_dir = TempDir::new().unwrap();
        let export = ExportFile {
            file_name: EXPORT_FILE_NAME.to_string(),
            mime_type: EXPORT_MIME_TYPE,
            contents: "[]".to_string(),
        };

        let written = export.write_to(temp_dir.path()).await.unwrap();

        assert_eq!(written, temp_dir.path().join("credentials.json"));
        assert_eq!(std::fs::read_to_string(written).unwrap(), "[]");
    }
}
