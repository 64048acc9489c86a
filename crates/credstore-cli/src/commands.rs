//! Subcommand handlers
//!
//! Handlers write user-facing output to the given writer so they can be
//! exercised without a terminal.

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::io::AsyncReadExt;
use uuid::Uuid;

use credstore_core::view::copy_text;
use credstore_core::{
    CopyField, Credential, CredentialInput, CredentialStore, CredentialView, EditRequest,
    SettingsManager, StoreError,
};

/// Reference to a credential by list position or by id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Index(usize),
    Id(Uuid),
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if let Ok(index) = s.parse::<usize>() {
            return Ok(Self::Index(index));
        }
        Uuid::parse_str(s)
            .map(Self::Id)
            .map_err(|_| format!("'{}' is neither a list index nor a credential id", s))
    }
}

/// Field changes for `edit`; omitted fields keep their value
#[derive(ClapArgs, Debug, Default)]
pub struct EditFields {
    /// New display name
    #[arg(long)]
    pub name: Option<String>,

    /// New description
    #[arg(long)]
    pub description: Option<String>,

    /// New API key
    #[arg(long)]
    pub api_key: Option<String>,

    /// New endpoint
    #[arg(long)]
    pub endpoint: Option<String>,
}

impl EditFields {
    fn apply(self, current: &Credential) -> CredentialInput {
        let current = current.to_input();
        CredentialInput {
            name: self.name.unwrap_or(current.name),
            description: self.description.unwrap_or(current.description),
            api_key: self.api_key.unwrap_or(current.api_key),
            endpoint: self.endpoint.unwrap_or(current.endpoint),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List stored credentials (keys and endpoints masked)
    List {
        /// Show API keys and endpoints in clear text
        #[arg(long)]
        reveal: bool,
    },

    /// Show a single credential
    Show {
        /// List index or credential id
        target: Target,

        /// Show the API key and endpoint in clear text
        #[arg(long)]
        reveal: bool,
    },

    /// Add a credential
    Add {
        /// Display name
        #[arg(long)]
        name: String,

        /// API key
        #[arg(long)]
        api_key: String,

        /// Free-text description
        #[arg(long, default_value = "")]
        description: String,

        /// Endpoint the key is used against
        #[arg(long, default_value = "")]
        endpoint: String,
    },

    /// Edit a credential
    Edit {
        /// List index or credential id
        target: Target,

        #[command(flatten)]
        fields: EditFields,
    },

    /// Delete a credential
    Delete {
        /// List index or credential id
        target: Target,
    },

    /// Print a raw value for pasting: key, endpoint or pair ("<key> <endpoint>")
    Copy {
        /// List index or credential id
        target: Target,

        /// Which value to print
        field: CopyField,
    },

    /// Replace all credentials with the content of a JSON or CSV file ("-" for stdin)
    Import {
        /// JSON or CSV file
        file: PathBuf,
    },

    /// Export all credentials as JSON
    Export {
        /// Output file or directory (prints to stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show or change settings
    Config {
        /// Storage key holding the credential list
        #[arg(long)]
        storage_key: Option<String>,

        /// Storage quota in bytes
        #[arg(long)]
        quota_bytes: Option<usize>,

        /// Suggested file name for exports
        #[arg(long)]
        export_file_name: Option<String>,

        /// Restore default settings
        #[arg(long, conflicts_with_all = ["storage_key", "quota_bytes", "export_file_name"])]
        reset: bool,
    },
}

/// Run a subcommand
pub async fn run<W: Write>(
    command: Command,
    store: &CredentialStore,
    settings: &mut SettingsManager,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::List { reveal } => list(store, reveal, out).await,
        Command::Show { target, reveal } => show(store, target, reveal, out).await,
        Command::Add {
            name,
            api_key,
            description,
            endpoint,
        } => {
            let input = CredentialInput::new(name, api_key)
                .description(description)
                .endpoint(endpoint);
            add(store, input, out).await
        }
        Command::Edit { target, fields } => edit(store, target, fields, out).await,
        Command::Delete { target } => delete(store, target, out).await,
        Command::Copy { target, field } => copy(store, target, field, out).await,
        Command::Import { file } => import(store, &file, out).await,
        Command::Export { output } => export(store, output.as_deref(), out).await,
        Command::Config {
            storage_key,
            quota_bytes,
            export_file_name,
            reset,
        } => {
            if reset {
                settings.reset().await?;
            } else if storage_key.is_some() || quota_bytes.is_some() || export_file_name.is_some() {
                let mut updated = settings.get().clone();
                if let Some(key) = storage_key {
                    updated.storage_key = key;
                }
                if let Some(quota) = quota_bytes {
                    updated.quota_bytes = quota;
                }
                if let Some(name) = export_file_name {
                    updated.export_file_name = name;
                }
                settings.update(updated).await?;
            }
            config(settings, out)
        }
    }
}

/// Resolve a target to its current position and record
async fn locate(store: &CredentialStore, target: Target) -> Result<(usize, Credential)> {
    match target {
        Target::Index(index) => Ok((index, store.get(index).await?)),
        Target::Id(id) => {
            let credentials = store.list().await?;
            credentials
                .into_iter()
                .enumerate()
                .find(|(_, c)| c.id == id)
                .ok_or_else(|| StoreError::CredentialNotFound(id.to_string()).into())
        }
    }
}

fn render(index: usize, credential: &Credential, reveal: bool) -> String {
    let view = CredentialView::new(index, credential);
    if reveal {
        view.reveal_all().to_string()
    } else {
        view.to_string()
    }
}

async fn list<W: Write>(store: &CredentialStore, reveal: bool, out: &mut W) -> Result<()> {
    let credentials = store.list().await?;

    if credentials.is_empty() {
        writeln!(out, "No credentials stored.")?;
        return Ok(());
    }

    for (index, credential) in credentials.iter().enumerate() {
        if index > 0 {
            writeln!(out)?;
        }
        writeln!(out, "{}", render(index, credential, reveal))?;
    }
    Ok(())
}

async fn show<W: Write>(
    store: &CredentialStore,
    target: Target,
    reveal: bool,
    out: &mut W,
) -> Result<()> {
    let (index, credential) = locate(store, target).await?;
    writeln!(out, "{}", render(index, &credential, reveal))?;
    Ok(())
}

async fn add<W: Write>(store: &CredentialStore, input: CredentialInput, out: &mut W) -> Result<()> {
    let credential = store.submit(EditRequest::Create, input).await?;
    writeln!(out, "Added '{}' ({})", credential.name, credential.id)?;
    Ok(())
}

async fn edit<W: Write>(
    store: &CredentialStore,
    target: Target,
    fields: EditFields,
    out: &mut W,
) -> Result<()> {
    let (index, current) = locate(store, target).await?;
    let input = fields.apply(&current);

    let updated = match target {
        Target::Index(_) => store.submit(EditRequest::UpdateAt(index), input).await?,
        Target::Id(id) => store.update_by_id(id, input).await?,
    };

    writeln!(out, "Updated '{}' ({})", updated.name, updated.id)?;
    Ok(())
}

async fn delete<W: Write>(store: &CredentialStore, target: Target, out: &mut W) -> Result<()> {
    let removed = match target {
        Target::Index(index) => store.delete(index).await?,
        Target::Id(id) => store.delete_by_id(id).await?,
    };

    writeln!(out, "Deleted '{}' ({})", removed.name, removed.id)?;
    Ok(())
}

async fn copy<W: Write>(
    store: &CredentialStore,
    target: Target,
    field: CopyField,
    out: &mut W,
) -> Result<()> {
    let (_, credential) = locate(store, target).await?;
    writeln!(out, "{}", copy_text(&credential, field))?;
    Ok(())
}

async fn read_input(file: &Path) -> Result<String> {
    if file == Path::new("-") {
        let mut raw = String::new();
        tokio::io::stdin()
            .read_to_string(&mut raw)
            .await
            .context("Failed to read import data from stdin")?;
        return Ok(raw);
    }

    tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))
}

async fn import<W: Write>(store: &CredentialStore, file: &Path, out: &mut W) -> Result<()> {
    let raw = read_input(file).await?;

    match store.import_from(&raw).await {
        Ok(imported) => {
            writeln!(out, "Imported {} credentials", imported.len())?;
            Ok(())
        }
        Err(e) if e.is_import_rejection() => {
            Err(anyhow::Error::new(e).context("Import rejected; existing credentials were left unchanged"))
        }
        Err(e) => Err(e.into()),
    }
}

async fn export<W: Write>(
    store: &CredentialStore,
    output: Option<&Path>,
    out: &mut W,
) -> Result<()> {
    match output {
        Some(path) => {
            let written = store.export_to(path).await?;
            writeln!(out, "Exported credentials to {}", written.display())?;
        }
        None => {
            let export = store.export_all().await?;
            writeln!(out, "{}", export.contents)?;
        }
    }
    Ok(())
}

fn config<W: Write>(settings: &SettingsManager, out: &mut W) -> Result<()> {
    writeln!(out, "# {}", settings.path().display())?;
    writeln!(out, "{}", serde_json::to_string_pretty(settings.get())?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use credstore_core::MemoryStorage;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct Harness {
        store: CredentialStore,
        settings: SettingsManager,
        _dir: TempDir,
    }

    impl Harness {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            Self {
                store: CredentialStore::new(Arc::new(MemoryStorage::new())),
                settings: SettingsManager::new(dir.path()),
                _dir: dir,
            }
        }

        async fn run(&mut self, command: Command) -> Result<String> {
            let mut out = Vec::new();
            super::run(command, &self.store, &mut self.settings, &mut out).await?;
            Ok(String::from_utf8(out).unwrap())
        }

        async fn add(&mut self, name: &str, api_key: &str, endpoint: &str) {
            self.run(Command::Add {
                name: name.to_string(),
                api_key: api_key.to_string(),
                description: String::new(),
                endpoint: endpoint.to_string(),
            })
            .await
            .unwrap();
        }
    }

    #[test]
    fn test_target_from_str() {
        assert_eq!("3".parse::<Target>().unwrap(), Target::Index(3));

        let id = Uuid::new_v4();
        assert_eq!(id.to_string().parse::<Target>().unwrap(), Target::Id(id));

        assert!("-1".parse::<Target>().is_err());
        assert!("openai".parse::<Target>().is_err());
    }

    #[tokio::test]
    async fn test_list_masks_by_default() {
        let mut h = Harness::new();
        assert_eq!(
            h.run(Command::List { reveal: false }).await.unwrap(),
            "No credentials stored.\n"
        );

        h.add("OpenAI", "sk-secret", "https://api.openai.com").await;

        let masked = h.run(Command::List { reveal: false }).await.unwrap();
        assert!(masked.contains("[0] OpenAI"));
        assert!(!masked.contains("sk-secret"));

        let revealed = h.run(Command::List { reveal: true }).await.unwrap();
        assert!(revealed.contains("sk-secret"));
        assert!(revealed.contains("https://api.openai.com"));
    }

    #[tokio::test]
    async fn test_edit_keeps_unchanged_fields() {
        let mut h = Harness::new();
        h.add("svc", "old-key", "https://svc").await;

        h.run(Command::Edit {
            target: Target::Index(0),
            fields: EditFields {
                api_key: Some("new-key".to_string()),
                ..EditFields::default()
            },
        })
        .await
        .unwrap();

        let credential = h.store.get(0).await.unwrap();
        assert_eq!(credential.name, "svc");
        assert_eq!(credential.api_key, "new-key");
        assert_eq!(credential.endpoint, "https://svc");
    }

    #[tokio::test]
    async fn test_delete_by_id_and_copy() {
        let mut h = Harness::new();
        h.add("a", "ka", "ea").await;
        h.add("b", "kb", "eb").await;
        let a_id = h.store.get(0).await.unwrap().id;

        let pair = h
            .run(Command::Copy {
                target: Target::Index(1),
                field: CopyField::Pair,
            })
            .await
            .unwrap();
        assert_eq!(pair, "kb eb\n");

        h.run(Command::Delete {
            target: Target::Id(a_id),
        })
        .await
        .unwrap();

        let key = h
            .run(Command::Copy {
                target: Target::Index(0),
                field: CopyField::ApiKey,
            })
            .await
            .unwrap();
        assert_eq!(key, "kb\n");
    }

    #[tokio::test]
    async fn test_out_of_range_reports_error() {
        let mut h = Harness::new();

        let err = h
            .run(Command::Delete {
                target: Target::Index(0),
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[tokio::test]
    async fn test_import_and_export() {
        let mut h = Harness::new();
        h.add("old", "k", "e").await;

        let dir = TempDir::new().unwrap();
        let file = dir.path().join("creds.csv");
        std::fs::write(&file, "name,apiKey,endpoint\nfoo,abc123,https://foo\n").unwrap();

        let output = h.run(Command::Import { file }).await.unwrap();
        assert_eq!(output, "Imported 1 credentials\n");

        let exported = h.run(Command::Export { output: None }).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&exported).unwrap();
        assert_eq!(
            parsed,
            serde_json::json!([
                {"name": "foo", "description": "", "apiKey": "abc123", "endpoint": "https://foo"}
            ])
        );

        h.run(Command::Export {
            output: Some(dir.path().to_path_buf()),
        })
        .await
        .unwrap();
        assert!(dir.path().join("credentials.json").exists());
    }

    #[tokio::test]
    async fn test_rejected_import_keeps_credentials() {
        let mut h = Harness::new();
        h.add("keep", "k", "e").await;

        let dir = TempDir::new().unwrap();
        let file = dir.path().join("bad.txt");
        std::fs::write(&file, "not json {").unwrap();

        let err = h.run(Command::Import { file }).await.unwrap_err();
        assert!(err.to_string().contains("left unchanged"));
        assert_eq!(h.store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_config_update_and_reset() {
        let mut h = Harness::new();

        let output = h
            .run(Command::Config {
                storage_key: None,
                quota_bytes: Some(2048),
                export_file_name: None,
                reset: false,
            })
            .await
            .unwrap();
        assert!(output.contains("\"quotaBytes\": 2048"));
        assert!(h.settings.path().exists());

        h.run(Command::Config {
            storage_key: None,
            quota_bytes: None,
            export_file_name: None,
            reset: true,
        })
        .await
        .unwrap();
        assert_eq!(h.settings.get().quota_bytes, 5 * 1024 * 1024);
    }
}
