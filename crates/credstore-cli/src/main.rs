//! credstore - manage a local list of API credentials from the terminal
//!
//! Credentials are kept as plain text in a JSON store under the user's data
//! directory (or `--data-dir`). Keys and endpoints are masked in listings
//! unless `--reveal` is given.

use clap::Parser;
use std::sync::Arc;
use tracing::debug;

use credstore_core::{CredentialStore, FileStorage, SettingsManager};

mod commands;

use commands::Command;

/// credstore - local API credential list with JSON/CSV import and JSON export
#[derive(Parser, Debug)]
#[command(name = "credstore")]
#[command(version)]
#[command(about = "Manage API credentials: names, keys and endpoints, with JSON/CSV import and JSON export")]
struct Args {
    /// Directory holding the credential store and settings
    #[arg(long, global = true, env = "CREDSTORE_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries exports and copied values
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    let storage_dir = match args.data_dir {
        Some(dir) => dir,
        None => FileStorage::default_storage_dir()?,
    };

    let mut settings = SettingsManager::new(&storage_dir);
    let storage = FileStorage::with_dir(storage_dir)?.with_quota(settings.get().quota_bytes);
    let store = CredentialStore::with_settings(Arc::new(storage), settings.get());

    debug!(
        "Using {} with storage key '{}'",
        store.backend_name(),
        store.storage_key()
    );

    let mut out = std::io::stdout().lock();
    commands::run(args.command, &store, &mut settings, &mut out).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use commands::Target;
    use credstore_core::CopyField;

    #[test]
    fn test_parse_add() {
        let args = Args::try_parse_from([
            "credstore",
            "add",
            "--name",
            "OpenAI",
            "--api-key",
            "sk-123",
            "--endpoint",
            "https://api.openai.com",
        ])
        .unwrap();

        match args.command {
            Command::Add {
                name,
                api_key,
                description,
                endpoint,
            } => {
                assert_eq!(name, "OpenAI");
                assert_eq!(api_key, "sk-123");
                assert_eq!(description, "");
                assert_eq!(endpoint, "https://api.openai.com");
            }
            other => panic!("Expected Add command, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_add_requires_name() {
        assert!(Args::try_parse_from(["credstore", "add", "--api-key", "k"]).is_err());
    }

    #[test]
    fn test_parse_copy_pair() {
        let args = Args::try_parse_from(["credstore", "copy", "2", "pair"]).unwrap();

        match args.command {
            Command::Copy { target, field } => {
                assert_eq!(target, Target::Index(2));
                assert_eq!(field, CopyField::Pair);
            }
            other => panic!("Expected Copy command, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_flags() {
        let args =
            Args::try_parse_from(["credstore", "list", "--reveal", "--data-dir", "/tmp/creds", "-v"])
                .unwrap();

        assert!(args.verbose);
        assert_eq!(args.data_dir, Some(std::path::PathBuf::from("/tmp/creds")));
        assert!(matches!(args.command, Command::List { reveal: true }));
    }

    #[test]
    fn test_parse_config_reset_conflicts() {
        assert!(Args::try_parse_from(["credstore", "config", "--reset"]).is_ok());
        assert!(
            Args::try_parse_from(["credstore", "config", "--reset", "--quota-bytes", "10"]).is_err()
        );
    }
}
