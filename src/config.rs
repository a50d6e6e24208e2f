//! Configuration file handling for the ledger.
//!
//! The configuration file is stored at `$LEDGER_HOME/config.json`. It records which backend holds
//! the expenses and the display preferences. The backing store itself lives next to it, as
//! `expenses.csv` or `ledger.sqlite`.

use crate::error::{ErrorType, IntoResult};
use crate::model::Currency;
use crate::store::{self, Backend, RecordStore};
use crate::{utils, Result};
use anyhow::{anyhow, bail, ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

const APP_NAME: &str = "ledger";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";

/// How many recent records summaries and reports show unless configured otherwise.
pub const DEFAULT_RECENT_COUNT: usize = 10;

/// The `Config` object represents a ledger home directory that is ready to use: the parsed
/// `config.json` and an open handle to the record store it names.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    store: Arc<dyn RecordStore>,
}

impl Config {
    /// Creates the ledger home directory if needed, writes an initial `config.json` and creates an
    /// empty store of the chosen kind.
    ///
    /// # Errors
    /// - The directory already holds a `config.json`
    /// - Any file operation fails
    pub async fn create(dir: impl Into<PathBuf>, backend: Backend) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the ledger home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "A ledger already exists at '{}', remove its config.json to start over",
                root.display()
            );
        }

        let store_path = root.join(backend.file_name());
        let store = store::create(backend, &store_path)
            .await
            .with_context(|| format!("Unable to create the {backend} store"))?;

        let config_file = ConfigFile {
            backend,
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;
        debug!("Created ledger home {}", root.display());

        Ok(Self {
            root,
            config_path,
            config_file,
            store,
        })
    }

    /// This will
    /// - validate that `ledger_home` and its config file exist
    /// - load and validate the config file
    /// - open the store the config file names
    pub async fn load(ledger_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = ledger_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .map_err(|_| {
                anyhow!(
                    "No ledger found at '{}', run `ledger init` first",
                    maybe_relative.display()
                )
            })
            .pub_result(ErrorType::NotFound)?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            return Err(anyhow!(
                "The config file is missing '{}', run `ledger init` first",
                config_path.display()
            ))
            .pub_result(ErrorType::NotFound);
        }
        let config_file = ConfigFile::load(&config_path)
            .await
            .pub_result(ErrorType::Config)?;

        let store_path = root.join(config_file.backend.file_name());
        let store = store::open(config_file.backend, &store_path)
            .await
            .with_context(|| format!("Unable to open the {} store", config_file.backend))?;

        Ok(Self {
            root,
            config_path,
            config_file,
            store,
        })
    }

    /// Writes the current settings back to `config.json`.
    pub async fn save(&self) -> Result<()> {
        self.config_file.save(&self.config_path).await
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backend(&self) -> Backend {
        self.config_file.backend
    }

    pub fn store_path(&self) -> PathBuf {
        self.root.join(self.backend().file_name())
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    pub fn currency(&self) -> Currency {
        self.config_file.currency
    }

    pub fn recent_count(&self) -> usize {
        self.config_file.recent_count
    }

    pub fn set_currency(&mut self, currency: Currency) {
        self.config_file.currency = currency;
    }

    pub fn set_recent_count(&mut self, recent_count: usize) -> Result<()> {
        ensure!(recent_count > 0, "The number of recent records must be at least 1");
        self.config_file.recent_count = recent_count;
        Ok(())
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "ledger",
///   "config_version": 1,
///   "backend": "csv",
///   "currency": "inr",
///   "recent_count": 10
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "ledger"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Which store holds the expenses
    backend: Backend,

    /// The currency symbol used when rendering amounts
    #[serde(default)]
    currency: Currency,

    /// How many recent records the summary and the PDF report show
    #[serde(default = "default_recent_count")]
    recent_count: usize,
}

fn default_recent_count() -> usize {
    DEFAULT_RECENT_COUNT
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            backend: Backend::default(),
            currency: Currency::default(),
            recent_count: DEFAULT_RECENT_COUNT,
        }
    }
}

impl ConfigFile {
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;
        ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        ensure!(
            config.config_version <= CONFIG_VERSION,
            "The config file version {} is newer than this program supports ({})",
            config.config_version,
            CONFIG_VERSION
        );
        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_type_of;
    use crate::model::Expense;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_csv() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("ledger_home");
        let config = Config::create(&home, Backend::Csv).await.unwrap();
        assert_eq!(config.backend(), Backend::Csv);
        assert_eq!(config.currency(), Currency::Inr);
        assert_eq!(config.recent_count(), DEFAULT_RECENT_COUNT);
        assert!(config.config_path().is_file());
        assert!(config.store_path().ends_with("expenses.csv"));
        assert!(config.store_path().is_file());
    }

    #[tokio::test]
    async fn test_create_sqlite_and_load() {
        let dir = TempDir::new().unwrap();
        let config = Config::create(dir.path(), Backend::Sqlite).await.unwrap();
        assert!(config.store_path().ends_with("ledger.sqlite"));
        config
            .store()
            .append(&Expense::parse("2025-10-14", "Food", "250", "").unwrap())
            .await
            .unwrap();

        let loaded = Config::load(dir.path()).await.unwrap();
        assert_eq!(loaded.backend(), Backend::Sqlite);
        assert_eq!(loaded.store().all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_twice_fails() {
        let dir = TempDir::new().unwrap();
        Config::create(dir.path(), Backend::Csv).await.unwrap();
        assert!(Config::create(dir.path(), Backend::Sqlite).await.is_err());
    }

    #[tokio::test]
    async fn test_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path().join("nope")).await.unwrap_err();
        assert_eq!(error_type_of(&err), Some(ErrorType::NotFound));
        let err = Config::load(dir.path()).await.unwrap_err();
        assert_eq!(error_type_of(&err), Some(ErrorType::NotFound));
    }

    #[tokio::test]
    async fn test_settings_are_saved() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::create(dir.path(), Backend::Csv).await.unwrap();
        config.set_currency(Currency::Usd);
        config.set_recent_count(5).unwrap();
        assert!(config.set_recent_count(0).is_err());
        config.save().await.unwrap();

        let loaded = Config::load(dir.path()).await.unwrap();
        assert_eq!(loaded.currency(), Currency::Usd);
        assert_eq!(loaded.recent_count(), 5);
    }

    #[tokio::test]
    async fn test_optional_keys_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        utils::write(
            &path,
            r#"{"app_name": "ledger", "config_version": 1, "backend": "csv"}"#,
        )
        .await
        .unwrap();
        let loaded = Config::load(dir.path()).await.unwrap();
        assert_eq!(loaded.currency(), Currency::Inr);
        assert_eq!(loaded.recent_count(), DEFAULT_RECENT_COUNT);
        // A CSV ledger whose file is missing reads as empty.
        assert!(loaded.store().all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_wrong_app_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        utils::write(
            &path,
            r#"{"app_name": "budget", "config_version": 1, "backend": "csv"}"#,
        )
        .await
        .unwrap();
        let err = Config::load(dir.path()).await.unwrap_err();
        assert_eq!(error_type_of(&err), Some(ErrorType::Config));
        assert!(format!("{err:#}").contains("app_name"));
    }
}
