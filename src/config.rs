//! Configuration file handling.
//!
//! The configuration file is stored at `$AGRO_HOME/config.json` and holds the display locale,
//! the history length and the storage quota. The rest of `$AGRO_HOME` is a fixed layout: the
//! storage slots in `storage/` and CSV exports in `exports/` unless configured otherwise.

use crate::present::{Locale, DEFAULT_HISTORY_LIMIT};
use crate::storage::FileStorage;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "agro";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const STORAGE: &str = "storage";
const EXPORTS: &str = "exports";
/// Browsers allow roughly this much per origin in `localStorage`.
const DEFAULT_STORAGE_QUOTA: u64 = 5 * 1024 * 1024;

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$AGRO_HOME` and from there it loads `$AGRO_HOME/config.json`. It provides paths to
/// other items that are expected in a certain location within the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    storage_dir: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the data directory, its subdirectories and an initial `config.json` using `locale`
    /// along with default settings. An existing `config.json` is an error.
    ///
    /// # Errors
    /// - Returns an error if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>, locale: Locale) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the agro home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "A config file already exists at '{}'",
                config_path.display()
            )
        }

        let storage_dir = root.join(STORAGE);
        utils::make_dir(&storage_dir).await?;
        utils::make_dir(&root.join(EXPORTS)).await?;

        let config_file = ConfigFile {
            locale,
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            storage_dir,
            config_path,
            config_file,
        })
    }

    /// This will
    /// - validate that `agro_home` exists and that the config file exists
    /// - load the config file
    /// - validate that the storage directory exists
    /// - return the loaded configuration object
    pub async fn load(agro_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = agro_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Agro Home is missing, run 'agro init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let storage_dir = root.join(STORAGE);
        if !storage_dir.is_dir() {
            bail!(
                "The storage directory is missing '{}'",
                storage_dir.display()
            )
        }
        Ok(Self {
            root,
            storage_dir,
            config_path,
            config_file,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn locale(&self) -> Locale {
        self.config_file.locale
    }

    pub fn history_limit(&self) -> usize {
        self.config_file.history_limit
    }

    pub fn storage_quota(&self) -> Option<u64> {
        self.config_file.storage_quota_bytes
    }

    /// Where exports are written: the configured `export_dir`, resolved against the home
    /// directory if relative, or `$AGRO_HOME/exports`.
    pub fn export_dir(&self) -> PathBuf {
        match &self.config_file.export_dir {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => self.root.join(p),
            None => self.root.join(EXPORTS),
        }
    }

    /// Opens the storage slots.
    pub fn storage(&self) -> FileStorage {
        FileStorage::new(&self.storage_dir, self.storage_quota())
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "agro",
///   "config_version": 1,
///   "locale": "pt-BR",
///   "history_limit": 10,
///   "storage_quota_bytes": 5242880
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "agro"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Display conventions for currency, dates and labels
    #[serde(default)]
    locale: Locale,

    /// How many transactions `history` shows by default
    #[serde(default = "default_history_limit")]
    history_limit: usize,

    /// Total bytes the storage slots may use. No limit when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    storage_quota_bytes: Option<u64>,

    /// Where exports are written (optional, relative to the home directory or absolute)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    export_dir: Option<PathBuf>,
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            locale: Locale::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            storage_quota_bytes: Some(DEFAULT_STORAGE_QUOTA),
            export_dir: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it belongs to another app.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            config.config_version <= CONFIG_VERSION,
            "Config version {} is not supported. Is a newer version of agro available?",
            config.config_version
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}
