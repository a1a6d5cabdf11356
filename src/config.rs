//! Configuration file handling for MicroSave.
//!
//! The configuration file is stored at `$MICROSAVE_HOME/config.json` and contains settings for
//! the application, including where the ledger store and the exported report live and which
//! currency label to print amounts with.

use crate::db::Db;
use crate::error::{ErrorType, IntoResult};
use crate::report::DEFAULT_REPORT_FILE;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

const APP_NAME: &str = "microsave";
const CONFIG_VERSION: u8 = 1;
const DEFAULT_CURRENCY: &str = "RWF";
const CONFIG_JSON: &str = "config.json";
const MICROSAVE_SQLITE: &str = "microsave.sqlite";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$MICROSAVE_HOME` and from there it loads `$MICROSAVE_HOME/config.json`. It
/// provides the ledger store handle and resolves the paths that are configurable relative to the
/// home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    db: Db,
}

impl Config {
    /// Creates the home directory, an initial `config.json` with default settings, and an empty
    /// ledger store. A store already present at the default location, e.g. one left behind after
    /// `config.json` was deleted, is kept and opened instead.
    ///
    /// # Errors
    /// - Returns a `Config` error if a configuration already exists in `dir` or if any file
    ///   operation fails.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the microsave home directory")
            .pub_result(ErrorType::Config)?;
        let root = utils::canonicalize(&maybe_relative)
            .await
            .pub_result(ErrorType::Config)?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            return Err(anyhow::anyhow!(
                "A configuration already exists at '{}'",
                config_path.display()
            ))
            .pub_result(ErrorType::Config);
        }

        let config_file = ConfigFile::default();
        config_file
            .save(&config_path)
            .await
            .pub_result(ErrorType::Config)?;

        let db_path = resolve(&root, config_file.database_path());
        let db = if db_path.is_file() {
            info!(
                "No config.json was found, using the existing ledger store at {}",
                db_path.display()
            );
            Db::load(&db_path).await?
        } else {
            Db::init(&db_path).await?
        };

        info!("Created microsave home at {}", root.display());
        Ok(Self {
            root,
            config_path,
            config_file,
            db,
        })
    }

    /// This will
    /// - validate that `microsave_home` exists and that the config file exists
    /// - load the config file
    /// - open the ledger store, bringing its schema up to date
    /// - return the loaded configuration object
    pub async fn load(microsave_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = microsave_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("MicroSave home is missing")
            .pub_result(ErrorType::Config)?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            return Err(anyhow::anyhow!(
                "The config file is missing '{}'",
                config_path.display()
            ))
            .pub_result(ErrorType::Config);
        }
        let config_file = ConfigFile::load(&config_path)
            .await
            .pub_result(ErrorType::Config)?;

        let db_path = resolve(&root, config_file.database_path());
        let db = Db::load(&db_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
            db,
        })
    }

    /// Loads the configuration in `microsave_home`, creating the home directory, configuration and
    /// store first if there is no configuration yet.
    pub async fn open(microsave_home: impl Into<PathBuf>) -> Result<Self> {
        let home = microsave_home.into();
        if home.join(CONFIG_JSON).is_file() {
            Self::load(home).await
        } else {
            Self::create(home).await
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    /// The label printed in front of amounts, e.g. `RWF`.
    pub fn currency(&self) -> &str {
        &self.config_file.currency
    }

    /// The report file, resolved against the home directory if it is relative.
    pub fn report_path(&self) -> PathBuf {
        resolve(&self.root, self.config_file.report_path())
    }

    /// Resolves a user-supplied path against the home directory if it is relative.
    pub fn resolve(&self, p: impl Into<PathBuf>) -> PathBuf {
        resolve(&self.root, p.into())
    }
}

/// Returns `p` unchanged if it is absolute, otherwise joins it to `root`.
fn resolve(root: &Path, p: PathBuf) -> PathBuf {
    if p.is_absolute() {
        return p;
    }
    root.join(p)
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "microsave",
///   "config_version": 1,
///   "currency": "RWF",
///   "database_path": "microsave.sqlite",
///   "report_path": "report.txt"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "microsave"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Label printed in front of amounts
    #[serde(default = "default_currency")]
    currency: String,

    /// Path to the SQLite ledger store (optional, relative to the home directory or absolute)
    /// Defaults to $MICROSAVE_HOME/microsave.sqlite if not specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    database_path: Option<PathBuf>,

    /// Path to the exported report (optional, relative to the home directory or absolute)
    /// Defaults to $MICROSAVE_HOME/report.txt if not specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    report_path: Option<PathBuf>,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            currency: default_currency(),
            database_path: None,
            report_path: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it belongs to another app.
    async fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
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
        if config.config_version > CONFIG_VERSION {
            bail!(
                "Config version {} is unsupported. Is a newer version of microsave available?",
                config.config_version
            );
        }

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(MICROSAVE_SQLITE))
    }

    fn report_path(&self) -> PathBuf {
        self.report_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_FILE))
    }
}
