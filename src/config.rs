//! Configuration file handling for the ledger.
//!
//! The configuration file is stored at `$LEDGER_HOME/config.json` and says where the workbook
//! lives and how the HTTP API is served.

use crate::error::{ErrorType, IntoResult, Res};
use crate::store::WorkbookStore;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "ledger";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const DEFAULT_WORKBOOK: &str = "transactions.xlsx";
const DEFAULT_LISTEN: &str = "127.0.0.1:8000";
pub(crate) const ANY_ORIGIN: &str = "*";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$LEDGER_HOME` and from there it loads `$LEDGER_HOME/config.json`.
///
/// Clones share one `WorkbookStore`, and therefore one lock on the workbook.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    store: WorkbookStore,
}

impl Config {
    /// Creates the home directory and an initial `config.json`.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the ledger home, e.g. `$HOME/ledger`
    /// - `workbook` - Where the workbook is kept, relative to `dir` or absolute. Defaults to
    ///   `transactions.xlsx`.
    /// - `listen` - The address the HTTP API binds to. Defaults to `127.0.0.1:8000`.
    ///
    /// # Errors
    /// - If a config file already exists in `dir`, or any file operation fails.
    pub async fn create(
        dir: impl Into<PathBuf>,
        workbook: Option<PathBuf>,
        listen: Option<String>,
    ) -> Result<Self> {
        Self::create_inner(dir.into(), workbook, listen)
            .await
            .pub_result(ErrorType::Config)
    }

    async fn create_inner(
        maybe_relative: PathBuf,
        workbook: Option<PathBuf>,
        listen: Option<String>,
    ) -> Res<Self> {
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the ledger home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if utils::exists(&config_path).await? {
            bail!(
                "The ledger home is already initialized, found '{}'",
                config_path.display()
            )
        }

        let mut config_file = ConfigFile::default();
        if let Some(workbook) = workbook {
            config_file.workbook_path = workbook;
        }
        if let Some(listen) = listen {
            config_file.listen = listen;
        }
        config_file.save(&config_path).await?;

        Ok(Self::from_parts(root, config_path, config_file))
    }

    /// This will
    /// - validate that `ledger_home` exists and that the config file exists
    /// - load and validate the config file
    /// - return the loaded configuration object
    pub async fn load(ledger_home: impl Into<PathBuf>) -> Result<Self> {
        Self::load_inner(ledger_home.into())
            .await
            .pub_result(ErrorType::Config)
    }

    async fn load_inner(maybe_relative: PathBuf) -> Res<Self> {
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Ledger Home is missing, run 'ledger init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !utils::exists(&config_path).await? {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;
        Ok(Self::from_parts(root, config_path, config_file))
    }

    fn from_parts(root: PathBuf, config_path: PathBuf, config_file: ConfigFile) -> Self {
        let workbook_path = resolve(&root, &config_file.workbook_path);
        Self {
            root,
            config_path,
            config_file,
            store: WorkbookStore::new(workbook_path),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// The absolute path to the workbook.
    pub fn workbook_path(&self) -> &Path {
        self.store.path()
    }

    pub fn listen(&self) -> &str {
        &self.config_file.listen
    }

    /// Origins allowed by CORS. `*` allows any origin.
    pub fn allowed_origins(&self) -> &[String] {
        &self.config_file.allowed_origins
    }

    pub fn store(&self) -> &WorkbookStore {
        &self.store
    }
}

/// Returns `p` if it is absolute, otherwise `p` joined to `root`.
fn resolve(root: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        return p.to_path_buf();
    }
    root.join(p)
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "ledger",
///   "config_version": 1,
///   "workbook_path": "transactions.xlsx",
///   "listen": "127.0.0.1:8000",
///   "allowed_origins": ["*"]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "ledger"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Path to the workbook, relative to the ledger home or absolute
    #[serde(default = "default_workbook_path")]
    workbook_path: PathBuf,

    /// The address the HTTP API listens on
    #[serde(default = "default_listen")]
    listen: String,

    /// Origins allowed to call the HTTP API from a browser
    #[serde(default = "default_allowed_origins")]
    allowed_origins: Vec<String>,
}

fn default_workbook_path() -> PathBuf {
    PathBuf::from(DEFAULT_WORKBOOK)
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

fn default_allowed_origins() -> Vec<String> {
    vec![ANY_ORIGIN.to_string()]
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            workbook_path: default_workbook_path(),
            listen: default_listen(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it belongs to another app.
    async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path)
            .await
            .context("Unable to load the config file")?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            config.config_version == CONFIG_VERSION,
            "Unsupported config_version {} in config file, expected {}",
            config.config_version,
            CONFIG_VERSION
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}
