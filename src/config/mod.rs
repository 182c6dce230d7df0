//! Configuration for zk
//!
//! Stored as TOML in `<config_dir>/zettel/config.toml`. Every field has a
//! default, so a partial file is valid.

mod setup;

pub use setup::first_time_setup;

use crate::filter::{DEFAULT_LINK_CLOSE, DEFAULT_LINK_OPEN, FilterError, QueryCompiler};
use crate::finder::Renderer;
use crate::finder::render::{DEFAULT_POINTER, DEFAULT_PROMPT};
use crate::index::{DEFAULT_BUSY_TIMEOUT, DEFAULT_INDEX_FILE, SortColumn, SortSpec};
use crate::ui::{self, Theme};
use config::{Config, ConfigError, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR: &str = "zettel";
const CONFIG_FILE: &str = "config.toml";

/// Application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ZkConfig {
    /// Directory holding the notes and the index; the working directory when unset
    pub vault: Option<PathBuf>,

    /// Author name used by `list --mine`
    pub author: Option<String>,

    /// Index file name, relative to the vault
    pub index_file: String,

    pub link_open: String,
    pub link_close: String,

    /// Result order; by id when unset
    pub sort: Option<SortColumn>,
    pub descending: bool,

    /// How long a lookup waits on a locked index
    pub busy_timeout_ms: u64,

    pub prompt: String,
    pub pointer: String,

    /// Draw without colors
    pub plain: bool,
}

impl Default for ZkConfig {
    fn default() -> Self {
        Self {
            vault: None,
            author: None,
            index_file: DEFAULT_INDEX_FILE.to_string(),
            link_open: DEFAULT_LINK_OPEN.to_string(),
            link_close: DEFAULT_LINK_CLOSE.to_string(),
            sort: None,
            descending: false,
            busy_timeout_ms: u64::try_from(DEFAULT_BUSY_TIMEOUT.as_millis()).unwrap_or(u64::MAX),
            prompt: DEFAULT_PROMPT.to_string(),
            pointer: DEFAULT_POINTER.to_string(),
            plain: false,
        }
    }
}

impl ZkConfig {
    /// Get the path to the config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::Message("Could not determine config directory".to_string()))?;
        Ok(config_dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load configuration from an explicit file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing or is not valid TOML for
    /// this structure.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml))
            .build()?;
        settings.try_deserialize()
    }

    /// Load configuration, running first-time setup if config doesn't exist
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if loading or creating the configuration fails.
    pub fn load_or_setup() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            first_time_setup()
        }
    }

    /// Save configuration to the user's config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be written.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the directory cannot be created, the
    /// configuration cannot be serialized to TOML, or the file cannot be
    /// written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Message(format!("Failed to create config directory: {e}")))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")))?;

        fs::write(path, toml_string)
            .map_err(|e| ConfigError::Message(format!("Failed to write config file: {e}")))
    }

    /// Vault directory: `overridden`, then the configured vault, then `.`
    #[must_use]
    pub fn vault_dir(&self, overridden: Option<&Path>) -> PathBuf {
        overridden
            .map(Path::to_path_buf)
            .or_else(|| self.vault.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Index file inside `vault`
    #[must_use]
    pub fn index_path(&self, vault: &Path) -> PathBuf {
        vault.join(&self.index_file)
    }

    #[must_use]
    pub const fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    #[must_use]
    pub const fn sort_spec(&self) -> SortSpec {
        SortSpec::new(self.sort, self.descending)
    }

    /// Query compiler with the configured link delimiters
    ///
    /// # Errors
    ///
    /// Returns `FilterError::InvalidDelimiter` if a delimiter is empty.
    pub fn compiler(&self) -> Result<QueryCompiler, FilterError> {
        QueryCompiler::new(&self.link_open, &self.link_close)
    }

    /// Renderer with the configured prompt, pointer and colors
    ///
    /// # Errors
    ///
    /// Returns `UiError::InvalidConfig` if the pointer is empty.
    pub fn renderer(&self) -> ui::Result<Renderer> {
        let theme = if self.plain { Theme::plain() } else { Theme::dark() };
        Renderer::new(theme, self.prompt.as_str(), self.pointer.as_str())
    }
}
