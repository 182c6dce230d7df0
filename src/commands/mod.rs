//! Command implementations
//!
//! Each command is a module with an execute function that takes parsed CLI
//! args and a [`Session`], and reports through an [`OutputWriter`].
//!
//! [`OutputWriter`]: crate::ui::OutputWriter

pub mod find;
pub mod init;
pub mod list;
pub mod show;

pub use find::execute as find;
pub use init::execute as init;
pub use list::execute as list;
pub use show::execute as show;

use crate::config::ZkConfig;
use crate::index::{IndexResult, NoteIndex};
use std::path::{Path, PathBuf};

/// Configuration plus the resolved vault directory
#[derive(Debug, Clone)]
pub struct Session {
    pub config: ZkConfig,
    vault: PathBuf,
}

impl Session {
    /// Resolve the vault from `vault_override` or the configuration
    #[must_use]
    pub fn new(config: ZkConfig, vault_override: Option<&Path>) -> Self {
        let vault = config.vault_dir(vault_override);
        Self { config, vault }
    }

    #[must_use]
    pub fn vault(&self) -> &Path {
        &self.vault
    }

    #[must_use]
    pub fn index_path(&self) -> PathBuf {
        self.config.index_path(&self.vault)
    }

    /// Open the vault's index with the configured busy timeout
    ///
    /// # Errors
    ///
    /// Returns `IndexError::Unavailable` if there is no usable index.
    pub fn open_index(&self) -> IndexResult<NoteIndex> {
        let index = NoteIndex::open(self.index_path())?;
        index.set_busy_timeout(self.config.busy_timeout())?;
        Ok(index)
    }
}
