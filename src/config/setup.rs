//! Interactive first-time configuration

use super::ZkConfig;
use config::ConfigError;
use dialoguer::{Input, theme::ColorfulTheme};
use std::path::PathBuf;

/// Ask for the vault location and author name, then save the configuration
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - The home directory cannot be determined
/// - User input cannot be read
/// - The configuration cannot be saved
pub fn first_time_setup() -> Result<ZkConfig, ConfigError> {
    println!("Welcome to zk! Let's set up your Zettelkasten.\n");

    let default_vault = dirs::home_dir()
        .ok_or_else(|| ConfigError::Message("Could not determine home directory".to_string()))?
        .join("zettelkasten");

    let vault: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Vault location")
        .default(default_vault.to_string_lossy().to_string())
        .interact_text()
        .map_err(|e| ConfigError::Message(format!("Failed to read input: {e}")))?;

    let author: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Author name")
        .allow_empty(true)
        .default(std::env::var("USER").unwrap_or_default())
        .interact_text()
        .map_err(|e| ConfigError::Message(format!("Failed to read input: {e}")))?;

    let config = configured(PathBuf::from(vault), &author);
    config.save()?;

    println!("\nConfiguration saved to {}", ZkConfig::config_path()?.display());
    Ok(config)
}

fn configured(vault: PathBuf, author: &str) -> ZkConfig {
    let author = author.trim();
    ZkConfig {
        vault: Some(vault),
        author: (!author.is_empty()).then(|| author.to_string()),
        ..ZkConfig::default()
    }
}
