//! Cross-Platform Path Utilities
//!
//! Functions for resolving application directories across platforms.

use std::path::PathBuf;

use crate::utils::error::{AppError, AppResult};

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the PromptDeck directory (~/.promptdeck/)
pub fn promptdeck_dir() -> AppResult<PathBuf> {
    Ok(home_dir()?.join(".promptdeck"))
}

/// Get the config file path (~/.promptdeck/config.json)
pub fn config_path() -> AppResult<PathBuf> {
    Ok(promptdeck_dir()?.join("config.json"))
}

/// Get the local storage file path (~/.promptdeck/storage.json)
pub fn storage_path() -> AppResult<PathBuf> {
    Ok(promptdeck_dir()?.join("storage.json"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &PathBuf) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Get the PromptDeck directory, creating if it doesn't exist
pub fn ensure_promptdeck_dir() -> AppResult<PathBuf> {
    let path = promptdeck_dir()?;
    ensure_dir(&path)?;
    Ok(path)
}
