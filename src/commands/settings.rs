//! Settings Commands

use crate::models::response::CommandResponse;
use crate::models::settings::{AppConfig, SettingsUpdate};
use crate::state::AppState;

/// Get the current application settings
#[tauri::command]
pub async fn get_settings(
    state: tauri::State<'_, AppState>,
) -> Result<CommandResponse<AppConfig>, String> {
    match state.get_config().await {
        Ok(config) => Ok(CommandResponse::ok(config)),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}

/// Apply a partial settings update
#[tauri::command]
pub async fn update_settings(
    update: SettingsUpdate,
    state: tauri::State<'_, AppState>,
) -> Result<CommandResponse<AppConfig>, String> {
    match state.update_config(update).await {
        Ok(config) => Ok(CommandResponse::ok(config)),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}
