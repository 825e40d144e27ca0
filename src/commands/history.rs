//! History Commands
//!
//! Tauri command handlers for the enhancement history. Entries are appended
//! by the enhance flow; from here they can only be listed and deleted.

use crate::models::response::CommandResponse;
use crate::models::HistoryEntry;
use crate::state::AppState;

/// List history entries from the offline snapshot (no network)
#[tauri::command]
pub async fn list_history(
    state: tauri::State<'_, AppState>,
) -> Result<CommandResponse<Vec<HistoryEntry>>, String> {
    match state.history().await {
        Ok(service) => Ok(CommandResponse::ok(service.list())),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}

/// Delete one history entry
#[tauri::command]
pub async fn delete_history_entry(
    id: String,
    state: tauri::State<'_, AppState>,
) -> Result<CommandResponse<()>, String> {
    let service = match state.history().await {
        Ok(service) => service,
        Err(e) => return Ok(CommandResponse::err(e.to_string())),
    };
    match service.delete(&id).await {
        Ok(()) => Ok(CommandResponse::ok(())),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}

/// Clear the whole history
#[tauri::command]
pub async fn clear_history(
    state: tauri::State<'_, AppState>,
) -> Result<CommandResponse<()>, String> {
    let service = match state.history().await {
        Ok(service) => service,
        Err(e) => return Ok(CommandResponse::err(e.to_string())),
    };
    match service.delete("all").await {
        Ok(()) => Ok(CommandResponse::ok(())),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}
