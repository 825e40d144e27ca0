//! Variable Commands
//!
//! Tauri command handlers for the global variable library.

use chrono::Utc;

use crate::models::response::CommandResponse;
use crate::models::Variable;
use crate::state::AppState;

/// List variables from the offline snapshot (no network)
#[tauri::command]
pub async fn list_variables(
    state: tauri::State<'_, AppState>,
) -> Result<CommandResponse<Vec<Variable>>, String> {
    match state.variables().await {
        Ok(service) => Ok(CommandResponse::ok(service.list())),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}

/// Save a variable: applies locally at once, syncs in the background
#[tauri::command]
pub async fn save_variable(
    mut variable: Variable,
    state: tauri::State<'_, AppState>,
) -> Result<CommandResponse<Variable>, String> {
    let now = Utc::now();
    variable.updated_at = Some(now);
    if variable.created_at.is_none() {
        variable.created_at = Some(now);
    }

    let service = match state.variables().await {
        Ok(service) => service,
        Err(e) => return Ok(CommandResponse::err(e.to_string())),
    };
    match service.save(variable).await {
        Ok(saved) => Ok(CommandResponse::ok(saved)),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}

/// Delete a variable by id; `"all"` clears the whole library
#[tauri::command]
pub async fn delete_variable(
    id: String,
    state: tauri::State<'_, AppState>,
) -> Result<CommandResponse<()>, String> {
    let service = match state.variables().await {
        Ok(service) => service,
        Err(e) => return Ok(CommandResponse::err(e.to_string())),
    };
    match service.delete(&id).await {
        Ok(()) => Ok(CommandResponse::ok(())),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}
