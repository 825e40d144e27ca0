//! Prompt Commands
//!
//! Tauri command handlers for the prompt library. Saves re-establish the
//! template invariant: the text is brace-normalized and the binding set is
//! re-derived from the placeholders actually present.

use chrono::Utc;

use crate::models::response::CommandResponse;
use crate::models::Prompt;
use crate::state::AppState;
use crate::template;

/// List prompts from the offline snapshot (no network)
#[tauri::command]
pub async fn list_prompts(
    state: tauri::State<'_, AppState>,
) -> Result<CommandResponse<Vec<Prompt>>, String> {
    match state.prompts().await {
        Ok(service) => Ok(CommandResponse::ok(service.list())),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}

/// Save a prompt: applies locally at once, syncs in the background
#[tauri::command]
pub async fn save_prompt(
    mut prompt: Prompt,
    state: tauri::State<'_, AppState>,
) -> Result<CommandResponse<Prompt>, String> {
    prompt.prompt_text = template::normalize_braces(&prompt.prompt_text);
    prompt.variables = template::sync_bindings(&prompt.prompt_text, &prompt.variables);
    let now = Utc::now();
    prompt.updated_at = Some(now);
    if prompt.created_at.is_none() {
        prompt.created_at = Some(now);
    }

    let service = match state.prompts().await {
        Ok(service) => service,
        Err(e) => return Ok(CommandResponse::err(e.to_string())),
    };
    match service.save(prompt).await {
        Ok(saved) => Ok(CommandResponse::ok(saved)),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}

/// Delete a prompt by id; `"all"` clears the whole library
#[tauri::command]
pub async fn delete_prompt(
    id: String,
    state: tauri::State<'_, AppState>,
) -> Result<CommandResponse<()>, String> {
    let service = match state.prompts().await {
        Ok(service) => service,
        Err(e) => return Ok(CommandResponse::err(e.to_string())),
    };
    match service.delete(&id).await {
        Ok(()) => Ok(CommandResponse::ok(())),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}

/// Refresh the library from the server and return the new snapshot
#[tauri::command]
pub async fn reload_prompts(
    state: tauri::State<'_, AppState>,
) -> Result<CommandResponse<Vec<Prompt>>, String> {
    let service = match state.prompts().await {
        Ok(service) => service,
        Err(e) => return Ok(CommandResponse::err(e.to_string())),
    };
    match service.load_from_server().await {
        Ok(()) => Ok(CommandResponse::ok(service.list())),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}
