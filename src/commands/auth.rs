//! Auth Commands

use serde_json::json;

use crate::models::response::CommandResponse;
use crate::state::AppState;

/// Whether a bearer token is currently stored
#[tauri::command]
pub async fn check_auth(
    state: tauri::State<'_, AppState>,
) -> Result<CommandResponse<bool>, String> {
    match state.auth().await {
        Ok(auth) => Ok(CommandResponse::ok(auth.is_authenticated())),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}

/// Open the companion web app's login page
#[tauri::command]
pub async fn login(state: tauri::State<'_, AppState>) -> Result<CommandResponse<()>, String> {
    let dispatcher = match state.dispatcher().await {
        Ok(dispatcher) => dispatcher,
        Err(e) => return Ok(CommandResponse::err(e.to_string())),
    };
    dispatcher.dispatch(json!({ "action": "login" }), None).await;
    Ok(CommandResponse::ok(()))
}

/// Store a token pushed back by the companion web app after login
#[tauri::command]
pub async fn store_auth_token(
    token: String,
    state: tauri::State<'_, AppState>,
) -> Result<CommandResponse<()>, String> {
    let auth = match state.auth().await {
        Ok(auth) => auth,
        Err(e) => return Ok(CommandResponse::err(e.to_string())),
    };
    match auth.store_token(&token) {
        Ok(()) => Ok(CommandResponse::ok(())),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}

/// Drop the token and all locally cached account data. Remote data is left
/// untouched.
#[tauri::command]
pub async fn logout(state: tauri::State<'_, AppState>) -> Result<CommandResponse<()>, String> {
    let auth = match state.auth().await {
        Ok(auth) => auth,
        Err(e) => return Ok(CommandResponse::err(e.to_string())),
    };
    auth.clear_token();

    if let Ok(prompts) = state.prompts().await {
        prompts.clear_local();
    }
    if let Ok(variables) = state.variables().await {
        variables.clear_local();
    }
    if let Ok(history) = state.history().await {
        history.clear_local();
    }

    Ok(CommandResponse::ok(()))
}
