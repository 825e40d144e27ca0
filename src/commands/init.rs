//! Initialization Commands

use std::sync::Arc;

use tracing::warn;

use crate::bridge::LoginOpener;
use crate::models::response::CommandResponse;
use crate::state::AppState;

/// Initialize all services. Idempotent; the frontend calls this once on
/// startup.
#[tauri::command]
pub async fn init_app(
    app: tauri::AppHandle,
    state: tauri::State<'_, AppState>,
) -> Result<CommandResponse<String>, String> {
    let handle = app.clone();
    let opener: LoginOpener = Arc::new(move |url: &str| {
        use tauri_plugin_shell::ShellExt;
        if let Err(e) = handle.shell().open(url.to_string(), None) {
            warn!("could not open login page: {e}");
        }
    });

    match state.initialize(opener).await {
        Ok(()) => Ok(CommandResponse::ok("initialized".to_string())),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}

/// Get the application version
#[tauri::command]
pub async fn get_version() -> Result<CommandResponse<String>, String> {
    Ok(CommandResponse::ok(env!("CARGO_PKG_VERSION").to_string()))
}
