//! Health Commands

use crate::models::response::{CommandResponse, HealthResponse};
use crate::state::AppState;

/// Report the health of the backing services
#[tauri::command]
pub async fn get_health(
    state: tauri::State<'_, AppState>,
) -> Result<CommandResponse<HealthResponse>, String> {
    let authenticated = match state.auth().await {
        Ok(auth) => auth.is_authenticated(),
        Err(_) => false,
    };

    let health = HealthResponse {
        storage: state.is_storage_healthy(),
        config: state.is_config_healthy(),
        authenticated,
        ..Default::default()
    };

    Ok(CommandResponse::ok(health))
}
