//! Enhance Command
//!
//! Routes through the messaging bridge, same as the page-context enhance
//! button, so both surfaces share one flow: remote enhancement plus the
//! history append on success.

use serde_json::json;

use crate::bridge::DispatchOutcome;
use crate::models::response::CommandResponse;
use crate::state::AppState;

/// Enhance a prompt via the remote API
#[tauri::command]
pub async fn enhance_prompt(
    text: String,
    state: tauri::State<'_, AppState>,
) -> Result<CommandResponse<String>, String> {
    let dispatcher = match state.dispatcher().await {
        Ok(dispatcher) => dispatcher,
        Err(e) => return Ok(CommandResponse::err(e.to_string())),
    };

    let outcome = dispatcher
        .dispatch(json!({ "action": "enhancePrompt", "text": text }), None)
        .await;

    match outcome {
        DispatchOutcome::Replied(reply) => {
            if let Some(enhanced) = reply.get("enhancedText").and_then(|v| v.as_str()) {
                Ok(CommandResponse::ok(enhanced.to_string()))
            } else {
                let error = reply
                    .get("error")
                    .and_then(|v| v.as_str())
                    .unwrap_or("Failed to enhance prompt");
                Ok(CommandResponse::err(error))
            }
        }
        DispatchOutcome::Ignored => Ok(CommandResponse::err("enhance action not handled")),
    }
}
