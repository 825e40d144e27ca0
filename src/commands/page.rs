//! Page Commands
//!
//! Attach the hosted chat webview as a page session, route insertions and
//! bridge actions into it, and resolve eval replies coming back from the
//! injected bridge script.

use std::sync::Arc;

use serde_json::Value;
use tauri::Manager;
use tokio::sync::RwLock;
use tracing::warn;

use crate::bridge::DispatchOutcome;
use crate::dom::webview::{EvalBridge, TauriTransport, WebviewPage, BRIDGE_SCRIPT};
use crate::insertion::{InsertOutcome, InsertRequest};
use crate::models::response::CommandResponse;
use crate::page::PageSession;
use crate::state::AppState;

/// The currently attached page session and its eval bridge
pub struct PageState {
    session: Arc<RwLock<Option<Arc<PageSession>>>>,
    bridge: Arc<RwLock<Option<Arc<EvalBridge>>>>,
}

impl PageState {
    pub fn new() -> Self {
        Self {
            session: Arc::new(RwLock::new(None)),
            bridge: Arc::new(RwLock::new(None)),
        }
    }
}

impl Default for PageState {
    fn default() -> Self {
        Self::new()
    }
}

/// Attach a hosted webview window as the active page session. Injects the
/// bridge script and returns the name of the selected adapter.
#[tauri::command]
pub async fn attach_page(
    window_label: String,
    url: String,
    app: tauri::AppHandle,
    state: tauri::State<'_, AppState>,
    pages: tauri::State<'_, PageState>,
) -> Result<CommandResponse<String>, String> {
    let Some(window) = app.get_webview_window(&window_label) else {
        return Ok(CommandResponse::err(format!(
            "no webview window named '{window_label}'"
        )));
    };

    let adapter_debug = match state.get_config().await {
        Ok(config) => config.adapter_debug,
        Err(e) => return Ok(CommandResponse::err(e.to_string())),
    };

    if let Err(e) = window.eval(BRIDGE_SCRIPT) {
        warn!("bridge script injection failed: {e}");
    }

    let bridge = Arc::new(EvalBridge::new(Box::new(TauriTransport::new(window))));
    let page = WebviewPage::new(url, bridge.clone());
    let session = Arc::new(PageSession::new(Box::new(page), adapter_debug));
    let adapter = session.adapter_name().to_string();

    *pages.bridge.write().await = Some(bridge);
    *pages.session.write().await = Some(session);

    Ok(CommandResponse::ok(adapter))
}

/// Drop the active page session
#[tauri::command]
pub async fn detach_page(
    pages: tauri::State<'_, PageState>,
) -> Result<CommandResponse<()>, String> {
    *pages.session.write().await = None;
    *pages.bridge.write().await = None;
    Ok(CommandResponse::ok(()))
}

/// Insert text (with optional variable bindings) into the attached page.
/// Failures come back as a structured outcome, never as a command error.
#[tauri::command]
pub async fn insert_prompt(
    request: InsertRequest,
    pages: tauri::State<'_, PageState>,
) -> Result<CommandResponse<InsertOutcome>, String> {
    let session = pages.session.read().await.clone();
    match session {
        Some(session) => Ok(CommandResponse::ok(session.insert(&request).await)),
        None => Ok(CommandResponse::err("no page attached")),
    }
}

/// Route a raw bridge action message (from the UI surface or the page
/// context) through the dispatcher
#[tauri::command]
pub async fn dispatch_action(
    message: Value,
    state: tauri::State<'_, AppState>,
    pages: tauri::State<'_, PageState>,
) -> Result<CommandResponse<Value>, String> {
    let dispatcher = match state.dispatcher().await {
        Ok(dispatcher) => dispatcher,
        Err(e) => return Ok(CommandResponse::err(e.to_string())),
    };
    let session = pages.session.read().await.clone();

    match dispatcher.dispatch(message, session.as_deref()).await {
        DispatchOutcome::Replied(reply) => Ok(CommandResponse::ok(reply)),
        DispatchOutcome::Ignored => Ok(CommandResponse::err("unknown action")),
    }
}

/// Resolve a pending page evaluation; invoked by the injected bridge script
#[tauri::command]
pub async fn resolve_page_eval(
    id: String,
    ok: bool,
    value: Value,
    pages: tauri::State<'_, PageState>,
) -> Result<(), String> {
    if let Some(bridge) = pages.bridge.read().await.clone() {
        bridge.resolve(&id, ok, value);
    } else {
        warn!("eval reply arrived with no attached page");
    }
    Ok(())
}
