//! Page Session
//!
//! Ties one hosted page to the adapter registry and the insertion engine.
//! This is the page-context half of the bridge: commands and action
//! messages resolve here into DOM work on the current page.

use serde_json::Value;
use tracing::warn;

use crate::adapters::AdapterRegistry;
use crate::dom::HostPage;
use crate::insertion::{InsertOutcome, InsertRequest, InsertionEngine, VariableStore};
use crate::utils::error::{AppError, AppResult};

pub struct PageSession {
    page: Box<dyn HostPage>,
    registry: AdapterRegistry,
    engine: InsertionEngine,
}

impl PageSession {
    pub fn new(page: Box<dyn HostPage>, adapter_debug: bool) -> Self {
        Self {
            page,
            registry: AdapterRegistry::with_defaults(adapter_debug),
            engine: InsertionEngine::new(),
        }
    }

    pub fn url(&self) -> String {
        self.page.url()
    }

    /// Name of the adapter currently selected for this page
    pub fn adapter_name(&self) -> &'static str {
        self.registry.select(&self.page.url()).name()
    }

    /// Bindings remembered for elements on this page
    pub fn variable_store(&self) -> &VariableStore {
        self.engine.variable_store()
    }

    /// Insert text into the page's input element
    pub async fn insert(&self, request: &InsertRequest) -> InsertOutcome {
        let adapter = self.registry.select(&self.page.url());
        self.engine.insert(self.page.as_ref(), adapter, request).await
    }

    /// Re-dispatch an action message into the page context. Falls back to
    /// direct script evaluation when the page rejects messaging.
    pub async fn forward(&self, payload: &Value) -> AppResult<()> {
        match self.page.post_message(payload).await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("page messaging rejected ({e}); falling back to script evaluation");
                let js = format!(
                    "window.dispatchEvent(new CustomEvent('promptdeck:action', {{ detail: {payload} }}))"
                );
                self.page
                    .eval(&js)
                    .await
                    .map(|_| ())
                    .map_err(|e| AppError::dom(e.to_string()))
            }
        }
    }
}
