//! Insertion Engine
//!
//! Places computed text into the host page's editable surface and makes the
//! page's own logic recognize the change. Techniques are tried in escalation
//! order and each attempt is verified by reading the element's text back;
//! a technique whose mutation is not visible afterwards does not count.
//! Exhausting the chain is the only failure the caller sees, and it arrives
//! as a structured outcome, never as a panic or error propagation.

pub mod strategies;
pub mod variable_store;

pub use strategies::{default_strategies, InsertStrategy};
pub use variable_store::VariableStore;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::adapters::SiteAdapter;
use crate::dom::{EditableElement, HostPage};
use crate::models::VariableBinding;
use crate::template::substitute;

/// An insertion request from the UI surface or the page bridge
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertRequest {
    /// Template text to insert
    pub text: String,
    /// Bindings for the template's placeholders
    #[serde(default)]
    pub variables: Vec<VariableBinding>,
    /// Defer substitution to submit time instead of resolving now
    #[serde(default)]
    pub do_not_replace_variables: bool,
}

impl InsertRequest {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            variables: Vec::new(),
            do_not_replace_variables: false,
        }
    }
}

/// Structured result of an insertion attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOutcome {
    pub success: bool,
    /// Name of the technique that went through
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technique: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InsertOutcome {
    fn succeeded(technique: &str) -> Self {
        Self {
            success: true,
            technique: Some(technique.to_string()),
            error: None,
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            technique: None,
            error: Some(error.into()),
        }
    }
}

/// The escalating-fallback insertion engine
pub struct InsertionEngine {
    strategies: Vec<Box<dyn InsertStrategy>>,
    store: VariableStore,
}

impl InsertionEngine {
    /// Engine with the default technique chain
    pub fn new() -> Self {
        Self {
            strategies: default_strategies(),
            store: VariableStore::new(),
        }
    }

    /// Engine with a custom technique chain
    pub fn with_strategies(strategies: Vec<Box<dyn InsertStrategy>>) -> Self {
        Self {
            strategies,
            store: VariableStore::new(),
        }
    }

    /// The engine's variable store
    pub fn variable_store(&self) -> &VariableStore {
        &self.store
    }

    /// Insert text into the page's input element through the given adapter.
    ///
    /// Unless deferred, variable substitution runs against the template
    /// before any DOM mutation. The bindings are remembered against the
    /// resolved element either way, so a later submit interception can
    /// still resolve them.
    pub async fn insert(
        &self,
        page: &dyn HostPage,
        adapter: &dyn SiteAdapter,
        request: &InsertRequest,
    ) -> InsertOutcome {
        let Some(element) = adapter.find_input_element(page).await else {
            adapter.debug("insertion aborted: no editable element found");
            return InsertOutcome::failed("no editable element found");
        };

        let text = if !request.do_not_replace_variables && !request.variables.is_empty() {
            substitute(&request.text, &request.variables)
        } else {
            request.text.clone()
        };

        if !request.variables.is_empty() {
            match element.ensure_key().await {
                Ok(key) => self.store.remember(&key, request.variables.clone()),
                Err(e) => adapter.debug(&format!("could not key element for variable store: {e}")),
            }
            if request.do_not_replace_variables {
                adapter
                    .prepare_submit_interception(page, &request.variables)
                    .await;
            }
        }

        let policy = adapter.event_policy();
        let kind = element.kind();

        for strategy in &self.strategies {
            if !strategy.applies_to(kind) {
                continue;
            }
            adapter.debug(&format!("trying insertion technique '{}'", strategy.name()));

            if strategy.attempt(page, element.as_ref(), policy, &text).await
                && Self::verify(element.as_ref(), &text).await
            {
                adapter.debug(&format!("technique '{}' succeeded", strategy.name()));
                return InsertOutcome::succeeded(strategy.name());
            }
            debug!(technique = strategy.name(), "insertion technique failed, falling through");
        }

        adapter.debug("all insertion techniques exhausted");
        InsertOutcome::failed("no insertion technique succeeded")
    }

    /// A technique only counts when the mutation is visible afterwards.
    /// The host page may decorate the text (editors add structure), so the
    /// check is containment, not equality.
    async fn verify(element: &dyn EditableElement, expected: &str) -> bool {
        match element.text().await {
            Ok(visible) => {
                let expected = expected.trim();
                expected.is_empty() || visible.contains(expected)
            }
            Err(_) => false,
        }
    }
}

impl Default for InsertionEngine {
    fn default() -> Self {
        Self::new()
    }
}
