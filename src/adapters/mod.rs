//! Site Adapters
//!
//! One adapter per supported chat site, behind a common capability interface:
//! URL matching, input-element discovery, event policy, and submit
//! interception. The registry keeps adapters in match order with the generic
//! always-match adapter last, so selection never comes back empty.

mod chatgpt;
mod claude;
mod generic;

pub use chatgpt::ChatGptAdapter;
pub use claude::ClaudeAdapter;
pub use generic::GenericAdapter;

use async_trait::async_trait;
use tracing::debug;

use crate::dom::{EditableElement, HostPage};
use crate::models::VariableBinding;

/// Which synthetic events may follow an insertion on this site.
///
/// Chat composers that auto-send on `change` get it suppressed; everything
/// else gets the full set so framework bindings re-render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventPolicy {
    pub dispatch_change: bool,
}

impl EventPolicy {
    /// Policy for chat composers: no `change` event
    pub fn chat_composer() -> Self {
        Self {
            dispatch_change: false,
        }
    }

    /// Policy for ordinary inputs
    pub fn standard() -> Self {
        Self {
            dispatch_change: true,
        }
    }
}

/// Capability interface implemented by every site adapter
#[async_trait]
pub trait SiteAdapter: Send + Sync {
    /// Human-readable site name
    fn name(&self) -> &'static str;

    /// Whether this adapter handles the given URL
    fn matches(&self, url: &str) -> bool;

    /// Post-insertion event policy for this site
    fn event_policy(&self) -> EventPolicy;

    /// Locate the site's text-input element.
    ///
    /// Implementations try a descending-specificity selector chain and
    /// return the first hit; markup on these sites shifts too often for a
    /// single fixed selector.
    async fn find_input_element(&self, page: &dyn HostPage) -> Option<Box<dyn EditableElement>>;

    /// Arm submit-time variable resolution on sites that need it.
    ///
    /// Called when substitution is deferred to send time. The default does
    /// nothing.
    async fn prepare_submit_interception(
        &self,
        page: &dyn HostPage,
        bindings: &[VariableBinding],
    ) {
        let _ = (page, bindings);
        self.debug("submit interception not required");
    }

    /// Adapter-scoped debug logging hook
    fn debug(&self, message: &str);
}

/// Shared logging hook implementation
pub(crate) fn debug_log(enabled: bool, adapter: &str, message: &str) {
    if enabled {
        debug!(adapter, "{message}");
    }
}

/// Walk a selector chain and return the first editable hit
pub(crate) async fn first_selector_hit(
    page: &dyn HostPage,
    adapter: &dyn SiteAdapter,
    selectors: &[&str],
) -> Option<Box<dyn EditableElement>> {
    for selector in selectors {
        match page.query_editable(selector).await {
            Ok(Some(element)) => {
                adapter.debug(&format!("found input element via '{selector}'"));
                return Some(element);
            }
            Ok(None) => {}
            Err(e) => adapter.debug(&format!("query '{selector}' failed: {e}")),
        }
    }
    None
}

/// Ordered adapter list with a guaranteed always-match fallback
pub struct AdapterRegistry {
    adapters: Vec<Box<dyn SiteAdapter>>,
}

impl AdapterRegistry {
    /// Registry with the built-in adapters: ChatGPT, Claude, then the
    /// generic fallback.
    pub fn with_defaults(debug: bool) -> Self {
        Self {
            adapters: vec![
                Box::new(ChatGptAdapter::new(debug)),
                Box::new(ClaudeAdapter::new(debug)),
                Box::new(GenericAdapter::new(debug)),
            ],
        }
    }

    /// Register an adapter just before the generic fallback
    pub fn register(&mut self, adapter: Box<dyn SiteAdapter>) {
        let position = self.adapters.len().saturating_sub(1);
        self.adapters.insert(position, adapter);
    }

    /// Select the first adapter matching the URL.
    ///
    /// The generic adapter matches everything, so this always succeeds.
    pub fn select(&self, url: &str) -> &dyn SiteAdapter {
        self.adapters
            .iter()
            .find(|a| a.matches(url))
            .unwrap_or_else(|| {
                self.adapters
                    .last()
                    .expect("registry always contains the generic fallback")
            })
            .as_ref()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::with_defaults(false)
    }
}
