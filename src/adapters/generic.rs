//! Generic Adapter
//!
//! Always-match fallback for sites without a specialized adapter. Prefers
//! whatever editable element currently has focus, then widens to the usual
//! suspects.

use async_trait::async_trait;

use crate::dom::{EditableElement, HostPage};

use super::{debug_log, first_selector_hit, EventPolicy, SiteAdapter};

const SELECTORS: &[&str] = &["textarea", r#"input[type="text"]"#, r#"[contenteditable="true"]"#];

pub struct GenericAdapter {
    debug: bool,
}

impl GenericAdapter {
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }
}

#[async_trait]
impl SiteAdapter for GenericAdapter {
    fn name(&self) -> &'static str {
        "Generic"
    }

    fn matches(&self, _url: &str) -> bool {
        true
    }

    fn event_policy(&self) -> EventPolicy {
        EventPolicy::standard()
    }

    async fn find_input_element(&self, page: &dyn HostPage) -> Option<Box<dyn EditableElement>> {
        self.debug("searching for any suitable input element");

        match page.active_editable().await {
            Ok(Some(element)) => {
                self.debug("using focused element");
                return Some(element);
            }
            Ok(None) => {}
            Err(e) => self.debug(&format!("active element lookup failed: {e}")),
        }

        let found = first_selector_hit(page, self, SELECTORS).await;
        if found.is_none() {
            self.debug("no suitable input element found");
        }
        found
    }

    fn debug(&self, message: &str) {
        debug_log(self.debug, self.name(), message);
    }
}
