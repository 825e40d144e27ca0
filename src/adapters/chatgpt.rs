//! ChatGPT Adapter
//!
//! Targets the chat.openai.com / chatgpt.com composer. The composer has been
//! a plain textarea and a ProseMirror contenteditable in different UI
//! revisions, so the selector chain covers both.

use async_trait::async_trait;

use crate::dom::{EditableElement, HostPage};

use super::{debug_log, first_selector_hit, EventPolicy, SiteAdapter};

/// Selector chain, most specific first
const SELECTORS: &[&str] = &[
    "#prompt-textarea",
    r#"textarea[placeholder*="Message"]"#,
    r#"textarea[placeholder*="Send a message"]"#,
    "textarea.w-full",
    "textarea",
];

pub struct ChatGptAdapter {
    debug: bool,
}

impl ChatGptAdapter {
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }
}

#[async_trait]
impl SiteAdapter for ChatGptAdapter {
    fn name(&self) -> &'static str {
        "ChatGPT"
    }

    fn matches(&self, url: &str) -> bool {
        url.contains("chat.openai.com") || url.contains("chatgpt.com")
    }

    fn event_policy(&self) -> EventPolicy {
        // The composer treats `change` as a send trigger in some revisions
        EventPolicy::chat_composer()
    }

    async fn find_input_element(&self, page: &dyn HostPage) -> Option<Box<dyn EditableElement>> {
        self.debug("searching for ChatGPT input element");
        let found = first_selector_hit(page, self, SELECTORS).await;
        if found.is_none() {
            self.debug("no suitable input element found");
        }
        found
    }

    async fn prepare_submit_interception(
        &self,
        page: &dyn HostPage,
        bindings: &[crate::models::VariableBinding],
    ) {
        let payload = serde_json::json!({
            "action": "armSubmitInterception",
            "variables": bindings,
        });
        match page.post_message(&payload).await {
            Ok(()) => self.debug("submit interception armed"),
            Err(e) => self.debug(&format!("failed to arm submit interception: {e}")),
        }
    }

    fn debug(&self, message: &str) {
        debug_log(self.debug, self.name(), message);
    }
}
