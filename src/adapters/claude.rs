//! Claude Adapter
//!
//! Targets the claude.ai composer, a ProseMirror contenteditable. The chain
//! starts at the ProseMirror-specific classes and widens to any
//! contenteditable region.

use async_trait::async_trait;

use crate::dom::{EditableElement, HostPage};

use super::{debug_log, first_selector_hit, EventPolicy, SiteAdapter};

/// Selector chain, most specific first
const SELECTORS: &[&str] = &[
    ".ProseMirror.break-words",
    r#"[aria-label*="prompt"] .ProseMirror"#,
    r#".ProseMirror[contenteditable="true"]"#,
    r#"[contenteditable="true"][data-placeholder]"#,
    r#"[contenteditable="true"]"#,
];

pub struct ClaudeAdapter {
    debug: bool,
}

impl ClaudeAdapter {
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }
}

#[async_trait]
impl SiteAdapter for ClaudeAdapter {
    fn name(&self) -> &'static str {
        "Claude"
    }

    fn matches(&self, url: &str) -> bool {
        url.contains("claude.ai")
    }

    fn event_policy(&self) -> EventPolicy {
        EventPolicy::chat_composer()
    }

    async fn find_input_element(&self, page: &dyn HostPage) -> Option<Box<dyn EditableElement>> {
        self.debug("searching for Claude input element");
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::mock::{MockElement, MockPage};
    use crate::dom::{EditorKind, ElementKind};

    #[test]
    fn test_matches_urls() {
        let adapter = ClaudeAdapter::new(false);
        assert!(adapter.matches("https://claude.ai/new"));
        assert!(!adapter.matches("https://chat.openai.com"));
    }

    #[tokio::test]
    async fn test_finds_prosemirror_editor() {
        let editor = MockElement::new(ElementKind::RichTextEditor(EditorKind::ProseMirror))
            .selector(".ProseMirror.break-words")
            .shared();
        let page = MockPage::new("https://claude.ai").with_element(editor);

        let adapter = ClaudeAdapter::new(false);
        let found = adapter.find_input_element(&page).await.unwrap();
        assert!(found.kind().is_rich_editor());
    }

    #[tokio::test]
    async fn test_widens_to_any_contenteditable() {
        let editable = MockElement::new(ElementKind::ContentEditable)
            .selector(r#"[contenteditable="true"]"#)
            .shared();
        let page = MockPage::new("https://claude.ai").with_element(editable);

        let adapter = ClaudeAdapter::new(false);
        assert!(adapter.find_input_element(&page).await.is_some());
    }
}
