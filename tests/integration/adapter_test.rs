//! Adapter Registry Integration Tests
//!
//! The fallback guarantee and the per-site selector chains, driven through
//! the mock DOM.

use promptdeck_desktop::adapters::{AdapterRegistry, SiteAdapter};
use promptdeck_desktop::dom::mock::{MockElement, MockPage};
use promptdeck_desktop::dom::{EditableElement, EditorKind, ElementKind};

#[test]
fn test_select_never_returns_no_adapter() {
    let registry = AdapterRegistry::default();
    let urls = [
        "https://chat.openai.com/c/1",
        "https://chatgpt.com",
        "https://claude.ai/new",
        "https://gemini.google.com",
        "http://localhost:3000",
        "about:blank",
        "",
        "complete garbage \u{1F980}",
    ];
    for url in urls {
        // select() always yields an adapter; name() proves it is usable
        assert!(!registry.select(url).name().is_empty(), "url: {url:?}");
    }
}

#[test]
fn test_site_urls_route_to_their_adapters() {
    let registry = AdapterRegistry::default();
    assert_eq!(registry.select("https://chat.openai.com").name(), "ChatGPT");
    assert_eq!(registry.select("https://claude.ai").name(), "Claude");
    assert_eq!(registry.select("https://bing.com/chat").name(), "Generic");
}

#[tokio::test]
async fn test_chatgpt_chain_descends_in_specificity() {
    let registry = AdapterRegistry::default();
    let adapter = registry.select("https://chat.openai.com");

    // Only the broadest selector matches on this page revision
    let element = MockElement::new(ElementKind::TextArea)
        .selector("textarea")
        .shared();
    let page = MockPage::new("https://chat.openai.com").with_element(element);
    assert!(adapter.find_input_element(&page).await.is_some());

    // Nothing editable at all
    let empty = MockPage::new("https://chat.openai.com");
    assert!(adapter.find_input_element(&empty).await.is_none());
}

#[tokio::test]
async fn test_claude_chain_finds_prosemirror_before_generic_contenteditable() {
    let registry = AdapterRegistry::default();
    let adapter = registry.select("https://claude.ai/new");

    let editor = MockElement::new(ElementKind::RichTextEditor(EditorKind::ProseMirror))
        .selector(".ProseMirror.break-words")
        .shared();
    let plain = MockElement::new(ElementKind::ContentEditable)
        .selector(r#"[contenteditable="true"]"#)
        .shared();
    let page = MockPage::new("https://claude.ai/new")
        .with_element(plain)
        .with_element(editor.clone());

    let found = adapter.find_input_element(&page).await.unwrap();
    assert!(found.kind().is_rich_editor());
}

#[tokio::test]
async fn test_generic_adapter_prefers_focused_element() {
    let registry = AdapterRegistry::default();
    let adapter = registry.select("https://notes.example");

    let focused = MockElement::new(ElementKind::TextInput)
        .selector(r#"input[type="text"]"#)
        .focused()
        .shared();
    let textarea = MockElement::new(ElementKind::TextArea)
        .selector("textarea")
        .shared();
    let page = MockPage::new("https://notes.example")
        .with_element(textarea)
        .with_element(focused.clone());

    let found = adapter.find_input_element(&page).await.unwrap();
    assert_eq!(
        found.ensure_key().await.unwrap(),
        focused.ensure_key().await.unwrap()
    );
}
