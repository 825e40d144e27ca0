//! Insertion Engine Integration Tests
//!
//! Full fallback-chain behavior through a page session: escalation across
//! techniques, read-back verification, event policy, and variable handling.

use promptdeck_desktop::dom::mock::{MockElement, MockPage, OpBehavior};
use promptdeck_desktop::dom::{EditableElement, EditorKind, ElementKind};
use promptdeck_desktop::{InsertRequest, PageSession, VariableBinding};

fn prosemirror() -> ElementKind {
    ElementKind::RichTextEditor(EditorKind::ProseMirror)
}

#[tokio::test]
async fn test_textarea_insert_via_value_assignment() {
    let element = MockElement::new(ElementKind::TextArea)
        .selector("#prompt-textarea")
        .shared();
    let page = MockPage::new("https://chat.openai.com").with_element(element.clone());
    let session = PageSession::new(Box::new(page), false);

    let outcome = session.insert(&InsertRequest::plain("write a haiku")).await;

    assert!(outcome.success);
    assert_eq!(outcome.technique.as_deref(), Some("value-assign"));
    assert_eq!(element.content(), "write a haiku");
    // Chat composer policy: input dispatched, change suppressed
    let events = element.dispatched_events();
    assert!(events.contains(&"input".to_string()));
    assert!(!events.contains(&"change".to_string()));
}

#[tokio::test]
async fn test_rich_editor_insert_via_editor_write() {
    let editor = MockElement::new(prosemirror())
        .selector(".ProseMirror.break-words")
        .with_content("draft")
        .shared();
    let page = MockPage::new("https://claude.ai/new").with_element(editor.clone());
    let session = PageSession::new(Box::new(page), false);

    let outcome = session.insert(&InsertRequest::plain("final text")).await;

    assert!(outcome.success);
    assert_eq!(outcome.technique.as_deref(), Some("editor-dom-write"));
    assert_eq!(editor.content(), "final text");
}

#[tokio::test]
async fn test_chain_escalates_to_selection_insert() {
    let editor = MockElement::new(prosemirror())
        .selector(".ProseMirror.break-words")
        .on_editor_write(OpBehavior::Ignore)
        .shared();
    let page = MockPage::new("https://claude.ai/new").with_element(editor.clone());
    let session = PageSession::new(Box::new(page), false);

    let outcome = session.insert(&InsertRequest::plain("text")).await;

    assert!(outcome.success);
    assert_eq!(outcome.technique.as_deref(), Some("selection-insert"));
}

#[tokio::test]
async fn test_chain_escalates_to_clipboard_roundtrip() {
    let editor = MockElement::new(prosemirror())
        .selector(".ProseMirror.break-words")
        .on_editor_write(OpBehavior::Ignore)
        .on_insert_command(OpBehavior::Fail)
        .on_paste_event(OpBehavior::Ignore)
        .shared();
    let page = MockPage::new("https://claude.ai/new")
        .with_element(editor.clone())
        .with_clipboard("user's clipboard");
    let session = PageSession::new(Box::new(page), false);

    let outcome = session.insert(&InsertRequest::plain("via clipboard")).await;

    assert!(outcome.success);
    assert_eq!(outcome.technique.as_deref(), Some("clipboard-roundtrip"));
    assert_eq!(editor.content(), "via clipboard");
}

#[tokio::test]
async fn test_exhausted_chain_reports_structured_failure() {
    let stubborn = MockElement::new(prosemirror())
        .selector(".ProseMirror.break-words")
        .on_editor_write(OpBehavior::Ignore)
        .on_insert_command(OpBehavior::Ignore)
        .on_paste_event(OpBehavior::Ignore)
        .on_exec_paste(OpBehavior::Ignore)
        .shared();
    let page = MockPage::new("https://claude.ai/new").with_element(stubborn);
    let session = PageSession::new(Box::new(page), false);

    let outcome = session.insert(&InsertRequest::plain("text")).await;

    assert!(!outcome.success);
    assert!(outcome.technique.is_none());
    assert!(outcome.error.is_some());
}

#[tokio::test]
async fn test_variables_resolved_before_insertion() {
    let element = MockElement::new(ElementKind::TextArea)
        .selector("textarea")
        .shared();
    let page = MockPage::new("https://example.com").with_element(element.clone());
    let session = PageSession::new(Box::new(page), false);

    let request = InsertRequest {
        text: "Review {{lang}} code for {{lang}} pitfalls".to_string(),
        variables: vec![VariableBinding::new("lang", "Rust")],
        do_not_replace_variables: false,
    };
    let outcome = session.insert(&request).await;

    assert!(outcome.success);
    assert_eq!(element.content(), "Review Rust code for Rust pitfalls");
}

#[tokio::test]
async fn test_deferred_variables_stay_resolvable_via_store() {
    let element = MockElement::new(ElementKind::TextArea)
        .selector("#prompt-textarea")
        .shared();
    let page = MockPage::new("https://chat.openai.com").with_element(element.clone());
    let session = PageSession::new(Box::new(page), false);

    let request = InsertRequest {
        text: "Hello {{name}}".to_string(),
        variables: vec![VariableBinding::new("name", "Ann")],
        do_not_replace_variables: true,
    };
    session.insert(&request).await;

    assert_eq!(element.content(), "Hello {{name}}");
    let key = element.ensure_key().await.unwrap();
    let remembered = session.variable_store().recall(&key).unwrap();
    assert_eq!(remembered, vec![VariableBinding::new("name", "Ann")]);
}
