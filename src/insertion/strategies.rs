//! Insertion Strategies
//!
//! The ordered techniques the engine escalates through. Every strategy has
//! the same shape: given the page, the target element, the site's event
//! policy, and the text, try one mutation technique and report whether it
//! went through. A strategy never lets a DOM error escape; failure is a
//! plain `false` so the engine can move on to the next technique.

use async_trait::async_trait;
use tracing::debug;

use crate::adapters::EventPolicy;
use crate::dom::{EditableElement, ElementKind, HostPage, SyntheticEvent};

/// One DOM mutation technique
#[async_trait]
pub trait InsertStrategy: Send + Sync {
    /// Technique name, for logging and outcome reporting
    fn name(&self) -> &'static str;

    /// Whether the technique makes sense for the element shape
    fn applies_to(&self, kind: ElementKind) -> bool;

    /// Try the technique; `false` means fall through to the next one
    async fn attempt(
        &self,
        page: &dyn HostPage,
        element: &dyn EditableElement,
        policy: EventPolicy,
        text: &str,
    ) -> bool;
}

/// Dispatch the post-mutation notification events the host page's own
/// listeners expect. `change` is skipped for chat composers that auto-send
/// on it.
async fn notify_listeners(element: &dyn EditableElement, policy: EventPolicy) -> bool {
    if element.dispatch(SyntheticEvent::Input).await.is_err() {
        return false;
    }
    if policy.dispatch_change && element.dispatch(SyntheticEvent::Change).await.is_err() {
        return false;
    }
    true
}

/// 1. Direct `value` assignment for plain form fields
pub struct ValueAssign;

#[async_trait]
impl InsertStrategy for ValueAssign {
    fn name(&self) -> &'static str {
        "value-assign"
    }

    fn applies_to(&self, kind: ElementKind) -> bool {
        kind.is_form_field()
    }

    async fn attempt(
        &self,
        _page: &dyn HostPage,
        element: &dyn EditableElement,
        policy: EventPolicy,
        text: &str,
    ) -> bool {
        if element.set_value(text).await.is_err() {
            return false;
        }
        if !notify_listeners(element, policy).await {
            return false;
        }
        element.focus().await.is_ok()
    }
}

/// 2. Structural write for recognized rich-text editors: clear, then append
/// a paragraph-wrapped text node matching the editor's expected shape
pub struct EditorDomWrite;

#[async_trait]
impl InsertStrategy for EditorDomWrite {
    fn name(&self) -> &'static str {
        "editor-dom-write"
    }

    fn applies_to(&self, kind: ElementKind) -> bool {
        kind.is_rich_editor()
    }

    async fn attempt(
        &self,
        _page: &dyn HostPage,
        element: &dyn EditableElement,
        policy: EventPolicy,
        text: &str,
    ) -> bool {
        if element.clear_content().await.is_err() {
            return false;
        }
        if element.append_paragraph(text).await.is_err() {
            return false;
        }
        if !notify_listeners(element, policy).await {
            return false;
        }
        element.focus().await.is_ok()
    }
}

/// 3. Selection-based insertion through the platform editing command
pub struct SelectionInsert;

#[async_trait]
impl InsertStrategy for SelectionInsert {
    fn name(&self) -> &'static str {
        "selection-insert"
    }

    fn applies_to(&self, kind: ElementKind) -> bool {
        kind.is_rich_editor() || kind == ElementKind::ContentEditable
    }

    async fn attempt(
        &self,
        _page: &dyn HostPage,
        element: &dyn EditableElement,
        _policy: EventPolicy,
        text: &str,
    ) -> bool {
        if element.focus().await.is_err() || element.select_all().await.is_err() {
            return false;
        }
        match element.exec_insert_text(text).await {
            Ok(true) => element.dispatch(SyntheticEvent::Input).await.is_ok(),
            _ => false,
        }
    }
}

/// 4. Synthesized `paste` event carrying the text as plain-text clipboard data
pub struct PasteSimulation;

#[async_trait]
impl InsertStrategy for PasteSimulation {
    fn name(&self) -> &'static str {
        "paste-simulation"
    }

    fn applies_to(&self, kind: ElementKind) -> bool {
        kind.is_editable()
    }

    async fn attempt(
        &self,
        _page: &dyn HostPage,
        element: &dyn EditableElement,
        _policy: EventPolicy,
        text: &str,
    ) -> bool {
        if element.focus().await.is_err() {
            return false;
        }
        matches!(element.paste_plain_text(text).await, Ok(true))
    }
}

/// 5. Real clipboard round-trip: save the clipboard, write the text, run the
/// platform paste command, restore the clipboard. Restoration is best
/// effort; a concurrent clipboard writer can still race us.
pub struct ClipboardRoundtrip;

#[async_trait]
impl InsertStrategy for ClipboardRoundtrip {
    fn name(&self) -> &'static str {
        "clipboard-roundtrip"
    }

    fn applies_to(&self, kind: ElementKind) -> bool {
        kind.is_editable()
    }

    async fn attempt(
        &self,
        page: &dyn HostPage,
        element: &dyn EditableElement,
        _policy: EventPolicy,
        text: &str,
    ) -> bool {
        let saved = match page.read_clipboard().await {
            Ok(contents) => Some(contents),
            Err(e) => {
                debug!("could not capture clipboard before round-trip: {e}");
                None
            }
        };

        if page.write_clipboard(text).await.is_err() {
            return false;
        }

        let pasted = element.focus().await.is_ok()
            && matches!(element.exec_paste().await, Ok(true));

        if let Some(previous) = saved {
            if let Err(e) = page.write_clipboard(&previous).await {
                debug!("could not restore clipboard after round-trip: {e}");
            }
        }

        pasted
    }
}

/// 6. Last resort for known rich editors: write the content, then replay
/// synthetic keystrokes, because some editors only commit state when they
/// observe key events
pub struct KeystrokeReplay;

#[async_trait]
impl InsertStrategy for KeystrokeReplay {
    fn name(&self) -> &'static str {
        "keystroke-replay"
    }

    fn applies_to(&self, kind: ElementKind) -> bool {
        kind.is_rich_editor()
    }

    async fn attempt(
        &self,
        _page: &dyn HostPage,
        element: &dyn EditableElement,
        _policy: EventPolicy,
        text: &str,
    ) -> bool {
        if element.focus().await.is_err() {
            return false;
        }
        if element.clear_content().await.is_err()
            || element.append_paragraph(text).await.is_err()
        {
            return false;
        }
        for event in [
            SyntheticEvent::KeyDown {
                key: " ".to_string(),
            },
            SyntheticEvent::Input,
            SyntheticEvent::KeyUp {
                key: " ".to_string(),
            },
        ] {
            if element.dispatch(event).await.is_err() {
                return false;
            }
        }
        true
    }
}

/// The default chain, in escalation order
pub fn default_strategies() -> Vec<Box<dyn InsertStrategy>> {
    vec![
        Box::new(ValueAssign),
        Box::new(EditorDomWrite),
        Box::new(SelectionInsert),
        Box::new(PasteSimulation),
        Box::new(ClipboardRoundtrip),
        Box::new(KeystrokeReplay),
    ]
}
