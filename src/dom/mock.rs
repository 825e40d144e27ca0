//! In-Memory DOM Double
//!
//! A scriptable stand-in for a hosted page, used by adapter and insertion
//! tests. Each mock element exposes the same mutation channels as a real
//! element, with a configurable behavior per channel so tests can model
//! host pages that ignore, reject, or honor a given technique.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{DomError, DomResult, EditableElement, ElementKind, HostPage, SyntheticEvent};

static KEY_COUNTER: AtomicU64 = AtomicU64::new(1);

/// How a mock element responds to one mutation channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpBehavior {
    /// Perform the mutation and report success
    Apply,
    /// Report "not handled" without mutating (the host page swallowed it)
    Ignore,
    /// Raise a DOM error
    Fail,
}

/// A single editable element on a [`MockPage`]
pub struct MockElement {
    kind: ElementKind,
    selectors: Vec<String>,
    key: Mutex<Option<String>>,
    content: Mutex<String>,
    focused: AtomicBool,
    /// Dispatched synthetic events, in order ("input", "change", "keydown: ")
    pub events: Mutex<Vec<String>>,
    clipboard: Mutex<Option<Arc<Mutex<String>>>>,
    on_set_value: OpBehavior,
    on_editor_write: OpBehavior,
    on_insert_command: OpBehavior,
    on_paste_event: OpBehavior,
    on_exec_paste: OpBehavior,
}

impl MockElement {
    /// Create an element with the default channel behaviors for its kind
    pub fn new(kind: ElementKind) -> Self {
        let (value, editor, insert, paste, exec_paste) = match kind {
            ElementKind::TextArea | ElementKind::TextInput => (
                OpBehavior::Apply,
                OpBehavior::Ignore,
                OpBehavior::Ignore,
                OpBehavior::Ignore,
                OpBehavior::Ignore,
            ),
            ElementKind::RichTextEditor(_) => (
                OpBehavior::Ignore,
                OpBehavior::Apply,
                OpBehavior::Apply,
                OpBehavior::Apply,
                OpBehavior::Apply,
            ),
            ElementKind::ContentEditable => (
                OpBehavior::Ignore,
                OpBehavior::Ignore,
                OpBehavior::Apply,
                OpBehavior::Apply,
                OpBehavior::Apply,
            ),
            ElementKind::Other => (
                OpBehavior::Ignore,
                OpBehavior::Ignore,
                OpBehavior::Ignore,
                OpBehavior::Ignore,
                OpBehavior::Ignore,
            ),
        };
        Self {
            kind,
            selectors: Vec::new(),
            key: Mutex::new(None),
            content: Mutex::new(String::new()),
            focused: AtomicBool::new(false),
            events: Mutex::new(Vec::new()),
            clipboard: Mutex::new(None),
            on_set_value: value,
            on_editor_write: editor,
            on_insert_command: insert,
            on_paste_event: paste,
            on_exec_paste: exec_paste,
        }
    }

    /// Add a CSS selector this element answers to
    pub fn selector(mut self, selector: impl Into<String>) -> Self {
        self.selectors.push(selector.into());
        self
    }

    /// Mark the element as currently focused
    pub fn focused(self) -> Self {
        self.focused.store(true, Ordering::SeqCst);
        self
    }

    /// Pre-fill the element's content
    pub fn with_content(self, text: impl Into<String>) -> Self {
        *self.content.lock().unwrap() = text.into();
        self
    }

    pub fn on_set_value(mut self, behavior: OpBehavior) -> Self {
        self.on_set_value = behavior;
        self
    }

    pub fn on_editor_write(mut self, behavior: OpBehavior) -> Self {
        self.on_editor_write = behavior;
        self
    }

    pub fn on_insert_command(mut self, behavior: OpBehavior) -> Self {
        self.on_insert_command = behavior;
        self
    }

    pub fn on_paste_event(mut self, behavior: OpBehavior) -> Self {
        self.on_paste_event = behavior;
        self
    }

    pub fn on_exec_paste(mut self, behavior: OpBehavior) -> Self {
        self.on_exec_paste = behavior;
        self
    }

    /// Finish building and share the element
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// The element's current content
    pub fn content(&self) -> String {
        self.content.lock().unwrap().clone()
    }

    /// Whether the element currently has focus
    pub fn is_focused(&self) -> bool {
        self.focused.load(Ordering::SeqCst)
    }

    /// Names of the synthetic events dispatched so far
    pub fn dispatched_events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn attach_clipboard(&self, clipboard: Arc<Mutex<String>>) {
        *self.clipboard.lock().unwrap() = Some(clipboard);
    }
}

#[async_trait]
impl EditableElement for Arc<MockElement> {
    fn kind(&self) -> ElementKind {
        self.kind
    }

    async fn ensure_key(&self) -> DomResult<String> {
        let mut key = self.key.lock().unwrap();
        if key.is_none() {
            *key = Some(format!("pd-{}", KEY_COUNTER.fetch_add(1, Ordering::SeqCst)));
        }
        Ok(key.clone().unwrap())
    }

    async fn text(&self) -> DomResult<String> {
        Ok(self.content.lock().unwrap().clone())
    }

    async fn focus(&self) -> DomResult<()> {
        self.focused.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn set_value(&self, text: &str) -> DomResult<()> {
        match self.on_set_value {
            OpBehavior::Apply => {
                *self.content.lock().unwrap() = text.to_string();
                Ok(())
            }
            OpBehavior::Ignore => Ok(()),
            OpBehavior::Fail => Err(DomError::Script("value assignment rejected".to_string())),
        }
    }

    async fn clear_content(&self) -> DomResult<()> {
        match self.on_editor_write {
            OpBehavior::Apply => {
                self.content.lock().unwrap().clear();
                Ok(())
            }
            OpBehavior::Ignore => Ok(()),
            OpBehavior::Fail => Err(DomError::Script("clear rejected".to_string())),
        }
    }

    async fn append_paragraph(&self, text: &str) -> DomResult<()> {
        match self.on_editor_write {
            OpBehavior::Apply => {
                self.content.lock().unwrap().push_str(text);
                Ok(())
            }
            OpBehavior::Ignore => Ok(()),
            OpBehavior::Fail => Err(DomError::Script("append rejected".to_string())),
        }
    }

    async fn select_all(&self) -> DomResult<()> {
        self.events.lock().unwrap().push("select_all".to_string());
        Ok(())
    }

    async fn exec_insert_text(&self, text: &str) -> DomResult<bool> {
        match self.on_insert_command {
            OpBehavior::Apply => {
                *self.content.lock().unwrap() = text.to_string();
                Ok(true)
            }
            OpBehavior::Ignore => Ok(false),
            OpBehavior::Fail => Err(DomError::CommandRejected),
        }
    }

    async fn exec_paste(&self) -> DomResult<bool> {
        match self.on_exec_paste {
            OpBehavior::Apply => {
                let clipboard = self.clipboard.lock().unwrap().clone();
                match clipboard {
                    Some(shared) => {
                        *self.content.lock().unwrap() = shared.lock().unwrap().clone();
                        Ok(true)
                    }
                    // Element was never attached to a page
                    None => Ok(false),
                }
            }
            OpBehavior::Ignore => Ok(false),
            OpBehavior::Fail => Err(DomError::CommandRejected),
        }
    }

    async fn dispatch(&self, event: SyntheticEvent) -> DomResult<()> {
        let label = match &event {
            SyntheticEvent::KeyDown { key } => format!("keydown:{key}"),
            SyntheticEvent::KeyUp { key } => format!("keyup:{key}"),
            other => other.name().to_string(),
        };
        self.events.lock().unwrap().push(label);
        Ok(())
    }

    async fn paste_plain_text(&self, text: &str) -> DomResult<bool> {
        match self.on_paste_event {
            OpBehavior::Apply => {
                *self.content.lock().unwrap() = text.to_string();
                self.events.lock().unwrap().push("paste".to_string());
                Ok(true)
            }
            OpBehavior::Ignore => Ok(false),
            OpBehavior::Fail => Err(DomError::Script("paste event rejected".to_string())),
        }
    }
}

/// A scriptable page double
pub struct MockPage {
    url: String,
    elements: Vec<Arc<MockElement>>,
    clipboard: Arc<Mutex<String>>,
    clipboard_allowed: bool,
    messaging_rejected: bool,
    /// Messages delivered through `post_message`
    pub posted: Mutex<Vec<serde_json::Value>>,
    /// Scripts passed to `eval`
    pub evaluated: Mutex<Vec<String>>,
}

impl MockPage {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            elements: Vec::new(),
            clipboard: Arc::new(Mutex::new(String::new())),
            clipboard_allowed: true,
            messaging_rejected: false,
            posted: Mutex::new(Vec::new()),
            evaluated: Mutex::new(Vec::new()),
        }
    }

    /// Attach an element to the page
    pub fn with_element(mut self, element: Arc<MockElement>) -> Self {
        element.attach_clipboard(self.clipboard.clone());
        self.elements.push(element);
        self
    }

    /// Pre-fill the page clipboard
    pub fn with_clipboard(self, text: impl Into<String>) -> Self {
        *self.clipboard.lock().unwrap() = text.into();
        self
    }

    /// Deny all clipboard access
    pub fn deny_clipboard(mut self) -> Self {
        self.clipboard_allowed = false;
        self
    }

    /// Reject direct page messaging (forces the eval fallback)
    pub fn reject_messaging(mut self) -> Self {
        self.messaging_rejected = true;
        self
    }

    /// The page clipboard contents
    pub fn clipboard_text(&self) -> String {
        self.clipboard.lock().unwrap().clone()
    }
}

#[async_trait]
impl HostPage for MockPage {
    fn url(&self) -> String {
        self.url.clone()
    }

    async fn query_editable(&self, selector: &str) -> DomResult<Option<Box<dyn EditableElement>>> {
        for element in &self.elements {
            if element.selectors.iter().any(|s| s == selector) {
                return Ok(Some(Box::new(element.clone()) as Box<dyn EditableElement>));
            }
        }
        Ok(None)
    }

    async fn active_editable(&self) -> DomResult<Option<Box<dyn EditableElement>>> {
        for element in &self.elements {
            if element.is_focused() && element.kind.is_editable() {
                return Ok(Some(Box::new(element.clone()) as Box<dyn EditableElement>));
            }
        }
        Ok(None)
    }

    async fn read_clipboard(&self) -> DomResult<String> {
        if !self.clipboard_allowed {
            return Err(DomError::Clipboard("read denied".to_string()));
        }
        Ok(self.clipboard.lock().unwrap().clone())
    }

    async fn write_clipboard(&self, text: &str) -> DomResult<()> {
        if !self.clipboard_allowed {
            return Err(DomError::Clipboard("write denied".to_string()));
        }
        *self.clipboard.lock().unwrap() = text.to_string();
        Ok(())
    }

    async fn post_message(&self, payload: &serde_json::Value) -> DomResult<()> {
        if self.messaging_rejected {
            return Err(DomError::MessagingRejected(
                "page refused the message".to_string(),
            ));
        }
        self.posted.lock().unwrap().push(payload.clone());
        Ok(())
    }

    async fn eval(&self, js: &str) -> DomResult<serde_json::Value> {
        self.evaluated.lock().unwrap().push(js.to_string());
        Ok(serde_json::Value::Null)
    }
}
