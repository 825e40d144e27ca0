//! Host-Page DOM Abstraction
//!
//! The hosted chat page is a foreign, uncontrolled surface. Everything the
//! rest of the crate knows about it goes through the traits in this module:
//! a page that can be queried for editable elements, and element handles that
//! expose the handful of mutation primitives the insertion engine escalates
//! through. Failures are values (`DomError`), never panics, so no DOM or
//! clipboard exception can cross into caller control flow.

pub mod mock;
pub mod webview;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from host-page interaction
#[derive(Debug, Error)]
pub enum DomError {
    /// Script evaluation in the page failed
    #[error("script evaluation failed: {0}")]
    Script(String),

    /// The element handle no longer resolves to a live node
    #[error("element is no longer attached")]
    ElementGone,

    /// Clipboard access was denied or failed
    #[error("clipboard access failed: {0}")]
    Clipboard(String),

    /// The platform editing command was rejected
    #[error("editing command rejected")]
    CommandRejected,

    /// Direct page messaging was rejected
    #[error("page messaging rejected: {0}")]
    MessagingRejected(String),

    /// The page did not answer in time
    #[error("timed out waiting for the page")]
    Timeout,
}

/// Result type alias for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// Known rich-text editor implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKind {
    /// ProseMirror, the editor behind both the ChatGPT and Claude composers
    ProseMirror,
}

/// Shape of an editable element, driving which insertion techniques apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// `<textarea>`
    TextArea,
    /// `<input type="text">`
    TextInput,
    /// A contenteditable region recognized as a specific editor
    RichTextEditor(EditorKind),
    /// An unrecognized contenteditable region
    ContentEditable,
    /// Anything else; no insertion technique applies
    Other,
}

impl ElementKind {
    /// Whether the element is a plain form field with a `value` property
    pub fn is_form_field(&self) -> bool {
        matches!(self, ElementKind::TextArea | ElementKind::TextInput)
    }

    /// Whether the element is a recognized rich-text editor
    pub fn is_rich_editor(&self) -> bool {
        matches!(self, ElementKind::RichTextEditor(_))
    }

    /// Whether the element accepts text at all
    pub fn is_editable(&self) -> bool {
        !matches!(self, ElementKind::Other)
    }

    /// Parse the wire name used by the page bridge script
    pub fn from_wire(name: &str) -> Self {
        match name {
            "textarea" => ElementKind::TextArea,
            "text_input" => ElementKind::TextInput,
            "prosemirror" => ElementKind::RichTextEditor(EditorKind::ProseMirror),
            "contenteditable" => ElementKind::ContentEditable,
            _ => ElementKind::Other,
        }
    }
}

/// Synthetic events dispatched after a mutation so the host page's own
/// listeners observe the change. All events bubble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntheticEvent {
    Input,
    Change,
    KeyDown { key: String },
    KeyUp { key: String },
}

impl SyntheticEvent {
    /// The DOM event name
    pub fn name(&self) -> &'static str {
        match self {
            SyntheticEvent::Input => "input",
            SyntheticEvent::Change => "change",
            SyntheticEvent::KeyDown { .. } => "keydown",
            SyntheticEvent::KeyUp { .. } => "keyup",
        }
    }
}

/// Handle to one editable element on the host page.
///
/// Handles stay valid across host-page re-renders as long as the node keeps
/// its generated `data-pd-key` attribute; a handle whose node disappeared
/// reports `DomError::ElementGone`.
#[async_trait]
pub trait EditableElement: Send + Sync {
    /// The element's shape
    fn kind(&self) -> ElementKind;

    /// Get the element's stable key, assigning one if missing
    async fn ensure_key(&self) -> DomResult<String>;

    /// The element's currently visible text
    async fn text(&self) -> DomResult<String>;

    async fn focus(&self) -> DomResult<()>;

    /// Set the `value` property (form fields)
    async fn set_value(&self, text: &str) -> DomResult<()>;

    /// Remove all children (rich editors)
    async fn clear_content(&self) -> DomResult<()>;

    /// Append a paragraph-wrapped text node (rich editors)
    async fn append_paragraph(&self, text: &str) -> DomResult<()>;

    /// Collapse the selection over the element's contents
    async fn select_all(&self) -> DomResult<()>;

    /// Run the platform insert-text editing command; `false` means the page
    /// rejected the command
    async fn exec_insert_text(&self, text: &str) -> DomResult<bool>;

    /// Run the platform paste editing command against the system clipboard
    async fn exec_paste(&self) -> DomResult<bool>;

    /// Dispatch a bubbling synthetic event on the element
    async fn dispatch(&self, event: SyntheticEvent) -> DomResult<()>;

    /// Dispatch a synthesized `paste` event carrying `text` as plain-text
    /// clipboard data; `false` means a page listener cancelled it
    async fn paste_plain_text(&self, text: &str) -> DomResult<bool>;
}

/// One hosted page: element discovery, clipboard, and page messaging.
#[async_trait]
pub trait HostPage: Send + Sync {
    /// The page's current URL
    fn url(&self) -> String;

    /// First element matching a CSS selector, as an editable handle
    async fn query_editable(&self, selector: &str) -> DomResult<Option<Box<dyn EditableElement>>>;

    /// The currently focused element, if it is editable
    async fn active_editable(&self) -> DomResult<Option<Box<dyn EditableElement>>>;

    async fn read_clipboard(&self) -> DomResult<String>;

    async fn write_clipboard(&self, text: &str) -> DomResult<()>;

    /// Deliver an action message to the page-context listener
    async fn post_message(&self, payload: &serde_json::Value) -> DomResult<()>;

    /// Evaluate a script in the page and return its value
    async fn eval(&self, js: &str) -> DomResult<serde_json::Value>;
}
