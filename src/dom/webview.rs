//! Webview-Backed Host Page
//!
//! Drives the hosted chat page through a bridge script injected at page load
//! (the content-script role). Element operations compile to small JS snippets;
//! each evaluation is correlated with its reply through a pending-request map
//! keyed by a generated request id, resolved when the page bridge invokes the
//! `resolve_page_eval` command.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{json, Value};
use tokio::sync::oneshot;
use tracing::warn;
use uuid::Uuid;

use super::{DomError, DomResult, EditableElement, ElementKind, HostPage, SyntheticEvent};

/// Default time to wait for the page to answer an evaluation
const DEFAULT_EVAL_TIMEOUT: Duration = Duration::from_secs(5);

/// Script injected into every hosted page at load time. Exposes the eval
/// entry point the backend calls into and relays action messages to the
/// page-context listener.
pub const BRIDGE_SCRIPT: &str = r#"
(function () {
  if (window.__pdBridge) return;
  const invoke = window.__TAURI_INTERNALS__.invoke;
  window.__pdBridge = {
    run: async (request) => {
      try {
        let value = (0, eval)(request.js);
        if (value instanceof Promise) value = await value;
        invoke('resolve_page_eval', {
          id: request.id,
          ok: true,
          value: value === undefined ? null : value,
        });
      } catch (e) {
        invoke('resolve_page_eval', { id: request.id, ok: false, value: String(e) });
      }
    },
    deliver: (payload) => {
      window.dispatchEvent(new CustomEvent('promptdeck:action', { detail: payload }));
    },
  };
})();
"#;

/// Quote a Rust string as a JS string literal
fn js_string(text: &str) -> String {
    Value::String(text.to_string()).to_string()
}

/// Transport delivering scripts to the page bridge
pub trait EvalTransport: Send + Sync + 'static {
    /// Hand an eval request (`{id, js}`) to the bridge
    fn send_eval(&self, request: &Value) -> DomResult<()>;

    /// Hand an action message to the bridge's page-context listener
    fn send_action(&self, payload: &Value) -> DomResult<()>;
}

/// Transport backed by a Tauri webview window
pub struct TauriTransport<R: tauri::Runtime> {
    window: tauri::WebviewWindow<R>,
}

impl<R: tauri::Runtime> TauriTransport<R> {
    pub fn new(window: tauri::WebviewWindow<R>) -> Self {
        Self { window }
    }
}

impl<R: tauri::Runtime> EvalTransport for TauriTransport<R> {
    fn send_eval(&self, request: &Value) -> DomResult<()> {
        self.window
            .eval(&format!("window.__pdBridge.run({request})"))
            .map_err(|e| DomError::Script(e.to_string()))
    }

    fn send_action(&self, payload: &Value) -> DomResult<()> {
        self.window
            .eval(&format!("window.__pdBridge.deliver({payload})"))
            .map_err(|e| DomError::MessagingRejected(e.to_string()))
    }
}

/// Correlates eval requests with their asynchronous replies
pub struct EvalBridge {
    transport: Box<dyn EvalTransport>,
    pending: DashMap<String, oneshot::Sender<Result<Value, String>>>,
    timeout: Duration,
}

impl EvalBridge {
    pub fn new(transport: Box<dyn EvalTransport>) -> Self {
        Self {
            transport,
            pending: DashMap::new(),
            timeout: DEFAULT_EVAL_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Evaluate a script in the page and wait for its reply
    pub async fn eval(&self, js: &str) -> DomResult<Value> {
        let id = Uuid::new_v4().simple().to_string();
        let (tx, rx) = oneshot::channel();
        self.pending.insert(id.clone(), tx);

        let request = json!({ "id": id, "js": js });
        if let Err(e) = self.transport.send_eval(&request) {
            self.pending.remove(&id);
            return Err(e);
        }

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(Ok(value))) => Ok(value),
            Ok(Ok(Err(message))) => Err(DomError::Script(message)),
            Ok(Err(_)) => Err(DomError::Script("reply channel closed".to_string())),
            Err(_) => {
                self.pending.remove(&id);
                Err(DomError::Timeout)
            }
        }
    }

    /// Resolve a pending request. Called by the `resolve_page_eval` command.
    pub fn resolve(&self, id: &str, ok: bool, value: Value) {
        match self.pending.remove(id) {
            Some((_, tx)) => {
                let result = if ok {
                    Ok(value)
                } else {
                    Err(value
                        .as_str()
                        .unwrap_or("unknown page error")
                        .to_string())
                };
                let _ = tx.send(result);
            }
            None => warn!(request_id = id, "reply for unknown eval request"),
        }
    }

    /// Deliver an action message to the page context
    pub fn send_action(&self, payload: &Value) -> DomResult<()> {
        self.transport.send_action(payload)
    }
}

/// A hosted page reached through the eval bridge
pub struct WebviewPage {
    url: Mutex<String>,
    bridge: Arc<EvalBridge>,
}

impl WebviewPage {
    pub fn new(url: impl Into<String>, bridge: Arc<EvalBridge>) -> Self {
        Self {
            url: Mutex::new(url.into()),
            bridge,
        }
    }

    /// Record a navigation
    pub fn set_url(&self, url: impl Into<String>) {
        *self.url.lock().unwrap() = url.into();
    }

    pub fn bridge(&self) -> Arc<EvalBridge> {
        self.bridge.clone()
    }

    /// Build the discovery snippet shared by selector and active-element
    /// queries: classify the element, assign a stable key if missing, and
    /// report both.
    fn discovery_tail(candidate_key: &str) -> String {
        format!(
            r#"
  let key = el.getAttribute('data-pd-key');
  if (!key) {{ key = {key}; el.setAttribute('data-pd-key', key); }}
  let kind;
  const tag = el.tagName;
  if (tag === 'TEXTAREA') kind = 'textarea';
  else if (tag === 'INPUT' && el.type === 'text') kind = 'text_input';
  else if (el.classList && el.classList.contains('ProseMirror')) kind = 'prosemirror';
  else if (el.isContentEditable) kind = 'contenteditable';
  else kind = 'other';
  return {{ key: key, kind: kind }};"#,
            key = js_string(candidate_key)
        )
    }

    fn element_from_reply(&self, value: Value) -> Option<Box<dyn EditableElement>> {
        let key = value.get("key")?.as_str()?.to_string();
        let kind = ElementKind::from_wire(value.get("kind")?.as_str()?);
        Some(Box::new(WebviewElement {
            key,
            kind,
            bridge: self.bridge.clone(),
        }))
    }
}

#[async_trait]
impl HostPage for WebviewPage {
    fn url(&self) -> String {
        self.url.lock().unwrap().clone()
    }

    async fn query_editable(&self, selector: &str) -> DomResult<Option<Box<dyn EditableElement>>> {
        let candidate_key = Uuid::new_v4().simple().to_string();
        let js = format!(
            r#"(() => {{
  const el = document.querySelector({selector});
  if (!el) return null;{tail}
}})()"#,
            selector = js_string(selector),
            tail = Self::discovery_tail(&candidate_key)
        );
        let value = self.bridge.eval(&js).await?;
        Ok(self.element_from_reply(value))
    }

    async fn active_editable(&self) -> DomResult<Option<Box<dyn EditableElement>>> {
        let candidate_key = Uuid::new_v4().simple().to_string();
        let js = format!(
            r#"(() => {{
  const el = document.activeElement;
  if (!el) return null;
  const tag = el.tagName;
  const editable = tag === 'TEXTAREA'
    || (tag === 'INPUT' && el.type === 'text')
    || el.isContentEditable;
  if (!editable) return null;{tail}
}})()"#,
            tail = Self::discovery_tail(&candidate_key)
        );
        let value = self.bridge.eval(&js).await?;
        Ok(self.element_from_reply(value))
    }

    async fn read_clipboard(&self) -> DomResult<String> {
        let value = self
            .bridge
            .eval("navigator.clipboard.readText()")
            .await
            .map_err(|e| DomError::Clipboard(e.to_string()))?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| DomError::Clipboard("clipboard returned no text".to_string()))
    }

    async fn write_clipboard(&self, text: &str) -> DomResult<()> {
        self.bridge
            .eval(&format!(
                "navigator.clipboard.writeText({}).then(() => true)",
                js_string(text)
            ))
            .await
            .map_err(|e| DomError::Clipboard(e.to_string()))?;
        Ok(())
    }

    async fn post_message(&self, payload: &Value) -> DomResult<()> {
        self.bridge.send_action(payload)
    }

    async fn eval(&self, js: &str) -> DomResult<Value> {
        self.bridge.eval(js).await
    }
}

/// Handle to one element, addressed by its `data-pd-key` attribute
struct WebviewElement {
    key: String,
    kind: ElementKind,
    bridge: Arc<EvalBridge>,
}

impl WebviewElement {
    fn with_element(&self, body: &str) -> String {
        format!(
            r#"(() => {{
  const el = document.querySelector('[data-pd-key="{key}"]');
  if (!el) return {{ __gone: true }};
  {body}
}})()"#,
            key = self.key,
            body = body
        )
    }

    async fn run(&self, body: &str) -> DomResult<Value> {
        let value = self.bridge.eval(&self.with_element(body)).await?;
        if value
            .get("__gone")
            .and_then(Value::as_bool)
            .unwrap_or(false)
        {
            return Err(DomError::ElementGone);
        }
        Ok(value)
    }

    async fn run_flag(&self, body: &str) -> DomResult<bool> {
        let value = self.run(body).await?;
        Ok(value.get("ok").and_then(Value::as_bool).unwrap_or(false))
    }
}

#[async_trait]
impl EditableElement for WebviewElement {
    fn kind(&self) -> ElementKind {
        self.kind
    }

    async fn ensure_key(&self) -> DomResult<String> {
        // Assigned during discovery
        Ok(self.key.clone())
    }

    async fn text(&self) -> DomResult<String> {
        let value = self
            .run(
                r#"const t = (el.tagName === 'TEXTAREA' || el.tagName === 'INPUT')
    ? (el.value || '')
    : (el.innerText || el.textContent || '');
  return { text: t };"#,
            )
            .await?;
        Ok(value
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }

    async fn focus(&self) -> DomResult<()> {
        self.run("el.focus(); return {};").await.map(|_| ())
    }

    async fn set_value(&self, text: &str) -> DomResult<()> {
        self.run(&format!("el.value = {}; return {{}};", js_string(text)))
            .await
            .map(|_| ())
    }

    async fn clear_content(&self) -> DomResult<()> {
        self.run("el.innerHTML = ''; return {};").await.map(|_| ())
    }

    async fn append_paragraph(&self, text: &str) -> DomResult<()> {
        self.run(&format!(
            r#"const p = document.createElement('p');
  p.textContent = {};
  el.appendChild(p);
  return {{}};"#,
            js_string(text)
        ))
        .await
        .map(|_| ())
    }

    async fn select_all(&self) -> DomResult<()> {
        self.run(
            r#"el.focus();
  const range = document.createRange();
  range.selectNodeContents(el);
  const sel = window.getSelection();
  sel.removeAllRanges();
  sel.addRange(range);
  return {};"#,
        )
        .await
        .map(|_| ())
    }

    async fn exec_insert_text(&self, text: &str) -> DomResult<bool> {
        self.run_flag(&format!(
            r#"el.focus();
  document.execCommand('selectAll', false, null);
  const ok = document.execCommand('insertText', false, {});
  return {{ ok: ok }};"#,
            js_string(text)
        ))
        .await
    }

    async fn exec_paste(&self) -> DomResult<bool> {
        self.run_flag(
            r#"el.focus();
  const ok = document.execCommand('paste');
  return { ok: ok };"#,
        )
        .await
    }

    async fn dispatch(&self, event: SyntheticEvent) -> DomResult<()> {
        let js = match &event {
            SyntheticEvent::Input => {
                "el.dispatchEvent(new InputEvent('input', { bubbles: true, cancelable: true, inputType: 'insertText' })); return {};"
                    .to_string()
            }
            SyntheticEvent::Change => {
                "el.dispatchEvent(new Event('change', { bubbles: true })); return {};".to_string()
            }
            SyntheticEvent::KeyDown { key } | SyntheticEvent::KeyUp { key } => format!(
                "el.dispatchEvent(new KeyboardEvent('{name}', {{ key: {key}, bubbles: true, cancelable: true }})); return {{}};",
                name = event.name(),
                key = js_string(key)
            ),
        };
        self.run(&js).await.map(|_| ())
    }

    async fn paste_plain_text(&self, text: &str) -> DomResult<bool> {
        self.run_flag(&format!(
            r#"const dt = new DataTransfer();
  dt.setData('text/plain', {});
  const ev = new ClipboardEvent('paste', {{ bubbles: true, cancelable: true, clipboardData: dt }});
  const ok = el.dispatchEvent(ev);
  return {{ ok: ok }};"#,
            js_string(text)
        ))
        .await
    }
}
