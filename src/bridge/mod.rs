//! Messaging Bridge
//!
//! The action-dispatch protocol shared by the extension-style surfaces:
//! tagged messages (`{"action": ..., ...payload}`) arrive from the UI
//! surface or the page context and are routed to the matching handler.
//! Handlers run async (the returned future is the keep-channel-open
//! contract); unknown actions are logged and ignored, never fatal.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::models::{HistoryEntry, Prompt, VariableBinding};
use crate::page::PageSession;
use crate::services::{ApiClient, AuthService, DataService};
use crate::template;

/// Tagged action messages, camelCase on the wire
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ActionMessage {
    EnhancePrompt {
        text: String,
    },
    GetPromptTemplates,
    SavePromptTemplate {
        template: Prompt,
    },
    CheckAuth,
    Login,
    AuthSuccess {
        token: String,
    },
    InsertPrompt {
        text: String,
        #[serde(default)]
        variables: Vec<VariableBinding>,
        #[serde(default, rename = "doNotReplaceVariables")]
        do_not_replace_variables: bool,
    },
    SendToActiveSurface {
        data: Value,
    },
}

/// Result of dispatching one message
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// The handler produced a reply payload
    Replied(Value),
    /// The action was unknown; logged and dropped
    Ignored,
}

/// Side effect invoked when an action needs the user to authenticate
pub type LoginOpener = Arc<dyn Fn(&str) + Send + Sync>;

/// One dispatch point per execution context
pub struct Dispatcher {
    prompts: DataService<Prompt>,
    history: DataService<HistoryEntry>,
    api: ApiClient,
    auth: Arc<AuthService>,
    login_opener: LoginOpener,
}

impl Dispatcher {
    pub fn new(
        prompts: DataService<Prompt>,
        history: DataService<HistoryEntry>,
        api: ApiClient,
        auth: Arc<AuthService>,
        login_opener: LoginOpener,
    ) -> Self {
        Self {
            prompts,
            history,
            api,
            auth,
            login_opener,
        }
    }

    /// Route one raw message to its handler.
    ///
    /// `page` is the current page session, when one is attached; page-bound
    /// actions without a page reply with a structured failure.
    pub async fn dispatch(&self, raw: Value, page: Option<&PageSession>) -> DispatchOutcome {
        let message: ActionMessage = match serde_json::from_value(raw.clone()) {
            Ok(message) => message,
            Err(_) => {
                let action = raw
                    .get("action")
                    .and_then(Value::as_str)
                    .unwrap_or("<untagged>");
                info!(action, "unknown bridge action ignored");
                return DispatchOutcome::Ignored;
            }
        };

        let reply = match message {
            ActionMessage::EnhancePrompt { text } => self.enhance(&text).await,
            ActionMessage::GetPromptTemplates => {
                json!({ "templates": self.prompts.list() })
            }
            ActionMessage::SavePromptTemplate { mut template } => {
                // Re-establish the template invariant before saving
                template.prompt_text = template::normalize_braces(&template.prompt_text);
                template.variables =
                    template::sync_bindings(&template.prompt_text, &template.variables);
                match self.prompts.save(template).await {
                    Ok(saved) => json!({ "success": true, "template": saved }),
                    Err(e) => json!({ "success": false, "error": e.to_string() }),
                }
            }
            ActionMessage::CheckAuth => {
                json!({ "isAuthenticated": self.auth.is_authenticated() })
            }
            ActionMessage::Login => {
                (self.login_opener)(self.auth.login_url());
                json!({ "success": true })
            }
            ActionMessage::AuthSuccess { token } => match self.auth.store_token(&token) {
                Ok(()) => json!({ "success": true }),
                Err(e) => json!({ "success": false, "error": e.to_string() }),
            },
            ActionMessage::InsertPrompt {
                text,
                variables,
                do_not_replace_variables,
            } => match page {
                Some(session) => {
                    let request = crate::insertion::InsertRequest {
                        text,
                        variables,
                        do_not_replace_variables,
                    };
                    match serde_json::to_value(session.insert(&request).await) {
                        Ok(outcome) => outcome,
                        Err(e) => json!({ "success": false, "error": e.to_string() }),
                    }
                }
                None => json!({ "success": false, "error": "no page attached" }),
            },
            ActionMessage::SendToActiveSurface { data } => match page {
                Some(session) => match session.forward(&data).await {
                    Ok(()) => json!({ "success": true }),
                    Err(e) => json!({ "success": false, "error": e.to_string() }),
                },
                None => json!({ "success": false, "error": "no page attached" }),
            },
        };

        DispatchOutcome::Replied(reply)
    }

    /// Enhance a prompt through the remote API and append the result to the
    /// history. A missing token triggers the login side effect instead of
    /// an error cascade.
    async fn enhance(&self, text: &str) -> Value {
        let Some(token) = self.auth.current_token() else {
            (self.login_opener)(self.auth.login_url());
            return json!({ "error": "Not authenticated" });
        };

        match self.api.enhance_prompt(text, &token).await {
            Ok(enhanced) => {
                if let Err(e) = self
                    .history
                    .save(HistoryEntry::new(text, enhanced.clone()))
                    .await
                {
                    warn!("could not record enhancement in history: {e}");
                }
                json!({ "enhancedText": enhanced })
            }
            Err(e) => {
                warn!("enhance request failed: {e}");
                json!({ "error": "Failed to enhance prompt" })
            }
        }
    }
}
