//! Auth Token Service
//!
//! Token issuance and refresh belong to the external provider; this service
//! only keeps the opaque bearer token in local storage, answers the two
//! questions the rest of the crate asks (`current_token`, `is_authenticated`),
//! and knows where to send the user when a token is missing.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::storage::LocalStore;
use crate::utils::error::AppResult;

/// Storage key for the bearer token
const TOKEN_KEY: &str = "auth_token";

pub struct AuthService {
    store: Arc<LocalStore>,
    login_url: String,
}

impl AuthService {
    pub fn new(store: Arc<LocalStore>, login_url: impl Into<String>) -> Self {
        Self {
            store,
            login_url: login_url.into(),
        }
    }

    /// The stored bearer token, if any
    pub fn current_token(&self) -> Option<String> {
        self.store
            .get_one(TOKEN_KEY)
            .and_then(|v| v.as_str().map(str::to_string))
            .filter(|t| !t.is_empty())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_token().is_some()
    }

    /// Store a token pushed by the companion web app
    pub fn store_token(&self, token: &str) -> AppResult<()> {
        self.store.set_one(TOKEN_KEY, Value::String(token.to_string()))?;
        info!("auth token stored");
        Ok(())
    }

    /// Drop the stored token (logout)
    pub fn clear_token(&self) {
        if let Err(e) = self.store.remove(&[TOKEN_KEY]) {
            warn!("could not clear auth token: {e}");
        }
    }

    /// Where to send the user to authenticate
    pub fn login_url(&self) -> &str {
        &self.login_url
    }
}
