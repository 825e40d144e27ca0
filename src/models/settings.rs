//! Settings Models
//!
//! Application configuration and settings data structures.

use serde::{Deserialize, Serialize};

/// Application configuration stored in config.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the remote API
    pub api_base_url: String,
    /// Login page of the companion web app (opened when auth is missing)
    pub login_url: String,
    /// Delay before a queued reconciliation intent is executed, in milliseconds
    pub sync_delay_ms: u64,
    /// Interval between retry ticks for failed reconciliation intents, in seconds
    pub sync_retry_secs: u64,
    /// Page size for history list fetches
    pub history_page_size: u32,
    /// Enable per-adapter debug logging
    #[serde(default = "default_adapter_debug")]
    pub adapter_debug: bool,
}

fn default_adapter_debug() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            login_url: "http://localhost:5173/login".to_string(),
            sync_delay_ms: 100,
            sync_retry_secs: 30,
            history_page_size: 20,
            adapter_debug: true,
        }
    }
}

/// Settings update request (partial update)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SettingsUpdate {
    pub api_base_url: Option<String>,
    pub login_url: Option<String>,
    pub sync_delay_ms: Option<u64>,
    pub sync_retry_secs: Option<u64>,
    pub history_page_size: Option<u32>,
    pub adapter_debug: Option<bool>,
}

impl AppConfig {
    /// Apply a partial update to the configuration
    pub fn apply_update(&mut self, update: SettingsUpdate) {
        if let Some(api_base_url) = update.api_base_url {
            self.api_base_url = api_base_url;
        }
        if let Some(login_url) = update.login_url {
            self.login_url = login_url;
        }
        if let Some(delay) = update.sync_delay_ms {
            self.sync_delay_ms = delay;
        }
        if let Some(retry) = update.sync_retry_secs {
            self.sync_retry_secs = retry;
        }
        if let Some(page_size) = update.history_page_size {
            self.history_page_size = page_size;
        }
        if let Some(debug) = update.adapter_debug {
            self.adapter_debug = debug;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if url::Url::parse(&self.api_base_url).is_err() {
            return Err(format!("Invalid api_base_url: {}", self.api_base_url));
        }

        if url::Url::parse(&self.login_url).is_err() {
            return Err(format!("Invalid login_url: {}", self.login_url));
        }

        if self.sync_delay_ms > 60_000 {
            return Err("sync_delay_ms cannot exceed 60000".to_string());
        }

        if self.sync_retry_secs == 0 {
            return Err("sync_retry_secs must be at least 1".to_string());
        }

        if self.history_page_size == 0 || self.history_page_size > 100 {
            return Err("history_page_size must be between 1 and 100".to_string());
        }

        Ok(())
    }
}
