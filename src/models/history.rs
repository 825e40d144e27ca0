//! Enhancement History Models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Entity;

/// One enhance-prompt call, as shown in the history tab.
///
/// Entries are append-only from the user's perspective; they can be deleted
/// individually or cleared in bulk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub original_prompt: String,
    pub enhanced_prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl HistoryEntry {
    /// Create an entry stamped with the current time
    pub fn new(original: impl Into<String>, enhanced: impl Into<String>) -> Self {
        Self {
            id: None,
            original_prompt: original.into(),
            enhanced_prompt: enhanced.into(),
            timestamp: Some(Utc::now()),
        }
    }
}

impl Entity for HistoryEntry {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }
}
