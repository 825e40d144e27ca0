//! Prompt Template Models
//!
//! Data structures for the prompt library feature.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Entity;

/// A reusable prompt template
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    /// Server-assigned id; `temp_*` until the first create reconciles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub prompt_name: String,
    #[serde(default)]
    pub prompt_description: String,
    /// Template text, may contain `{{variable}}` placeholders
    pub prompt_text: String,
    /// Display color (hex string)
    #[serde(default)]
    pub color: String,
    /// Bindings for the placeholders currently present in `prompt_text`
    #[serde(default)]
    pub variables: Vec<VariableBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A named variable binding inside a prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableBinding {
    pub name: String,
    /// May be empty; substituted as the empty string
    #[serde(default)]
    pub value: String,
}

impl VariableBinding {
    /// Create a binding with an empty value
    pub fn unset(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
        }
    }

    /// Create a binding with a value
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl Entity for Prompt {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }
}
