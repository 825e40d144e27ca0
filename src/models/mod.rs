//! Data Models
//!
//! Serde data structures shared between services, commands, and the wire.
//! Field names serialize as camelCase to match the remote API.

pub mod history;
pub mod prompt;
pub mod response;
pub mod settings;
pub mod variable;

pub use history::HistoryEntry;
pub use prompt::{Prompt, VariableBinding};
pub use response::{CommandResponse, HealthResponse};
pub use settings::{AppConfig, SettingsUpdate};
pub use variable::Variable;

/// An entity managed by an offline-first data service.
///
/// Entities carry an optional id: absent until first saved, a `temp_`-prefixed
/// placeholder until the remote store assigns the canonical one.
pub trait Entity: Clone + Send + Sync + 'static {
    /// The entity's current id, if any
    fn id(&self) -> Option<&str>;

    /// Overwrite the entity's id
    fn set_id(&mut self, id: String);
}
