//! PromptDeck Desktop - Rust Backend Library
//!
//! Backend for the PromptDeck desktop companion: a prompt-template library
//! with `{{variable}}` placeholders, reliable text insertion into embedded
//! third-party chat pages, remote prompt enhancement, and offline-first data
//! with background reconciliation. It includes:
//! - Tauri command handlers for frontend IPC
//! - The site-adapter and insertion subsystem for hosted chat pages
//! - Offline-first entity services with a background sync queue
//! - Storage layer (local KV store, JSON config)

pub mod adapters;
pub mod bridge;
pub mod commands;
pub mod dom;
pub mod insertion;
pub mod models;
pub mod page;
pub mod services;
pub mod state;
pub mod storage;
pub mod template;
pub mod utils;

// Re-export commonly used items
pub use adapters::{AdapterRegistry, SiteAdapter};
pub use bridge::{ActionMessage, DispatchOutcome, Dispatcher};
pub use insertion::{InsertOutcome, InsertRequest, InsertionEngine, VariableStore};
pub use models::response::*;
pub use models::settings::{AppConfig, SettingsUpdate};
pub use models::{Entity, HistoryEntry, Prompt, Variable, VariableBinding};
pub use page::PageSession;
pub use services::{ApiClient, AuthService, DataService, SyncPacing};
pub use state::AppState;
pub use utils::error::{AppError, AppResult};
