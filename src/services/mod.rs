//! Services
//!
//! Business logic services for the application: the remote API client, auth
//! token handling, the offline-first entity services, and their background
//! reconciliation queues. Services are called by commands and by the
//! messaging bridge.

pub mod api;
pub mod auth;
pub mod data;
pub mod sync;

pub use api::{ApiClient, ApiError, ApiResult, HistoryRemote, PromptRemote, VariableRemote};
pub use auth::AuthService;
pub use data::{DataService, Subscription};
pub use sync::{RemoteClient, SyncAction, SyncIntent, SyncPacing};
