//! Application State
//!
//! Global state managed by Tauri, containing all services. Initialization is
//! lazy and idempotent: storage and config come up first, then the entity
//! services hydrate their offline snapshots, and the initial server loads
//! are scheduled in the background so startup never blocks on the network.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::info;

use crate::bridge::{Dispatcher, LoginOpener};
use crate::models::settings::{AppConfig, SettingsUpdate};
use crate::models::{HistoryEntry, Prompt, Variable};
use crate::services::{
    ApiClient, AuthService, DataService, HistoryRemote, PromptRemote, SyncPacing, VariableRemote,
};
use crate::storage::{ConfigService, LocalStore};
use crate::utils::error::{AppError, AppResult};

/// Delay before the initial server loads, decoupling them from startup
const INITIAL_LOAD_DELAY: Duration = Duration::from_millis(100);

/// Application state managed by Tauri
pub struct AppState {
    store: Arc<RwLock<Option<Arc<LocalStore>>>>,
    config: Arc<RwLock<Option<ConfigService>>>,
    auth: Arc<RwLock<Option<Arc<AuthService>>>>,
    api: Arc<RwLock<Option<ApiClient>>>,
    prompts: Arc<RwLock<Option<DataService<Prompt>>>>,
    variables: Arc<RwLock<Option<DataService<Variable>>>>,
    history: Arc<RwLock<Option<DataService<HistoryEntry>>>>,
    dispatcher: Arc<RwLock<Option<Arc<Dispatcher>>>>,
    initialized: Arc<RwLock<bool>>,
}

impl AppState {
    /// Create a new uninitialized app state
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(None)),
            config: Arc::new(RwLock::new(None)),
            auth: Arc::new(RwLock::new(None)),
            api: Arc::new(RwLock::new(None)),
            prompts: Arc::new(RwLock::new(None)),
            variables: Arc::new(RwLock::new(None)),
            history: Arc::new(RwLock::new(None)),
            dispatcher: Arc::new(RwLock::new(None)),
            initialized: Arc::new(RwLock::new(false)),
        }
    }

    /// Initialize all services. Idempotent.
    pub async fn initialize(&self, login_opener: LoginOpener) -> AppResult<()> {
        let mut initialized = self.initialized.write().await;
        if *initialized {
            return Ok(());
        }

        let store = Arc::new(LocalStore::new()?);
        let config = ConfigService::new()?;
        let app_config = config.get_config_clone();

        let auth = Arc::new(AuthService::new(store.clone(), app_config.login_url.clone()));
        let api = ApiClient::new(app_config.api_base_url.clone());
        let pacing = SyncPacing {
            delay: Duration::from_millis(app_config.sync_delay_ms),
            retry_interval: Duration::from_secs(app_config.sync_retry_secs),
        };

        let prompts: DataService<Prompt> = DataService::new(
            "local_prompts",
            store.clone(),
            Arc::new(PromptRemote::new(api.clone())),
            auth.clone(),
            pacing,
        );
        let variables: DataService<Variable> = DataService::new(
            "local_variables",
            store.clone(),
            Arc::new(VariableRemote::new(api.clone())),
            auth.clone(),
            pacing,
        );
        let history: DataService<HistoryEntry> = DataService::new(
            "local_history",
            store.clone(),
            Arc::new(HistoryRemote::new(
                api.clone(),
                app_config.history_page_size,
            )),
            auth.clone(),
            pacing,
        );

        // Offline snapshots are available immediately
        prompts.hydrate();
        variables.hydrate();
        history.hydrate();

        let dispatcher = Arc::new(Dispatcher::new(
            prompts.clone(),
            history.clone(),
            api.clone(),
            auth.clone(),
            login_opener,
        ));

        // Authoritative server state arrives in the background
        {
            let prompts = prompts.clone();
            let variables = variables.clone();
            let history = history.clone();
            tokio::spawn(async move {
                tokio::time::sleep(INITIAL_LOAD_DELAY).await;
                let _ = prompts.load_from_server().await;
                let _ = variables.load_from_server().await;
                let _ = history.load_from_server().await;
            });
        }

        *self.store.write().await = Some(store);
        *self.config.write().await = Some(config);
        *self.auth.write().await = Some(auth);
        *self.api.write().await = Some(api);
        *self.prompts.write().await = Some(prompts);
        *self.variables.write().await = Some(variables);
        *self.history.write().await = Some(history);
        *self.dispatcher.write().await = Some(dispatcher);

        *initialized = true;
        info!("application state initialized");
        Ok(())
    }

    /// Check if local storage is healthy
    pub fn is_storage_healthy(&self) -> bool {
        if let Ok(guard) = self.store.try_read() {
            if let Some(ref store) = *guard {
                return store.is_healthy();
            }
        }
        false
    }

    /// Check if config is healthy
    pub fn is_config_healthy(&self) -> bool {
        if let Ok(guard) = self.config.try_read() {
            if let Some(ref config) = *guard {
                return config.is_healthy();
            }
        }
        false
    }

    /// Get the current configuration
    pub async fn get_config(&self) -> AppResult<AppConfig> {
        let guard = self.config.read().await;
        match &*guard {
            Some(config) => Ok(config.get_config_clone()),
            None => Err(AppError::config("Config service not initialized")),
        }
    }

    /// Update the configuration
    pub async fn update_config(&self, update: SettingsUpdate) -> AppResult<AppConfig> {
        let mut guard = self.config.write().await;
        match &mut *guard {
            Some(config) => config.update_config(update),
            None => Err(AppError::config("Config service not initialized")),
        }
    }

    /// Get the auth service
    pub async fn auth(&self) -> AppResult<Arc<AuthService>> {
        let guard = self.auth.read().await;
        guard
            .clone()
            .ok_or_else(|| AppError::internal("Auth service not initialized"))
    }

    /// Get the API client
    pub async fn api(&self) -> AppResult<ApiClient> {
        let guard = self.api.read().await;
        guard
            .clone()
            .ok_or_else(|| AppError::internal("API client not initialized"))
    }

    /// Get the prompts service
    pub async fn prompts(&self) -> AppResult<DataService<Prompt>> {
        let guard = self.prompts.read().await;
        guard
            .clone()
            .ok_or_else(|| AppError::internal("Prompt service not initialized"))
    }

    /// Get the variables service
    pub async fn variables(&self) -> AppResult<DataService<Variable>> {
        let guard = self.variables.read().await;
        guard
            .clone()
            .ok_or_else(|| AppError::internal("Variable service not initialized"))
    }

    /// Get the history service
    pub async fn history(&self) -> AppResult<DataService<HistoryEntry>> {
        let guard = self.history.read().await;
        guard
            .clone()
            .ok_or_else(|| AppError::internal("History service not initialized"))
    }

    /// Get the bridge dispatcher
    pub async fn dispatcher(&self) -> AppResult<Arc<Dispatcher>> {
        let guard = self.dispatcher.read().await;
        guard
            .clone()
            .ok_or_else(|| AppError::internal("Dispatcher not initialized"))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("initialized", &self.initialized)
            .finish()
    }
}
