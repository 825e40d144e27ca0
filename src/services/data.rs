//! Offline-First Data Service
//!
//! Generic entity service owning an in-memory snapshot: reads are
//! synchronous, mutations apply locally and notify subscribers before any
//! network work, the snapshot persists to local storage, and remote
//! reconciliation happens through the sync queue in the background. The UI
//! never waits on the network.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::Entity;
use crate::storage::LocalStore;
use crate::utils::error::AppResult;

use super::auth::AuthService;
use super::sync::{spawn_worker, RemoteClient, SyncIntent, SyncPacing, SyncQueueHandle};

type Listener<T> = Box<dyn Fn(&[T]) + Send + Sync>;

/// Shared state behind a [`DataService`]
pub(crate) struct ServiceCore<T: Entity> {
    storage_key: String,
    store: Arc<LocalStore>,
    items: Mutex<Vec<T>>,
    listeners: Mutex<Vec<(u64, Listener<T>)>>,
    next_listener_id: AtomicU64,
    /// Single-flight guard for `load_from_server`
    loading: AtomicBool,
    queue: SyncQueueHandle<T>,
    remote: Arc<dyn RemoteClient<T>>,
    auth: Arc<AuthService>,
}

impl<T> ServiceCore<T>
where
    T: Entity + Serialize + DeserializeOwned,
{
    /// Synchronously push the current snapshot to every subscriber. A
    /// panicking listener is skipped; it cannot break the service or its
    /// sibling listeners.
    fn notify_subscribers(&self) {
        let snapshot = self.items.lock().unwrap().clone();
        let listeners = self.listeners.lock().unwrap();
        for (_, listener) in listeners.iter() {
            if catch_unwind(AssertUnwindSafe(|| listener(&snapshot))).is_err() {
                warn!(key = %self.storage_key, "subscriber panicked during notification");
            }
        }
    }

    /// Persist the snapshot to local storage; failures degrade to a warning
    fn persist(&self) {
        let snapshot = self.items.lock().unwrap().clone();
        match serde_json::to_value(&snapshot) {
            Ok(value) => {
                if let Err(e) = self.store.set_one(&self.storage_key, value) {
                    warn!(key = %self.storage_key, "snapshot persist failed: {e}");
                }
            }
            Err(e) => warn!(key = %self.storage_key, "snapshot serialization failed: {e}"),
        }
    }

    /// Rewrite a temporary id to the canonical server id, in place.
    /// Called by the sync worker after a successful create.
    pub(crate) fn apply_server_id(&self, old_id: &str, new_id: &str) {
        let rewritten = {
            let mut items = self.items.lock().unwrap();
            match items.iter_mut().find(|i| i.id() == Some(old_id)) {
                Some(item) => {
                    item.set_id(new_id.to_string());
                    true
                }
                None => false,
            }
        };
        if rewritten {
            self.notify_subscribers();
            self.persist();
            info!(key = %self.storage_key, old_id, new_id, "reconciled temporary id");
        }
    }
}

/// Offline-first cache over one entity type
pub struct DataService<T: Entity> {
    core: Arc<ServiceCore<T>>,
}

impl<T: Entity> Clone for DataService<T> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl<T> DataService<T>
where
    T: Entity + Serialize + DeserializeOwned,
{
    /// Create the service and spawn its reconciliation worker.
    /// Must run inside the tokio runtime.
    pub fn new(
        storage_key: impl Into<String>,
        store: Arc<LocalStore>,
        remote: Arc<dyn RemoteClient<T>>,
        auth: Arc<AuthService>,
        pacing: SyncPacing,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let core = Arc::new(ServiceCore {
            storage_key: storage_key.into(),
            store,
            items: Mutex::new(Vec::new()),
            listeners: Mutex::new(Vec::new()),
            next_listener_id: AtomicU64::new(1),
            loading: AtomicBool::new(false),
            queue: SyncQueueHandle::from_sender(tx),
            remote: remote.clone(),
            auth: auth.clone(),
        });
        spawn_worker(rx, remote, auth, Arc::downgrade(&core), pacing);
        Self { core }
    }

    /// Current in-memory snapshot. Synchronous, no I/O.
    pub fn list(&self) -> Vec<T> {
        self.core.items.lock().unwrap().clone()
    }

    /// Entity by id from the in-memory snapshot. Synchronous, no I/O.
    pub fn get_by_id(&self, id: &str) -> Option<T> {
        self.core
            .items
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.id() == Some(id))
            .cloned()
    }

    /// Subscribe to snapshot changes. The listener immediately receives the
    /// current snapshot, then every subsequent mutation, synchronously and
    /// in mutation order. Dropping the returned subscription unsubscribes.
    pub fn subscribe(
        &self,
        listener: impl Fn(&[T]) + Send + Sync + 'static,
    ) -> Subscription<T> {
        let id = self.core.next_listener_id.fetch_add(1, Ordering::SeqCst);
        let snapshot = self.core.items.lock().unwrap().clone();
        if catch_unwind(AssertUnwindSafe(|| listener(&snapshot))).is_err() {
            warn!("subscriber panicked on initial snapshot");
        }
        self.core
            .listeners
            .lock()
            .unwrap()
            .push((id, Box::new(listener)));
        Subscription {
            id,
            core: Arc::downgrade(&self.core),
        }
    }

    /// Upsert an entity: assign a temporary id if absent, apply in memory,
    /// notify subscribers, persist, and enqueue reconciliation. Subscribers
    /// are always notified before this future resolves.
    pub async fn save(&self, mut item: T) -> AppResult<T> {
        if item.id().is_none() {
            item.set_id(format!("temp_{}", Uuid::new_v4().simple()));
        }
        let id = item.id().map(str::to_string).unwrap_or_default();

        let existed = {
            let mut items = self.core.items.lock().unwrap();
            match items.iter_mut().find(|i| i.id() == Some(id.as_str())) {
                Some(slot) => {
                    *slot = item.clone();
                    true
                }
                None => {
                    items.push(item.clone());
                    false
                }
            }
        };

        self.core.notify_subscribers();
        self.core.persist();

        let intent = if existed {
            SyncIntent::update(id, item.clone())
        } else {
            SyncIntent::create(id, item.clone())
        };
        self.core.queue.submit(intent);

        Ok(item)
    }

    /// Delete by id. The sentinel id `"all"` clears everything. Applies
    /// locally, notifies, persists, and enqueues reconciliation.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        if id == "all" {
            self.core.items.lock().unwrap().clear();
            self.core.notify_subscribers();
            self.core.persist();
            self.core.queue.submit(SyncIntent::clear_all());
            return Ok(());
        }

        self.core
            .items
            .lock()
            .unwrap()
            .retain(|i| i.id() != Some(id));
        self.core.notify_subscribers();
        self.core.persist();
        self.core.queue.submit(SyncIntent::delete(id));
        Ok(())
    }

    /// Replace the snapshot with the authoritative server list. Guarded by
    /// a single-flight flag: concurrent calls collapse into one fetch. A
    /// fetch failure keeps local data and is not surfaced as an error.
    pub async fn load_from_server(&self) -> AppResult<()> {
        if self.core.loading.swap(true, Ordering::SeqCst) {
            debug!(key = %self.core.storage_key, "server load already in flight");
            return Ok(());
        }

        let result = self.load_from_server_inner().await;
        self.core.loading.store(false, Ordering::SeqCst);
        result
    }

    async fn load_from_server_inner(&self) -> AppResult<()> {
        let Some(token) = self.core.auth.current_token() else {
            warn!(key = %self.core.storage_key, "no auth token; keeping local data");
            return Ok(());
        };

        match self.core.remote.fetch_all(&token).await {
            Ok(items) => {
                *self.core.items.lock().unwrap() = items;
                self.core.notify_subscribers();
                self.core.persist();
                Ok(())
            }
            Err(e) => {
                warn!(key = %self.core.storage_key, "server load failed, keeping local data: {e}");
                Ok(())
            }
        }
    }

    /// Drop all local state (memory and persisted snapshot) without
    /// touching the remote store. Used on logout.
    pub fn clear_local(&self) {
        self.core.items.lock().unwrap().clear();
        self.core.notify_subscribers();
        self.core.persist();
    }

    /// Load the persisted snapshot from local storage (startup)
    pub fn hydrate(&self) {
        let Some(value) = self.core.store.get_one(&self.core.storage_key) else {
            return;
        };
        match serde_json::from_value::<Vec<T>>(value) {
            Ok(items) => {
                *self.core.items.lock().unwrap() = items;
                self.core.notify_subscribers();
            }
            Err(e) => warn!(key = %self.core.storage_key, "persisted snapshot unreadable: {e}"),
        }
    }
}

/// Listener registration; dropping it unsubscribes
pub struct Subscription<T: Entity> {
    id: u64,
    core: Weak<ServiceCore<T>>,
}

impl<T: Entity> Subscription<T> {
    /// Explicit unsubscribe
    pub fn unsubscribe(self) {}
}

impl<T: Entity> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(core) = self.core.upgrade() {
            core.listeners.lock().unwrap().retain(|(id, _)| *id != self.id);
        }
    }
}
