//! Background Reconciliation Queue
//!
//! Local mutations reach the remote store only through this queue: each
//! mutation enqueues an intent, and a single consumer task per entity
//! service executes intents against the remote client after a pacing delay.
//! Failures are logged and the intent stays queued for the next retry tick;
//! the caller is never blocked and never sees the error. Queued intents for
//! the same id are coalesced so a burst of edits produces one server write.

use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::models::Entity;

use super::api::{ApiError, ApiResult};
use super::auth::AuthService;
use super::data::ServiceCore;

/// Remote CRUD surface consumed by the reconciliation worker
#[async_trait]
pub trait RemoteClient<T: Entity>: Send + Sync {
    async fn fetch_all(&self, token: &str) -> ApiResult<Vec<T>>;
    async fn create(&self, item: &T, token: &str) -> ApiResult<T>;
    async fn update(&self, id: &str, item: &T, token: &str) -> ApiResult<T>;
    async fn delete(&self, id: &str, token: &str) -> ApiResult<()>;
    async fn clear_all(&self, token: &str) -> ApiResult<()>;
}

/// What a pending intent wants done remotely
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Create,
    Update,
    Delete,
    ClearAll,
}

/// One pending remote-reconciliation operation
#[derive(Debug, Clone)]
pub struct SyncIntent<T> {
    pub action: SyncAction,
    pub id: String,
    pub payload: Option<T>,
    pub queued_at: DateTime<Utc>,
    pub attempts: u32,
}

impl<T> SyncIntent<T> {
    pub fn create(id: impl Into<String>, payload: T) -> Self {
        Self {
            action: SyncAction::Create,
            id: id.into(),
            payload: Some(payload),
            queued_at: Utc::now(),
            attempts: 0,
        }
    }

    pub fn update(id: impl Into<String>, payload: T) -> Self {
        Self {
            action: SyncAction::Update,
            id: id.into(),
            payload: Some(payload),
            queued_at: Utc::now(),
            attempts: 0,
        }
    }

    pub fn delete(id: impl Into<String>) -> Self {
        Self {
            action: SyncAction::Delete,
            id: id.into(),
            payload: None,
            queued_at: Utc::now(),
            attempts: 0,
        }
    }

    pub fn clear_all() -> Self {
        Self {
            action: SyncAction::ClearAll,
            id: "all".to_string(),
            payload: None,
            queued_at: Utc::now(),
            attempts: 0,
        }
    }
}

/// Pacing of the consumer loop
#[derive(Debug, Clone, Copy)]
pub struct SyncPacing {
    /// Delay between enqueue and execution, decoupling the caller from
    /// network latency
    pub delay: Duration,
    /// Interval between retry ticks for failed intents
    pub retry_interval: Duration,
}

impl Default for SyncPacing {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(100),
            retry_interval: Duration::from_secs(30),
        }
    }
}

impl SyncPacing {
    /// Near-zero pacing, for tests
    pub fn immediate() -> Self {
        Self {
            delay: Duration::from_millis(1),
            retry_interval: Duration::from_millis(20),
        }
    }
}

/// Submits intents to a service's consumer task
pub struct SyncQueueHandle<T: Entity> {
    tx: mpsc::UnboundedSender<SyncIntent<T>>,
}

impl<T: Entity> SyncQueueHandle<T> {
    pub(crate) fn from_sender(tx: mpsc::UnboundedSender<SyncIntent<T>>) -> Self {
        Self { tx }
    }

    pub fn submit(&self, intent: SyncIntent<T>) {
        if self.tx.send(intent).is_err() {
            warn!("sync worker is gone; intent dropped");
        }
    }
}

/// Fold a new intent into the pending list.
///
/// Rules: newest payload wins for the same id; an `Update` folds into a
/// still-pending `Create`; a `Delete` cancels a pending `Create` outright
/// (the server never saw the entity); `ClearAll` supersedes the whole queue.
fn coalesce<T>(pending: &mut Vec<SyncIntent<T>>, new: SyncIntent<T>) {
    if new.action == SyncAction::ClearAll {
        pending.clear();
        pending.push(new);
        return;
    }

    match pending.iter().position(|i| i.id == new.id) {
        Some(position) => {
            let existing = pending.remove(position);
            match (existing.action, new.action) {
                (SyncAction::Create, SyncAction::Update) => {
                    pending.push(SyncIntent {
                        action: SyncAction::Create,
                        id: existing.id,
                        payload: new.payload,
                        queued_at: existing.queued_at,
                        attempts: 0,
                    });
                }
                (SyncAction::Create, SyncAction::Delete) => {
                    debug!(id = %existing.id, "delete cancelled a pending create");
                }
                _ => pending.push(new),
            }
        }
        None => pending.push(new),
    }
}

enum Attempt {
    Done,
    Retry,
}

async fn execute<T>(
    intent: &SyncIntent<T>,
    remote: &Arc<dyn RemoteClient<T>>,
    auth: &Arc<AuthService>,
    core: &Weak<ServiceCore<T>>,
) -> Attempt
where
    T: Entity + Serialize + DeserializeOwned,
{
    let Some(token) = auth.current_token() else {
        debug!("no auth token; intent stays queued");
        return Attempt::Retry;
    };

    match intent.action {
        SyncAction::Create => {
            let Some(payload) = &intent.payload else {
                warn!(id = %intent.id, "create intent without payload dropped");
                return Attempt::Done;
            };
            match remote.create(payload, &token).await {
                Ok(server_item) => {
                    if let Some(server_id) = server_item.id() {
                        if server_id != intent.id {
                            if let Some(core) = core.upgrade() {
                                core.apply_server_id(&intent.id, server_id);
                            }
                        }
                    }
                    Attempt::Done
                }
                Err(e) => {
                    warn!(id = %intent.id, "create reconciliation failed: {e}");
                    Attempt::Retry
                }
            }
        }
        SyncAction::Update => {
            let Some(payload) = &intent.payload else {
                warn!(id = %intent.id, "update intent without payload dropped");
                return Attempt::Done;
            };
            match remote.update(&intent.id, payload, &token).await {
                Ok(_) => Attempt::Done,
                Err(e) => {
                    warn!(id = %intent.id, "update reconciliation failed: {e}");
                    Attempt::Retry
                }
            }
        }
        SyncAction::Delete => match remote.delete(&intent.id, &token).await {
            Ok(()) => Attempt::Done,
            // Already gone server-side; the delete is effectively done
            Err(ApiError::Status { status, .. }) if status == reqwest::StatusCode::NOT_FOUND => {
                debug!(id = %intent.id, "entity already absent on server");
                Attempt::Done
            }
            Err(e) => {
                warn!(id = %intent.id, "delete reconciliation failed: {e}");
                Attempt::Retry
            }
        },
        SyncAction::ClearAll => match remote.clear_all(&token).await {
            Ok(()) => Attempt::Done,
            Err(e) => {
                warn!("clear-all reconciliation failed: {e}");
                Attempt::Retry
            }
        },
    }
}

async fn drain<T>(
    pending: &mut Vec<SyncIntent<T>>,
    remote: &Arc<dyn RemoteClient<T>>,
    auth: &Arc<AuthService>,
    core: &Weak<ServiceCore<T>>,
) where
    T: Entity + Serialize + DeserializeOwned,
{
    let intents = std::mem::take(pending);
    for mut intent in intents {
        match execute(&intent, remote, auth, core).await {
            Attempt::Done => {}
            Attempt::Retry => {
                intent.attempts += 1;
                pending.push(intent);
            }
        }
    }
}

/// Spawn the single consumer task for one entity service. The task drains
/// the channel, coalesces, paces, and retries until the service (and with
/// it the sender) is dropped.
pub(crate) fn spawn_worker<T>(
    mut rx: mpsc::UnboundedReceiver<SyncIntent<T>>,
    remote: Arc<dyn RemoteClient<T>>,
    auth: Arc<AuthService>,
    core: Weak<ServiceCore<T>>,
    pacing: SyncPacing,
) -> tokio::task::JoinHandle<()>
where
    T: Entity + Serialize + DeserializeOwned,
{
    tokio::spawn(async move {
        let mut pending: Vec<SyncIntent<T>> = Vec::new();
        let mut retry = tokio::time::interval(pacing.retry_interval);
        retry.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately; consume it so the retry
        // cadence starts one interval from now.
        retry.tick().await;

        loop {
            tokio::select! {
                received = rx.recv() => match received {
                    Some(intent) => {
                        coalesce(&mut pending, intent);
                        tokio::time::sleep(pacing.delay).await;
                        while let Ok(next) = rx.try_recv() {
                            coalesce(&mut pending, next);
                        }
                        drain(&mut pending, &remote, &auth, &core).await;
                    }
                    None => {
                        drain(&mut pending, &remote, &auth, &core).await;
                        break;
                    }
                },
                _ = retry.tick() => {
                    if !pending.is_empty() {
                        drain(&mut pending, &remote, &auth, &core).await;
                    }
                }
            }
        }
        debug!("sync worker stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Prompt;

    fn prompt(id: &str) -> Prompt {
        Prompt {
            id: Some(id.to_string()),
            prompt_name: id.to_string(),
            prompt_description: String::new(),
            prompt_text: String::new(),
            color: String::new(),
            variables: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_coalesce_update_replaces_queued_update() {
        let mut pending = Vec::new();
        coalesce(&mut pending, SyncIntent::update("a", prompt("a")));
        let mut newer = prompt("a");
        newer.prompt_name = "newer".to_string();
        coalesce(&mut pending, SyncIntent::update("a", newer));

        assert_eq!(pending.len(), 1);
        assert_eq!(
            pending[0].payload.as_ref().unwrap().prompt_name,
            "newer"
        );
    }

    #[test]
    fn test_coalesce_update_folds_into_pending_create() {
        let mut pending = Vec::new();
        coalesce(&mut pending, SyncIntent::create("temp_1", prompt("temp_1")));
        coalesce(&mut pending, SyncIntent::update("temp_1", prompt("temp_1")));

        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].action, SyncAction::Create);
    }

    #[test]
    fn test_coalesce_delete_cancels_pending_create() {
        let mut pending = Vec::new();
        coalesce(&mut pending, SyncIntent::create("temp_1", prompt("temp_1")));
        coalesce(&mut pending, SyncIntent::delete("temp_1"));

        assert!(pending.is_empty());
    }

    #[test]
    fn test_coalesce_delete_replaces_pending_update() {
        let mut pending = Vec::new();
        coalesce(&mut pending, SyncIntent::update("a", prompt("a")));
        coalesce(&mut pending, SyncIntent::delete("a"));

        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].action, SyncAction::Delete);
    }

    #[test]
    fn test_coalesce_clear_all_supersedes_queue() {
        let mut pending = Vec::new();
        coalesce(&mut pending, SyncIntent::update("a", prompt("a")));
        coalesce(&mut pending, SyncIntent::create("b", prompt("b")));
        coalesce(&mut pending, SyncIntent::clear_all());

        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].action, SyncAction::ClearAll);
    }

    #[test]
    fn test_coalesce_distinct_ids_keep_order() {
        let mut pending = Vec::new();
        coalesce(&mut pending, SyncIntent::create("a", prompt("a")));
        coalesce(&mut pending, SyncIntent::create("b", prompt("b")));

        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].id, "a");
        assert_eq!(pending[1].id, "b");
    }
}
