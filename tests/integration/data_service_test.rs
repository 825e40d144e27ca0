//! Offline-First Data Service Integration Tests
//!
//! The full local-mutation → notify → persist → background-reconciliation
//! loop, exercised against an in-memory remote double.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use promptdeck_desktop::services::api::ApiResult;
use promptdeck_desktop::services::{ApiError, RemoteClient, SyncPacing};
use promptdeck_desktop::storage::LocalStore;
use promptdeck_desktop::{AuthService, DataService, Prompt};

/// Remote double that simulates a server assigning canonical ids
struct FakeServer {
    next_id: AtomicU32,
    items: Mutex<Vec<Prompt>>,
    fetches: AtomicU32,
    fail_next_creates: AtomicU32,
}

impl FakeServer {
    fn new() -> Self {
        Self {
            next_id: AtomicU32::new(1),
            items: Mutex::new(Vec::new()),
            fetches: AtomicU32::new(0),
            fail_next_creates: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl RemoteClient<Prompt> for FakeServer {
    async fn fetch_all(&self, _token: &str) -> ApiResult<Vec<Prompt>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.items.lock().unwrap().clone())
    }

    async fn create(&self, item: &Prompt, _token: &str) -> ApiResult<Prompt> {
        if self.fail_next_creates.load(Ordering::SeqCst) > 0 {
            self.fail_next_creates.fetch_sub(1, Ordering::SeqCst);
            return Err(ApiError::Status {
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                body: "down".to_string(),
            });
        }
        let mut created = item.clone();
        created.id = Some(format!("srv_{}", self.next_id.fetch_add(1, Ordering::SeqCst)));
        self.items.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: &str, item: &Prompt, _token: &str) -> ApiResult<Prompt> {
        let mut items = self.items.lock().unwrap();
        if let Some(slot) = items.iter_mut().find(|i| i.id.as_deref() == Some(id)) {
            *slot = item.clone();
        }
        Ok(item.clone())
    }

    async fn delete(&self, id: &str, _token: &str) -> ApiResult<()> {
        self.items
            .lock()
            .unwrap()
            .retain(|i| i.id.as_deref() != Some(id));
        Ok(())
    }

    async fn clear_all(&self, _token: &str) -> ApiResult<()> {
        self.items.lock().unwrap().clear();
        Ok(())
    }
}

fn prompt(name: &str) -> Prompt {
    Prompt {
        id: None,
        prompt_name: name.to_string(),
        prompt_description: String::new(),
        prompt_text: format!("{name} {{{{topic}}}}"),
        color: "#336699".to_string(),
        variables: Vec::new(),
        created_at: None,
        updated_at: None,
    }
}

struct Harness {
    service: DataService<Prompt>,
    server: Arc<FakeServer>,
    _dir: tempfile::TempDir,
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(LocalStore::at_path(dir.path().join("storage.json")));
    let auth = Arc::new(AuthService::new(store.clone(), "http://localhost:5173/login"));
    auth.store_token("tok_it").unwrap();
    let server = Arc::new(FakeServer::new());
    let service = DataService::new(
        "local_prompts",
        store,
        server.clone() as Arc<dyn RemoteClient<Prompt>>,
        auth,
        SyncPacing::immediate(),
    );
    Harness {
        service,
        server,
        _dir: dir,
    }
}

#[tokio::test]
async fn test_save_is_locally_visible_then_reconciled_with_server_id() {
    let h = harness();

    let saved = h.service.save(prompt("greet")).await.unwrap();
    let temp_id = saved.id.clone().unwrap();
    assert!(temp_id.starts_with("temp_"));
    // Local read works immediately, before any network round-trip
    assert!(h.service.get_by_id(&temp_id).is_some());

    tokio::time::sleep(Duration::from_millis(60)).await;

    // Server assigned srv_1; the local item was rewritten in place
    assert!(h.service.get_by_id("srv_1").is_some());
    assert!(h.service.get_by_id(&temp_id).is_none());
    assert_eq!(h.server.items.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_failed_create_retries_on_next_tick() {
    let h = harness();
    h.server.fail_next_creates.store(1, Ordering::SeqCst);

    h.service.save(prompt("eventually")).await.unwrap();

    // First attempt fails; the retry tick (20ms in test pacing) resubmits
    tokio::time::sleep(Duration::from_millis(120)).await;

    assert_eq!(h.server.items.lock().unwrap().len(), 1);
    assert!(h.service.get_by_id("srv_1").is_some());
}

#[tokio::test]
async fn test_edit_burst_coalesces_into_one_server_write() {
    let h = harness();

    let saved = h.service.save(prompt("v1")).await.unwrap();
    let id = saved.id.unwrap();
    let mut v2 = h.service.get_by_id(&id).unwrap();
    v2.prompt_name = "v2".to_string();
    h.service.save(v2).await.unwrap();
    let mut v3 = h.service.get_by_id(&id).unwrap();
    v3.prompt_name = "v3".to_string();
    h.service.save(v3).await.unwrap();

    tokio::time::sleep(Duration::from_millis(60)).await;

    // The create and both updates collapsed into a single create carrying
    // the newest payload
    let items = h.server.items.lock().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].prompt_name, "v3");
}

#[tokio::test]
async fn test_delete_all_clears_local_and_remote() {
    let h = harness();
    h.service.save(prompt("a")).await.unwrap();
    h.service.save(prompt("b")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(h.server.items.lock().unwrap().len(), 2);

    h.service.delete("all").await.unwrap();
    assert!(h.service.list().is_empty());

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(h.server.items.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_load_from_server_single_flight_and_replace() {
    let h = harness();
    h.server.items.lock().unwrap().push(Prompt {
        id: Some("srv_remote".to_string()),
        ..prompt("remote")
    });

    let before = h.server.fetches.load(Ordering::SeqCst);
    let (a, b) = tokio::join!(h.service.load_from_server(), h.service.load_from_server());
    a.unwrap();
    b.unwrap();

    assert_eq!(h.server.fetches.load(Ordering::SeqCst) - before, 1);
    assert!(h.service.get_by_id("srv_remote").is_some());
}

#[tokio::test]
async fn test_snapshot_survives_restart_via_local_storage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    {
        let store = Arc::new(LocalStore::at_path(path.clone()));
        let auth = Arc::new(AuthService::new(store.clone(), "http://localhost:5173/login"));
        let service: DataService<Prompt> = DataService::new(
            "local_prompts",
            store,
            Arc::new(FakeServer::new()),
            auth,
            SyncPacing::immediate(),
        );
        service.save(prompt("kept")).await.unwrap();
    }

    // New process: no token, server unreachable, but data is there
    let store = Arc::new(LocalStore::at_path(path));
    let auth = Arc::new(AuthService::new(store.clone(), "http://localhost:5173/login"));
    let service: DataService<Prompt> = DataService::new(
        "local_prompts",
        store,
        Arc::new(FakeServer::new()),
        auth,
        SyncPacing::immediate(),
    );
    service.hydrate();

    assert_eq!(service.list().len(), 1);
    assert_eq!(service.list()[0].prompt_name, "kept");
}
