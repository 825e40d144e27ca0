//! Messaging Bridge Integration Tests
//!
//! Action routing from raw tagged messages down to services and the page
//! session, including the forward-to-active-surface fallback.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use promptdeck_desktop::dom::mock::{MockElement, MockPage};
use promptdeck_desktop::dom::ElementKind;
use promptdeck_desktop::services::api::ApiResult;
use promptdeck_desktop::services::{ApiClient, RemoteClient, SyncPacing};
use promptdeck_desktop::storage::LocalStore;
use promptdeck_desktop::{
    AuthService, DataService, DispatchOutcome, Dispatcher, Entity, HistoryEntry, PageSession,
    Prompt,
};

struct NullRemote;

#[async_trait]
impl<T: Entity> RemoteClient<T> for NullRemote {
    async fn fetch_all(&self, _token: &str) -> ApiResult<Vec<T>> {
        Ok(Vec::new())
    }
    async fn create(&self, item: &T, _token: &str) -> ApiResult<T> {
        Ok(item.clone())
    }
    async fn update(&self, _id: &str, item: &T, _token: &str) -> ApiResult<T> {
        Ok(item.clone())
    }
    async fn delete(&self, _id: &str, _token: &str) -> ApiResult<()> {
        Ok(())
    }
    async fn clear_all(&self, _token: &str) -> ApiResult<()> {
        Ok(())
    }
}

struct Harness {
    dispatcher: Dispatcher,
    opened: Arc<Mutex<Vec<String>>>,
    _dir: tempfile::TempDir,
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(LocalStore::at_path(dir.path().join("storage.json")));
    let auth = Arc::new(AuthService::new(store.clone(), "http://localhost:5173/login"));
    let prompts: DataService<Prompt> = DataService::new(
        "local_prompts",
        store.clone(),
        Arc::new(NullRemote),
        auth.clone(),
        SyncPacing::immediate(),
    );
    let history: DataService<HistoryEntry> = DataService::new(
        "local_history",
        store,
        Arc::new(NullRemote),
        auth.clone(),
        SyncPacing::immediate(),
    );
    let opened: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let opened_in_opener = opened.clone();
    let dispatcher = Dispatcher::new(
        prompts,
        history,
        ApiClient::new("http://localhost:8000"),
        auth,
        Arc::new(move |url: &str| opened_in_opener.lock().unwrap().push(url.to_string())),
    );
    Harness {
        dispatcher,
        opened,
        _dir: dir,
    }
}

#[tokio::test]
async fn test_full_save_then_list_flow() {
    let h = harness();

    let saved = h
        .dispatcher
        .dispatch(
            json!({
                "action": "savePromptTemplate",
                "template": {
                    "promptName": "Review",
                    "promptText": "Review this {lang} code",
                    "color": "#112233"
                }
            }),
            None,
        )
        .await;
    let DispatchOutcome::Replied(saved) = saved else {
        panic!("expected reply");
    };
    assert_eq!(saved["success"], true);
    // Single-brace placeholder was normalized and turned into a binding
    assert_eq!(saved["template"]["promptText"], "Review this {{lang}} code");
    assert_eq!(saved["template"]["variables"][0]["name"], "lang");
    let id = saved["template"]["id"].as_str().unwrap();
    assert!(id.starts_with("temp_"));

    let listed = h
        .dispatcher
        .dispatch(json!({"action": "getPromptTemplates"}), None)
        .await;
    let DispatchOutcome::Replied(listed) = listed else {
        panic!("expected reply");
    };
    assert_eq!(listed["templates"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_auth_round_trip() {
    let h = harness();

    let before = h
        .dispatcher
        .dispatch(json!({"action": "checkAuth"}), None)
        .await;
    assert_eq!(
        before,
        DispatchOutcome::Replied(json!({"isAuthenticated": false}))
    );

    h.dispatcher
        .dispatch(json!({"action": "authSuccess", "token": "tok_web"}), None)
        .await;

    let after = h
        .dispatcher
        .dispatch(json!({"action": "checkAuth"}), None)
        .await;
    assert_eq!(
        after,
        DispatchOutcome::Replied(json!({"isAuthenticated": true}))
    );
}

#[tokio::test]
async fn test_enhance_without_auth_redirects_to_login() {
    let h = harness();

    let outcome = h
        .dispatcher
        .dispatch(json!({"action": "enhancePrompt", "text": "improve me"}), None)
        .await;

    let DispatchOutcome::Replied(reply) = outcome else {
        panic!("expected reply");
    };
    assert!(reply.get("error").is_some());
    assert_eq!(
        *h.opened.lock().unwrap(),
        vec!["http://localhost:5173/login".to_string()]
    );
}

#[tokio::test]
async fn test_insert_prompt_routes_into_page_session() {
    let h = harness();
    let element = MockElement::new(ElementKind::TextArea)
        .selector("textarea")
        .shared();
    let page = MockPage::new("https://example.com").with_element(element.clone());
    let session = PageSession::new(Box::new(page), false);

    let outcome = h
        .dispatcher
        .dispatch(
            json!({
                "action": "insertPrompt",
                "text": "Summarize {{what}}",
                "variables": [{"name": "what", "value": "this article"}]
            }),
            Some(&session),
        )
        .await;

    let DispatchOutcome::Replied(reply) = outcome else {
        panic!("expected reply");
    };
    assert_eq!(reply["success"], true);
    assert_eq!(element.content(), "Summarize this article");
}

#[tokio::test]
async fn test_send_to_active_surface_falls_back_to_eval() {
    let h = harness();
    // Page refuses direct messaging; the dispatcher must still deliver
    let page = MockPage::new("https://example.com").reject_messaging();
    let session = PageSession::new(Box::new(page), false);

    let outcome = h
        .dispatcher
        .dispatch(
            json!({
                "action": "sendToActiveSurface",
                "data": {"action": "insertPrompt", "text": "hello"}
            }),
            Some(&session),
        )
        .await;

    assert_eq!(outcome, DispatchOutcome::Replied(json!({"success": true})));
}

#[tokio::test]
async fn test_unknown_actions_are_ignored() {
    let h = harness();
    for raw in [
        json!({"action": "mystery"}),
        json!({"payload": "no action tag"}),
        json!("not even an object"),
    ] {
        assert_eq!(h.dispatcher.dispatch(raw, None).await, DispatchOutcome::Ignored);
    }
}
