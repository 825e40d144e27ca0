//! Remote API Client
//!
//! Thin reqwest client over the backend's CRUD and enhance endpoints. List
//! responses arrive wrapped (`{"prompts": [...]}` etc.); every request
//! carries a bearer token. Errors stay at this boundary: callers get an
//! `ApiError` value, and the degrade helpers turn list failures into empty
//! collections for UI-facing paths.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::models::{HistoryEntry, Prompt, Variable};

use super::sync::RemoteClient;

/// Errors from remote API calls
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection/transport failure
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response
    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// Body did not parse as the expected shape
    #[error("response decoding failed: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result type alias for API calls
pub type ApiResult<T> = Result<T, ApiError>;

/// Build the shared reqwest client
pub fn build_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .build()
        .expect("failed to build reqwest client")
}

#[derive(Deserialize)]
struct PromptListResponse {
    prompts: Vec<Prompt>,
}

#[derive(Deserialize)]
struct VariableListResponse {
    variables: Vec<Variable>,
}

#[derive(Deserialize)]
struct HistoryListResponse {
    history: Vec<HistoryEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnhanceResponse {
    enhanced_text: String,
}

/// Client for the PromptDeck backend
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: build_http_client(),
            base_url,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn expect_json<T: serde::de::DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> ApiResult<T> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn expect_ok(&self, builder: reqwest::RequestBuilder) -> ApiResult<()> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }
        Ok(())
    }

    // ----- prompts -----

    pub async fn list_prompts(&self, token: &str) -> ApiResult<Vec<Prompt>> {
        let response: PromptListResponse = self
            .expect_json(
                self.client
                    .get(self.endpoint("/api/prompts"))
                    .bearer_auth(token),
            )
            .await?;
        Ok(response.prompts)
    }

    pub async fn create_prompt(&self, prompt: &Prompt, token: &str) -> ApiResult<Prompt> {
        self.expect_json(
            self.client
                .post(self.endpoint("/api/prompts"))
                .bearer_auth(token)
                .json(prompt),
        )
        .await
    }

    pub async fn update_prompt(&self, id: &str, prompt: &Prompt, token: &str) -> ApiResult<Prompt> {
        self.expect_json(
            self.client
                .put(self.endpoint(&format!("/api/prompts/{}", urlencoding::encode(id))))
                .bearer_auth(token)
                .json(prompt),
        )
        .await
    }

    pub async fn delete_prompt(&self, id: &str, token: &str) -> ApiResult<()> {
        self.expect_ok(
            self.client
                .delete(self.endpoint(&format!("/api/prompts/{}", urlencoding::encode(id))))
                .bearer_auth(token),
        )
        .await
    }

    // ----- variables -----

    pub async fn list_variables(&self, token: &str) -> ApiResult<Vec<Variable>> {
        let response: VariableListResponse = self
            .expect_json(
                self.client
                    .get(self.endpoint("/api/variables"))
                    .bearer_auth(token),
            )
            .await?;
        Ok(response.variables)
    }

    pub async fn create_variable(&self, variable: &Variable, token: &str) -> ApiResult<Variable> {
        self.expect_json(
            self.client
                .post(self.endpoint("/api/variables"))
                .bearer_auth(token)
                .json(variable),
        )
        .await
    }

    pub async fn update_variable(
        &self,
        id: &str,
        variable: &Variable,
        token: &str,
    ) -> ApiResult<Variable> {
        self.expect_json(
            self.client
                .put(self.endpoint(&format!("/api/variables/{}", urlencoding::encode(id))))
                .bearer_auth(token)
                .json(variable),
        )
        .await
    }

    pub async fn delete_variable(&self, id: &str, token: &str) -> ApiResult<()> {
        self.expect_ok(
            self.client
                .delete(self.endpoint(&format!("/api/variables/{}", urlencoding::encode(id))))
                .bearer_auth(token),
        )
        .await
    }

    // ----- history -----

    pub async fn list_history(
        &self,
        token: &str,
        limit: u32,
        offset: u32,
    ) -> ApiResult<Vec<HistoryEntry>> {
        let response: HistoryListResponse = self
            .expect_json(
                self.client
                    .get(self.endpoint(&format!("/api/history?limit={limit}&offset={offset}")))
                    .bearer_auth(token),
            )
            .await?;
        Ok(response.history)
    }

    pub async fn add_history_entry(
        &self,
        entry: &HistoryEntry,
        token: &str,
    ) -> ApiResult<HistoryEntry> {
        self.expect_json(
            self.client
                .post(self.endpoint("/api/history"))
                .bearer_auth(token)
                .json(entry),
        )
        .await
    }

    pub async fn delete_history_entry(&self, id: &str, token: &str) -> ApiResult<()> {
        self.expect_ok(
            self.client
                .delete(self.endpoint(&format!("/api/history/{}", urlencoding::encode(id))))
                .bearer_auth(token),
        )
        .await
    }

    /// Bulk delete of the whole history
    pub async fn clear_history(&self, token: &str) -> ApiResult<()> {
        self.expect_ok(
            self.client
                .delete(self.endpoint("/api/history"))
                .bearer_auth(token),
        )
        .await
    }

    // ----- enhancement -----

    pub async fn enhance_prompt(&self, text: &str, token: &str) -> ApiResult<String> {
        let response: EnhanceResponse = self
            .expect_json(
                self.client
                    .post(self.endpoint("/api/enhance-prompt"))
                    .bearer_auth(token)
                    .json(&serde_json::json!({ "text": text })),
            )
            .await?;
        Ok(response.enhanced_text)
    }

    // ----- degrade helpers for UI-facing list reads -----

    pub async fn list_prompts_or_empty(&self, token: &str) -> Vec<Prompt> {
        match self.list_prompts(token).await {
            Ok(prompts) => prompts,
            Err(e) => {
                warn!("prompt list fetch degraded to empty: {e}");
                Vec::new()
            }
        }
    }

    pub async fn list_history_or_empty(&self, token: &str, limit: u32, offset: u32) -> Vec<HistoryEntry> {
        match self.list_history(token, limit, offset).await {
            Ok(history) => history,
            Err(e) => {
                warn!("history list fetch degraded to empty: {e}");
                Vec::new()
            }
        }
    }
}

/// Reconciliation surface for prompts
pub struct PromptRemote {
    api: ApiClient,
}

impl PromptRemote {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl RemoteClient<Prompt> for PromptRemote {
    async fn fetch_all(&self, token: &str) -> ApiResult<Vec<Prompt>> {
        self.api.list_prompts(token).await
    }

    async fn create(&self, item: &Prompt, token: &str) -> ApiResult<Prompt> {
        self.api.create_prompt(item, token).await
    }

    async fn update(&self, id: &str, item: &Prompt, token: &str) -> ApiResult<Prompt> {
        self.api.update_prompt(id, item, token).await
    }

    async fn delete(&self, id: &str, token: &str) -> ApiResult<()> {
        self.api.delete_prompt(id, token).await
    }

    async fn clear_all(&self, token: &str) -> ApiResult<()> {
        // No bulk endpoint; enumerate the server list and delete one by one
        for prompt in self.api.list_prompts(token).await? {
            if let Some(id) = &prompt.id {
                self.api.delete_prompt(id, token).await?;
            }
        }
        Ok(())
    }
}

/// Reconciliation surface for global variables
pub struct VariableRemote {
    api: ApiClient,
}

impl VariableRemote {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl RemoteClient<Variable> for VariableRemote {
    async fn fetch_all(&self, token: &str) -> ApiResult<Vec<Variable>> {
        self.api.list_variables(token).await
    }

    async fn create(&self, item: &Variable, token: &str) -> ApiResult<Variable> {
        self.api.create_variable(item, token).await
    }

    async fn update(&self, id: &str, item: &Variable, token: &str) -> ApiResult<Variable> {
        self.api.update_variable(id, item, token).await
    }

    async fn delete(&self, id: &str, token: &str) -> ApiResult<()> {
        self.api.delete_variable(id, token).await
    }

    async fn clear_all(&self, token: &str) -> ApiResult<()> {
        for variable in self.api.list_variables(token).await? {
            if let Some(id) = &variable.id {
                self.api.delete_variable(id, token).await?;
            }
        }
        Ok(())
    }
}

/// Reconciliation surface for history
pub struct HistoryRemote {
    api: ApiClient,
    page_size: u32,
}

impl HistoryRemote {
    pub fn new(api: ApiClient, page_size: u32) -> Self {
        Self { api, page_size }
    }
}

#[async_trait]
impl RemoteClient<HistoryEntry> for HistoryRemote {
    async fn fetch_all(&self, token: &str) -> ApiResult<Vec<HistoryEntry>> {
        self.api.list_history(token, self.page_size, 0).await
    }

    async fn create(&self, item: &HistoryEntry, token: &str) -> ApiResult<HistoryEntry> {
        self.api.add_history_entry(item, token).await
    }

    async fn update(&self, _id: &str, item: &HistoryEntry, _token: &str) -> ApiResult<HistoryEntry> {
        // History entries are append-only; nothing to update
        Ok(item.clone())
    }

    async fn delete(&self, id: &str, token: &str) -> ApiResult<()> {
        self.api.delete_history_entry(id, token).await
    }

    async fn clear_all(&self, token: &str) -> ApiResult<()> {
        self.api.clear_history(token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:8000/");
        assert_eq!(client.endpoint("/api/prompts"), "http://localhost:8000/api/prompts");
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let client = ApiClient::new("https://api.example.com");
        assert_eq!(
            client.endpoint("/api/history?limit=20&offset=0"),
            "https://api.example.com/api/history?limit=20&offset=0"
        );
    }

    #[test]
    fn test_enhance_response_parses_camel_case() {
        let response: EnhanceResponse =
            serde_json::from_str(r#"{"enhancedText": "better"}"#).unwrap();
        assert_eq!(response.enhanced_text, "better");
    }

    #[test]
    fn test_wrapped_list_response_parses() {
        let response: PromptListResponse = serde_json::from_str(
            r#"{"prompts": [{"promptName": "a", "promptText": "b"}]}"#,
        )
        .unwrap();
        assert_eq!(response.prompts.len(), 1);
    }
}
