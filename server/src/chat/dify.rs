//! Dify-compatible chat API client.
//!
//! Thin HTTP wrapper for `/v1/chat-messages` (blocking mode) and the
//! knowledge-base listing endpoints. Pure parsing in `parse_answer` and
//! `parse_listing` for testability.

use std::time::Duration;

use super::{ChatAnswer, ChatBackend, ChatError, ChatQuery, KnowledgeItem};
use crate::config::ChatConfig;

const CHAT_PATH: &str = "/v1/chat-messages";
const DATASETS_PATH: &str = "/v1/datasets";
const DATASET_PAGE_LIMIT: u32 = 20;

// =============================================================================
// CLIENT
// =============================================================================

pub struct DifyClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl DifyClient {
    /// # Errors
    ///
    /// Returns [`ChatError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn new(config: &ChatConfig) -> Result<Self, ChatError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ChatError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.base_url.clone(), api_key: config.api_key.clone() })
    }

    async fn read_body(response: reqwest::Response) -> Result<String, ChatError> {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ChatError::ApiRequest(e.to_string()))?;
        if status != 200 {
            return Err(ChatError::ApiResponse { status, body: text });
        }
        Ok(text)
    }

    async fn get(&self, path: &str) -> Result<String, ChatError> {
        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| ChatError::ApiRequest(e.to_string()))?;
        Self::read_body(response).await
    }
}

#[async_trait::async_trait]
impl ChatBackend for DifyClient {
    async fn ask(&self, query: &ChatQuery) -> Result<ChatAnswer, ChatError> {
        let body = ApiRequest {
            inputs: serde_json::Map::new(),
            query: &query.text,
            response_mode: "blocking",
            conversation_id: query.conversation_id.as_deref().unwrap_or_default(),
            user: &query.user,
        };
        let response = self
            .http
            .post(format!("{}{CHAT_PATH}", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::ApiRequest(e.to_string()))?;
        parse_answer(&Self::read_body(response).await?)
    }

    async fn list_datasets(&self) -> Result<Vec<KnowledgeItem>, ChatError> {
        let text = self
            .get(&format!("{DATASETS_PATH}?page=1&limit={DATASET_PAGE_LIMIT}"))
            .await?;
        parse_listing(&text)
    }

    async fn list_documents(&self, dataset_id: &str) -> Result<Vec<KnowledgeItem>, ChatError> {
        let text = self.get(&format!("{DATASETS_PATH}/{dataset_id}/documents")).await?;
        parse_listing(&text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(serde::Serialize)]
struct ApiRequest<'a> {
    inputs: serde_json::Map<String, serde_json::Value>,
    query: &'a str,
    response_mode: &'static str,
    conversation_id: &'a str,
    user: &'a str,
}

#[derive(serde::Deserialize)]
struct ApiAnswer {
    answer: String,
    #[serde(default)]
    conversation_id: Option<String>,
}

#[derive(serde::Deserialize)]
struct ApiListing {
    data: Vec<KnowledgeItem>,
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_answer(json: &str) -> Result<ChatAnswer, ChatError> {
    let api: ApiAnswer = serde_json::from_str(json).map_err(|e| ChatError::ApiParse(e.to_string()))?;
    Ok(ChatAnswer {
        text: api.answer,
        conversation_id: api.conversation_id.filter(|id| !id.is_empty()),
    })
}

fn parse_listing(json: &str) -> Result<Vec<KnowledgeItem>, ChatError> {
    let api: ApiListing = serde_json::from_str(json).map_err(|e| ChatError::ApiParse(e.to_string()))?;
    Ok(api.data)
}

#[cfg(test)]
#[path = "dify_test.rs"]
mod tests;
