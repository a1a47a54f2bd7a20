//! HTTP adapter for the tour chat backend

use super::types::{ChatRequest, ChatResponse, CustomTripRequest, CustomTripResponse};
use super::{ChatError, ChatService};
use crate::config::ClientConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Chat service reached over HTTP (`POST {base}/api/chat`)
pub struct HttpChatService {
    client: Client,
    base_url: String,
}

impl HttpChatService {
    pub fn new(config: &ClientConfig) -> Result<Self, ChatError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ChatError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ChatError>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChatError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    ChatError::network(format!("Connection failed: {e}"))
                } else {
                    ChatError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ChatError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(classify_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            ChatError::invalid_response(format!("Failed to parse response: {e} - body: {body}"))
        })
    }
}

fn classify_error(status: StatusCode, body: &str) -> ChatError {
    match status.as_u16() {
        400 | 422 => ChatError::invalid_request(format!("Invalid request: {body}")),
        500..=599 => ChatError::server_error(format!("Server error: {body}")),
        _ => ChatError::unknown(format!("HTTP {status}: {body}")),
    }
}

#[async_trait]
impl ChatService for HttpChatService {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError> {
        self.post_json("/api/chat", request).await
    }

    async fn submit_custom_trip(
        &self,
        request: &CustomTripRequest,
    ) -> Result<CustomTripResponse, ChatError> {
        self.post_json("/api/custom-trips", request).await
    }
}
