//! Chat service abstraction
//!
//! The remote chat/recommendation service is a black box: given a message,
//! a flow state and the accumulated selections it returns the next bot turn.

mod error;
mod http;
mod types;

pub use error::{ChatError, ChatErrorKind};
pub use http::HttpChatService;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for the remote chat service
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Run one conversation turn
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError>;

    /// Submit a custom trip planning request
    async fn submit_custom_trip(
        &self,
        request: &CustomTripRequest,
    ) -> Result<CustomTripResponse, ChatError>;
}

#[async_trait]
impl<T: ChatService + ?Sized> ChatService for Arc<T> {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError> {
        (**self).chat(request).await
    }

    async fn submit_custom_trip(
        &self,
        request: &CustomTripRequest,
    ) -> Result<CustomTripResponse, ChatError> {
        (**self).submit_custom_trip(request).await
    }
}

/// Logging wrapper for chat services
pub struct LoggingService<S> {
    inner: S,
}

impl<S: ChatService> LoggingService<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: ChatService> ChatService for LoggingService<S> {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError> {
        let start = std::time::Instant::now();
        let result = self.inner.chat(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    flow_state = %request.flow_state,
                    next_state = ?response.flow_state,
                    options = response.options.as_ref().map_or(0, Vec::len),
                    packages = response.packages.as_ref().map_or(0, Vec::len),
                    ai = response.is_ai_response,
                    duration_ms = %duration.as_millis(),
                    "Chat turn completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    flow_state = %request.flow_state,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    transient = e.kind.is_transient(),
                    "Chat turn failed"
                );
            }
        }

        result
    }

    async fn submit_custom_trip(
        &self,
        request: &CustomTripRequest,
    ) -> Result<CustomTripResponse, ChatError> {
        let start = std::time::Instant::now();
        let result = self.inner.submit_custom_trip(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => tracing::info!(
                success = response.success,
                request_id = ?response.request_id,
                duration_ms = %duration.as_millis(),
                "Custom trip submitted"
            ),
            Err(e) => tracing::error!(
                duration_ms = %duration.as_millis(),
                error = %e.message,
                "Custom trip submission failed"
            ),
        }

        result
    }
}
