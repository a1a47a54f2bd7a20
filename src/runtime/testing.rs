//! Mock chat services for testing
//!
//! These mocks enable exercising the runtime without a chat backend.

use crate::chat::{
    ChatError, ChatRequest, ChatResponse, ChatService, CustomTripRequest, CustomTripResponse,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

struct Queued<T> {
    result: Result<T, ChatError>,
    delay: Option<Duration>,
}

/// Mock chat service that replays queued outcomes in order.
///
/// An empty queue behaves like an unreachable service.
#[derive(Default)]
pub struct MockChatService {
    responses: Mutex<VecDeque<Queued<ChatResponse>>>,
    trip_responses: Mutex<VecDeque<Queued<CustomTripResponse>>>,
    /// Record of all chat requests made
    pub requests: Mutex<Vec<ChatRequest>>,
    /// Record of all trip submissions made
    pub trip_requests: Mutex<Vec<CustomTripRequest>>,
}

impl MockChatService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: ChatResponse) {
        self.push(Ok(response), None);
    }

    /// Queue a response that arrives after `delay`
    pub fn queue_delayed_response(&self, response: ChatResponse, delay: Duration) {
        self.push(Ok(response), Some(delay));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: ChatError) {
        self.push(Err(error), None);
    }

    pub fn queue_delayed_error(&self, error: ChatError, delay: Duration) {
        self.push(Err(error), Some(delay));
    }

    pub fn queue_trip_response(&self, response: CustomTripResponse) {
        self.trip_responses.lock().unwrap().push_back(Queued {
            result: Ok(response),
            delay: None,
        });
    }

    pub fn queue_trip_error(&self, error: ChatError) {
        self.trip_responses.lock().unwrap().push_back(Queued {
            result: Err(error),
            delay: None,
        });
    }

    /// Get recorded chat requests
    pub fn recorded_requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn recorded_trip_requests(&self) -> Vec<CustomTripRequest> {
        self.trip_requests.lock().unwrap().clone()
    }

    fn push(&self, result: Result<ChatResponse, ChatError>, delay: Option<Duration>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Queued { result, delay });
    }
}

#[async_trait]
impl ChatService for MockChatService {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError> {
        self.requests.lock().unwrap().push(request.clone());
        // Claim the outcome at call time so delayed replies keep their slot
        let queued = self.responses.lock().unwrap().pop_front();
        let Some(Queued { result, delay }) = queued else {
            return Err(ChatError::network("No mock response queued"));
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result
    }

    async fn submit_custom_trip(
        &self,
        request: &CustomTripRequest,
    ) -> Result<CustomTripResponse, ChatError> {
        self.trip_requests.lock().unwrap().push(request.clone());
        let queued = self.trip_responses.lock().unwrap().pop_front();
        queued.map_or_else(
            || Err(ChatError::network("No mock response queued")),
            |q| q.result,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{FlowOption, Package};
    use crate::flow::{FlowState, SelectionKey, Selections};
    use crate::runtime::{spawn_session, SessionHandle, SessionHandleError};
    use crate::state_machine::{
        Role, SessionContext, SessionError, TransitionError, APOLOGY_MESSAGE, FALLBACK_GREETING,
    };
    use std::sync::Arc;

    fn test_context() -> SessionContext {
        SessionContext::new(Duration::from_millis(20))
    }

    fn greeting() -> ChatResponse {
        ChatResponse::new("Kia Ora! How would you like to explore?", FlowState::Greeting)
            .with_options(vec![
                FlowOption::new("Browse Packages", "browse", FlowState::Destination),
                FlowOption::new("Talk to AI Assistant", "ai", FlowState::AiChat),
            ])
    }

    fn start(mock: &Arc<MockChatService>) -> SessionHandle {
        spawn_session(Arc::clone(mock), test_context())
    }

    async fn idle(handle: &SessionHandle) -> crate::state_machine::SessionState {
        tokio::time::timeout(Duration::from_secs(5), handle.settled())
            .await
            .expect("session did not settle")
            .unwrap()
    }

    #[tokio::test]
    async fn test_mock_chat_service() {
        let mock = MockChatService::new();
        mock.queue_response(greeting());

        let request = ChatRequest {
            message: String::new(),
            flow_state: FlowState::Greeting,
            selections: Selections::new(),
        };
        let response = mock.chat(&request).await.unwrap();
        assert_eq!(response.flow_state, Some(FlowState::Greeting));

        // Queue drained: behaves as unreachable
        assert!(mock.chat(&request).await.is_err());
        assert_eq!(mock.recorded_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_initialize_success() {
        let mock = Arc::new(MockChatService::new());
        mock.queue_response(greeting());
        let handle = start(&mock);

        handle.initialize().await.unwrap();
        let state = idle(&handle).await;

        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].role, Role::Bot);
        assert_eq!(state.flow_state, FlowState::Greeting);
        assert_eq!(state.current_options.as_ref().map(Vec::len), Some(2));
        assert_eq!(state.error, None);

        let requests = mock.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].message, "");
        assert_eq!(requests[0].flow_state, FlowState::Greeting);
    }

    #[tokio::test]
    async fn test_initialize_offline_shows_fallback_menu() {
        let mock = Arc::new(MockChatService::new());
        mock.queue_error(ChatError::network("Connection refused"));
        let handle = start(&mock);

        handle.initialize().await.unwrap();
        let state = idle(&handle).await;

        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].role, Role::Bot);
        assert_eq!(state.messages[0].content, FALLBACK_GREETING);
        let values: Vec<_> = state.messages[0]
            .options
            .iter()
            .flatten()
            .map(|o| o.value.clone())
            .collect();
        assert_eq!(values, vec!["browse", "custom", "ai"]);
        assert_eq!(state.error, Some(SessionError::InitializationFailure));
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let mock = Arc::new(MockChatService::new());
        mock.queue_response(greeting());
        let handle = start(&mock);

        handle.initialize().await.unwrap();
        idle(&handle).await;
        handle.initialize().await.unwrap();

        assert_eq!(handle.snapshot().messages.len(), 1);
        assert_eq!(mock.recorded_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_select_option_records_selection() {
        let mock = Arc::new(MockChatService::new());
        mock.queue_response(greeting());
        mock.queue_response(ChatResponse::new("Which region?", FlowState::Destination));
        mock.queue_response(ChatResponse::new("What type?", FlowState::TripType));
        mock.queue_response(ChatResponse::new("How long?", FlowState::Duration));
        mock.queue_response(ChatResponse::new("Budget?", FlowState::Budget));
        mock.queue_response(ChatResponse::new("How many?", FlowState::GroupSize));
        let handle = start(&mock);

        handle.initialize().await.unwrap();
        idle(&handle).await;

        for (label, value) in [
            ("Browse Packages", "browse"),
            ("South Island", "south"),
            ("Nature & Wildlife", "nature"),
            ("1 Week", "week"),
        ] {
            handle
                .select_option(FlowOption::new(label, value, FlowState::Greeting))
                .await
                .unwrap();
            idle(&handle).await;
        }
        assert_eq!(handle.snapshot().flow_state, FlowState::Budget);

        handle
            .select_option(FlowOption::new("Mid-Range", "mid", FlowState::GroupSize))
            .await
            .unwrap();
        let state = idle(&handle).await;

        let expected: Selections = [
            (SelectionKey::Destination, "south"),
            (SelectionKey::TripType, "nature"),
            (SelectionKey::Duration, "week"),
            (SelectionKey::Budget, "mid"),
        ]
        .into_iter()
        .collect();
        assert_eq!(state.selections, expected);

        let tail: Vec<_> = state.messages[state.messages.len() - 2..]
            .iter()
            .map(|m| (m.role, m.content.clone()))
            .collect();
        assert_eq!(
            tail,
            vec![
                (Role::User, "Mid-Range".to_string()),
                (Role::Bot, "How many?".to_string())
            ]
        );

        let last_request = mock.recorded_requests().pop().unwrap();
        assert_eq!(last_request.message, "_flow:mid");
        assert_eq!(last_request.flow_state, FlowState::Budget);
    }

    #[tokio::test]
    async fn test_user_message_visible_before_reply() {
        let mock = Arc::new(MockChatService::new());
        mock.queue_response(greeting());
        mock.queue_delayed_response(
            ChatResponse::new("Summer is best", FlowState::AiChat),
            Duration::from_millis(200),
        );
        let handle = start(&mock);
        handle.initialize().await.unwrap();
        idle(&handle).await;

        handle.send_message("When should I visit?", false).await.unwrap();

        let pending = handle.snapshot();
        assert!(pending.is_loading);
        assert_eq!(pending.current_options, None);
        assert_eq!(pending.messages.last().unwrap().content, "When should I visit?");
        assert_eq!(pending.messages.last().unwrap().role, Role::User);

        let state = idle(&handle).await;
        assert_eq!(state.messages.last().unwrap().content, "Summer is best");
        assert_eq!(state.flow_state, FlowState::AiChat);
    }

    #[tokio::test]
    async fn test_empty_message_is_ignored() {
        let mock = Arc::new(MockChatService::new());
        mock.queue_response(greeting());
        let handle = start(&mock);
        handle.initialize().await.unwrap();
        let before = idle(&handle).await;

        handle.send_message("", false).await.unwrap();

        assert_eq!(handle.snapshot(), before);
        assert_eq!(mock.recorded_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_send_failure_keeps_progress() {
        let mock = Arc::new(MockChatService::new());
        mock.queue_response(greeting());
        mock.queue_response(ChatResponse::new("Which region?", FlowState::Destination).with_options(
            vec![FlowOption::new("North Island", "north", FlowState::TripType)],
        ));
        mock.queue_error(ChatError::server_error("Server error: 502"));
        let handle = start(&mock);
        handle.initialize().await.unwrap();
        idle(&handle).await;
        handle.send_message("browse", true).await.unwrap();
        let before = idle(&handle).await;

        handle.send_message("north", true).await.unwrap();
        let state = idle(&handle).await;

        assert_eq!(state.error, Some(SessionError::SendFailure));
        assert_eq!(state.flow_state, FlowState::Destination);
        assert!(state.selections.is_empty());
        assert_eq!(state.current_options, before.current_options);
        assert_eq!(state.messages.last().unwrap().content, APOLOGY_MESSAGE);
    }

    #[tokio::test]
    async fn test_busy_session_rejects_second_send() {
        let mock = Arc::new(MockChatService::new());
        mock.queue_response(greeting());
        mock.queue_delayed_response(
            ChatResponse::new("Thinking done", FlowState::AiChat),
            Duration::from_millis(200),
        );
        let handle = start(&mock);
        handle.initialize().await.unwrap();
        idle(&handle).await;

        handle.send_message("first", false).await.unwrap();
        let err = handle.send_message("second", false).await.unwrap_err();
        assert_eq!(err, SessionHandleError::Rejected(TransitionError::Busy));

        let state = idle(&handle).await;
        assert!(state.messages.iter().all(|m| m.content != "second"));
        assert_eq!(mock.recorded_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_reset_reinitializes_with_same_fallback() {
        let mock = Arc::new(MockChatService::new());
        let handle = start(&mock);

        handle.initialize().await.unwrap();
        let first = idle(&handle).await;

        handle.reset().await.unwrap();
        let cleared = handle.snapshot();
        assert!(cleared.messages.is_empty());
        assert!(!cleared.initialized);
        assert_eq!(cleared.flow_state, FlowState::Greeting);

        let second = idle(&handle).await;
        assert_eq!(second.epoch, 1);
        assert_eq!(second.messages.len(), 1);
        assert_eq!(second.messages[0].content, first.messages[0].content);
        assert_eq!(second.messages[0].options, first.messages[0].options);
        assert_eq!(second.current_options, first.current_options);
        assert_eq!(second.error, first.error);
    }

    #[tokio::test]
    async fn test_stale_reply_after_reset_is_discarded() {
        let mock = Arc::new(MockChatService::new());
        mock.queue_response(greeting());
        mock.queue_delayed_response(
            ChatResponse::new("Here are packages", FlowState::ShowPackages).with_packages(vec![
                serde_json::from_value::<Package>(
                    serde_json::json!({ "id": "P1", "name": "Late Tour" }),
                )
                .unwrap(),
            ]),
            Duration::from_millis(300),
        );
        mock.queue_response(greeting());
        let handle = start(&mock);
        handle.initialize().await.unwrap();
        idle(&handle).await;

        handle.send_message("group", false).await.unwrap();
        handle.reset().await.unwrap();
        let fresh = idle(&handle).await;
        assert_eq!(fresh.epoch, 1);

        // Let the late reply land
        tokio::time::sleep(Duration::from_millis(400)).await;
        let state = handle.snapshot();
        assert_eq!(state.flow_state, FlowState::Greeting);
        assert!(state.packages.is_empty());
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].content, greeting().message);
    }

    #[tokio::test]
    async fn test_send_during_reset_window_is_rejected() {
        let mock = Arc::new(MockChatService::new());
        mock.queue_response(greeting());
        mock.queue_response(greeting());
        let handle = spawn_session(
            Arc::clone(&mock),
            SessionContext::new(Duration::from_millis(200)),
        );
        handle.initialize().await.unwrap();
        idle(&handle).await;

        handle.reset().await.unwrap();
        let err = handle.send_message("hello", false).await.unwrap_err();
        assert_eq!(err, SessionHandleError::Rejected(TransitionError::NotReady));

        let state = idle(&handle).await;
        assert!(state.initialized);
        assert_eq!(state.epoch, 1);
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].content, greeting().message);

        let requests = mock.recorded_requests();
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|r| r.message.is_empty()));
    }

    #[tokio::test]
    async fn test_stale_failure_after_reset_is_discarded() {
        let mock = Arc::new(MockChatService::new());
        mock.queue_response(greeting());
        mock.queue_delayed_error(
            ChatError::network("Request timeout"),
            Duration::from_millis(300),
        );
        mock.queue_response(greeting());
        let handle = start(&mock);
        handle.initialize().await.unwrap();
        idle(&handle).await;

        handle.send_message("Any hot pools?", false).await.unwrap();
        handle.reset().await.unwrap();
        idle(&handle).await;

        // Let the late failure land
        tokio::time::sleep(Duration::from_millis(400)).await;
        let state = handle.snapshot();
        assert_eq!(state.error, None);
        assert_eq!(state.messages.len(), 1);
        assert!(state.messages.iter().all(|m| m.content != APOLOGY_MESSAGE));
    }

    #[tokio::test]
    async fn test_packages_retained_across_turns() {
        let mock = Arc::new(MockChatService::new());
        mock.queue_response(greeting());
        mock.queue_response(
            ChatResponse::new("Perfect packages!", FlowState::ShowPackages).with_packages(vec![
                serde_json::from_value(serde_json::json!({ "id": "P1", "name": "Alps" })).unwrap(),
            ]),
        );
        mock.queue_response(ChatResponse::new("Great question", FlowState::AiChat));
        let handle = start(&mock);
        handle.initialize().await.unwrap();
        idle(&handle).await;

        handle.send_message("small", true).await.unwrap();
        assert_eq!(idle(&handle).await.packages.len(), 1);

        handle.send_message("Is it family friendly?", false).await.unwrap();
        let state = idle(&handle).await;
        assert_eq!(state.packages.len(), 1);
        assert_eq!(state.packages[0].id, "P1");
    }
}
