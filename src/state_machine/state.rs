//! Session state types

use crate::chat::{FlowOption, Package};
use crate::flow::{FlowState, Selections};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Bot,
}

/// A conversation turn as rendered by the UI. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub role: Role,
    pub content: String,
    /// Bot only
    pub options: Option<Vec<FlowOption>>,
    /// Bot only
    pub packages: Option<Vec<Package>>,
    pub created_at: DateTime<Utc>,
}

/// User-visible failure banner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionError {
    #[error("Failed to connect to chat service")]
    InitializationFailure,
    #[error("Failed to send message. Please try again.")]
    SendFailure,
}

/// Everything the UI renders from. Owned by the session runtime.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionState {
    pub messages: Vec<Message>,
    pub flow_state: FlowState,
    pub selections: Selections,
    pub is_loading: bool,
    pub error: Option<SessionError>,
    /// Options clickable right now, distinct from options embedded in history
    pub current_options: Option<Vec<FlowOption>>,
    /// Latest known packages, kept until a response replaces them
    pub packages: Vec<Package>,
    pub initialized: bool,
    /// Reset generation; completions from older epochs are discarded
    pub epoch: u64,
    #[serde(skip)]
    pub(crate) next_message_id: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            flow_state: FlowState::INITIAL,
            selections: Selections::new(),
            is_loading: false,
            error: None,
            current_options: None,
            packages: Vec::new(),
            initialized: false,
            epoch: 0,
            next_message_id: 1,
        }
    }
}

impl SessionState {
    /// Fresh session for the next epoch. Message ids keep counting so they
    /// stay unique across resets.
    pub fn next_epoch(&self) -> Self {
        Self {
            epoch: self.epoch + 1,
            next_message_id: self.next_message_id,
            ..Self::default()
        }
    }

    pub fn push_user_message(&mut self, content: impl Into<String>, now: DateTime<Utc>) {
        let id = self.allocate_id();
        self.messages.push(Message {
            id,
            role: Role::User,
            content: content.into(),
            options: None,
            packages: None,
            created_at: now,
        });
    }

    pub fn push_bot_message(
        &mut self,
        content: impl Into<String>,
        options: Option<Vec<FlowOption>>,
        packages: Option<Vec<Package>>,
        now: DateTime<Utc>,
    ) {
        let id = self.allocate_id();
        self.messages.push(Message {
            id,
            role: Role::Bot,
            content: content.into(),
            options,
            packages,
            created_at: now,
        });
    }

    /// Most recent message, if any
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_message_id;
        self.next_message_id += 1;
        id
    }
}

/// What a chat request was issued for, captured before the request starts.
///
/// Completion handling works only from this snapshot plus the response.
#[derive(Debug, Clone, PartialEq)]
pub enum Turn {
    /// Session greeting
    Initialize,
    /// A user send, free text or flow selection
    Send {
        /// Flow state the answer was given in
        sent_in: FlowState,
        selections_before: Selections,
        options_before: Option<Vec<FlowOption>>,
        /// Raw text or option value, without the transport prefix
        text: String,
        is_flow_selection: bool,
    },
}

/// Immutable session configuration
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Pause between a reset and the follow-up initialization
    pub reset_delay: Duration,
}

impl SessionContext {
    pub fn new(reset_delay: Duration) -> Self {
        Self { reset_delay }
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(Duration::from_millis(crate::config::DEFAULT_RESET_DELAY_MS))
    }
}
