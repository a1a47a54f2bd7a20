//! Tour chat - conversation flow controller for the NZ Tours booking widget
//!
//! Tracks a guided conversation through its flow states, accumulates the
//! user's selections, and keeps the chat usable when the backend is down.

pub mod chat;
pub mod config;
pub mod flow;
pub mod runtime;
pub mod state_machine;
pub mod trip;

pub use chat::{ChatService, HttpChatService, LoggingService};
pub use config::ClientConfig;
pub use flow::{FlowState, SelectionKey, Selections};
pub use runtime::{spawn_session, SessionHandle, SessionHandleError};
pub use state_machine::{SessionContext, SessionState};
