//! Events that drive a session

use super::state::Turn;
use crate::chat::{ChatError, ChatResponse, FlowOption};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // UI events
    Initialize,
    UserMessage {
        text: String,
        is_flow_selection: bool,
    },
    OptionSelected {
        option: FlowOption,
    },
    Reset,

    // Chat service events
    ChatCompleted {
        epoch: u64,
        turn: Turn,
        response: ChatResponse,
    },
    ChatFailed {
        epoch: u64,
        turn: Turn,
        error: ChatError,
    },

    // Timers
    ReinitializeTimeout {
        epoch: u64,
    },
}

impl Event {
    /// Epoch an internal event belongs to; UI events always target the current session
    pub fn epoch(&self) -> Option<u64> {
        match self {
            Event::ChatCompleted { epoch, .. }
            | Event::ChatFailed { epoch, .. }
            | Event::ReinitializeTimeout { epoch } => Some(*epoch),
            Event::Initialize
            | Event::UserMessage { .. }
            | Event::OptionSelected { .. }
            | Event::Reset => None,
        }
    }
}
