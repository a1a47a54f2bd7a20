//! Effects produced by state transitions

use super::state::Turn;
use crate::chat::ChatRequest;
use std::time::Duration;

/// Effects to be executed after a state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Call the chat service; the outcome comes back tagged with `epoch` and `turn`
    RequestChat {
        epoch: u64,
        request: ChatRequest,
        turn: Turn,
    },

    /// Fire `ReinitializeTimeout` for `epoch` after `delay`
    ScheduleInitialize { epoch: u64, delay: Duration },
}
