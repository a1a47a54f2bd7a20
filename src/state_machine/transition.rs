//! Pure state transition function
//!
//! Given the same state, context, event and clock reading, `transition`
//! always yields the same new state and effects. All I/O happens in the
//! runtime that executes the effects.

use super::state::{SessionError, Turn};
use super::{Effect, Event, SessionContext, SessionState};
use crate::chat::{ChatError, ChatRequest, ChatResponse, FlowOption};
use crate::flow::{
    selection_key_for, FlowState, Selections, FLOW_SELECTION_PREFIX, RESTART_VALUE,
};
use chrono::{DateTime, Utc};
use thiserror::Error;

pub const FALLBACK_GREETING: &str = "Kia Ora! Welcome to NZ Tours. I'm here to help you discover the magic of Aotearoa New Zealand. How would you like to explore?";

pub const APOLOGY_MESSAGE: &str =
    "I'm sorry, I'm having trouble connecting. Please try again in a moment.";

/// Menu offered when the chat service cannot be reached at session start
pub fn fallback_options() -> Vec<FlowOption> {
    vec![
        FlowOption::new("Browse Packages", "browse", FlowState::Destination),
        FlowOption::new("Plan Custom Trip", "custom", FlowState::Destination),
        FlowOption::new("Talk to AI Assistant", "ai", FlowState::AiChat),
    ]
}

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("A message is already being processed, wait for the reply")]
    Busy,
    #[error("The session is starting, wait for the greeting")]
    NotReady,
    #[error("Stale event from epoch {event_epoch} (current epoch {current_epoch})")]
    Stale {
        event_epoch: u64,
        current_epoch: u64,
    },
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
pub fn transition(
    state: &SessionState,
    context: &SessionContext,
    event: Event,
    now: DateTime<Utc>,
) -> Result<TransitionResult, TransitionError> {
    if let Some(event_epoch) = event.epoch() {
        if event_epoch != state.epoch {
            return Err(TransitionError::Stale {
                event_epoch,
                current_epoch: state.epoch,
            });
        }
    }

    match event {
        // ============================================================
        // Initialization
        // ============================================================
        Event::Initialize | Event::ReinitializeTimeout { .. } => {
            if state.initialized {
                return Ok(TransitionResult::new(state.clone()));
            }

            let mut new_state = state.clone();
            new_state.initialized = true;
            new_state.is_loading = true;

            let request = ChatRequest {
                message: String::new(),
                flow_state: FlowState::INITIAL,
                selections: Selections::new(),
            };
            Ok(TransitionResult::new(new_state).with_effect(Effect::RequestChat {
                epoch: state.epoch,
                request,
                turn: Turn::Initialize,
            }))
        }

        // ============================================================
        // User input
        // ============================================================

        // Empty free text is dropped without touching anything
        Event::UserMessage {
            text,
            is_flow_selection: false,
        } if text.trim().is_empty() => Ok(TransitionResult::new(state.clone())),

        // Input before the greeting request would race the deferred
        // initialize of a reset
        Event::UserMessage { .. } | Event::OptionSelected { .. } if !state.initialized => {
            Err(TransitionError::NotReady)
        }

        Event::UserMessage { .. } | Event::OptionSelected { .. } if state.is_loading => {
            Err(TransitionError::Busy)
        }

        Event::UserMessage {
            text,
            is_flow_selection,
        } => {
            let mut new_state = state.clone();
            if !is_flow_selection {
                new_state.push_user_message(text.clone(), now);
            }
            Ok(begin_send(new_state, text, is_flow_selection))
        }

        Event::OptionSelected { option } => {
            let mut new_state = state.clone();
            new_state.push_user_message(option.label, now);
            Ok(begin_send(new_state, option.value, true))
        }

        // ============================================================
        // Chat service outcomes
        // ============================================================
        Event::ChatCompleted { .. } | Event::ChatFailed { .. } if !state.is_loading => {
            Err(TransitionError::InvalidTransition(
                "chat outcome received with no request in flight".to_string(),
            ))
        }

        Event::ChatCompleted { turn, response, .. } => {
            let mut new_state = state.clone();
            if let Turn::Send {
                sent_in,
                selections_before,
                text,
                is_flow_selection,
                ..
            } = turn
            {
                new_state.selections =
                    record_selection(selections_before, sent_in, &text, is_flow_selection);
            }
            apply_response(&mut new_state, response, now);
            Ok(TransitionResult::new(new_state))
        }

        Event::ChatFailed { turn, .. } => {
            let mut new_state = state.clone();
            new_state.is_loading = false;
            match turn {
                Turn::Initialize => {
                    new_state.error = Some(SessionError::InitializationFailure);
                    new_state.current_options = Some(fallback_options());
                    new_state.push_bot_message(
                        FALLBACK_GREETING,
                        Some(fallback_options()),
                        None,
                        now,
                    );
                }
                Turn::Send {
                    sent_in,
                    selections_before,
                    options_before,
                    ..
                } => {
                    new_state.error = Some(SessionError::SendFailure);
                    new_state.flow_state = sent_in;
                    new_state.selections = selections_before;
                    new_state.current_options = options_before;
                    new_state.push_bot_message(APOLOGY_MESSAGE, None, None, now);
                }
            }
            Ok(TransitionResult::new(new_state))
        }

        // ============================================================
        // Reset
        // ============================================================
        Event::Reset => {
            let new_state = state.next_epoch();
            let epoch = new_state.epoch;
            Ok(
                TransitionResult::new(new_state).with_effect(Effect::ScheduleInitialize {
                    epoch,
                    delay: context.reset_delay,
                }),
            )
        }
    }
}

/// Shared tail of a user send: mark loading, hide the previous options, and
/// request the next turn with a snapshot of the pre-send state.
fn begin_send(mut state: SessionState, text: String, is_flow_selection: bool) -> TransitionResult {
    let options_before = state.current_options.take();
    state.is_loading = true;
    state.error = None;

    let message = if is_flow_selection {
        format!("{FLOW_SELECTION_PREFIX}{text}")
    } else {
        text.clone()
    };

    let request = ChatRequest {
        message,
        flow_state: state.flow_state,
        selections: state.selections.clone(),
    };
    let turn = Turn::Send {
        sent_in: state.flow_state,
        selections_before: state.selections.clone(),
        options_before,
        text,
        is_flow_selection,
    };
    let epoch = state.epoch;

    TransitionResult::new(state).with_effect(Effect::RequestChat {
        epoch,
        request,
        turn,
    })
}

/// Selections after a successful send. Keyed by the state the answer was
/// given in, never by the state the response moves to.
fn record_selection(
    mut selections: Selections,
    sent_in: FlowState,
    text: &str,
    is_flow_selection: bool,
) -> Selections {
    if is_flow_selection && sent_in != FlowState::ShowPackages {
        if let Some(key) = selection_key_for(sent_in) {
            selections.insert(key, text);
        }
    }
    if text == RESTART_VALUE {
        selections.clear();
    }
    selections
}

fn apply_response(state: &mut SessionState, response: ChatResponse, now: DateTime<Utc>) {
    let ChatResponse {
        message,
        flow_state,
        options,
        packages,
        ..
    } = response;

    if let Some(flow_state) = flow_state {
        state.flow_state = flow_state;
    }
    state.current_options.clone_from(&options);
    if let Some(packages) = &packages {
        state.packages.clone_from(packages);
    }
    state.push_bot_message(message, options, packages, now);
    state.error = None;
    state.is_loading = false;
}

/// Why a chat request failed, as recorded in logs
pub fn describe_failure(turn: &Turn, error: &ChatError) -> String {
    match turn {
        Turn::Initialize => format!("initialization failed: {error}"),
        Turn::Send { sent_in, .. } => format!("send in {sent_in} failed: {error}"),
    }
}
