//! Session runtime
//!
//! One task owns the `SessionState` and applies events one at a time. Chat
//! requests and reset timers run as spawned tasks that post their outcome
//! back tagged with the epoch they started in. Every new state is published
//! on a watch channel, which is the UI's re-render trigger.

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::SessionRuntime;

use crate::chat::{ChatService, FlowOption};
use crate::state_machine::{Event, SessionContext, SessionState, TransitionError};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};

/// Capacity of the session's event queue
const EVENT_QUEUE_CAPACITY: usize = 32;

/// An event plus, for UI calls, where to report acceptance
#[derive(Debug)]
pub(crate) struct Envelope {
    pub event: Event,
    pub reply: Option<oneshot::Sender<Result<(), TransitionError>>>,
}

impl Envelope {
    pub fn internal(event: Event) -> Self {
        Self { event, reply: None }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionHandleError {
    #[error("Session runtime has stopped")]
    Closed,
    #[error(transparent)]
    Rejected(#[from] TransitionError),
}

/// Handle the UI uses to drive and observe one session
#[derive(Clone)]
pub struct SessionHandle {
    event_tx: mpsc::Sender<Envelope>,
    state_rx: watch::Receiver<SessionState>,
}

impl SessionHandle {
    /// Greet the user. A second call on an initialized session does nothing.
    pub async fn initialize(&self) -> Result<(), SessionHandleError> {
        self.dispatch(Event::Initialize).await
    }

    /// Send free text, or a raw option value when `is_flow_selection` is set.
    ///
    /// Returns once the user's message and the loading flag are visible; the
    /// bot reply arrives later through [`SessionHandle::subscribe`].
    pub async fn send_message(
        &self,
        text: impl Into<String>,
        is_flow_selection: bool,
    ) -> Result<(), SessionHandleError> {
        self.dispatch(Event::UserMessage {
            text: text.into(),
            is_flow_selection,
        })
        .await
    }

    /// Show the option's label as the user's message and send its value
    pub async fn select_option(&self, option: FlowOption) -> Result<(), SessionHandleError> {
        self.dispatch(Event::OptionSelected { option }).await
    }

    /// Drop the conversation and start over after the configured delay
    pub async fn reset(&self) -> Result<(), SessionHandleError> {
        self.dispatch(Event::Reset).await
    }

    /// Current session state
    pub fn snapshot(&self) -> SessionState {
        self.state_rx.borrow().clone()
    }

    /// Receiver that wakes on every state change
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_rx.clone()
    }

    /// Wait until the session is initialized and no turn is in flight
    pub async fn settled(&self) -> Result<SessionState, SessionHandleError> {
        let mut rx = self.state_rx.clone();
        let state = rx
            .wait_for(|s| s.initialized && !s.is_loading)
            .await
            .map_err(|_| SessionHandleError::Closed)?;
        Ok(state.clone())
    }

    async fn dispatch(&self, event: Event) -> Result<(), SessionHandleError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.event_tx
            .send(Envelope {
                event,
                reply: Some(reply_tx),
            })
            .await
            .map_err(|_| SessionHandleError::Closed)?;
        reply_rx.await.map_err(|_| SessionHandleError::Closed)??;
        Ok(())
    }
}

/// Start a session runtime on the current tokio runtime.
///
/// The session is not greeted until [`SessionHandle::initialize`] is called.
/// The runtime stops once every handle and subscriber is dropped.
pub fn spawn_session<C>(client: C, context: SessionContext) -> SessionHandle
where
    C: ChatService + 'static,
{
    let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
    let (state_tx, state_rx) = watch::channel(SessionState::default());

    let runtime = SessionRuntime::new(context, client, event_rx, event_tx.clone(), state_tx);
    tokio::spawn(runtime.run());

    SessionHandle { event_tx, state_rx }
}
