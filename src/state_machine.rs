//! Session state machine
//!
//! Elm-style: an explicitly owned `SessionState`, events, and a pure
//! transition function that returns the next state plus effects to run.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;


pub use effect::Effect;
pub use event::Event;
pub use state::{Message, Role, SessionContext, SessionError, SessionState, Turn};
pub use transition::{
    fallback_options, transition, TransitionError, TransitionResult, APOLOGY_MESSAGE,
    FALLBACK_GREETING,
};
