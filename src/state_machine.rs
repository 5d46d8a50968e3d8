//! Request controller state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.
//! At most one chat request is outstanding at any time.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;


pub use effect::Effect;
pub use event::{ChatOutcome, Event};
pub use state::{RequestContext, RequestId, RequestState};
pub use transition::{
    transition, TransitionError, TransitionResult, NETWORK_ERROR_TEXT, UNKNOWN_ERROR_TEXT,
};
