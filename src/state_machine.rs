//! Turn orchestration state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.
//! The runtime executes the returned effects and feeds results back in as
//! events.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{CompletionPhase, Effect};
pub use event::TurnEvent;
pub use state::TurnState;
pub use transition::{transition, TransitionError};
