//! Quiz session state machine
//!
//! - [`state`] - The session record and the view derived from it
//! - [`controller`] - Server round trips and the guards around them
//! - [`driver`] - Feeds UI commands and gamepad presses into the controller

pub mod controller;
pub mod driver;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

pub use controller::SessionController;
pub use driver::{SessionCommand, SessionDriver};
pub use state::{
    AnswerOutcome, FinalScore, Question, ResultLine, SessionPhase, SessionState, SessionView,
};
