//! Gate and binding between the gamepad poller and the quiz session
//!
//! The gate is a plain shared boolean flipped by the UI toggle. The binding
//! starts and stops the poller together with the gate and checks the gate
//! inside the press sink, at the last moment before a press leaves the
//! controller subsystem.

pub mod binding;
pub mod gate;

pub use binding::{GamepadBinding, InputStatus};
pub use gate::InputGate;
